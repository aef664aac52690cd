//! Native module loading and locale setup.

use std::env::consts::DLL_SUFFIX;
use std::ffi::{CStr, CString, c_void};
use std::fmt;
use std::ptr::NonNull;
use std::sync::OnceLock;

use libloading::Library;
use ncbind_core::{Error, Result, debug, info, warn};

/// Loader contract used by ABI discovery and the runtime.
///
/// Implementations must tolerate `free_module` being called for every
/// successfully loaded module exactly once.
pub trait NativeLoader {
    /// Handle to one loaded module.
    type Module;

    /// Load a module by file name (a platform suffix is added if missing).
    fn load_module(&self, name: &str) -> Result<Self::Module>;

    /// Address of an exported symbol, or `None` if the module lacks it.
    fn get_symbol(&self, module: &Self::Module, name: &str) -> Option<NonNull<c_void>>;

    /// Unload a module. Returns `false` if the platform reported a failure.
    fn free_module(&self, module: Self::Module) -> bool;

    /// Switch the process to a UTF-8 capable locale and return its name.
    ///
    /// Must be idempotent: the native locale call runs at most once per
    /// process regardless of how many times this is called.
    fn set_locale(&self) -> Result<String>;
}

/// Append the platform's shared-library suffix when `name` lacks one.
#[must_use]
pub fn module_file_name(name: &str) -> String {
    if name.contains(DLL_SUFFIX) {
        name.to_owned()
    } else {
        format!("{name}{DLL_SUFFIX}")
    }
}

/// Loader backed by the operating system's dynamic linker.
#[derive(Clone, Copy, Default)]
pub struct SystemLoader;

impl fmt::Debug for SystemLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SystemLoader")
    }
}

impl NativeLoader for SystemLoader {
    type Module = Library;

    fn load_module(&self, name: &str) -> Result<Library> {
        let file = module_file_name(name);
        // SAFETY: loading runs the module's initializers; curses libraries
        // only set up their own global state there.
        unsafe { Library::new(&file) }.map_err(|e| {
            debug!(error = %e, library = %file, "module load failed");
            Error::ProbeFailed {
                library: file,
                reason: e.to_string(),
            }
        })
    }

    fn get_symbol(&self, module: &Library, name: &str) -> Option<NonNull<c_void>> {
        // SAFETY: the symbol is read as a plain address and never called
        // or dereferenced here.
        let symbol = unsafe { module.get::<*mut c_void>(name.as_bytes()) }.ok()?;
        NonNull::new(*symbol)
    }

    fn free_module(&self, module: Library) -> bool {
        match module.close() {
            Ok(()) => true,
            Err(e) => {
                warn!(error = %e, "module unload failed");
                false
            }
        }
    }

    fn set_locale(&self) -> Result<String> {
        static LOCALE: OnceLock<Result<String>> = OnceLock::new();
        LOCALE.get_or_init(select_locale).clone()
    }
}

/// Resolve a typed function pointer from a loaded library.
///
/// # Safety
///
/// `F` must be the exact `extern "C"` function pointer type of `symbol`, and
/// the returned pointer must not be called after `library` is unloaded.
pub unsafe fn resolve<F: Copy>(library: &Library, library_name: &str, symbol: &str) -> Result<F> {
    // SAFETY: upheld by the caller.
    let resolved = unsafe { library.get::<F>(symbol.as_bytes()) }.map_err(|e| {
        debug!(error = %e, symbol, library = library_name, "symbol lookup failed");
        Error::ProbeFailed {
            library: library_name.to_owned(),
            reason: format!("missing symbol `{symbol}`"),
        }
    })?;
    Ok(*resolved)
}

// ── Locale ──────────────────────────────────────────────────────────────

#[cfg(not(windows))]
const LOCALE_CANDIDATES: &[&str] = &["", "C.UTF-8", "C.utf8"];
#[cfg(windows)]
const LOCALE_CANDIDATES: &[&str] = &["", ".UTF-8"];

fn select_locale() -> Result<String> {
    for candidate in LOCALE_CANDIDATES {
        if let Some(name) = apply_locale(candidate)
            && is_utf8_locale(&name)
        {
            info!(locale = %name, "selected native locale");
            return Ok(name);
        }
        debug!(candidate, "locale candidate rejected");
    }
    Err(Error::ProbeFailed {
        library: "locale".to_owned(),
        reason: "no UTF-8 capable locale is available".to_owned(),
    })
}

fn apply_locale(candidate: &str) -> Option<String> {
    let requested = CString::new(candidate).ok()?;
    // SAFETY: only called from the one-time initializer in `set_locale`, so
    // never concurrently with itself.
    let set = unsafe { libc::setlocale(libc::LC_ALL, requested.as_ptr()) };
    if set.is_null() {
        return None;
    }
    // Query LC_CTYPE alone; the LC_ALL result may be a composite string.
    // SAFETY: a NULL locale argument only reads the current setting.
    let ctype = unsafe { libc::setlocale(libc::LC_CTYPE, std::ptr::null()) };
    if ctype.is_null() {
        return None;
    }
    // SAFETY: setlocale returns a NUL-terminated string owned by the C
    // runtime, valid until the next setlocale call.
    Some(unsafe { CStr::from_ptr(ctype) }.to_string_lossy().into_owned())
}

fn is_utf8_locale(name: &str) -> bool {
    let normalized: String = name
        .chars()
        .filter(|c| *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    normalized.contains("utf8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn suffix_is_appended_once() {
        let bare = module_file_name("libncursesw");
        assert!(bare.ends_with(DLL_SUFFIX));
        assert_eq!(module_file_name(&bare), bare);
    }

    #[test]
    fn utf8_locale_names() {
        assert!(is_utf8_locale("C.UTF-8"));
        assert!(is_utf8_locale("en_US.utf8"));
        assert!(is_utf8_locale("English_United States.utf8"));
        assert!(!is_utf8_locale("C"));
        assert!(!is_utf8_locale("de_DE.ISO-8859-1"));
    }

    #[test]
    fn missing_module_is_probe_failure() {
        let err = SystemLoader
            .load_module("libncbind-does-not-exist")
            .unwrap_err();
        match err {
            Error::ProbeFailed { library, .. } => {
                assert!(library.starts_with("libncbind-does-not-exist"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
