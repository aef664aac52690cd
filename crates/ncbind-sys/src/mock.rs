//! In-memory loader for tests.
//!
//! Libraries are registered by name with the symbols they export. Symbol
//! addresses are dangling and must never be called; discovery only checks
//! presence.

use std::collections::{HashMap, HashSet};
use std::ffi::c_void;
use std::ptr::NonNull;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use ncbind_core::{Error, Result};

use crate::loader::NativeLoader;

/// Module handle produced by [`MockLoader`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockModule {
    pub name: String,
}

/// Scriptable [`NativeLoader`].
#[derive(Debug, Default)]
pub struct MockLoader {
    libraries: HashMap<String, HashSet<String>>,
    locale: Option<String>,
    loads: Mutex<Vec<String>>,
    frees: AtomicUsize,
    locale_calls: AtomicUsize,
}

impl MockLoader {
    /// Loader with no libraries and a `C.UTF-8` locale.
    #[must_use]
    pub fn new() -> Self {
        Self {
            locale: Some("C.UTF-8".to_owned()),
            ..Self::default()
        }
    }

    /// Register a loadable library exporting `symbols`.
    #[must_use]
    pub fn with_library(mut self, name: &str, symbols: &[&str]) -> Self {
        self.libraries.insert(
            name.to_owned(),
            symbols.iter().map(|s| (*s).to_owned()).collect(),
        );
        self
    }

    /// Set the locale returned by `set_locale`; `None` makes it fail.
    #[must_use]
    pub fn with_locale(mut self, locale: Option<&str>) -> Self {
        self.locale = locale.map(str::to_owned);
        self
    }

    /// Names passed to `load_module`, in call order (including failures).
    #[must_use]
    pub fn load_attempts(&self) -> Vec<String> {
        self.loads.lock().map(|l| l.clone()).unwrap_or_default()
    }

    #[must_use]
    pub fn free_count(&self) -> usize {
        self.frees.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn locale_calls(&self) -> usize {
        self.locale_calls.load(Ordering::SeqCst)
    }
}

impl NativeLoader for MockLoader {
    type Module = MockModule;

    fn load_module(&self, name: &str) -> Result<MockModule> {
        if let Ok(mut loads) = self.loads.lock() {
            loads.push(name.to_owned());
        }
        if self.libraries.contains_key(name) {
            Ok(MockModule {
                name: name.to_owned(),
            })
        } else {
            Err(Error::ProbeFailed {
                library: name.to_owned(),
                reason: "not registered with the mock loader".to_owned(),
            })
        }
    }

    fn get_symbol(&self, module: &MockModule, name: &str) -> Option<NonNull<c_void>> {
        self.libraries
            .get(&module.name)
            .filter(|symbols| symbols.contains(name))
            .map(|_| NonNull::dangling())
    }

    fn free_module(&self, _module: MockModule) -> bool {
        self.frees.fetch_add(1, Ordering::SeqCst);
        true
    }

    fn set_locale(&self) -> Result<String> {
        self.locale_calls.fetch_add(1, Ordering::SeqCst);
        self.locale.clone().ok_or_else(|| Error::ProbeFailed {
            library: "locale".to_owned(),
            reason: "no UTF-8 capable locale is available".to_owned(),
        })
    }
}
