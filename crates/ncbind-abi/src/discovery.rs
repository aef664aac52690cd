//! ABI trait discovery.
//!
//! Facts are never computed by inspecting memory. They are selected from
//! [`KNOWN_CONFIGS`] by platform, and the selection is confirmed by loading
//! the candidate library and checking its exports:
//!
//! 1. Candidates: the forced `NCBIND_ABI` entry, or every entry matching the
//!    current OS family and word size, in table order.
//! 2. For each candidate, load the main library (library overrides apply).
//!    A library without `wadd_wch` is a narrow build and is skipped.
//! 3. The first wide build must export every required symbol and accept a
//!    UTF-8 locale; it decides the facts.
//! 4. The library is unloaded again before returning.

use std::sync::OnceLock;

use ncbind_core::{CCHARW_MAX, Config, Error, Result, debug, info};
use ncbind_sys::{NativeLoader, SystemLoader};

use crate::facts::{AbiFactSet, LibraryNames, OsFamily, PlatformId};

/// Symbol whose presence marks a wide-character build.
const WIDE_PROBE_SYMBOL: &str = "wadd_wch";

/// Symbols every supported library must export.
pub const REQUIRED_SYMBOLS: [&str; 4] = ["initscr", "endwin", "wadd_wch", "setcchar"];

/// One row of the configuration table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KnownConfig {
    pub name: &'static str,
    pub os: OsFamily,
    pub word_size: u32,
    pub main_library: &'static str,
    pub panel_library: &'static str,
    /// `sizeof(chtype)`.
    pub chtype_width: usize,
    /// `sizeof(wchar_t)`.
    pub wchar_width: usize,
    /// `NCURSES_EXT_COLORS`: ABI 6 builds only.
    pub ext_colors: bool,
}

impl KnownConfig {
    fn matches(&self, platform: PlatformId) -> bool {
        self.os == platform.os && self.word_size == platform.word_size
    }

    fn facts(&self, libraries: LibraryNames) -> AbiFactSet {
        AbiFactSet {
            config_name: self.name,
            attributed_char_width: self.chtype_width,
            wide_char_slot_width: self.wchar_width,
            max_cell_width: CCHARW_MAX,
            ext_colors: self.ext_colors,
            libraries,
        }
    }
}

/// Every configuration the binding has compiled layouts for.
pub const KNOWN_CONFIGS: &[KnownConfig] = &[
    KnownConfig {
        name: "linux64-ncursesw6",
        os: OsFamily::Linux,
        word_size: 64,
        main_library: "libncursesw.so.6",
        panel_library: "libpanelw.so.6",
        chtype_width: 4,
        wchar_width: 4,
        ext_colors: true,
    },
    KnownConfig {
        name: "linux64-ncursesw5",
        os: OsFamily::Linux,
        word_size: 64,
        main_library: "libncursesw.so.5",
        panel_library: "libpanelw.so.5",
        chtype_width: 8,
        wchar_width: 4,
        ext_colors: false,
    },
    KnownConfig {
        name: "linux32-ncursesw6",
        os: OsFamily::Linux,
        word_size: 32,
        main_library: "libncursesw.so.6",
        panel_library: "libpanelw.so.6",
        chtype_width: 4,
        wchar_width: 4,
        ext_colors: true,
    },
    KnownConfig {
        name: "linux32-ncursesw5",
        os: OsFamily::Linux,
        word_size: 32,
        main_library: "libncursesw.so.5",
        panel_library: "libpanelw.so.5",
        chtype_width: 4,
        wchar_width: 4,
        ext_colors: false,
    },
    KnownConfig {
        name: "freebsd64-ncursesw",
        os: OsFamily::FreeBsd,
        word_size: 64,
        main_library: "libncursesw.so.9",
        panel_library: "libpanelw.so.9",
        chtype_width: 4,
        wchar_width: 4,
        ext_colors: true,
    },
    KnownConfig {
        name: "macos64-ncurses",
        os: OsFamily::MacOs,
        word_size: 64,
        main_library: "libncurses.dylib",
        panel_library: "libpanel.dylib",
        chtype_width: 4,
        wchar_width: 4,
        ext_colors: false,
    },
    KnownConfig {
        name: "windows64-ncursesw6",
        os: OsFamily::Windows,
        word_size: 64,
        main_library: "libncursesw6.dll",
        panel_library: "libpanelw6.dll",
        chtype_width: 4,
        wchar_width: 2,
        ext_colors: true,
    },
];

/// One discovery run over an injectable loader.
#[derive(Debug)]
pub struct AbiDiscovery<'a, L: NativeLoader> {
    loader: &'a L,
    config: &'a Config,
    platform: PlatformId,
}

impl<'a, L: NativeLoader> AbiDiscovery<'a, L> {
    #[must_use]
    pub fn new(loader: &'a L, config: &'a Config) -> Self {
        Self {
            loader,
            config,
            platform: PlatformId::current(),
        }
    }

    /// Probe as if running on `platform`.
    #[must_use]
    pub fn with_platform(mut self, platform: PlatformId) -> Self {
        self.platform = platform;
        self
    }

    /// Table rows to probe, in order.
    pub fn candidates(&self) -> Result<Vec<&'static KnownConfig>> {
        if let Some(name) = &self.config.abi_override {
            return KNOWN_CONFIGS
                .iter()
                .find(|c| c.name == name.as_str())
                .map(|c| vec![c])
                .ok_or_else(|| Error::CorruptAbi(format!("unknown ABI configuration `{name}`")));
        }

        let matching: Vec<_> = KNOWN_CONFIGS
            .iter()
            .filter(|c| c.matches(self.platform))
            .collect();
        if matching.is_empty() {
            return Err(Error::UnsupportedPlatform {
                os: self.platform.os.as_str(),
                word_size: self.platform.word_size,
                wide: true,
            });
        }
        Ok(matching)
    }

    fn library_names(&self, candidate: &KnownConfig) -> LibraryNames {
        LibraryNames {
            main: self
                .config
                .library_override
                .clone()
                .unwrap_or_else(|| candidate.main_library.to_owned()),
            panel: self
                .config
                .panel_library_override
                .clone()
                .unwrap_or_else(|| candidate.panel_library.to_owned()),
        }
    }

    /// Run the probe and return the selected facts.
    pub fn probe(&self) -> Result<AbiFactSet> {
        let candidates = self.candidates()?;
        let mut narrow_build = false;
        let mut last_error = None;

        for candidate in candidates {
            let libraries = self.library_names(candidate);
            debug!(config = candidate.name, library = %libraries.main, "probing candidate");

            let module = match self.loader.load_module(&libraries.main) {
                Ok(module) => module,
                Err(err) => {
                    last_error = Some(err);
                    continue;
                }
            };

            if self.loader.get_symbol(&module, WIDE_PROBE_SYMBOL).is_none() {
                debug!(library = %libraries.main, "narrow build, skipping");
                narrow_build = true;
                self.loader.free_module(module);
                continue;
            }

            let verdict = self.verify(&module, &libraries.main);
            self.loader.free_module(module);
            verdict?;

            let facts = candidate.facts(libraries);
            info!(
                config = facts.config_name,
                chtype = facts.attributed_char_width,
                wchar = facts.wide_char_slot_width,
                "resolved native ABI"
            );
            return Ok(facts);
        }

        if narrow_build {
            return Err(Error::UnsupportedPlatform {
                os: self.platform.os.as_str(),
                word_size: self.platform.word_size,
                wide: false,
            });
        }
        Err(last_error.unwrap_or_else(|| Error::ProbeFailed {
            library: String::new(),
            reason: "no candidate library could be loaded".to_owned(),
        }))
    }

    fn verify(&self, module: &L::Module, library: &str) -> Result<()> {
        let missing: Vec<&str> = REQUIRED_SYMBOLS
            .iter()
            .copied()
            .filter(|symbol| self.loader.get_symbol(module, symbol).is_none())
            .collect();
        if !missing.is_empty() {
            return Err(Error::ProbeFailed {
                library: library.to_owned(),
                reason: format!("missing symbols: {}", missing.join(", ")),
            });
        }
        self.loader.set_locale().map(|_| ())
    }
}

/// Write-once holder for the outcome of discovery.
///
/// The first caller probes; every later caller gets the cached outcome,
/// including a cached failure. Discovery failures are not retried.
#[derive(Debug, Default)]
pub struct FactCache {
    outcome: OnceLock<Result<AbiFactSet>>,
}

impl FactCache {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            outcome: OnceLock::new(),
        }
    }

    pub fn get_or_probe<L: NativeLoader>(
        &self,
        loader: &L,
        config: &Config,
    ) -> Result<&AbiFactSet> {
        self.outcome
            .get_or_init(|| AbiDiscovery::new(loader, config).probe())
            .as_ref()
            .map_err(Clone::clone)
    }

    /// The cached outcome, if discovery has run.
    #[must_use]
    pub fn get(&self) -> Option<Result<&AbiFactSet>> {
        self.outcome
            .get()
            .map(|outcome| outcome.as_ref().map_err(Clone::clone))
    }
}

static PROCESS_FACTS: FactCache = FactCache::new();

/// Resolve the process-wide facts with the system loader and environment
/// configuration.
pub fn resolve() -> Result<&'static AbiFactSet> {
    resolve_with(&SystemLoader, &Config::from_env())
}

/// Resolve the process-wide facts; the first call decides the outcome.
pub fn resolve_with<L: NativeLoader>(loader: &L, config: &Config) -> Result<&'static AbiFactSet> {
    PROCESS_FACTS.get_or_probe(loader, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::LayoutKind;

    #[test]
    fn table_names_are_unique() {
        for (i, a) in KNOWN_CONFIGS.iter().enumerate() {
            for b in &KNOWN_CONFIGS[i + 1..] {
                assert_ne!(a.name, b.name);
            }
        }
    }

    #[test]
    fn every_table_row_has_a_compiled_layout() {
        for config in KNOWN_CONFIGS {
            let facts = config.facts(LibraryNames {
                main: config.main_library.to_owned(),
                panel: config.panel_library.to_owned(),
            });
            assert!(facts.layout_kind().is_ok(), "{}", config.name);
        }
    }

    #[test]
    fn abi5_rows_have_no_ext_color() {
        for name in ["linux64-ncursesw5", "linux32-ncursesw5", "macos64-ncurses"] {
            let config = KNOWN_CONFIGS.iter().find(|c| c.name == name).unwrap();
            assert!(!config.ext_colors, "{name}");
        }
        let row = KNOWN_CONFIGS
            .iter()
            .find(|c| c.name == "linux32-ncursesw5")
            .unwrap();
        let facts = row.facts(LibraryNames {
            main: row.main_library.to_owned(),
            panel: row.panel_library.to_owned(),
        });
        assert_eq!(facts.layout_kind(), Ok(LayoutKind::Chtype32Wchar32Abi5));
    }

    #[test]
    fn windows_uses_two_byte_slots() {
        let windows: Vec<_> = KNOWN_CONFIGS
            .iter()
            .filter(|c| c.os == OsFamily::Windows)
            .collect();
        assert!(!windows.is_empty());
        assert!(windows.iter().all(|c| c.wchar_width == 2));
    }
}
