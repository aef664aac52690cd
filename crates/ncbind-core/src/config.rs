#![forbid(unsafe_code)]

//! Environment-driven configuration.
//!
//! | Variable | Effect |
//! |----------|--------|
//! | `NCBIND_LIBRARY` | main native library file name |
//! | `NCBIND_PANEL_LIBRARY` | panel library file name |
//! | `NCBIND_ABI` | force a named configuration, skipping the probe order |
//! | `NCBIND_ENCODING` | active text encoding (`utf-8`, `latin1`, `ascii`) |
//! | `NCBIND_MAX_STRING_CELLS` | largest buffer a factory will allocate |
//!
//! Unparsable values are ignored and the default is kept. Without
//! `NCBIND_ENCODING` the locale variables give a first guess, replaced at
//! boot by the codeset of the locale the native library actually runs in.

use crate::encoding::TextEncoding;

const ENV_LIBRARY: &str = "NCBIND_LIBRARY";
const ENV_PANEL_LIBRARY: &str = "NCBIND_PANEL_LIBRARY";
const ENV_ABI: &str = "NCBIND_ABI";
const ENV_ENCODING: &str = "NCBIND_ENCODING";
const ENV_MAX_STRING_CELLS: &str = "NCBIND_MAX_STRING_CELLS";

/// Locale variables consulted for the encoding, highest priority first.
const LOCALE_VARS: [&str; 3] = ["LC_ALL", "LC_CTYPE", "LANG"];

/// Process configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Replaces the main library name of every candidate configuration.
    pub library_override: Option<String>,
    /// Replaces the panel library name of every candidate configuration.
    pub panel_library_override: Option<String>,
    /// Name of a known configuration to use instead of probing in order.
    pub abi_override: Option<String>,
    pub encoding: TextEncoding,
    /// Encoding pinned by `NCBIND_ENCODING` or [`Config::with_encoding`];
    /// the native locale never replaces it.
    pub encoding_override: Option<TextEncoding>,
    /// Maximum number of cells a factory string may hold.
    pub max_string_cells: usize,
}

impl Config {
    pub const DEFAULT_MAX_STRING_CELLS: usize = 65_536;
    pub const MIN_STRING_CELLS: usize = 1;
    pub const MAX_STRING_CELLS: usize = 1 << 20;

    /// Load configuration from the process environment.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_env_with(|key| std::env::var(key).ok())
    }

    /// Load configuration using a custom environment lookup (for tests).
    #[must_use]
    pub fn from_env_with<F>(get_env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        config.library_override = non_empty(get_env(ENV_LIBRARY));
        config.panel_library_override = non_empty(get_env(ENV_PANEL_LIBRARY));
        config.abi_override = non_empty(get_env(ENV_ABI));
        config.encoding_override = get_env(ENV_ENCODING).and_then(|v| TextEncoding::parse(&v));
        config.encoding = config
            .encoding_override
            .unwrap_or_else(|| locale_encoding(&get_env));

        if let Some(value) = get_env(ENV_MAX_STRING_CELLS)
            && let Ok(parsed) = value.trim().parse::<usize>()
        {
            config.max_string_cells = parsed;
        }

        config.validated()
    }

    /// Clamp numeric settings into their supported ranges.
    #[must_use]
    pub fn validated(mut self) -> Self {
        self.max_string_cells = self
            .max_string_cells
            .clamp(Self::MIN_STRING_CELLS, Self::MAX_STRING_CELLS);
        self
    }

    #[must_use]
    pub fn with_encoding(mut self, encoding: TextEncoding) -> Self {
        self.encoding = encoding;
        self.encoding_override = Some(encoding);
        self
    }

    /// Follow the codeset of the locale the native library was switched to,
    /// unless the encoding is pinned. A locale without a codeset changes
    /// nothing.
    #[must_use]
    pub fn with_native_locale(mut self, locale: &str) -> Self {
        if self.encoding_override.is_none()
            && let Some(encoding) = TextEncoding::from_locale(locale)
        {
            self.encoding = encoding;
        }
        self
    }

    #[must_use]
    pub fn with_max_string_cells(mut self, cells: usize) -> Self {
        self.max_string_cells = cells;
        self.validated()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            library_override: None,
            panel_library_override: None,
            abi_override: None,
            encoding: TextEncoding::Utf8,
            encoding_override: None,
            max_string_cells: Self::DEFAULT_MAX_STRING_CELLS,
        }
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_owned())
        .filter(|v| !v.is_empty())
}

fn locale_encoding<F>(get_env: &F) -> TextEncoding
where
    F: Fn(&str) -> Option<String>,
{
    // First non-empty locale variable wins, as in setlocale(LC_CTYPE, "").
    for var in LOCALE_VARS {
        if let Some(locale) = get_env(var)
            && !locale.trim().is_empty()
        {
            return TextEncoding::from_locale(&locale).unwrap_or_default();
        }
    }

    TextEncoding::default()
}
