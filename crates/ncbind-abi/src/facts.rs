//! The ABI fact set and platform identification.

use std::fmt;

use ncbind_core::{CCHARW_MAX, Error, Result};

use crate::layout::LayoutKind;

/// Largest single-byte cell width any native build uses.
const MAX_CHAR_WIDTH: usize = 8;
/// Largest wide-slot width (`wchar_t` is at most 32 bits).
const MAX_SLOT_WIDTH: usize = 4;
/// Upper bound on slots per wide cell before the value is considered corrupt.
const MAX_CELL_SLOTS: usize = 16;

/// Operating system family, as far as native library naming is concerned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OsFamily {
    Linux,
    FreeBsd,
    MacOs,
    Windows,
    Other,
}

impl OsFamily {
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(target_os = "linux") {
            Self::Linux
        } else if cfg!(target_os = "freebsd") {
            Self::FreeBsd
        } else if cfg!(target_os = "macos") {
            Self::MacOs
        } else if cfg!(windows) {
            Self::Windows
        } else {
            Self::Other
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Linux => "linux",
            Self::FreeBsd => "freebsd",
            Self::MacOs => "macos",
            Self::Windows => "windows",
            Self::Other => "other",
        }
    }
}

/// The key half of the configuration table lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PlatformId {
    pub os: OsFamily,
    /// Processor word size in bits.
    pub word_size: u32,
}

impl PlatformId {
    #[must_use]
    pub const fn new(os: OsFamily, word_size: u32) -> Self {
        Self { os, word_size }
    }

    /// The platform this process runs on.
    #[must_use]
    pub const fn current() -> Self {
        Self {
            os: OsFamily::current(),
            word_size: usize::BITS,
        }
    }
}

impl fmt::Display for PlatformId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.os.as_str(), self.word_size)
    }
}

/// File names of the main library and the panel extension library.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LibraryNames {
    pub main: String,
    pub panel: String,
}

/// Binary-layout parameters of the loaded native library.
///
/// Fixed once per process after the first successful probe.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct AbiFactSet {
    /// Name of the table entry the facts were selected from.
    pub config_name: &'static str,
    /// Byte width of the single-byte attributed cell (`chtype`).
    pub attributed_char_width: usize,
    /// Byte width of one wide-character slot (`wchar_t`).
    pub wide_char_slot_width: usize,
    /// Wide-character slots per wide cell (`CCHARW_MAX`).
    pub max_cell_width: usize,
    /// Whether wide cells carry `ext_color` (`NCURSES_EXT_COLORS`).
    pub ext_colors: bool,
    pub libraries: LibraryNames,
}

impl AbiFactSet {
    /// Check the widths against sane bounds and map them to a compiled
    /// layout.
    pub fn layout_kind(&self) -> Result<LayoutKind> {
        if self.attributed_char_width == 0 || self.attributed_char_width > MAX_CHAR_WIDTH {
            return Err(Error::CorruptAbi(format!(
                "attributed character width {} out of range",
                self.attributed_char_width
            )));
        }
        if self.wide_char_slot_width == 0 || self.wide_char_slot_width > MAX_SLOT_WIDTH {
            return Err(Error::CorruptAbi(format!(
                "wide slot width {} out of range",
                self.wide_char_slot_width
            )));
        }
        if self.max_cell_width == 0 || self.max_cell_width > MAX_CELL_SLOTS {
            return Err(Error::CorruptAbi(format!(
                "cell width {} out of range",
                self.max_cell_width
            )));
        }
        if self.max_cell_width != CCHARW_MAX {
            return Err(Error::CorruptAbi(format!(
                "no compiled layout with {} slots per cell",
                self.max_cell_width
            )));
        }
        LayoutKind::select(
            self.attributed_char_width,
            self.wide_char_slot_width,
            self.ext_colors,
        )
        .ok_or_else(|| {
            Error::CorruptAbi(format!(
                "no compiled layout for {}-byte cells with {}-byte slots ({} ext_color)",
                self.attributed_char_width,
                self.wide_char_slot_width,
                if self.ext_colors { "with" } else { "without" }
            ))
        })
    }
}
