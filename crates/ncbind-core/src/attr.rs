#![forbid(unsafe_code)]

//! Character attributes and color-pair packing.
//!
//! # Bit layout
//!
//! ```text
//! [31 ........ 16][15 .... 8][7 .... 0]
//!   attribute bits  color pair  char text
//! ```
//!
//! Every attribute is `1 << (n + ATTR_SHIFT)` for `n >= 8`; the color pair
//! occupies the eight bits directly above the character text. The layout is
//! identical for 32-bit and 64-bit single-byte cells: the upper half of a
//! 64-bit cell is never used.

use bitflags::bitflags;

/// Shift applied to every attribute and color-pair bit.
pub const ATTR_SHIFT: u32 = 8;

const fn bits(mask: u32, shift: u32) -> u32 {
    mask << (shift + ATTR_SHIFT)
}

bitflags! {
    /// Display attributes of a cell.
    ///
    /// `CHARTEXT` and `COLOR` are masks rather than attributes; they are
    /// included so callers can split a raw cell value with the same type.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attrs: u32 {
        /// Mask of the character text bits.
        const CHARTEXT   = bits(1, 0) - 1;
        /// Mask of the color-pair bits.
        const COLOR      = bits((1 << 8) - 1, 0);
        const STANDOUT   = bits(1, 8);
        const UNDERLINE  = bits(1, 9);
        const REVERSE    = bits(1, 10);
        const BLINK      = bits(1, 11);
        const DIM        = bits(1, 12);
        const BOLD       = bits(1, 13);
        const ALTCHARSET = bits(1, 14);
        const INVIS      = bits(1, 15);
        const PROTECT    = bits(1, 16);
        const HORIZONTAL = bits(1, 17);
        const LEFT       = bits(1, 18);
        const LOW        = bits(1, 19);
        const RIGHT      = bits(1, 20);
        const TOP        = bits(1, 21);
        const VERTICAL   = bits(1, 22);
        const ITALIC     = bits(1, 23);
    }
}

impl Attrs {
    /// No attributes.
    pub const NORMAL: Self = Self::empty();

    /// Every bit above the character text (attributes and color).
    pub const ATTRIBUTES: Self = Self::from_bits_retain(!Self::CHARTEXT.bits());

    /// Only the display attributes, without the text and color masks.
    #[must_use]
    pub const fn display(self) -> Self {
        Self::from_bits_retain(self.bits() & !(Self::CHARTEXT.bits() | Self::COLOR.bits()))
    }

    /// Split a raw single-byte cell value into (text, attributes, pair).
    #[must_use]
    pub const fn split(raw: u32) -> (u8, Self, u16) {
        (
            (raw & Self::CHARTEXT.bits()) as u8,
            Self::from_bits_retain(raw).display(),
            pair_number(raw),
        )
    }
}

impl Default for Attrs {
    fn default() -> Self {
        Self::NORMAL
    }
}

/// Native pair-to-bits transform: place `pair` in the color bits.
///
/// Only the low eight bits of `pair` fit; wider pairs are truncated exactly
/// like the native macro truncates them.
#[inline]
#[must_use]
pub const fn color_pair(pair: u16) -> u32 {
    bits(pair as u32, 0) & Attrs::COLOR.bits()
}

/// Inverse of [`color_pair`]: extract the pair index from cell bits.
#[inline]
#[must_use]
pub const fn pair_number(raw: u32) -> u16 {
    ((raw & Attrs::COLOR.bits()) >> ATTR_SHIFT) as u16
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_match_native_header() {
        assert_eq!(Attrs::CHARTEXT.bits(), 0x0000_00FF);
        assert_eq!(Attrs::COLOR.bits(), 0x0000_FF00);
        assert_eq!(Attrs::STANDOUT.bits(), 0x0001_0000);
        assert_eq!(Attrs::BOLD.bits(), 0x0020_0000);
        assert_eq!(Attrs::ITALIC.bits(), 0x8000_0000);
        assert_eq!(Attrs::ATTRIBUTES.bits(), 0xFFFF_FF00);
    }

    #[test]
    fn color_and_attribute_bits_are_disjoint() {
        let display = Attrs::all().display();
        assert_eq!(display.bits() & Attrs::COLOR.bits(), 0);
        assert_eq!(display.bits() & Attrs::CHARTEXT.bits(), 0);
    }

    #[test]
    fn pair_round_trip() {
        for pair in 0..=255u16 {
            assert_eq!(pair_number(color_pair(pair)), pair);
        }
    }

    #[test]
    fn wide_pairs_truncate_like_native() {
        assert_eq!(color_pair(0x1_04), color_pair(0x04));
    }

    #[test]
    fn split_raw_cell() {
        let raw = u32::from(b'a') | (Attrs::BOLD | Attrs::ITALIC).bits() | color_pair(4);
        let (text, attrs, pair) = Attrs::split(raw);
        assert_eq!(text, b'a');
        assert_eq!(attrs, Attrs::BOLD | Attrs::ITALIC);
        assert_eq!(pair, 4);
    }

    #[test]
    fn display_strips_masks() {
        let attrs = Attrs::BOLD | Attrs::COLOR | Attrs::CHARTEXT;
        assert_eq!(attrs.display(), Attrs::BOLD);
    }
}
