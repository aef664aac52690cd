//! Layout-exact native representations.
//!
//! Field order and width follow the native declarations exactly; values
//! cross the boundary by raw memory, never member by member.
//!
//! ```text
//! chtype   : [ attrs | pair | byte ]              u32 or u64
//! wchar_t  : [ unit ]                             u16 or u32
//! cchar_t  : { attr_t attr; wchar_t chars[5]; int ext_color; }
//!            (ext_color only where NCURSES_EXT_COLORS is set)
//! MEVENT   : { short id; int x, y, z; mmask_t bstate; }
//! ```

use std::fmt::Debug;
use std::hash::Hash;

use ncbind_core::CCHARW_MAX;

// ── Integer parameters ──────────────────────────────────────────────────

/// Integer backing a single-byte cell (and the mouse mask).
pub trait CellInt: Copy + Default + Eq + Hash + Debug + Send + Sync + 'static {
    /// Width in bytes.
    const WIDTH: usize;

    fn from_u32(value: u32) -> Self;

    /// The low 32 bits. Every attribute, color, and mouse bit lives there.
    fn low_u32(self) -> u32;

    fn to_u64(self) -> u64;
}

impl CellInt for u32 {
    const WIDTH: usize = 4;

    #[inline]
    fn from_u32(value: u32) -> Self {
        value
    }

    #[inline]
    fn low_u32(self) -> u32 {
        self
    }

    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }
}

impl CellInt for u64 {
    const WIDTH: usize = 8;

    #[inline]
    fn from_u32(value: u32) -> Self {
        u64::from(value)
    }

    #[inline]
    fn low_u32(self) -> u32 {
        self as u32
    }

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }
}

/// Integer backing one wide-character slot.
pub trait SlotUnit: Copy + Default + Eq + Hash + Debug + Send + Sync + 'static {
    /// Width in bytes.
    const WIDTH: usize;

    /// Narrow `value` into a unit, or `None` if it does not fit.
    fn from_u32(value: u32) -> Option<Self>;

    fn to_u32(self) -> u32;
}

impl SlotUnit for u16 {
    const WIDTH: usize = 2;

    #[inline]
    fn from_u32(value: u32) -> Option<Self> {
        u16::try_from(value).ok()
    }

    #[inline]
    fn to_u32(self) -> u32 {
        u32::from(self)
    }
}

impl SlotUnit for u32 {
    const WIDTH: usize = 4;

    #[inline]
    fn from_u32(value: u32) -> Option<Self> {
        Some(value)
    }

    #[inline]
    fn to_u32(self) -> u32 {
        self
    }
}

/// The optional `ext_color` member of a wide cell.
///
/// ABI 6 builds define `NCURSES_EXT_COLORS` and carry an `int`; ABI 5 builds
/// have no such member and use [`NoExtColor`].
pub trait ExtColor: Copy + Default + Eq + Hash + Debug + Send + Sync + 'static {
    /// Width in bytes; 0 when the member is absent.
    const WIDTH: usize;

    fn from_pair(pair: u16) -> Self;

    /// The stored pair, or `None` if absent, zero, or out of range.
    fn pair(self) -> Option<u16>;
}

impl ExtColor for i32 {
    const WIDTH: usize = 4;

    #[inline]
    fn from_pair(pair: u16) -> Self {
        i32::from(pair)
    }

    #[inline]
    fn pair(self) -> Option<u16> {
        u16::try_from(self).ok().filter(|pair| *pair != 0)
    }
}

/// Zero-sized stand-in for builds without `ext_color`.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct NoExtColor;

impl ExtColor for NoExtColor {
    const WIDTH: usize = 0;

    #[inline]
    fn from_pair(_pair: u16) -> Self {
        Self
    }

    #[inline]
    fn pair(self) -> Option<u16> {
        None
    }
}

// ── Representations ─────────────────────────────────────────────────────

/// Single-byte attributed cell (`chtype`).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Chtype<I>(pub I);

/// One wide-character slot (`wchar_t` / `wint_t`).
#[repr(transparent)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct WChar<U>(pub U);

/// Wide attributed cell (`cchar_t`).
///
/// `chars[0]` holds the spacing character, the remaining slots optional
/// combining characters, terminated by the first zero slot. Without an
/// `ext_color` member only pairs 0..=255 survive, in the `attr` pair bits.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct CChar<A, U, X = i32> {
    pub attr: A,
    pub chars: [WChar<U>; CCHARW_MAX],
    pub ext_color: X,
}

/// Mouse event record (`MEVENT`); `bstate` shares the cell integer width.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct MEvent<M> {
    pub id: i16,
    pub x: i32,
    pub y: i32,
    pub z: i32,
    pub bstate: M,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slot_units_narrow_checked() {
        assert_eq!(<u16 as SlotUnit>::from_u32(0xFFFF), Some(0xFFFF));
        assert_eq!(<u16 as SlotUnit>::from_u32(0x1_0000), None);
        assert_eq!(<u32 as SlotUnit>::from_u32(0x1F600), Some(0x1F600));
    }

    #[test]
    fn cell_ints_keep_low_bits() {
        assert_eq!(<u64 as CellInt>::from_u32(0x8000_0061).low_u32(), 0x8000_0061);
        assert_eq!(0xFFFF_FFFF_0000_0001u64.low_u32(), 1);
        assert_eq!(<u32 as CellInt>::WIDTH, 4);
        assert_eq!(<u64 as CellInt>::WIDTH, 8);
    }

    #[test]
    fn ext_color_pairs_are_range_checked() {
        assert_eq!(300i32.pair(), Some(300));
        assert_eq!(0i32.pair(), None);
        assert_eq!((-1i32).pair(), None);
        assert_eq!(70_000i32.pair(), None);
        assert_eq!(NoExtColor::from_pair(300).pair(), None);
        assert_eq!(std::mem::size_of::<NoExtColor>(), 0);
    }

    #[test]
    fn defaults_are_all_zero() {
        let cell = CChar::<u32, u16>::default();
        assert_eq!(cell.attr, 0);
        assert!(cell.chars.iter().all(|c| c.0 == 0));
        assert_eq!(cell.ext_color, 0);
        assert_eq!(MEvent::<u64>::default().bstate, 0);
    }
}
