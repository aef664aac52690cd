//! Capability traits implemented by every representation.
//!
//! Generic code above this crate never names a concrete representation; it
//! bounds on these traits through [`Layout`](crate::Layout). Attribute and
//! color packing is defined once here, so two values built from equal
//! `(char, attrs, pair)` inputs are bitwise identical.

use std::fmt::Debug;
use std::hash::Hash;

use ncbind_core::{Attrs, CCHARW_MAX, MouseMask, color_pair, pair_number};

use crate::repr::{CChar, CellInt, Chtype, ExtColor, MEvent, SlotUnit, WChar};

/// Any value that crosses the native boundary by raw memory.
pub trait NativeChar: Copy + Default + Eq + Hash + Debug + Send + Sync + 'static {
    /// `true` for the all-zero value that terminates native arrays.
    #[inline]
    fn is_terminator(&self) -> bool {
        *self == Self::default()
    }
}

/// A cell carrying display attributes and a color pair.
pub trait NCursesChar: NativeChar {
    fn attrs(&self) -> Attrs;
    fn color_pair(&self) -> u16;
}

/// Single-byte attributed cell.
pub trait SingleByteChar: NCursesChar {
    type Int: CellInt;

    fn from_parts(byte: u8, attrs: Attrs, pair: u16) -> Self;

    /// The 8-bit encoded character.
    fn encoded_byte(&self) -> u8;

    fn raw(&self) -> Self::Int;

    fn from_raw(raw: Self::Int) -> Self;
}

/// Standalone wide-character slot.
pub trait WideChar: NativeChar {
    type Unit: SlotUnit;

    fn from_unit(unit: Self::Unit) -> Self;

    fn unit(&self) -> Self::Unit;
}

/// Wide attributed cell.
pub trait MultiByteChar: NCursesChar {
    type Slot: WideChar;

    fn from_parts(slots: [Self::Slot; CCHARW_MAX], attrs: Attrs, pair: u16) -> Self;

    fn slots(&self) -> &[Self::Slot; CCHARW_MAX];
}

/// Mouse event record.
pub trait MouseEvent: Copy + Default + Eq + Hash + Debug + Send + Sync + 'static {
    type Mask: CellInt;

    fn new(id: i16, x: i32, y: i32, z: i32, bstate: MouseMask) -> Self;
    fn id(&self) -> i16;
    fn x(&self) -> i32;
    fn y(&self) -> i32;
    fn z(&self) -> i32;
    fn bstate(&self) -> MouseMask;

    /// The mask exactly as stored, at the native width.
    fn raw_bstate(&self) -> Self::Mask;
}

// ── Single-byte cell ────────────────────────────────────────────────────

impl<I: CellInt> NativeChar for Chtype<I> {}

impl<I: CellInt> NCursesChar for Chtype<I> {
    #[inline]
    fn attrs(&self) -> Attrs {
        Attrs::from_bits_retain(self.0.low_u32()).display()
    }

    #[inline]
    fn color_pair(&self) -> u16 {
        pair_number(self.0.low_u32())
    }
}

impl<I: CellInt> SingleByteChar for Chtype<I> {
    type Int = I;

    #[inline]
    fn from_parts(byte: u8, attrs: Attrs, pair: u16) -> Self {
        Self(I::from_u32(
            u32::from(byte) | attrs.display().bits() | color_pair(pair),
        ))
    }

    #[inline]
    fn encoded_byte(&self) -> u8 {
        (self.0.low_u32() & Attrs::CHARTEXT.bits()) as u8
    }

    #[inline]
    fn raw(&self) -> I {
        self.0
    }

    #[inline]
    fn from_raw(raw: I) -> Self {
        Self(raw)
    }
}

// ── Wide slot ───────────────────────────────────────────────────────────

impl<U: SlotUnit> NativeChar for WChar<U> {}

impl<U: SlotUnit> WideChar for WChar<U> {
    type Unit = U;

    #[inline]
    fn from_unit(unit: U) -> Self {
        Self(unit)
    }

    #[inline]
    fn unit(&self) -> U {
        self.0
    }
}

// ── Wide cell ───────────────────────────────────────────────────────────

impl<A: CellInt, U: SlotUnit, X: ExtColor> NativeChar for CChar<A, U, X> {}

impl<A: CellInt, U: SlotUnit, X: ExtColor> NCursesChar for CChar<A, U, X> {
    #[inline]
    fn attrs(&self) -> Attrs {
        Attrs::from_bits_retain(self.attr.low_u32()).display()
    }

    /// Extended color wins when it holds a usable pair; it is the only place
    /// pairs above 255 survive.
    #[inline]
    fn color_pair(&self) -> u16 {
        self.ext_color
            .pair()
            .unwrap_or_else(|| pair_number(self.attr.low_u32()))
    }
}

impl<A: CellInt, U: SlotUnit, X: ExtColor> MultiByteChar for CChar<A, U, X> {
    type Slot = WChar<U>;

    #[inline]
    fn from_parts(slots: [WChar<U>; CCHARW_MAX], attrs: Attrs, pair: u16) -> Self {
        Self {
            attr: A::from_u32(attrs.display().bits() | color_pair(pair)),
            chars: slots,
            ext_color: X::from_pair(pair),
        }
    }

    #[inline]
    fn slots(&self) -> &[WChar<U>; CCHARW_MAX] {
        &self.chars
    }
}

// ── Mouse event ─────────────────────────────────────────────────────────

impl<M: CellInt> MouseEvent for MEvent<M> {
    type Mask = M;

    fn new(id: i16, x: i32, y: i32, z: i32, bstate: MouseMask) -> Self {
        Self {
            id,
            x,
            y,
            z,
            bstate: M::from_u32(bstate.bits()),
        }
    }

    #[inline]
    fn id(&self) -> i16 {
        self.id
    }

    #[inline]
    fn x(&self) -> i32 {
        self.x
    }

    #[inline]
    fn y(&self) -> i32 {
        self.y
    }

    #[inline]
    fn z(&self) -> i32 {
        self.z
    }

    #[inline]
    fn bstate(&self) -> MouseMask {
        MouseMask::from_native(self.bstate.to_u64())
    }

    #[inline]
    fn raw_bstate(&self) -> M {
        self.bstate
    }
}
