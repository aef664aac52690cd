//! Compiled layouts and the closed dispatch over them.
//!
//! Every supported ABI fact set maps to exactly one zero-sized layout type.
//! Generic code is written once against [`Layout`] and instantiated for each;
//! [`LayoutKind::visit`] picks the instantiation at runtime.

use std::fmt::Debug;
use std::mem::{offset_of, size_of};

use ncbind_core::CCHARW_MAX;
use static_assertions::{assert_eq_align, assert_eq_size};

use crate::capability::{MouseEvent, MultiByteChar, SingleByteChar, WideChar};
use crate::registry::{FieldDescriptor, LayoutDescriptors, TypeDescriptor};
use crate::repr::{CChar, CellInt, Chtype, ExtColor, MEvent, NoExtColor, SlotUnit, WChar};

/// One concrete native layout.
pub trait Layout: Copy + Default + Debug + Send + Sync + 'static {
    const KIND: LayoutKind;

    type Int: CellInt;
    type Unit: SlotUnit;
    type Ext: ExtColor;
    type Small: SingleByteChar<Int = Self::Int>;
    type Slot: WideChar<Unit = Self::Unit>;
    type Wide: MultiByteChar<Slot = Self::Slot>;
    type Event: MouseEvent<Mask = Self::Int>;

    /// Size, alignment, and field offsets of every representation.
    fn descriptors() -> LayoutDescriptors;
}

/// Generic operation run against the layout chosen at runtime.
pub trait LayoutVisitor {
    type Output;

    fn visit<L: Layout>(self) -> Self::Output;
}

/// Runtime tag for the compiled layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutKind {
    /// 32-bit `chtype`, 32-bit `wchar_t`, extended colors (Linux, BSD,
    /// ncurses 6).
    Chtype32Wchar32,
    /// 32-bit `chtype`, 32-bit `wchar_t`, no `ext_color` (ILP32 ncurses 5,
    /// macOS system ncurses).
    Chtype32Wchar32Abi5,
    /// 32-bit `chtype`, 16-bit `wchar_t`, extended colors (Windows).
    Chtype32Wchar16,
    /// 64-bit `chtype`, 32-bit `wchar_t`, no `ext_color` (LP64 ncurses 5).
    Chtype64Wchar32,
}

impl LayoutKind {
    pub const ALL: [Self; 4] = [
        Self::Chtype32Wchar32,
        Self::Chtype32Wchar32Abi5,
        Self::Chtype32Wchar16,
        Self::Chtype64Wchar32,
    ];

    /// The compiled layout for `chtype`/`wchar_t` widths and the presence of
    /// `ext_color`.
    #[must_use]
    pub const fn select(chtype: usize, wchar: usize, ext_colors: bool) -> Option<Self> {
        match (chtype, wchar, ext_colors) {
            (4, 4, true) => Some(Self::Chtype32Wchar32),
            (4, 4, false) => Some(Self::Chtype32Wchar32Abi5),
            (4, 2, true) => Some(Self::Chtype32Wchar16),
            (8, 4, false) => Some(Self::Chtype64Wchar32),
            _ => None,
        }
    }

    #[must_use]
    pub const fn chtype_width(self) -> usize {
        match self {
            Self::Chtype32Wchar32 | Self::Chtype32Wchar32Abi5 | Self::Chtype32Wchar16 => 4,
            Self::Chtype64Wchar32 => 8,
        }
    }

    #[must_use]
    pub const fn wchar_width(self) -> usize {
        match self {
            Self::Chtype32Wchar32 | Self::Chtype32Wchar32Abi5 | Self::Chtype64Wchar32 => 4,
            Self::Chtype32Wchar16 => 2,
        }
    }

    /// `true` if wide cells carry `ext_color`.
    #[must_use]
    pub const fn ext_colors(self) -> bool {
        matches!(self, Self::Chtype32Wchar32 | Self::Chtype32Wchar16)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Chtype32Wchar32 => "chtype32-wchar32",
            Self::Chtype32Wchar32Abi5 => "chtype32-wchar32-abi5",
            Self::Chtype32Wchar16 => "chtype32-wchar16",
            Self::Chtype64Wchar32 => "chtype64-wchar32",
        }
    }

    /// Run `visitor` instantiated for this layout.
    pub fn visit<V: LayoutVisitor>(self, visitor: V) -> V::Output {
        match self {
            Self::Chtype32Wchar32 => visitor.visit::<Chtype32Wchar32>(),
            Self::Chtype32Wchar32Abi5 => visitor.visit::<Chtype32Wchar32Abi5>(),
            Self::Chtype32Wchar16 => visitor.visit::<Chtype32Wchar16>(),
            Self::Chtype64Wchar32 => visitor.visit::<Chtype64Wchar32>(),
        }
    }
}

macro_rules! compiled_layouts {
    ($(
        $(#[$meta:meta])*
        $name:ident { int: $int:ty, unit: $unit:ty, ext: $ext:ty, cell: $cell:literal, event: $event:literal }
    )*) => {
        $(
            $(#[$meta])*
            #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
            pub struct $name;

            assert_eq_size!(Chtype<$int>, $int);
            assert_eq_size!(WChar<$unit>, $unit);
            assert_eq_size!(CChar<$int, $unit, $ext>, [u8; $cell]);
            assert_eq_size!(MEvent<$int>, [u8; $event]);
            assert_eq_align!(CChar<$int, $unit, $ext>, $int);

            impl Layout for $name {
                const KIND: LayoutKind = LayoutKind::$name;

                type Int = $int;
                type Unit = $unit;
                type Ext = $ext;
                type Small = Chtype<$int>;
                type Slot = WChar<$unit>;
                type Wide = CChar<$int, $unit, $ext>;
                type Event = MEvent<$int>;

                fn descriptors() -> LayoutDescriptors {
                    type Cell = CChar<$int, $unit, $ext>;
                    type Event = MEvent<$int>;
                    let mut wide = vec![
                        FieldDescriptor::new("attr", offset_of!(Cell, attr), size_of::<$int>()),
                        FieldDescriptor::new(
                            "chars",
                            offset_of!(Cell, chars),
                            size_of::<[WChar<$unit>; CCHARW_MAX]>(),
                        ),
                    ];
                    if <$ext as ExtColor>::WIDTH > 0 {
                        wide.push(FieldDescriptor::new(
                            "ext_color",
                            offset_of!(Cell, ext_color),
                            <$ext as ExtColor>::WIDTH,
                        ));
                    }
                    LayoutDescriptors {
                        single_byte: TypeDescriptor::of::<Chtype<$int>>(vec![
                            FieldDescriptor::new("value", 0, size_of::<$int>()),
                        ]),
                        slot: TypeDescriptor::of::<WChar<$unit>>(vec![
                            FieldDescriptor::new("unit", 0, size_of::<$unit>()),
                        ]),
                        wide: TypeDescriptor::of::<Cell>(wide),
                        mouse: TypeDescriptor::of::<Event>(vec![
                            FieldDescriptor::new("id", offset_of!(Event, id), size_of::<i16>()),
                            FieldDescriptor::new("x", offset_of!(Event, x), size_of::<i32>()),
                            FieldDescriptor::new("y", offset_of!(Event, y), size_of::<i32>()),
                            FieldDescriptor::new("z", offset_of!(Event, z), size_of::<i32>()),
                            FieldDescriptor::new("bstate", offset_of!(Event, bstate), size_of::<$int>()),
                        ]),
                    }
                }
            }
        )*
    };
}

compiled_layouts! {
    /// 32-bit cells, 32-bit wide slots, extended colors.
    Chtype32Wchar32 { int: u32, unit: u32, ext: i32, cell: 28, event: 20 }
    /// 32-bit cells, 32-bit wide slots, no `ext_color`.
    Chtype32Wchar32Abi5 { int: u32, unit: u32, ext: NoExtColor, cell: 24, event: 20 }
    /// 32-bit cells, 16-bit wide slots, extended colors.
    Chtype32Wchar16 { int: u32, unit: u16, ext: i32, cell: 20, event: 20 }
    /// 64-bit cells, 32-bit wide slots, no `ext_color`.
    Chtype64Wchar32 { int: u64, unit: u32, ext: NoExtColor, cell: 32, event: 24 }
}
