//! ABI discovery and specialized native representations.
//!
//! # Role in ncbind
//! The native library's cell and event structures change width and layout
//! between platforms and builds. This crate decides, once per process, which
//! layout the installed library uses and provides a layout-exact Rust type
//! for every structure that crosses the boundary.
//!
//! # Primary responsibilities
//! - **AbiFactSet / discovery**: select the configuration from a fixed table
//!   keyed by OS family, word size, and wide-build flag, verified by probing.
//! - **Representations**: `#[repr(C)]`/`#[repr(transparent)]` types
//!   ([`Chtype`], [`WChar`], [`CChar`], [`MEvent`]) instantiated once per
//!   supported layout.
//! - **Capabilities**: the traits generic code programs against
//!   ([`SingleByteChar`], [`MultiByteChar`], [`WideChar`], [`MouseEvent`]).
//! - **Registry**: memoized [`RepresentationSet`] descriptors with stable
//!   identity per fact set.
//!
//! # How it fits in the system
//! `ncbind-marshal` is generic over [`Layout`]; `ncbind` resolves facts at
//! boot and dispatches into that generic code through [`LayoutKind::visit`].

#![forbid(unsafe_code)]

pub mod capability;
pub mod discovery;
pub mod facts;
pub mod layout;
pub mod registry;
pub mod repr;

pub use capability::{
    MouseEvent, MultiByteChar, NCursesChar, NativeChar, SingleByteChar, WideChar,
};
pub use discovery::{AbiDiscovery, FactCache, KNOWN_CONFIGS, KnownConfig, resolve, resolve_with};
pub use facts::{AbiFactSet, LibraryNames, OsFamily, PlatformId};
pub use layout::{
    Chtype32Wchar16, Chtype32Wchar32, Chtype32Wchar32Abi5, Chtype64Wchar32, Layout, LayoutKind,
    LayoutVisitor,
};
pub use registry::{
    FieldDescriptor, LayoutDescriptors, Registry, RepresentationSet, TypeDescriptor, build,
};
pub use repr::{CChar, CellInt, Chtype, ExtColor, MEvent, NoExtColor, SlotUnit, WChar};
