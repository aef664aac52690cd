//! Generic marshaling core and character factories.
//!
//! # Role in ncbind
//! Everything that turns Rust text into native cells (and back) lives here,
//! written once against [`ncbind_abi::Layout`]. No code above this crate
//! touches raw cell bits.
//!
//! # Primary responsibilities
//! - **Marshal**: encode/decode of single-byte cells, wide cells, wide
//!   slots, wide strings, and multi-byte strings under the active encoding.
//! - **NativeString**: owned terminated buffers handed to native calls.
//! - **Factories**: the typed [`CharFactory`] and the erased
//!   [`DynCharFactory`] installed once per process.
//! - **find_length**: cell-granular length of native-owned buffers.

pub mod factory;
pub mod marshal;
pub mod string;

pub use factory::{CellString, CellValue, CharFactory, DynCharFactory, erased, factory, install};
pub use marshal::{
    Decoded, Marshal, Terminator, find_length, terminated_len, terminated_slice,
};
pub use string::NativeString;
