#![forbid(unsafe_code)]

//! Core: errors, configuration, logging, and native numeric constants.
//!
//! # Role in ncbind
//! `ncbind-core` is the leaf crate every other ncbind crate builds on. It has
//! no knowledge of binary layouts or native libraries; it owns the pieces that
//! are identical for every ABI configuration.
//!
//! # Primary responsibilities
//! - **Error**: the single error taxonomy surfaced by discovery, marshaling,
//!   and native calls.
//! - **Config**: environment-driven overrides (library names, forced ABI,
//!   text encoding, string limits).
//! - **Attrs / MouseMask**: attribute, color-pair, and mouse bit layouts as
//!   the native headers define them.
//! - **TextEncoding**: the active text encoding used when characters cross
//!   into native cells.
//!
//! # How it fits in the system
//! `ncbind-sys` loads native modules, `ncbind-abi` resolves the ABI facts and
//! the specialized representations, `ncbind-marshal` converts text to and from
//! those representations, and `ncbind` ties it all together. All of them
//! report failures through [`Error`] and log through [`logging`].

pub mod attr;
pub mod config;
pub mod encoding;
pub mod error;
pub mod logging;
pub mod mouse;

pub use attr::{Attrs, color_pair, pair_number};
pub use config::Config;
pub use encoding::TextEncoding;
pub use error::{Error, Result, check_ptr, check_status};
pub use mouse::MouseMask;

// Re-export tracing macros at crate root for ergonomic use.
#[cfg(feature = "tracing")]
pub use logging::{
    debug, debug_span, error, error_span, info, info_span, trace, trace_span, warn, warn_span,
};

/// Native success return value.
pub const OK: i32 = 0;

/// Native failure return value.
pub const ERR: i32 = -1;

/// Returned by wide-character reads when the value is a function key code.
pub const KEY_CODE_YES: i32 = 0o400;

/// Number of wide-character slots in one native wide cell.
pub const CCHARW_MAX: usize = 5;
