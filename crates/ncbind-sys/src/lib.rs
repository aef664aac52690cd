//! Platform loader and opaque native types.
//!
//! # Role in ncbind
//! `ncbind-sys` is the only crate that talks to the operating system's
//! dynamic loader. It knows nothing about cell layouts; it loads a module by
//! name, answers symbol lookups, unloads, and switches the process locale.
//!
//! # Primary responsibilities
//! - **NativeLoader**: the loader contract (`load_module`, `get_symbol`,
//!   `free_module`, `set_locale`) used by ABI discovery.
//! - **SystemLoader**: the real implementation over `libloading` and the C
//!   locale functions.
//! - **Opaque types**: [`WINDOW`] and [`PANEL`] for typed native
//!   pointers.
//!
//! # How it fits in the system
//! `ncbind-abi` probes candidate libraries through a `NativeLoader`;
//! `ncbind` loads the chosen libraries with [`SystemLoader`] and resolves its
//! function tables with [`resolve`].

pub mod loader;
#[cfg(any(test, feature = "test-helpers"))]
pub mod mock;
pub mod types;

pub use loader::{NativeLoader, SystemLoader, module_file_name, resolve};
#[cfg(any(test, feature = "test-helpers"))]
pub use mock::MockLoader;
pub use types::{NativePtr, PANEL, WINDOW};
