//! ncbind public facade.
//!
//! Binds the native curses library at runtime, adapting to whichever binary
//! layout the installed build uses. [`Runtime::boot`] discovers the layout,
//! loads the libraries, and hands back a typed [`Context`] through which
//! windows, panels, and the session are driven.
//!
//! ```no_run
//! use ncbind::prelude::*;
//!
//! struct Hello;
//!
//! impl ContextVisitor for Hello {
//!     type Output = Result<()>;
//!
//!     fn visit<L: Layout>(self, ctx: &Context<L>) -> Result<()> {
//!         let screen = ctx.init_screen()?;
//!         let stdscr = screen.stdscr();
//!         stdscr.add_str("hello \u{263A}", Attrs::BOLD, 0)?;
//!         stdscr.refresh()?;
//!         stdscr.get_key()?;
//!         Ok(())
//!     }
//! }
//!
//! fn main() -> Result<()> {
//!     Runtime::boot()?.visit(Hello)?
//! }
//! ```

pub mod acs;
pub mod handle;
pub mod panel;
pub mod runtime;
pub mod screen;
pub mod table;
pub mod window;

// --- Facade types ----------------------------------------------------------

pub use acs::{ACS_LEN, AcsMap};
pub use handle::{Deallocator, HandleRegistry, HandleState, NativeHandle};
pub use panel::Panel;
pub use runtime::{Context, ContextVisitor, Runtime};
pub use screen::Screen;
pub use table::{
    CoreFunctions, FunctionTables, MouseFunctions, PanelFunctions, SingleByteFunctions,
    WideFunctions,
};
pub use window::{Key, Window};

// --- Core re-exports -------------------------------------------------------

pub use ncbind_core::{
    Attrs, Config, Error, MouseMask, Result, TextEncoding, color_pair, pair_number,
};

// --- Representation re-exports ---------------------------------------------

pub use ncbind_abi::{
    AbiFactSet, Layout, LayoutKind, MouseEvent, MultiByteChar, NCursesChar, NativeChar,
    RepresentationSet, SingleByteChar, WideChar,
};
pub use ncbind_marshal::{CellString, CellValue, CharFactory, Decoded, DynCharFactory, factory};

// --- Prelude ---------------------------------------------------------------

pub mod prelude {
    pub use crate::{
        Attrs, Context, ContextVisitor, Error, Key, Layout, MouseMask, Panel, Result, Runtime,
        Screen, Window,
    };

    pub use crate::{abi, core, marshal, sys};
}

pub use ncbind_abi as abi;
pub use ncbind_core as core;
pub use ncbind_marshal as marshal;
pub use ncbind_sys as sys;
