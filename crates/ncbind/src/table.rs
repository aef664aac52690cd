//! Typed native function tables.
//!
//! Each group is a plain struct of `extern "C"` function pointers resolved
//! once from the loaded libraries. Groups that exchange cells are generic
//! over the compiled [`Layout`], so a table can only be called with the
//! representations the loaded build expects.

use std::ffi::{c_char, c_int, c_short};
use std::fmt;

use libloading::Library;
use ncbind_abi::Layout;
use ncbind_core::Result;
use ncbind_sys::{PANEL, WINDOW, resolve};

macro_rules! fn_table {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident $(<$l:ident>)? {
            $( $field:ident: fn($($arg:ty),* $(,)?) -> $ret:ty; )*
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy)]
        $vis struct $name $(<$l: Layout>)? {
            $( pub $field: unsafe extern "C" fn($($arg),*) -> $ret, )*
        }

        impl $(<$l: Layout>)? $name $(<$l>)? {
            /// Symbols this group resolves, in declaration order.
            pub const SYMBOLS: &'static [&'static str] = &[$(stringify!($field)),*];

            /// Resolve every function in the group from `library`.
            ///
            /// # Safety
            ///
            /// `library` must export each symbol with the declared signature
            /// and must stay loaded for as long as the table is used.
            pub unsafe fn resolve(library: &Library, library_name: &str) -> Result<Self> {
                Ok(Self {
                    // SAFETY: upheld by the caller.
                    $( $field: unsafe { resolve(library, library_name, stringify!($field)) }?, )*
                })
            }
        }

        impl $(<$l: Layout>)? fmt::Debug for $name $(<$l>)? {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.debug_struct(stringify!($name))
                    .field("symbols", &Self::SYMBOLS.len())
                    .finish_non_exhaustive()
            }
        }
    };
}

fn_table! {
    /// Session, window, and color management.
    pub struct CoreFunctions {
        initscr: fn() -> *mut WINDOW;
        endwin: fn() -> c_int;
        newwin: fn(c_int, c_int, c_int, c_int) -> *mut WINDOW;
        delwin: fn(*mut WINDOW) -> c_int;
        wrefresh: fn(*mut WINDOW) -> c_int;
        wmove: fn(*mut WINDOW, c_int, c_int) -> c_int;
        werase: fn(*mut WINDOW) -> c_int;
        keypad: fn(*mut WINDOW, bool) -> c_int;
        getmaxx: fn(*const WINDOW) -> c_int;
        getmaxy: fn(*const WINDOW) -> c_int;
        start_color: fn() -> c_int;
        init_pair: fn(c_short, c_short, c_short) -> c_int;
        doupdate: fn() -> c_int;
        keyname: fn(c_int) -> *const c_char;
    }
}

fn_table! {
    /// `chtype` operations.
    pub struct SingleByteFunctions<L> {
        waddch: fn(*mut WINDOW, L::Small) -> c_int;
        winch: fn(*mut WINDOW) -> L::Small;
        waddchnstr: fn(*mut WINDOW, *const L::Small, c_int) -> c_int;
        winchnstr: fn(*mut WINDOW, *mut L::Small, c_int) -> c_int;
        waddnstr: fn(*mut WINDOW, *const c_char, c_int) -> c_int;
    }
}

fn_table! {
    /// `cchar_t` and `wchar_t` operations.
    pub struct WideFunctions<L> {
        wadd_wch: fn(*mut WINDOW, *const L::Wide) -> c_int;
        win_wch: fn(*mut WINDOW, *mut L::Wide) -> c_int;
        wadd_wchnstr: fn(*mut WINDOW, *const L::Wide, c_int) -> c_int;
        win_wchnstr: fn(*mut WINDOW, *mut L::Wide, c_int) -> c_int;
        waddnwstr: fn(*mut WINDOW, *const L::Slot, c_int) -> c_int;
        winnwstr: fn(*mut WINDOW, *mut L::Slot, c_int) -> c_int;
        wget_wch: fn(*mut WINDOW, *mut L::Slot) -> c_int;
        wunctrl: fn(*mut L::Wide) -> *mut L::Slot;
    }
}

fn_table! {
    /// Mouse reporting. `mmask_t` has the width of `chtype`.
    pub struct MouseFunctions<L> {
        mousemask: fn(L::Int, *mut L::Int) -> L::Int;
        getmouse: fn(*mut L::Event) -> c_int;
        ungetmouse: fn(*mut L::Event) -> c_int;
    }
}

fn_table! {
    /// Panel extension library.
    pub struct PanelFunctions {
        new_panel: fn(*mut WINDOW) -> *mut PANEL;
        del_panel: fn(*mut PANEL) -> c_int;
        panel_window: fn(*const PANEL) -> *mut WINDOW;
        update_panels: fn() -> ();
        top_panel: fn(*mut PANEL) -> c_int;
        bottom_panel: fn(*mut PANEL) -> c_int;
        hide_panel: fn(*mut PANEL) -> c_int;
        show_panel: fn(*mut PANEL) -> c_int;
    }
}

/// Every function group for layout `L`.
#[derive(Debug, Clone, Copy)]
pub struct FunctionTables<L: Layout> {
    pub core: CoreFunctions,
    pub single_byte: SingleByteFunctions<L>,
    pub wide: WideFunctions<L>,
    pub mouse: MouseFunctions<L>,
    pub panel: PanelFunctions,
}

impl<L: Layout> FunctionTables<L> {
    /// Resolve all groups; panel functions come from the panel library.
    ///
    /// # Safety
    ///
    /// Both libraries must be builds whose cell layouts match `L` and must
    /// outlive the returned tables.
    pub unsafe fn resolve(
        main: &Library,
        main_name: &str,
        panel: &Library,
        panel_name: &str,
    ) -> Result<Self> {
        // SAFETY: upheld by the caller.
        unsafe {
            Ok(Self {
                core: CoreFunctions::resolve(main, main_name)?,
                single_byte: SingleByteFunctions::resolve(main, main_name)?,
                wide: WideFunctions::resolve(main, main_name)?,
                mouse: MouseFunctions::resolve(main, main_name)?,
                panel: PanelFunctions::resolve(panel, panel_name)?,
            })
        }
    }
}
