//! Window pass-through.
//!
//! Every method marshals its arguments with the context's factory, makes one
//! native call, and maps the native return convention through
//! [`check_status`]. Cloning a [`Window`] shares its handle; the native
//! window is deleted when the last clone drops or on an explicit
//! [`release`](Window::release).

use std::ffi::c_int;
use std::fmt;
use std::sync::Arc;

use ncbind_abi::{Layout, SlotUnit, WideChar};
use ncbind_core::{Attrs, Error, KEY_CODE_YES, Result, check_status};
use ncbind_marshal::{Decoded, Marshal, Terminator};
use ncbind_sys::WINDOW;

use crate::handle::{HandleState, NativeHandle};
use crate::runtime::Context;

/// Convert a Rust length or coordinate to a native `int`.
pub(crate) fn native_len(value: usize) -> Result<c_int> {
    c_int::try_from(value).map_err(|_| Error::InvalidLength {
        requested: i64::try_from(value).unwrap_or(i64::MAX),
        max: c_int::MAX as usize,
    })
}

/// One keyboard read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    /// A character decoded under the active encoding.
    Char(char),
    /// A function key code (`KEY_*`).
    Function(u32),
}

/// Interpret a `wget_wch` status and the slot it filled.
pub(crate) fn decode_key<L: Layout>(
    marshal: &Marshal<L>,
    status: c_int,
    slot: &L::Slot,
) -> Result<Key> {
    if check_status("wget_wch", status)? == KEY_CODE_YES {
        Ok(Key::Function(slot.unit().to_u32()))
    } else {
        marshal.decode_wide_slot(slot).map(Key::Char)
    }
}

/// A native window bound to its context.
#[derive(Clone)]
pub struct Window<'ctx, L: Layout> {
    ctx: &'ctx Context<L>,
    handle: Arc<NativeHandle<WINDOW>>,
}

impl<'ctx, L: Layout> Window<'ctx, L> {
    pub(crate) fn new(ctx: &'ctx Context<L>, handle: Arc<NativeHandle<WINDOW>>) -> Self {
        Self { ctx, handle }
    }

    #[must_use]
    pub fn handle(&self) -> &Arc<NativeHandle<WINDOW>> {
        &self.handle
    }

    #[must_use]
    pub fn state(&self) -> HandleState {
        self.handle.state()
    }

    /// Delete the native window now. Later calls through any clone fail
    /// with [`Error::NotInitialized`].
    pub fn release(&self) -> bool {
        self.handle.release()
    }

    pub(crate) fn ptr(&self) -> Result<*mut WINDOW> {
        self.handle
            .get()
            .map(|p| p.as_ptr())
            .ok_or(Error::NotInitialized("window handle"))
    }

    // ── Window management ───────────────────────────────────────────────

    pub fn refresh(&self) -> Result<()> {
        let win = self.ptr()?;
        // SAFETY: `win` is owned by a live handle.
        check_status("wrefresh", unsafe { (self.ctx.tables().core.wrefresh)(win) }).map(drop)
    }

    pub fn erase(&self) -> Result<()> {
        let win = self.ptr()?;
        // SAFETY: `win` is owned by a live handle.
        check_status("werase", unsafe { (self.ctx.tables().core.werase)(win) }).map(drop)
    }

    pub fn move_to(&self, y: usize, x: usize) -> Result<()> {
        let win = self.ptr()?;
        let (y, x) = (native_len(y)?, native_len(x)?);
        // SAFETY: `win` is owned by a live handle.
        check_status("wmove", unsafe { (self.ctx.tables().core.wmove)(win, y, x) }).map(drop)
    }

    /// Enable or disable function-key decoding for reads.
    pub fn keypad(&self, enabled: bool) -> Result<()> {
        let win = self.ptr()?;
        // SAFETY: `win` is owned by a live handle.
        check_status("keypad", unsafe {
            (self.ctx.tables().core.keypad)(win, enabled)
        })
        .map(drop)
    }

    /// `(rows, cols)` of the window.
    pub fn size(&self) -> Result<(usize, usize)> {
        let win = self.ptr()?;
        let core = &self.ctx.tables().core;
        // SAFETY: `win` is owned by a live handle.
        let (rows, cols) = unsafe { ((core.getmaxy)(win), (core.getmaxx)(win)) };
        let rows = check_status("getmaxy", rows)?;
        let cols = check_status("getmaxx", cols)?;
        Ok((rows.max(0) as usize, cols.max(0) as usize))
    }

    // ── Single-byte cells ───────────────────────────────────────────────

    pub fn add_small_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<()> {
        self.add_small_cell(self.ctx.factory().get_small_char(ch, attrs, pair))
    }

    /// Write a prepared cell, such as an [`AcsMap`](crate::AcsMap) entry.
    pub fn add_small_cell(&self, cell: L::Small) -> Result<()> {
        let win = self.ptr()?;
        // SAFETY: `win` is owned by a live handle; the cell is passed by value.
        check_status("waddch", unsafe {
            (self.ctx.tables().single_byte.waddch)(win, cell)
        })
        .map(drop)
    }

    /// Character, attributes, and pair under the cursor.
    pub fn small_char_at(&self) -> Result<(char, Attrs, u16)> {
        let win = self.ptr()?;
        // SAFETY: `win` is owned by a live handle.
        let cell = unsafe { (self.ctx.tables().single_byte.winch)(win) };
        self.ctx.marshal().decode_small_char(&cell)
    }

    pub fn add_small_str(&self, text: &str, attrs: Attrs, pair: u16) -> Result<()> {
        let win = self.ptr()?;
        let cells = self.ctx.factory().get_small_string(text, attrs, pair)?;
        let len = native_len(cells.len())?;
        // SAFETY: `cells` holds `len` cells plus a terminator and outlives
        // the call.
        check_status("waddchnstr", unsafe {
            (self.ctx.tables().single_byte.waddchnstr)(win, cells.as_ptr(), len)
        })
        .map(drop)
    }

    /// Read up to `max` single-byte cells starting at the cursor.
    pub fn read_small_str(&self, max: i32) -> Result<Decoded> {
        let win = self.ptr()?;
        let mut buf = self.ctx.factory().get_empty_small_string(max)?;
        let capacity = native_len(buf.capacity())?;
        // SAFETY: `buf` has room for `capacity` cells plus a terminator.
        let read = check_status("winchnstr", unsafe {
            (self.ctx.tables().single_byte.winchnstr)(win, buf.as_mut_ptr(), capacity)
        })?;
        self.ctx
            .marshal()
            .decode_small_string(buf.raw(), read.max(0) as usize)
    }

    /// Write a locale multi-byte string.
    pub fn add_multibyte(&self, text: &str) -> Result<()> {
        let win = self.ptr()?;
        let bytes = self.ctx.marshal().encode_multibyte(text)?;
        // SAFETY: `bytes` is NUL-terminated; -1 tells the native call to
        // stop at the NUL.
        check_status("waddnstr", unsafe {
            (self.ctx.tables().single_byte.waddnstr)(win, bytes.as_ptr().cast(), -1)
        })
        .map(drop)
    }

    // ── Wide cells ──────────────────────────────────────────────────────

    pub fn add_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<()> {
        self.add_cell(&self.ctx.factory().get_char(ch, attrs, pair)?)
    }

    /// Write a prepared wide cell.
    pub fn add_cell(&self, cell: &L::Wide) -> Result<()> {
        let win = self.ptr()?;
        // SAFETY: `win` is owned by a live handle; `cell` is borrowed for
        // the call.
        check_status("wadd_wch", unsafe {
            (self.ctx.tables().wide.wadd_wch)(win, cell)
        })
        .map(drop)
    }

    /// Wide character, attributes, and pair under the cursor.
    pub fn char_at(&self) -> Result<(char, Attrs, u16)> {
        let win = self.ptr()?;
        let mut cell = L::Wide::default();
        // SAFETY: `cell` is a valid out-parameter of the loaded layout.
        check_status("win_wch", unsafe {
            (self.ctx.tables().wide.win_wch)(win, &mut cell)
        })?;
        self.ctx.marshal().decode_char(&cell)
    }

    pub fn add_str(&self, text: &str, attrs: Attrs, pair: u16) -> Result<()> {
        let win = self.ptr()?;
        let cells = self.ctx.factory().get_string(text, attrs, pair)?;
        let len = native_len(cells.len())?;
        // SAFETY: `cells` holds `len` cells plus a terminator.
        check_status("wadd_wchnstr", unsafe {
            (self.ctx.tables().wide.wadd_wchnstr)(win, cells.as_ptr(), len)
        })
        .map(drop)
    }

    /// Read up to `max` wide cells starting at the cursor.
    pub fn read_str(&self, max: i32) -> Result<Decoded> {
        let win = self.ptr()?;
        let mut buf = self.ctx.factory().get_empty_string(max)?;
        let capacity = native_len(buf.capacity())?;
        // SAFETY: `buf` has room for `capacity` cells plus a terminator.
        check_status("win_wchnstr", unsafe {
            (self.ctx.tables().wide.win_wchnstr)(win, buf.as_mut_ptr(), capacity)
        })?;
        self.ctx.marshal().decode_string(buf.raw(), buf.capacity())
    }

    /// Write a native wide string (`wchar_t*`).
    pub fn add_wide_str(&self, text: &str) -> Result<()> {
        let win = self.ptr()?;
        let slots = self.ctx.marshal().encode_wide_str(text, Terminator::Append)?;
        let len = native_len(slots.len().saturating_sub(1))?;
        // SAFETY: `slots` holds `len` units plus a terminator.
        check_status("waddnwstr", unsafe {
            (self.ctx.tables().wide.waddnwstr)(win, slots.as_ptr(), len)
        })
        .map(drop)
    }

    /// Read up to `max` wide units starting at the cursor.
    pub fn read_wide_str(&self, max: i32) -> Result<Decoded> {
        let win = self.ptr()?;
        let mut buf = self.ctx.factory().get_empty_wide_str(max)?;
        let capacity = native_len(buf.capacity())?;
        // SAFETY: `buf` has room for `capacity` units plus a terminator.
        let read = check_status("winnwstr", unsafe {
            (self.ctx.tables().wide.winnwstr)(win, buf.as_mut_ptr(), capacity)
        })?;
        self.ctx
            .marshal()
            .decode_wide_str(buf.raw(), read.max(0) as usize)
    }

    /// Block for one key (`wget_wch`).
    pub fn get_key(&self) -> Result<Key> {
        let win = self.ptr()?;
        let mut slot = L::Slot::default();
        // SAFETY: `slot` has the width of the native `wint_t`.
        let status = unsafe { (self.ctx.tables().wide.wget_wch)(win, &mut slot) };
        decode_key(self.ctx.marshal(), status, &slot)
    }
}

impl<L: Layout> fmt::Debug for Window<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("layout", &L::KIND)
            .field("handle", &self.handle)
            .finish()
    }
}
