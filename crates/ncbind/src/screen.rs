//! The curses session and its process-wide calls.

use std::fmt;

use ncbind_abi::{CellInt, Layout, MouseEvent};
use ncbind_core::{Attrs, Error, MouseMask, Result, check_ptr, check_status};
use ncbind_marshal::find_length;
use ncbind_sys::NativePtr;

use crate::handle::Deallocator;
use crate::runtime::Context;
use crate::window::Window;

/// A started session.
///
/// The standard screen's handle is released with `endwin` once the last
/// [`Window`] obtained from [`stdscr`](Screen::stdscr) and the screen itself
/// are gone. Starting a session twice shares the first one.
pub struct Screen<'ctx, L: Layout> {
    ctx: &'ctx Context<L>,
    stdscr: Window<'ctx, L>,
}

impl<'ctx, L: Layout> Screen<'ctx, L> {
    pub(crate) fn init(ctx: &'ctx Context<L>) -> Result<Self> {
        let core = &ctx.tables().core;
        // SAFETY: `initscr` takes no arguments; the locale was set during
        // discovery.
        let ptr = NativePtr::new(unsafe { (core.initscr)() }).ok_or(Error::NativeCall {
            function: "initscr",
            result: 0,
        })?;
        let handle = ctx
            .windows()
            .wrap(ptr, "endwin", Deallocator::Nullary(core.endwin));
        Ok(Self {
            ctx,
            stdscr: Window::new(ctx, handle),
        })
    }

    #[must_use]
    pub fn stdscr(&self) -> Window<'ctx, L> {
        self.stdscr.clone()
    }

    /// End the session now instead of on drop.
    pub fn end(&self) -> bool {
        self.stdscr.release()
    }

    // ── Mouse ───────────────────────────────────────────────────────────

    /// Request mouse events; returns `(granted, previous)` masks.
    pub fn mouse_mask(&self, mask: MouseMask) -> (MouseMask, MouseMask) {
        let mut previous = L::Int::default();
        // SAFETY: `previous` is a valid `mmask_t` out-parameter.
        let granted =
            unsafe { (self.ctx.tables().mouse.mousemask)(L::Int::from_u32(mask.bits()), &mut previous) };
        (
            MouseMask::from_native(granted.to_u64()),
            MouseMask::from_native(previous.to_u64()),
        )
    }

    /// Pop the pending mouse event.
    pub fn get_mouse(&self) -> Result<L::Event> {
        let mut event = L::Event::default();
        // SAFETY: `event` is an `MEVENT` of the loaded layout.
        check_status("getmouse", unsafe {
            (self.ctx.tables().mouse.getmouse)(&mut event)
        })?;
        Ok(event)
    }

    /// Push `event` back onto the input queue.
    pub fn unget_mouse(&self, event: &L::Event) -> Result<()> {
        let mut event = *event;
        // SAFETY: `event` is an `MEVENT` of the loaded layout.
        check_status("ungetmouse", unsafe {
            (self.ctx.tables().mouse.ungetmouse)(&mut event)
        })
        .map(drop)
    }

    /// Build and push a synthetic event.
    pub fn push_mouse(&self, id: i16, x: i32, y: i32, bstate: MouseMask) -> Result<()> {
        self.unget_mouse(&L::Event::new(id, x, y, 0, bstate))
    }

    // ── Text helpers ────────────────────────────────────────────────────

    /// Printable form of `ch` (`wunctrl`), e.g. `^C` for U+0003.
    pub fn unctrl(&self, ch: char) -> Result<String> {
        let mut cell = self.ctx.factory().get_char(ch, Attrs::NORMAL, 0)?;
        // SAFETY: `cell` is a valid cell of the loaded layout; the result
        // points into a static native buffer.
        let raw = check_ptr("wunctrl", unsafe {
            (self.ctx.tables().wide.wunctrl)(&mut cell)
        })?;
        // SAFETY: the native buffer is terminated by a zero unit, and it is
        // read before any further native call can overwrite it.
        let (slots, len) = unsafe {
            let len = find_length(raw.cast_const());
            (std::slice::from_raw_parts(raw.cast_const(), len), len)
        };
        Ok(self.ctx.marshal().decode_wide_str(slots, len)?.text)
    }
}

impl<L: Layout> fmt::Debug for Screen<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Screen")
            .field("stdscr", &self.stdscr)
            .finish()
    }
}
