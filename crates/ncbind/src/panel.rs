//! Panel pass-through.

use std::fmt;
use std::sync::Arc;

use ncbind_abi::Layout;
use ncbind_core::{Error, Result, check_status};
use ncbind_sys::{NativePtr, PANEL};

use crate::handle::{Deallocator, HandleState, NativeHandle};
use crate::runtime::Context;
use crate::window::Window;

/// A panel over one window.
///
/// The panel keeps its window alive; `del_panel` always runs before the
/// window's `delwin`.
pub struct Panel<'ctx, L: Layout> {
    ctx: &'ctx Context<L>,
    // Field order is drop order.
    handle: Arc<NativeHandle<PANEL>>,
    window: Window<'ctx, L>,
}

impl<'ctx, L: Layout> Panel<'ctx, L> {
    pub(crate) fn create(ctx: &'ctx Context<L>, window: Window<'ctx, L>) -> Result<Self> {
        let win = window.ptr()?;
        // SAFETY: `win` is owned by a live handle.
        let raw = unsafe { (ctx.tables().panel.new_panel)(win) };
        let ptr = NativePtr::new(raw).ok_or(Error::NativeCall {
            function: "new_panel",
            result: 0,
        })?;
        let handle = ctx.panels().wrap(
            ptr,
            "del_panel",
            Deallocator::Unary(ctx.tables().panel.del_panel),
        );
        Ok(Self {
            ctx,
            handle,
            window,
        })
    }

    /// The panel's window as reported by the native library.
    ///
    /// The returned window shares the handle the panel was created with.
    pub fn window(&self) -> Result<Window<'ctx, L>> {
        let panel = self.ptr()?;
        // SAFETY: `panel` is owned by a live handle.
        let raw = unsafe { (self.ctx.tables().panel.panel_window)(panel) };
        let ptr = NativePtr::new(raw).ok_or(Error::NativeCall {
            function: "panel_window",
            result: 0,
        })?;
        Ok(self.ctx.wrap_window(ptr))
    }

    pub fn top(&self) -> Result<()> {
        self.call("top_panel", self.ctx.tables().panel.top_panel)
    }

    pub fn bottom(&self) -> Result<()> {
        self.call("bottom_panel", self.ctx.tables().panel.bottom_panel)
    }

    pub fn hide(&self) -> Result<()> {
        self.call("hide_panel", self.ctx.tables().panel.hide_panel)
    }

    pub fn show(&self) -> Result<()> {
        self.call("show_panel", self.ctx.tables().panel.show_panel)
    }

    #[must_use]
    pub fn state(&self) -> HandleState {
        self.handle.state()
    }

    /// Delete the native panel now; the window stays alive.
    pub fn release(&self) -> bool {
        self.handle.release()
    }

    fn ptr(&self) -> Result<*mut PANEL> {
        self.handle
            .get()
            .map(|p| p.as_ptr())
            .ok_or(Error::NotInitialized("panel handle"))
    }

    fn call(
        &self,
        function: &'static str,
        native: unsafe extern "C" fn(*mut PANEL) -> std::ffi::c_int,
    ) -> Result<()> {
        let panel = self.ptr()?;
        // SAFETY: `panel` is owned by a live handle.
        check_status(function, unsafe { native(panel) }).map(drop)
    }
}

impl<L: Layout> fmt::Debug for Panel<'_, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Panel")
            .field("handle", &self.handle)
            .field("window", &self.window)
            .finish()
    }
}
