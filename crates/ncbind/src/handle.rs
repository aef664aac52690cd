//! Owned native pointers.
//!
//! A [`NativeHandle`] owns exactly one native pointer and runs its native
//! deallocator exactly once:
//!
//! ```text
//! Uninitialized ──adopt──▶ Owned ──release/drop──▶ Released
//! ```
//!
//! Release is idempotent and never fails loudly. A deallocator that reports
//! `ERR` is logged and surfaces as `false`; the handle still ends up
//! `Released` so the pointer is never freed twice.
//!
//! [`HandleRegistry`] keys live handles by address. Wrapping a pointer that
//! is already owned returns the existing handle with its reference count
//! bumped instead of a second owner.

use std::collections::HashMap;
use std::ffi::c_int;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

use ncbind_core::{ERR, debug, warn};
use ncbind_sys::NativePtr;

/// Native call that frees a handle's pointer.
pub enum Deallocator<T> {
    /// Takes the pointer (`delwin`, `del_panel`).
    Unary(unsafe extern "C" fn(*mut T) -> c_int),
    /// Frees implicit global state (`endwin` for the standard screen).
    Nullary(unsafe extern "C" fn() -> c_int),
}

impl<T> Clone for Deallocator<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Deallocator<T> {}

impl<T> fmt::Debug for Deallocator<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unary(_) => f.write_str("Unary"),
            Self::Nullary(_) => f.write_str("Nullary"),
        }
    }
}

impl<T> Deallocator<T> {
    /// # Safety
    ///
    /// `ptr` must be the live pointer this deallocator was paired with, and
    /// this must be the only call for it.
    unsafe fn run(self, ptr: NativePtr<T>) -> c_int {
        // SAFETY: upheld by the caller.
        unsafe {
            match self {
                Self::Unary(free) => free(ptr.as_ptr()),
                Self::Nullary(free) => free(),
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandleState {
    Uninitialized,
    Owned,
    Released,
}

enum Slot<T> {
    Uninitialized,
    Owned(NativePtr<T>),
    Released,
}

/// Exclusive owner of one native pointer.
pub struct NativeHandle<T> {
    function: &'static str,
    deallocator: Deallocator<T>,
    slot: Mutex<Slot<T>>,
}

impl<T> NativeHandle<T> {
    /// An empty handle that will be filled by [`adopt`](Self::adopt).
    ///
    /// `function` names the deallocator for logs.
    #[must_use]
    pub fn new(function: &'static str, deallocator: Deallocator<T>) -> Self {
        Self {
            function,
            deallocator,
            slot: Mutex::new(Slot::Uninitialized),
        }
    }

    /// A handle that owns `ptr` from the start.
    #[must_use]
    pub fn owned(ptr: NativePtr<T>, function: &'static str, deallocator: Deallocator<T>) -> Self {
        Self {
            function,
            deallocator,
            slot: Mutex::new(Slot::Owned(ptr)),
        }
    }

    /// Take ownership of `ptr`. Returns `false` unless the handle was
    /// uninitialized.
    pub fn adopt(&self, ptr: NativePtr<T>) -> bool {
        let mut slot = self.lock();
        if matches!(*slot, Slot::Uninitialized) {
            *slot = Slot::Owned(ptr);
            true
        } else {
            false
        }
    }

    #[must_use]
    pub fn state(&self) -> HandleState {
        match *self.lock() {
            Slot::Uninitialized => HandleState::Uninitialized,
            Slot::Owned(_) => HandleState::Owned,
            Slot::Released => HandleState::Released,
        }
    }

    /// The owned pointer, or `None` before adoption and after release.
    #[must_use]
    pub fn get(&self) -> Option<NativePtr<T>> {
        match *self.lock() {
            Slot::Owned(ptr) => Some(ptr),
            Slot::Uninitialized | Slot::Released => None,
        }
    }

    #[must_use]
    pub fn function(&self) -> &'static str {
        self.function
    }

    /// Run the deallocator if the handle owns a pointer.
    ///
    /// Returns `true` when the handle was already released or never held a
    /// pointer, and when the deallocator succeeded.
    pub fn release(&self) -> bool {
        let ptr = {
            let mut slot = self.lock();
            match std::mem::replace(&mut *slot, Slot::Released) {
                Slot::Owned(ptr) => ptr,
                Slot::Uninitialized | Slot::Released => return true,
            }
        };

        // SAFETY: the slot moved to `Released` under the lock, so this is the
        // only call for `ptr`.
        let result = unsafe { self.deallocator.run(ptr) };
        if result == ERR {
            warn!(
                function = self.function,
                addr = ptr.addr(),
                "native release failed"
            );
            false
        } else {
            debug!(function = self.function, addr = ptr.addr(), "native handle released");
            true
        }
    }

    fn lock(&self) -> MutexGuard<'_, Slot<T>> {
        self.slot.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl<T> Drop for NativeHandle<T> {
    fn drop(&mut self) {
        self.release();
    }
}

impl<T> fmt::Debug for NativeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NativeHandle")
            .field("function", &self.function)
            .field("state", &self.state())
            .field("addr", &self.get().map(|p| p.addr()))
            .finish()
    }
}

/// Address-keyed index of live handles.
pub struct HandleRegistry<T> {
    entries: Mutex<HashMap<usize, Weak<NativeHandle<T>>>>,
}

impl<T> Default for HandleRegistry<T> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<T> HandleRegistry<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Share the live handle for `ptr`, or create and index a new owner.
    pub fn wrap(
        &self,
        ptr: NativePtr<T>,
        function: &'static str,
        deallocator: Deallocator<T>,
    ) -> Arc<NativeHandle<T>> {
        let mut entries = self.lock();
        if let Some(existing) = live(&entries, ptr) {
            return existing;
        }
        entries.retain(|_, weak| weak.strong_count() > 0);
        let handle = Arc::new(NativeHandle::owned(ptr, function, deallocator));
        entries.insert(ptr.addr(), Arc::downgrade(&handle));
        handle
    }

    /// The live handle owning `ptr`, if any.
    #[must_use]
    pub fn lookup(&self, ptr: NativePtr<T>) -> Option<Arc<NativeHandle<T>>> {
        live(&self.lock(), ptr)
    }

    /// Handles still referenced somewhere and not yet released.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.lock()
            .values()
            .filter_map(Weak::upgrade)
            .filter(|h| h.state() == HandleState::Owned)
            .count()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<usize, Weak<NativeHandle<T>>>> {
        self.entries.lock().unwrap_or_else(|e| e.into_inner())
    }
}

/// A registered handle that still owns `ptr`. An explicitly released handle
/// is stale: the native library may have reused the address.
fn live<T>(
    entries: &HashMap<usize, Weak<NativeHandle<T>>>,
    ptr: NativePtr<T>,
) -> Option<Arc<NativeHandle<T>>> {
    entries
        .get(&ptr.addr())
        .and_then(Weak::upgrade)
        .filter(|handle| handle.get() == Some(ptr))
}

impl<T> fmt::Debug for HandleRegistry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandleRegistry")
            .field("entries", &self.lock().len())
            .finish()
    }
}
