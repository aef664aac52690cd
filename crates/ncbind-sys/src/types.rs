//! Opaque native types.

#![allow(non_camel_case_types)]

use std::fmt;
use std::marker::{PhantomData, PhantomPinned};
use std::ptr::NonNull;

macro_rules! opaque {
    ($($(#[$meta:meta])* $name:ident;)*) => {
        $(
            $(#[$meta])*
            #[repr(C)]
            pub struct $name {
                _data: [u8; 0],
                _marker: PhantomData<(*mut u8, PhantomPinned)>,
            }
        )*
    };
}

opaque! {
    /// Native window (also used for pads and the standard screen).
    WINDOW;
    /// Native panel from the panel extension library.
    PANEL;
}

/// A non-null native pointer that may move between threads.
///
/// The native library is not re-entrant; callers serialize every call that
/// touches the pointee. This wrapper only lets the pointer value itself be
/// stored in shared structures.
pub struct NativePtr<T>(NonNull<T>);

// SAFETY: the pointer is never dereferenced by Rust code; all access goes
// through native calls that the caller serializes.
unsafe impl<T> Send for NativePtr<T> {}
// SAFETY: see `Send`.
unsafe impl<T> Sync for NativePtr<T> {}

impl<T> NativePtr<T> {
    /// Wrap `ptr`, returning `None` for NULL.
    #[must_use]
    pub fn new(ptr: *mut T) -> Option<Self> {
        NonNull::new(ptr).map(Self)
    }

    #[inline]
    #[must_use]
    pub const fn as_ptr(&self) -> *mut T {
        self.0.as_ptr()
    }

    /// Address used as a registry key.
    #[inline]
    #[must_use]
    pub fn addr(&self) -> usize {
        self.0.as_ptr() as usize
    }
}

impl<T> Clone for NativePtr<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for NativePtr<T> {}

impl<T> PartialEq for NativePtr<T> {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl<T> Eq for NativePtr<T> {}

impl<T> fmt::Debug for NativePtr<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NativePtr({:p})", self.0)
    }
}
