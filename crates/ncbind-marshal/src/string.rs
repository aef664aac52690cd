//! Owned native string buffers.

use ncbind_abi::NativeChar;

use crate::marshal::terminated_len;

/// A buffer of native cells that native calls read from or write into.
///
/// The logical string ends at the first terminator cell. Buffers handed to
/// array-filling native calls always keep one extra cell for the
/// terminator, so [`capacity`](Self::capacity) is one less than the raw
/// length.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NativeString<T> {
    cells: Vec<T>,
}

impl<T: NativeChar> NativeString<T> {
    /// Wrap cells that already end in a terminator.
    ///
    /// A terminator is appended if `cells` lacks one.
    #[must_use]
    pub fn from_cells(mut cells: Vec<T>) -> Self {
        if cells.last().is_none_or(|c| !c.is_terminator()) {
            cells.push(T::default());
        }
        Self { cells }
    }

    /// `capacity` zero cells plus the terminator.
    #[must_use]
    pub fn zeroed(capacity: usize) -> Self {
        Self {
            cells: vec![T::default(); capacity + 1],
        }
    }

    /// Cells before the first terminator.
    #[must_use]
    pub fn len(&self) -> usize {
        terminated_len(&self.cells)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Cells a native call may write, excluding the terminator slot.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.cells.len().saturating_sub(1)
    }

    /// The logical cells, terminator excluded.
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.cells[..self.len()]
    }

    /// Every cell including the terminator and unused tail.
    #[must_use]
    pub fn raw(&self) -> &[T] {
        &self.cells
    }

    #[must_use]
    pub fn as_ptr(&self) -> *const T {
        self.cells.as_ptr()
    }

    /// Pointer for native calls that fill the buffer.
    pub fn as_mut_ptr(&mut self) -> *mut T {
        self.cells.as_mut_ptr()
    }

    #[must_use]
    pub fn into_cells(self) -> Vec<T> {
        self.cells
    }
}
