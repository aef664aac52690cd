//! Alternate character set maps.
//!
//! The native library exports two tables indexed by the ASCII code of a VT100
//! line-drawing character: `acs_map` (single-byte cells) and `_nc_wacs`
//! (a pointer to wide cells). Both are filled by `initscr`, so entries read
//! before the session starts are zero.

use std::fmt;
use std::marker::PhantomData;
use std::ptr::NonNull;

use ncbind_abi::NativeChar;
use ncbind_core::{Error, Result};

/// Entries in every ACS table.
pub const ACS_LEN: usize = 128;

pub const ULCORNER: char = 'l';
pub const LLCORNER: char = 'm';
pub const URCORNER: char = 'k';
pub const LRCORNER: char = 'j';
pub const LTEE: char = 't';
pub const RTEE: char = 'u';
pub const HLINE: char = 'q';
pub const VLINE: char = 'x';
pub const PLUS: char = 'n';
pub const DIAMOND: char = '`';
pub const CKBOARD: char = 'a';
pub const BULLET: char = '~';

/// A native-owned ACS table of `T`, borrowed for `'lib`.
pub struct AcsMap<'lib, T> {
    entries: NonNull<T>,
    _library: PhantomData<&'lib T>,
}

impl<'lib, T: NativeChar> AcsMap<'lib, T> {
    /// Wrap the first entry of a native table.
    ///
    /// # Safety
    ///
    /// A non-null `entries` must point to `ACS_LEN` aligned values of `T`
    /// that stay allocated for `'lib`. The native side may rewrite them.
    pub unsafe fn from_raw(entries: *const T, name: &'static str) -> Result<Self> {
        let entries = NonNull::new(entries.cast_mut()).ok_or(Error::NotInitialized(name))?;
        Ok(Self {
            entries,
            _library: PhantomData,
        })
    }

    /// The entry for `index`, as currently stored by the native library.
    pub fn get(&self, index: char) -> Result<T> {
        let slot = index as usize;
        if slot >= ACS_LEN {
            return Err(Error::InvalidLength {
                requested: i64::from(u32::from(index)),
                max: ACS_LEN - 1,
            });
        }
        // SAFETY: `slot < ACS_LEN` and `from_raw` guarantees that many
        // entries. Read by value on every call because `initscr` rewrites
        // the table.
        Ok(unsafe { self.entries.as_ptr().add(slot).read() })
    }
}

impl<T> fmt::Debug for AcsMap<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AcsMap")
            .field("entries", &self.entries)
            .field("type", &std::any::type_name::<T>())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncbind_abi::{CChar, Chtype, Chtype32Wchar32, SingleByteChar, WChar};
    use ncbind_core::{Attrs, CCHARW_MAX, TextEncoding};
    use ncbind_marshal::Marshal;

    fn small_table() -> Vec<Chtype<u32>> {
        let mut table = vec![Chtype::default(); ACS_LEN];
        table[ULCORNER as usize] = Chtype(0x0040_006C);
        table[HLINE as usize] = Chtype(0x0040_0071);
        table
    }

    #[test]
    fn small_entries_are_read_by_index() {
        let table = small_table();
        let map = unsafe { AcsMap::from_raw(table.as_ptr(), "acs_map") }.unwrap();
        assert_eq!(map.get(ULCORNER).unwrap().raw(), 0x0040_006C);
        assert_eq!(map.get(HLINE).unwrap().encoded_byte(), b'q');
        assert!(map.get(VLINE).unwrap().is_terminator());
    }

    #[test]
    fn indices_past_the_table_are_rejected() {
        let table = small_table();
        let map = unsafe { AcsMap::from_raw(table.as_ptr(), "acs_map") }.unwrap();
        assert!(map.get('\u{7F}').is_ok());
        let err = map.get('\u{80}').unwrap_err();
        assert_eq!(
            err,
            Error::InvalidLength {
                requested: 128,
                max: 127
            }
        );
        assert!(map.get('\u{263A}').unwrap_err().is_caller_input());
    }

    #[test]
    fn wide_entries_decode_through_marshal() {
        let mut table = vec![CChar::<u32, u32>::default(); ACS_LEN];
        let mut slots = [WChar(0); CCHARW_MAX];
        slots[0] = WChar(0x250C);
        table[ULCORNER as usize] = CChar {
            attr: 0,
            chars: slots,
            ext_color: 0,
        };

        let map = unsafe { AcsMap::from_raw(table.as_ptr(), "_nc_wacs") }.unwrap();
        let marshal = Marshal::<Chtype32Wchar32>::new(TextEncoding::Utf8);
        let cell = map.get(ULCORNER).unwrap();
        assert_eq!(marshal.decode_char(&cell), Ok(('\u{250C}', Attrs::NORMAL, 0)));
    }

    #[test]
    fn null_table_is_not_initialized() {
        let err = unsafe { AcsMap::<Chtype<u32>>::from_raw(std::ptr::null(), "_nc_wacs") }
            .unwrap_err();
        assert_eq!(err, Error::NotInitialized("_nc_wacs"));
    }
}
