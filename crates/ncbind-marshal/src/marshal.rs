//! Generic marshaling between Rust text and native representations.
//!
//! Every operation is written once against [`Layout`] and instantiated per
//! compiled layout. Lengths are always counted in cells (or slots for wide
//! strings), never in bytes.
//!
//! # Wide slots
//!
//! A 4-byte slot holds one Unicode scalar. A 2-byte slot holds one UTF-16
//! unit, so a character outside the BMP occupies two slots of the same cell;
//! it is still one cell.

use std::marker::PhantomData;

use ncbind_core::{Attrs, CCHARW_MAX, Error, Result, TextEncoding};
use ncbind_abi::{
    Layout, MultiByteChar, NCursesChar, NativeChar, SingleByteChar, SlotUnit, WideChar,
};

/// Whether an encoded buffer gets a trailing zero-valued terminator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Terminator {
    #[default]
    Append,
    Suppress,
}

/// Text read back from a native buffer.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Decoded {
    pub text: String,
    /// Native cells (or slots) consumed, excluding the terminator.
    pub count_read: usize,
}

impl Decoded {
    /// Length of `text` in UTF-16 code units.
    #[must_use]
    pub fn utf16_len(&self) -> usize {
        self.text.encode_utf16().count()
    }
}

/// Marshaling operations for layout `L` under one text encoding.
pub struct Marshal<L> {
    encoding: TextEncoding,
    _layout: PhantomData<L>,
}

impl<L> Clone for Marshal<L> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<L> Copy for Marshal<L> {}

impl<L> std::fmt::Debug for Marshal<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Marshal")
            .field("layout", &std::any::type_name::<L>())
            .field("encoding", &self.encoding)
            .finish()
    }
}

impl<L: Layout> Marshal<L> {
    #[must_use]
    pub const fn new(encoding: TextEncoding) -> Self {
        Self {
            encoding,
            _layout: PhantomData,
        }
    }

    #[must_use]
    pub const fn encoding(&self) -> TextEncoding {
        self.encoding
    }

    // ── Single-byte cells ───────────────────────────────────────────────

    /// Pack one character into a single-byte cell.
    ///
    /// Only the low 8 bits of the code point are kept; characters outside the
    /// single-byte range are narrowed, not rejected.
    #[inline]
    pub fn encode_small_char(&self, ch: char, attrs: Attrs, pair: u16) -> L::Small {
        L::Small::from_parts(ch as u32 as u8, attrs, pair)
    }

    pub fn decode_small_char(&self, cell: &L::Small) -> Result<(char, Attrs, u16)> {
        let ch = self.encoding.decode_byte(cell.encoded_byte())?;
        Ok((ch, cell.attrs(), cell.color_pair()))
    }

    /// Encode text one byte per cell.
    ///
    /// A character that narrows to the zero byte would end the native string
    /// early, so it is rejected.
    pub fn encode_small_string(
        &self,
        text: &str,
        attrs: Attrs,
        pair: u16,
        terminator: Terminator,
    ) -> Result<Vec<L::Small>> {
        let mut cells = Vec::with_capacity(text.len() + 1);
        for ch in text.chars() {
            let cell = self.encode_small_char(ch, attrs, pair);
            if cell.encoded_byte() == 0 {
                return Err(self.interior_nul(ch));
            }
            cells.push(cell);
        }
        if terminator == Terminator::Append {
            cells.push(L::Small::default());
        }
        Ok(cells)
    }

    /// Decode at most `max` cells, stopping at the first terminator.
    pub fn decode_small_string(&self, cells: &[L::Small], max: usize) -> Result<Decoded> {
        let mut decoded = Decoded::default();
        for cell in cells.iter().take(max) {
            if cell.is_terminator() {
                break;
            }
            decoded.text.push(self.encoding.decode_byte(cell.encoded_byte())?);
            decoded.count_read += 1;
        }
        Ok(decoded)
    }

    // ── Wide cells ──────────────────────────────────────────────────────

    /// Pack one character into a wide cell.
    pub fn encode_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<L::Wide> {
        let (units, used) = self.units_of(ch)?;
        let mut slots = [L::Slot::default(); CCHARW_MAX];
        for (slot, unit) in slots.iter_mut().zip(&units[..used]) {
            *slot = L::Slot::from_unit(*unit);
        }
        Ok(L::Wide::from_parts(slots, attrs, pair))
    }

    /// Unpack a wide cell into its spacing character, attributes, and pair.
    ///
    /// Combining characters stored after the spacing character are validated
    /// but not returned; use [`decode_string`](Self::decode_string) to keep
    /// them.
    pub fn decode_char(&self, cell: &L::Wide) -> Result<(char, Attrs, u16)> {
        let text = self.cell_text(cell)?;
        let base = text.chars().next().unwrap_or('\0');
        Ok((base, cell.attrs(), cell.color_pair()))
    }

    /// Encode text one character per cell. `'\0'` is rejected.
    pub fn encode_string(
        &self,
        text: &str,
        attrs: Attrs,
        pair: u16,
        terminator: Terminator,
    ) -> Result<Vec<L::Wide>> {
        let mut cells = Vec::with_capacity(text.len() + 1);
        for ch in text.chars() {
            cells.push(self.encode_string_char(ch, attrs, pair)?);
        }
        if terminator == Terminator::Append {
            cells.push(L::Wide::default());
        }
        Ok(cells)
    }

    /// Encode UTF-16 text; a surrogate pair is one logical character and
    /// fills one cell.
    pub fn encode_utf16(
        &self,
        units: &[u16],
        attrs: Attrs,
        pair: u16,
        terminator: Terminator,
    ) -> Result<Vec<L::Wide>> {
        let mut cells = Vec::with_capacity(units.len() + 1);
        for decoded in char::decode_utf16(units.iter().copied()) {
            let ch = decoded.map_err(|e| Error::Encoding {
                direction: "encode",
                subject: format!("unpaired surrogate 0x{:04X}", e.unpaired_surrogate()),
                encoding: self.encoding.name(),
            })?;
            cells.push(self.encode_string_char(ch, attrs, pair)?);
        }
        if terminator == Terminator::Append {
            cells.push(L::Wide::default());
        }
        Ok(cells)
    }

    /// Decode at most `max` cells, stopping at the first terminator.
    pub fn decode_string(&self, cells: &[L::Wide], max: usize) -> Result<Decoded> {
        let mut decoded = Decoded::default();
        for cell in cells.iter().take(max) {
            if cell.is_terminator() {
                break;
            }
            decoded.text.push_str(&self.cell_text(cell)?);
            decoded.count_read += 1;
        }
        Ok(decoded)
    }

    // ── Standalone wide slots and wide strings ──────────────────────────

    /// Encode one character as a standalone slot (`wint_t`-style).
    ///
    /// Fails if the character needs two units in a 2-byte slot.
    pub fn encode_wide_slot(&self, ch: char) -> Result<L::Slot> {
        let (units, used) = self.units_of(ch)?;
        if used != 1 {
            return Err(Error::unencodable(ch, self.encoding.name()));
        }
        Ok(L::Slot::from_unit(units[0]))
    }

    pub fn decode_wide_slot(&self, slot: &L::Slot) -> Result<char> {
        let unit = slot.unit().to_u32();
        let ch = char::from_u32(unit).ok_or_else(|| self.undecodable(unit))?;
        self.checked(ch, unit)
    }

    /// Encode a native wide string (`wchar_t*`).
    pub fn encode_wide_str(&self, text: &str, terminator: Terminator) -> Result<Vec<L::Slot>> {
        let mut slots = Vec::with_capacity(text.len() + 1);
        for ch in text.chars() {
            if ch == '\0' {
                return Err(self.interior_nul(ch));
            }
            let (units, used) = self.units_of(ch)?;
            slots.extend(units[..used].iter().map(|u| L::Slot::from_unit(*u)));
        }
        if terminator == Terminator::Append {
            slots.push(L::Slot::default());
        }
        Ok(slots)
    }

    /// Decode at most `max` slots of a native wide string.
    pub fn decode_wide_str(&self, slots: &[L::Slot], max: usize) -> Result<Decoded> {
        let used = slots
            .iter()
            .take(max)
            .take_while(|s| !s.is_terminator())
            .count();
        Ok(Decoded {
            text: self.decode_units(slots[..used].iter().map(WideChar::unit))?,
            count_read: used,
        })
    }

    // ── Multi-byte strings ──────────────────────────────────────────────

    /// Encode a NUL-terminated multi-byte string under the active encoding.
    pub fn encode_multibyte(&self, text: &str) -> Result<Vec<u8>> {
        if text.contains('\0') {
            return Err(self.interior_nul('\0'));
        }
        let mut bytes = self.encoding.encode_bytes(text)?;
        bytes.push(0);
        Ok(bytes)
    }

    /// Decode a multi-byte string up to its first NUL (or the whole slice).
    pub fn decode_multibyte(&self, bytes: &[u8]) -> Result<String> {
        let end = bytes.iter().position(|b| *b == 0).unwrap_or(bytes.len());
        self.encoding.decode_bytes(&bytes[..end])
    }

    // ── Helpers ─────────────────────────────────────────────────────────

    fn encode_string_char(&self, ch: char, attrs: Attrs, pair: u16) -> Result<L::Wide> {
        if ch == '\0' {
            return Err(self.interior_nul(ch));
        }
        self.encode_char(ch, attrs, pair)
    }

    fn interior_nul(&self, ch: char) -> Error {
        Error::Encoding {
            direction: "encode",
            subject: format!("interior NUL from U+{:04X}", u32::from(ch)),
            encoding: self.encoding.name(),
        }
    }

    /// Native units for `ch`: one unit, or a surrogate pair in 2-byte slots.
    fn units_of(&self, ch: char) -> Result<([L::Unit; 2], usize)> {
        let ch = self.encoding.check(ch)?;
        let mut units = [L::Unit::default(); 2];
        if <L::Unit as SlotUnit>::WIDTH >= 4 {
            units[0] = L::Unit::from_u32(u32::from(ch))
                .ok_or_else(|| Error::unencodable(ch, self.encoding.name()))?;
            return Ok((units, 1));
        }

        let mut buf = [0u16; 2];
        let encoded = ch.encode_utf16(&mut buf);
        for (slot, unit) in units.iter_mut().zip(encoded.iter()) {
            *slot = L::Unit::from_u32(u32::from(*unit))
                .ok_or_else(|| Error::unencodable(ch, self.encoding.name()))?;
        }
        Ok((units, encoded.len()))
    }

    /// Every scalar stored in a cell, up to its first zero slot.
    fn cell_text(&self, cell: &L::Wide) -> Result<String> {
        let units = cell
            .slots()
            .iter()
            .take_while(|s| !s.is_terminator())
            .map(WideChar::unit);
        self.decode_units(units)
    }

    fn decode_units(&self, units: impl Iterator<Item = L::Unit>) -> Result<String> {
        let mut text = String::new();
        if <L::Unit as SlotUnit>::WIDTH >= 4 {
            for unit in units {
                let raw = unit.to_u32();
                let ch = char::from_u32(raw).ok_or_else(|| self.undecodable(raw))?;
                text.push(self.checked(ch, raw)?);
            }
        } else {
            for decoded in char::decode_utf16(units.map(|u| u.to_u32() as u16)) {
                let ch = decoded.map_err(|e| self.undecodable(u32::from(e.unpaired_surrogate())))?;
                text.push(self.checked(ch, u32::from(ch))?);
            }
        }
        Ok(text)
    }

    fn checked(&self, ch: char, raw: u32) -> Result<char> {
        if self.encoding.can_encode(ch) {
            Ok(ch)
        } else {
            Err(self.undecodable(raw))
        }
    }

    fn undecodable(&self, raw: u32) -> Error {
        Error::undecodable(raw, self.encoding.name())
    }
}

/// Cells before the first terminator in `cells` (or all of them).
#[must_use]
pub fn terminated_len<T: NativeChar>(cells: &[T]) -> usize {
    cells
        .iter()
        .position(NativeChar::is_terminator)
        .unwrap_or(cells.len())
}

/// Count cells in a native buffer up to its zero-valued terminator.
///
/// Returns 0 for NULL. Used only for native-owned buffers whose length the
/// native call does not report.
///
/// # Safety
///
/// A non-null `ptr` must point to a readable, aligned array of `T` that
/// contains a terminator cell.
pub unsafe fn find_length<T: NativeChar>(ptr: *const T) -> usize {
    if ptr.is_null() {
        return 0;
    }
    let mut len = 0;
    // SAFETY: the caller guarantees a terminator inside the allocation, so
    // every offset read here is in bounds.
    while !unsafe { *ptr.add(len) }.is_terminator() {
        len += 1;
    }
    len
}

/// Borrow a terminated native buffer as a slice (terminator excluded).
///
/// # Safety
///
/// Same as [`find_length`]; the buffer must also stay alive and unmodified
/// for `'a`.
pub unsafe fn terminated_slice<'a, T: NativeChar>(ptr: *const T) -> &'a [T] {
    // SAFETY: forwarded to the caller.
    let len = unsafe { find_length(ptr) };
    if len == 0 {
        return &[];
    }
    // SAFETY: `len` cells were just read from `ptr`.
    unsafe { std::slice::from_raw_parts(ptr, len) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ncbind_abi::{CChar, Chtype32Wchar16, Chtype32Wchar32, Chtype64Wchar32, WChar};

    fn utf8<L: Layout>() -> Marshal<L> {
        Marshal::new(TextEncoding::Utf8)
    }

    #[test]
    fn small_char_keeps_low_byte() {
        let m = utf8::<Chtype32Wchar32>();
        let cell = m.encode_small_char('a', Attrs::NORMAL, 0);
        assert_eq!(cell.raw() & 0xFF, 0x61);
        assert_eq!(cell.raw() & !0xFF, 0);
        assert_eq!(m.decode_small_char(&cell), Ok(('a', Attrs::NORMAL, 0)));

        // U+0161 narrows to 0x61.
        assert_eq!(m.encode_small_char('\u{161}', Attrs::NORMAL, 0), cell);
    }

    #[test]
    fn small_high_bytes_depend_on_encoding() {
        let cell = utf8::<Chtype32Wchar32>().encode_small_char('é', Attrs::BOLD, 1);
        assert!(utf8::<Chtype32Wchar32>().decode_small_char(&cell).is_err());
        let latin = Marshal::<Chtype32Wchar32>::new(TextEncoding::Latin1);
        assert_eq!(latin.decode_small_char(&cell), Ok(('é', Attrs::BOLD, 1)));
    }

    #[test]
    fn wide_scenario_round_trips_everywhere() {
        fn check<L: Layout>() {
            let m = utf8::<L>();
            let cell = m
                .encode_char('\u{263A}', Attrs::BOLD | Attrs::ITALIC, 4)
                .unwrap();
            assert_eq!(
                m.decode_char(&cell),
                Ok(('\u{263A}', Attrs::BOLD | Attrs::ITALIC, 4))
            );
        }
        check::<Chtype32Wchar32>();
        check::<Chtype32Wchar16>();
        check::<Chtype64Wchar32>();
    }

    #[test]
    fn astral_char_fills_two_narrow_slots_in_one_cell() {
        let m = utf8::<Chtype32Wchar16>();
        let cells = m
            .encode_string("\u{1F600}", Attrs::NORMAL, 0, Terminator::Suppress)
            .unwrap();
        assert_eq!(cells.len(), 1);
        assert_eq!(cells[0].chars[0], WChar(0xD83D));
        assert_eq!(cells[0].chars[1], WChar(0xDE00));

        let decoded = m.decode_string(&cells, 8).unwrap();
        assert_eq!(decoded.text, "\u{1F600}");
        assert_eq!(decoded.count_read, 1);
        assert_eq!(decoded.utf16_len(), 2);
    }

    #[test]
    fn empty_string_is_just_the_terminator() {
        let m = utf8::<Chtype32Wchar32>();
        let cells = m
            .encode_string("", Attrs::BOLD, 3, Terminator::Append)
            .unwrap();
        assert_eq!(cells, vec![CChar::default()]);
        assert!(m
            .encode_string("", Attrs::BOLD, 3, Terminator::Suppress)
            .unwrap()
            .is_empty());
    }

    #[test]
    fn decode_string_honours_max() {
        let m = utf8::<Chtype32Wchar32>();
        let cells = m
            .encode_string("hello", Attrs::NORMAL, 0, Terminator::Append)
            .unwrap();
        let decoded = m.decode_string(&cells, 3).unwrap();
        assert_eq!(decoded.text, "hel");
        assert_eq!(decoded.count_read, 3);
    }

    #[test]
    fn combining_marks_are_kept_by_string_decode() {
        let m = utf8::<Chtype32Wchar32>();
        let mut cell = m.encode_char('e', Attrs::NORMAL, 0).unwrap();
        cell.chars[1] = WChar(0x0301);
        assert_eq!(m.decode_char(&cell).unwrap().0, 'e');
        assert_eq!(m.decode_string(&[cell], 1).unwrap().text, "e\u{301}");
    }

    #[test]
    fn encoding_limits_the_wide_path() {
        let m = Marshal::<Chtype32Wchar32>::new(TextEncoding::Latin1);
        let err = m.encode_char('\u{263A}', Attrs::NORMAL, 0).unwrap_err();
        assert!(err.is_caller_input());

        let native = utf8::<Chtype32Wchar32>()
            .encode_char('\u{263A}', Attrs::NORMAL, 0)
            .unwrap();
        assert!(m.decode_char(&native).is_err());
    }

    #[test]
    fn invalid_native_units_fail_to_decode() {
        let m = utf8::<Chtype32Wchar32>();
        let mut cell = CChar::<u32, u32>::default();
        cell.chars[0] = WChar(0xD800);
        assert!(m.decode_char(&cell).is_err());

        let narrow = utf8::<Chtype32Wchar16>();
        let mut cell = CChar::<u32, u16>::default();
        cell.chars[0] = WChar(0xDC00);
        assert!(narrow.decode_char(&cell).is_err());
    }

    #[test]
    fn utf16_input_pairs_surrogates() {
        let m = utf8::<Chtype32Wchar32>();
        let units: Vec<u16> = "a\u{1F600}b".encode_utf16().collect();
        let cells = m
            .encode_utf16(&units, Attrs::NORMAL, 0, Terminator::Append)
            .unwrap();
        assert_eq!(cells.len(), 4);
        assert_eq!(cells[1].chars[0], WChar(0x1F600));

        let err = m
            .encode_utf16(&[0x61, 0xD800], Attrs::NORMAL, 0, Terminator::Append)
            .unwrap_err();
        assert!(err.to_string().contains("unpaired surrogate 0xD800"));
    }

    #[test]
    fn wide_slots() {
        let wide = utf8::<Chtype32Wchar32>();
        let slot = wide.encode_wide_slot('\u{1F600}').unwrap();
        assert_eq!(wide.decode_wide_slot(&slot), Ok('\u{1F600}'));

        let narrow = utf8::<Chtype32Wchar16>();
        assert!(narrow.encode_wide_slot('\u{1F600}').is_err());
        let slot = narrow.encode_wide_slot('\u{263A}').unwrap();
        assert_eq!(narrow.decode_wide_slot(&slot), Ok('\u{263A}'));
    }

    #[test]
    fn wide_strings_count_units() {
        let narrow = utf8::<Chtype32Wchar16>();
        let slots = narrow.encode_wide_str("a\u{1F600}", Terminator::Append).unwrap();
        assert_eq!(slots.len(), 4);
        let decoded = narrow.decode_wide_str(&slots, 16).unwrap();
        assert_eq!(decoded.text, "a\u{1F600}");
        assert_eq!(decoded.count_read, 3);

        let wide = utf8::<Chtype32Wchar32>();
        let slots = wide.encode_wide_str("a\u{1F600}", Terminator::Suppress).unwrap();
        assert_eq!(slots.len(), 2);
    }

    #[test]
    fn multibyte_strings() {
        let m = utf8::<Chtype32Wchar32>();
        let bytes = m.encode_multibyte("☺ ok").unwrap();
        assert_eq!(bytes.last(), Some(&0));
        assert_eq!(m.decode_multibyte(&bytes).unwrap(), "☺ ok");
        assert!(m.encode_multibyte("a\0b").is_err());

        let latin = Marshal::<Chtype32Wchar32>::new(TextEncoding::Latin1);
        assert_eq!(latin.encode_multibyte("é").unwrap(), vec![0xE9, 0]);
    }

    #[test]
    fn interior_nul_is_rejected_by_string_encoders() {
        let m = utf8::<Chtype32Wchar32>();
        let err = m
            .encode_string("a\0b", Attrs::NORMAL, 0, Terminator::Append)
            .unwrap_err();
        assert!(err.is_caller_input());
        assert!(err.to_string().contains("interior NUL"));

        let units: Vec<u16> = "a\0b".encode_utf16().collect();
        assert!(m.encode_utf16(&units, Attrs::BOLD, 1, Terminator::Suppress).is_err());
        assert!(m.encode_wide_str("a\0b", Terminator::Append).is_err());

        // A lone character is not a string; the cell is still produced.
        assert!(m.encode_char('\0', Attrs::BOLD, 0).is_ok());
    }

    #[test]
    fn narrowing_to_zero_byte_is_rejected() {
        let m = utf8::<Chtype32Wchar32>();
        let err = m
            .encode_small_string("\u{100}x", Attrs::NORMAL, 0, Terminator::Append)
            .unwrap_err();
        assert!(err.to_string().contains("U+0100"));
        assert!(m
            .encode_small_string("x\0", Attrs::BOLD, 2, Terminator::Suppress)
            .is_err());

        let cells = m
            .encode_small_string("ok", Attrs::NORMAL, 0, Terminator::Append)
            .unwrap();
        assert_eq!(m.decode_small_string(&cells, 8).unwrap().text, "ok");
    }

    #[test]
    fn find_length_stops_at_terminator() {
        let m = utf8::<Chtype64Wchar32>();
        let cells = m
            .encode_string("four", Attrs::NORMAL, 0, Terminator::Append)
            .unwrap();
        assert_eq!(unsafe { find_length(cells.as_ptr()) }, 4);
        assert_eq!(unsafe { terminated_slice(cells.as_ptr()) }.len(), 4);
        assert_eq!(terminated_len(&cells), 4);
        assert_eq!(unsafe { find_length::<CChar<u64, u32>>(std::ptr::null()) }, 0);
    }
}
