//! Property-based tests for the marshaling core.
//!
//! 1. **Char round trip**: `decode_char(encode_char(c, a, p)) == (c, a, p)`
//!    for every representable character, on every compiled layout. Pairs
//!    above 255 need `ext_color`.
//! 2. **String round trip**: decoding an encoded string returns the text
//!    and reports one cell per character.
//! 3. **Idempotence**: encoding the same triple twice is bitwise identical.
//! 4. **find_length**: N non-terminator cells followed by a terminator
//!    measure N.
//! 5. **Single-byte path**: ASCII round-trips with any 8-bit pair.
//! 6. **Interior NUL**: no string encoder accepts text containing `'\0'`.

use ncbind_abi::{Chtype32Wchar16, Chtype32Wchar32, Chtype32Wchar32Abi5, Chtype64Wchar32, Layout};
use ncbind_core::{Attrs, TextEncoding};
use ncbind_marshal::{Marshal, Terminator, find_length};
use proptest::prelude::*;

// ── Strategies ──────────────────────────────────────────────────────────

fn display_attrs() -> impl Strategy<Value = Attrs> {
    any::<u32>().prop_map(|bits| Attrs::from_bits_truncate(bits).display())
}

fn non_nul_char() -> impl Strategy<Value = char> {
    any::<char>().prop_filter("terminator", |c| *c != '\0')
}

fn text() -> impl Strategy<Value = String> {
    prop::collection::vec(non_nul_char(), 0..48).prop_map(|c| c.into_iter().collect())
}

// ── Generic checks ──────────────────────────────────────────────────────

fn char_round_trip<L: Layout>(ch: char, attrs: Attrs, pair: u16) -> Result<(), TestCaseError> {
    let m = Marshal::<L>::new(TextEncoding::Utf8);
    let cell = m.encode_char(ch, attrs, pair).unwrap();
    prop_assert_eq!(m.decode_char(&cell).unwrap(), (ch, attrs, pair));
    prop_assert_eq!(m.encode_char(ch, attrs, pair).unwrap(), cell);
    Ok(())
}

fn string_round_trip<L: Layout>(text: &str, attrs: Attrs, pair: u16) -> Result<(), TestCaseError> {
    let m = Marshal::<L>::new(TextEncoding::Utf8);
    let cells = m.encode_string(text, attrs, pair, Terminator::Append).unwrap();
    let chars = text.chars().count();
    prop_assert_eq!(cells.len(), chars + 1);

    let decoded = m.decode_string(&cells, cells.len()).unwrap();
    prop_assert_eq!(&decoded.text, text);
    prop_assert_eq!(decoded.count_read, chars);

    // SAFETY: `cells` ends with the appended terminator.
    let measured = unsafe { find_length(cells.as_ptr()) };
    prop_assert_eq!(measured, chars);
    Ok(())
}

// ═════════════════════════════════════════════════════════════════════════
// 1-3. Wide path
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn wide_chars_round_trip(ch in any::<char>(), attrs in display_attrs(), pair in 0u16..=255) {
        char_round_trip::<Chtype32Wchar32>(ch, attrs, pair)?;
        char_round_trip::<Chtype32Wchar32Abi5>(ch, attrs, pair)?;
        char_round_trip::<Chtype32Wchar16>(ch, attrs, pair)?;
        char_round_trip::<Chtype64Wchar32>(ch, attrs, pair)?;
    }

    #[test]
    fn extended_pairs_round_trip(ch in any::<char>(), attrs in display_attrs(), pair in any::<u16>()) {
        char_round_trip::<Chtype32Wchar32>(ch, attrs, pair)?;
        char_round_trip::<Chtype32Wchar16>(ch, attrs, pair)?;
    }

    #[test]
    fn wide_strings_round_trip(text in text(), attrs in display_attrs(), pair in 1u16..=255) {
        string_round_trip::<Chtype32Wchar32>(&text, attrs, pair)?;
        string_round_trip::<Chtype32Wchar32Abi5>(&text, attrs, pair)?;
        string_round_trip::<Chtype32Wchar16>(&text, attrs, pair)?;
        string_round_trip::<Chtype64Wchar32>(&text, attrs, pair)?;
    }

    #[test]
    fn utf16_input_matches_str_input(text in text(), pair in 0u16..=255) {
        let m = Marshal::<Chtype32Wchar16>::new(TextEncoding::Utf8);
        let units: Vec<u16> = text.encode_utf16().collect();
        let from_utf16 = m.encode_utf16(&units, Attrs::NORMAL, pair, Terminator::Append).unwrap();
        let from_str = m.encode_string(&text, Attrs::NORMAL, pair, Terminator::Append).unwrap();
        prop_assert_eq!(from_utf16, from_str);
    }

    #[test]
    fn wide_strs_round_trip(text in text()) {
        let m = Marshal::<Chtype32Wchar16>::new(TextEncoding::Utf8);
        let slots = m.encode_wide_str(&text, Terminator::Append).unwrap();
        let decoded = m.decode_wide_str(&slots, slots.len()).unwrap();
        prop_assert_eq!(&decoded.text, &text);
        prop_assert_eq!(decoded.count_read, text.encode_utf16().count());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 5. Single-byte path
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn ascii_small_chars_round_trip(byte in 1u8..=0x7F, attrs in display_attrs(), pair in 0u16..=255) {
        let m = Marshal::<Chtype64Wchar32>::new(TextEncoding::Utf8);
        let ch = char::from(byte);
        let cell = m.encode_small_char(ch, attrs, pair);
        prop_assert_eq!(m.decode_small_char(&cell).unwrap(), (ch, attrs, pair));
    }

    #[test]
    fn latin1_small_strings_round_trip(bytes in prop::collection::vec(1u8..=0xFF, 0..32)) {
        let m = Marshal::<Chtype32Wchar32>::new(TextEncoding::Latin1);
        let text: String = bytes.iter().map(|b| char::from(*b)).collect();
        let cells = m.encode_small_string(&text, Attrs::NORMAL, 0, Terminator::Append).unwrap();
        let decoded = m.decode_small_string(&cells, cells.len()).unwrap();
        prop_assert_eq!(decoded.text, text);
        prop_assert_eq!(decoded.count_read, bytes.len());
    }
}

// ═════════════════════════════════════════════════════════════════════════
// 6. Interior NUL
// ═════════════════════════════════════════════════════════════════════════

proptest! {
    #[test]
    fn interior_nul_never_encodes(head in text(), tail in text(), attrs in display_attrs()) {
        let m = Marshal::<Chtype32Wchar32Abi5>::new(TextEncoding::Utf8);
        let text = format!("{head}\0{tail}");
        prop_assert!(m.encode_string(&text, attrs, 1, Terminator::Append).is_err());
        prop_assert!(m.encode_wide_str(&text, Terminator::Suppress).is_err());
        prop_assert!(m.encode_small_string(&text, attrs, 1, Terminator::Append).is_err());
        let units: Vec<u16> = text.encode_utf16().collect();
        prop_assert!(m.encode_utf16(&units, attrs, 1, Terminator::Append).is_err());
    }
}
