#![forbid(unsafe_code)]

//! Active text encoding.
//!
//! Native wide slots always hold Unicode scalar values, so the encoding only
//! decides which characters may cross into native cells and how the
//! byte-oriented paths (single-byte cells and multi-byte `char*` strings) map
//! between bytes and characters.

use crate::error::{Error, Result};

/// Text encoding used when characters cross into native memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextEncoding {
    /// UTF-8 locale; every Unicode scalar is representable.
    #[default]
    Utf8,
    /// ISO-8859-1; code points up to U+00FF.
    Latin1,
    /// 7-bit ASCII.
    Ascii,
}

impl TextEncoding {
    /// Parse an encoding name as written in `NCBIND_ENCODING` or a locale
    /// codeset.
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        let normalized: String = value
            .trim()
            .chars()
            .filter(|c| !matches!(c, '-' | '_'))
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match normalized.as_str() {
            "utf8" => Some(Self::Utf8),
            "latin1" | "iso88591" | "iso885915" | "l1" => Some(Self::Latin1),
            "ascii" | "usascii" | "ansix3.41968" => Some(Self::Ascii),
            _ => None,
        }
    }

    /// Derive the encoding from a POSIX locale name such as `en_US.UTF-8` or
    /// `de_DE.ISO-8859-1@euro`.
    ///
    /// `C` and `POSIX` map to ASCII; a locale without a codeset yields `None`.
    #[must_use]
    pub fn from_locale(locale: &str) -> Option<Self> {
        let locale = locale.trim();
        if locale.is_empty() {
            return None;
        }
        if locale == "C" || locale == "POSIX" {
            return Some(Self::Ascii);
        }
        let (_, codeset) = locale.split_once('.')?;
        let codeset = codeset.split('@').next().unwrap_or(codeset);
        Self::parse(codeset)
    }

    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Utf8 => "utf-8",
            Self::Latin1 => "latin1",
            Self::Ascii => "ascii",
        }
    }

    /// Highest code point representable under this encoding.
    #[must_use]
    pub const fn max_code_point(self) -> u32 {
        match self {
            Self::Utf8 => char::MAX as u32,
            Self::Latin1 => 0xFF,
            Self::Ascii => 0x7F,
        }
    }

    #[inline]
    #[must_use]
    pub const fn can_encode(self, ch: char) -> bool {
        ch as u32 <= self.max_code_point()
    }

    /// Return `ch` unchanged if representable, otherwise an encoding error.
    pub fn check(self, ch: char) -> Result<char> {
        if self.can_encode(ch) {
            Ok(ch)
        } else {
            Err(Error::unencodable(ch, self.name()))
        }
    }

    /// Map one byte of a single-byte cell back to a character.
    ///
    /// Under UTF-8 and ASCII only 7-bit bytes stand for a character on their
    /// own; Latin-1 maps every byte.
    pub fn decode_byte(self, byte: u8) -> Result<char> {
        match self {
            Self::Latin1 => Ok(char::from(byte)),
            Self::Utf8 | Self::Ascii if byte.is_ascii() => Ok(char::from(byte)),
            Self::Utf8 | Self::Ascii => Err(Error::undecodable(u32::from(byte), self.name())),
        }
    }

    /// Encode text into the byte form of this encoding (no terminator).
    pub fn encode_bytes(self, text: &str) -> Result<Vec<u8>> {
        match self {
            Self::Utf8 => Ok(text.as_bytes().to_vec()),
            Self::Latin1 | Self::Ascii => text
                .chars()
                .map(|ch| self.check(ch).map(|ch| ch as u32 as u8))
                .collect(),
        }
    }

    /// Decode bytes produced by the native library under this encoding.
    pub fn decode_bytes(self, bytes: &[u8]) -> Result<String> {
        match self {
            Self::Utf8 => match std::str::from_utf8(bytes) {
                Ok(text) => Ok(text.to_owned()),
                Err(err) => {
                    let bad = bytes.get(err.valid_up_to()).copied().unwrap_or_default();
                    Err(Error::undecodable(u32::from(bad), self.name()))
                }
            },
            Self::Latin1 | Self::Ascii => bytes.iter().map(|&b| self.decode_byte(b)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_accepts_common_spellings() {
        assert_eq!(TextEncoding::parse("UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::parse("utf8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::parse("ISO-8859-1"), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::parse(" latin1 "), Some(TextEncoding::Latin1));
        assert_eq!(TextEncoding::parse("US-ASCII"), Some(TextEncoding::Ascii));
        assert_eq!(TextEncoding::parse("ebcdic"), None);
    }

    #[test]
    fn locale_codeset_is_extracted() {
        assert_eq!(TextEncoding::from_locale("en_US.UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(
            TextEncoding::from_locale("de_DE.ISO-8859-1@euro"),
            Some(TextEncoding::Latin1)
        );
        assert_eq!(TextEncoding::from_locale("C"), Some(TextEncoding::Ascii));
        assert_eq!(TextEncoding::from_locale("C.UTF-8"), Some(TextEncoding::Utf8));
        assert_eq!(TextEncoding::from_locale("en_US"), None);
        assert_eq!(TextEncoding::from_locale(""), None);
    }

    #[test]
    fn representable_ranges() {
        assert!(TextEncoding::Utf8.can_encode('\u{1F600}'));
        assert!(TextEncoding::Latin1.can_encode('é'));
        assert!(!TextEncoding::Latin1.can_encode('\u{263A}'));
        assert!(!TextEncoding::Ascii.can_encode('é'));
        assert!(TextEncoding::Ascii.check('a').is_ok());
    }

    #[test]
    fn single_bytes_decode_per_encoding() {
        assert_eq!(TextEncoding::Latin1.decode_byte(0xE9), Ok('é'));
        assert_eq!(TextEncoding::Utf8.decode_byte(b'a'), Ok('a'));
        assert!(TextEncoding::Utf8.decode_byte(0xE9).is_err());
        assert!(TextEncoding::Ascii.decode_byte(0x80).is_err());
    }

    #[test]
    fn byte_strings_round_trip() {
        let latin = TextEncoding::Latin1.encode_bytes("café").unwrap();
        assert_eq!(latin, vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(TextEncoding::Latin1.decode_bytes(&latin).unwrap(), "café");

        let utf8 = TextEncoding::Utf8.encode_bytes("café").unwrap();
        assert_eq!(utf8.len(), 5);
        assert_eq!(TextEncoding::Utf8.decode_bytes(&utf8).unwrap(), "café");
    }

    #[test]
    fn invalid_utf8_reports_offending_byte() {
        let err = TextEncoding::Utf8.decode_bytes(&[b'o', b'k', 0xFF]).unwrap_err();
        assert_eq!(err, Error::undecodable(0xFF, "utf-8"));
    }

    #[test]
    fn ascii_rejects_non_ascii_text() {
        let err = TextEncoding::Ascii.encode_bytes("naïve").unwrap_err();
        assert!(err.is_caller_input());
    }
}
