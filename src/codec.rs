//! Text handling for the vendor dialect: escapes inside quoted AT strings and
//! the character sets used by SIM toolkit and phonebook fields.

use core::fmt::Write;

use heapless::{String, Vec};

use crate::hex::decode_ucs2_hex;

pub const MAX_TEXT_LEN: usize = 256;
pub const MAX_RAW_LEN: usize = 1024;

/// Decoded, human readable text.
pub type Text = String<MAX_TEXT_LEN>;

/// How special bytes are escaped inside quoted AT strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EscapeMode {
    /// `\XX`, two hex digits.
    Hex,
    /// `\ooo`, one to three octal digits.
    Octal,
}

/// 8-bit character set of text fields that are not flagged as unicode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Charset {
    /// GSM 03.38 default alphabet
    Gsm,
    Latin1,
    /// UCS2, four hex digits per character
    Ucs2,
}

/// Escape mode and character set of one AT channel, fixed when the channel is
/// set up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Codec {
    escapes: EscapeMode,
    charset: Charset,
}

impl Codec {
    pub const fn new(escapes: EscapeMode, charset: Charset) -> Self {
        Self { escapes, charset }
    }

    pub fn escapes(&self) -> EscapeMode {
        self.escapes
    }

    pub fn charset(&self) -> Charset {
        self.charset
    }

    /// Resolve backslash escapes of a quoted field body into raw bytes.
    ///
    /// A backslash that does not start a valid escape is kept as is.
    pub fn unescape(&self, quoted: &str) -> Vec<u8, MAX_RAW_LEN> {
        let bytes = quoted.as_bytes();
        let mut out = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            let mut b = bytes[pos];
            pos += 1;
            if b == b'\\' {
                match self.escapes {
                    EscapeMode::Hex => {
                        if let Some(value) = bytes
                            .get(pos..pos + 2)
                            .and_then(|digits| core::str::from_utf8(digits).ok())
                            .and_then(|digits| u8::from_str_radix(digits, 16).ok())
                        {
                            b = value;
                            pos += 2;
                        }
                    }
                    EscapeMode::Octal => {
                        let mut value: u16 = 0;
                        let mut digits = 0;
                        while digits < 3 && pos < bytes.len() && (b'0'..=b'7').contains(&bytes[pos]) {
                            value = value * 8 + u16::from(bytes[pos] - b'0');
                            pos += 1;
                            digits += 1;
                        }
                        if digits > 0 {
                            b = value as u8;
                        }
                    }
                }
            }
            if out.push(b).is_err() {
                break;
            }
        }
        out
    }

    /// Decode raw field bytes. `unicode` is the per-notification flag telling
    /// that the field is UCS2 hex regardless of the channel character set.
    pub fn decode(&self, raw: &[u8], unicode: bool) -> Text {
        if unicode || self.charset == Charset::Ucs2 {
            match decode_ucs2_hex(raw) {
                Ok(text) => return text,
                Err(_e) => warn!("Malformed UCS2 field, falling back to latin-1"),
            }
            return latin1(raw);
        }

        match self.charset {
            Charset::Gsm => gsm(raw),
            _ => latin1(raw),
        }
    }

    /// [`Codec::unescape`] followed by [`Codec::decode`].
    pub fn decode_quoted(&self, quoted: &str, unicode: bool) -> Text {
        self.decode(&self.unescape(quoted), unicode)
    }

    /// Unescape a quoted field that has no character set of its own, such as
    /// dial strings, URLs and AT command text.
    pub fn plain(&self, quoted: &str) -> Text {
        latin1(&self.unescape(quoted))
    }

    /// Escape `text` for use inside a quoted AT string. The surrounding quotes
    /// are not added.
    pub fn quote<const N: usize>(&self, text: &str) -> String<N> {
        let mut out = String::<N>::new();
        let mut escaped = String::<4>::new();
        for c in text.chars() {
            escaped.clear();
            match c {
                '"' | '\\' | '\r' | '\n' => match self.escapes {
                    EscapeMode::Hex => write!(escaped, "\\{:02X}", c as u32).ok(),
                    EscapeMode::Octal => write!(escaped, "\\{:03o}", c as u32).ok(),
                },
                c => escaped.push(c).ok(),
            };
            if out.push_str(&escaped).is_err() {
                break;
            }
        }
        out
    }
}

/// Copy as much of `s` as fits into a `String<N>`, never splitting a character.
pub(crate) fn truncated<const N: usize>(s: &str) -> String<N> {
    let mut out = String::new();
    for c in s.chars() {
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn latin1(raw: &[u8]) -> Text {
    let mut out = Text::new();
    for &b in raw {
        if out.push(char::from(b)).is_err() {
            break;
        }
    }
    out
}

fn gsm(raw: &[u8]) -> Text {
    let mut out = Text::new();
    let mut bytes = raw.iter();
    while let Some(&b) = bytes.next() {
        let c = match b {
            0x1B => match bytes.next() {
                Some(&ext) => gsm_extension(ext),
                None => ' ',
            },
            0x00..=0x7F => GSM_DEFAULT_ALPHABET[usize::from(b)],
            _ => char::from(b),
        };
        if out.push(c).is_err() {
            break;
        }
    }
    out
}

fn gsm_extension(b: u8) -> char {
    match b {
        0x0A => '\u{0C}',
        0x14 => '^',
        0x28 => '{',
        0x29 => '}',
        0x2F => '\\',
        0x3C => '[',
        0x3D => '~',
        0x3E => ']',
        0x40 => '|',
        0x65 => '\u{20AC}',
        other => GSM_DEFAULT_ALPHABET[usize::from(other & 0x7F)],
    }
}

#[rustfmt::skip]
const GSM_DEFAULT_ALPHABET: [char; 128] = [
    '@', '\u{A3}', '$', '\u{A5}', '\u{E8}', '\u{E9}', '\u{F9}', '\u{EC}',
    '\u{F2}', '\u{C7}', '\n', '\u{D8}', '\u{F8}', '\r', '\u{C5}', '\u{E5}',
    '\u{394}', '_', '\u{3A6}', '\u{393}', '\u{39B}', '\u{3A9}', '\u{3A0}', '\u{3A8}',
    '\u{3A3}', '\u{398}', '\u{39E}', '\u{A0}', '\u{C6}', '\u{E6}', '\u{DF}', '\u{C9}',
    ' ', '!', '"', '#', '\u{A4}', '%', '&', '\'',
    '(', ')', '*', '+', ',', '-', '.', '/',
    '0', '1', '2', '3', '4', '5', '6', '7',
    '8', '9', ':', ';', '<', '=', '>', '?',
    '\u{A1}', 'A', 'B', 'C', 'D', 'E', 'F', 'G',
    'H', 'I', 'J', 'K', 'L', 'M', 'N', 'O',
    'P', 'Q', 'R', 'S', 'T', 'U', 'V', 'W',
    'X', 'Y', 'Z', '\u{C4}', '\u{D6}', '\u{D1}', '\u{DC}', '\u{A7}',
    '\u{BF}', 'a', 'b', 'c', 'd', 'e', 'f', 'g',
    'h', 'i', 'j', 'k', 'l', 'm', 'n', 'o',
    'p', 'q', 'r', 's', 't', 'u', 'v', 'w',
    'x', 'y', 'z', '\u{E4}', '\u{F6}', '\u{F1}', '\u{FC}', '\u{E0}',
];

#[cfg(test)]
mod tests {
    use super::*;

    const OCTAL_GSM: Codec = Codec::new(EscapeMode::Octal, Charset::Gsm);
    const HEX_LATIN1: Codec = Codec::new(EscapeMode::Hex, Charset::Latin1);

    #[test]
    fn unescapes_octal() {
        assert_eq!(&OCTAL_GSM.unescape("a\\042b")[..], b"a\"b");
        assert_eq!(&OCTAL_GSM.unescape("\\0")[..], b"\0");
        assert_eq!(&OCTAL_GSM.unescape("x\\y")[..], b"x\\y");
    }

    #[test]
    fn unescapes_hex() {
        assert_eq!(&HEX_LATIN1.unescape("a\\22b")[..], b"a\"b");
        assert_eq!(&HEX_LATIN1.unescape("\\E9")[..], &[0xE9]);
        assert_eq!(&HEX_LATIN1.unescape("\\zz")[..], b"\\zz");
    }

    #[test]
    fn decodes_gsm_default_alphabet() {
        assert_eq!(OCTAL_GSM.decode(b"Hello", false), "Hello");
        assert_eq!(OCTAL_GSM.decode(&[0x00, 0x01, 0x11], false), "@\u{A3}_");
        assert_eq!(OCTAL_GSM.decode(&[0x1B, 0x65, 0x31], false), "\u{20AC}1");
    }

    #[test]
    fn unicode_flag_overrides_charset() {
        assert_eq!(OCTAL_GSM.decode(b"00480069", true), "Hi");
        assert_eq!(OCTAL_GSM.decode_quoted("00480069", true), "Hi");
    }

    #[test]
    fn malformed_unicode_falls_back_to_latin1() {
        assert_eq!(OCTAL_GSM.decode(b"Hi!", true), "Hi!");
    }

    #[test]
    fn quotes_special_characters() {
        let q: String<32> = OCTAL_GSM.quote("a\"b\\c");
        assert_eq!(q, "a\\042b\\134c");

        let q: String<32> = HEX_LATIN1.quote("a\"b\r\n");
        assert_eq!(q, "a\\22b\\0D\\0A");
    }

    #[test]
    fn truncates_on_character_boundary() {
        let s: String<3> = truncated("a\u{E9}b");
        assert_eq!(s, "a\u{E9}");
    }
}
