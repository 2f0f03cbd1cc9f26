use core::fmt;
use heapless::String;

/// Decode a string of UCS2 code units, four hex digits each, as used by the
/// SIM toolkit notifications when their unicode flag is set.
///
/// Surrogate pairs are combined; lone surrogates become U+FFFD. Characters
/// that do not fit in `N` bytes are dropped.
pub fn decode_ucs2_hex<const N: usize>(s: &[u8]) -> Result<String<N>, DecodeHexError> {
    if s.len() % 4 != 0 {
        return Err(DecodeHexError::OddLength);
    }

    let mut units = s.chunks_exact(4).map(|chunk| {
        chunk
            .iter()
            .try_fold(0u16, |acc, &b| -> Result<u16, DecodeHexError> {
                Ok((acc << 4) | u16::from(nibble(b)?))
            })
    });

    let mut out = String::new();
    let mut error: Option<DecodeHexError> = None;
    let decoded = char::decode_utf16(core::iter::from_fn(|| match units.next()? {
        Ok(unit) => Some(unit),
        Err(e) => {
            error = Some(e);
            None
        }
    }));
    for c in decoded {
        if out.push(c.unwrap_or(char::REPLACEMENT_CHARACTER)).is_err() {
            break;
        }
    }

    match error {
        Some(e) => Err(e),
        None => Ok(out),
    }
}

/// Encode `s` as UCS2, four uppercase hex digits per UTF-16 code unit.
pub fn encode_ucs2_hex<const N: usize>(s: &str) -> String<N> {
    const DIGITS: &[u8; 16] = b"0123456789ABCDEF";

    let mut out = String::new();
    for unit in s.encode_utf16() {
        if out.capacity() - out.len() < 4 {
            break;
        }
        for shift in [12, 8, 4, 0] {
            out.push(DIGITS[usize::from((unit >> shift) & 0xF)] as char).ok();
        }
    }
    out
}

fn nibble(b: u8) -> Result<u8, DecodeHexError> {
    match b {
        b'0'..=b'9' => Ok(b - b'0'),
        b'a'..=b'f' => Ok(b - b'a' + 10),
        b'A'..=b'F' => Ok(b - b'A' + 10),
        _ => Err(DecodeHexError::InvalidDigit(b)),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DecodeHexError {
    OddLength,
    InvalidDigit(u8),
}

impl fmt::Display for DecodeHexError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            DecodeHexError::OddLength => "input is not a whole number of UCS2 code units".fmt(f),
            DecodeHexError::InvalidDigit(b) => write!(f, "invalid hex digit {:#04x}", b),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn decodes_ucs2() {
        let s: String<32> = decode_ucs2_hex(b"004D0065006E0075").unwrap();
        assert_eq!(s, "Menu");

        let s: String<32> = decode_ucs2_hex(b"00e9").unwrap();
        assert_eq!(s, "\u{e9}");
    }

    #[test]
    fn decodes_surrogate_pairs() {
        let s: String<32> = decode_ucs2_hex(b"D83DDE00").unwrap();
        assert_eq!(s, "\u{1F600}");
    }

    #[test]
    fn rejects_malformed_input() {
        assert_eq!(
            decode_ucs2_hex::<32>(b"004"),
            Err(DecodeHexError::OddLength)
        );
        assert_eq!(
            decode_ucs2_hex::<32>(b"00G1"),
            Err(DecodeHexError::InvalidDigit(b'G'))
        );
    }

    #[test]
    fn encodes_ucs2() {
        let s: String<32> = encode_ucs2_hex("Yes");
        assert_eq!(s, "005900650073");

        let s: String<32> = encode_ucs2_hex("\u{20AC}");
        assert_eq!(s, "20AC");
    }

    #[test]
    fn encoding_stops_at_capacity() {
        let s: String<10> = encode_ucs2_hex("abc");
        assert_eq!(s, "00610062");
    }
}
