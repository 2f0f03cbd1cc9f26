//! Lenient positional field reader for vendor notifications.
//!
//! Missing numbers read as 0 and missing strings as empty, so a truncated
//! notification degrades to default values instead of failing.

use heapless::String;

use crate::codec::truncated;

pub const MAX_QUOTED_LEN: usize = 512;

/// Body of a quoted field with its escapes still in place.
pub type Quoted = String<MAX_QUOTED_LEN>;

#[derive(Debug, Clone)]
pub struct Tokens<'a> {
    line: &'a str,
    pos: usize,
}

impl<'a> Tokens<'a> {
    pub fn new(line: &'a str) -> Self {
        Self { line, pos: 0 }
    }

    /// Start reading right after `prefix`.
    pub fn after(line: &'a str, prefix: &str) -> Self {
        Self {
            line,
            pos: prefix.len().min(line.len()),
        }
    }

    pub fn has_more(&self) -> bool {
        self.pos < self.line.len()
    }

    /// Unread remainder of the line.
    pub fn rest(&self) -> &'a str {
        self.line.get(self.pos..).unwrap_or("")
    }

    /// Next decimal number, skipping separating spaces and commas.
    pub fn number(&mut self) -> u32 {
        let bytes = self.line.as_bytes();
        while self.pos < bytes.len() && matches!(bytes[self.pos], b' ' | b',') {
            self.pos += 1;
        }
        let mut value: u32 = 0;
        while self.pos < bytes.len() && bytes[self.pos].is_ascii_digit() {
            value = value
                .wrapping_mul(10)
                .wrapping_add(u32::from(bytes[self.pos] - b'0'));
            self.pos += 1;
        }
        value
    }

    /// Next number truncated to a byte.
    pub fn byte(&mut self) -> u8 {
        self.number() as u8
    }

    pub fn flag(&mut self) -> bool {
        self.number() != 0
    }

    /// Body of the next quoted string. Escapes are left for the codec.
    pub fn string(&mut self) -> Quoted {
        let bytes = self.line.as_bytes();
        while self.pos < bytes.len() && bytes[self.pos] != b'"' {
            self.pos += 1;
        }
        if self.pos >= bytes.len() {
            return Quoted::new();
        }
        self.pos += 1;
        let start = self.pos;
        while self.pos < bytes.len() && bytes[self.pos] != b'"' {
            self.pos += 1;
        }
        let body = &self.line[start..self.pos];
        if self.pos < bytes.len() {
            self.pos += 1;
        }
        truncated(body)
    }
}
