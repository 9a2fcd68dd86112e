//! Rune-level input cursor
//!
//! Decodes UTF-8 one character at a time while tracking the line number.
//! Pushback is done by saving and restoring a `Mark`, so any amount of
//! lookahead can be undone. Runs of plain text and searches for closing
//! delimiters go through memchr.

use memchr::{memchr, memchr2, memmem};
use std::borrow::Cow;

const BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// Saved cursor position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mark {
    pos: usize,
    line: u32,
}

/// Character cursor over a complete input buffer
pub struct Scanner<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
}

impl<'a> Scanner<'a> {
    /// Create a scanner, skipping a leading byte order mark
    pub fn new(input: &'a [u8]) -> Self {
        let pos = if input.starts_with(BOM) { BOM.len() } else { 0 };
        Scanner { input, pos, line: 1 }
    }

    /// Create a scanner over a fragment, keeping every byte
    pub fn raw(input: &'a [u8]) -> Self {
        Scanner { input, pos: 0, line: 1 }
    }

    /// Current line (1-based)
    #[inline]
    pub fn line(&self) -> u32 {
        self.line
    }

    #[inline]
    pub fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    #[inline]
    pub fn mark(&self) -> Mark {
        Mark { pos: self.pos, line: self.line }
    }

    #[inline]
    pub fn reset(&mut self, mark: Mark) {
        self.pos = mark.pos;
        self.line = mark.line;
    }

    /// Peek at the current byte without advancing
    #[inline]
    pub fn peek_byte(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    /// Check if the remaining input starts with `s`
    #[inline]
    pub fn starts_with(&self, s: &[u8]) -> bool {
        self.input[self.pos..].starts_with(s)
    }

    /// Advance past `n` bytes known to contain no newline
    #[inline]
    pub fn skip(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.input.len());
    }

    /// Decode the next character.
    ///
    /// An undecodable sequence is replaced by U+FFFD and consumes one byte.
    pub fn next_char(&mut self) -> Option<char> {
        let b = self.peek_byte()?;
        if b < 0x80 {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
            }
            return Some(b as char);
        }

        let width = match b {
            0xC0..=0xDF => 2,
            0xE0..=0xEF => 3,
            0xF0..=0xF7 => 4,
            _ => 1,
        };
        let end = (self.pos + width).min(self.input.len());
        let decoded = std::str::from_utf8(&self.input[self.pos..end])
            .ok()
            .and_then(|s| s.chars().next());

        match decoded {
            Some(c) => {
                self.pos = end;
                Some(c)
            }
            None => {
                tracing::warn!(line = self.line, "bad UTF-8 sequence");
                self.pos += 1;
                Some(char::REPLACEMENT_CHARACTER)
            }
        }
    }

    /// Peek at the next character without advancing
    pub fn peek_char(&mut self) -> Option<char> {
        let mark = self.mark();
        let c = self.next_char();
        self.reset(mark);
        c
    }

    fn consume(&mut self, end: usize) -> &'a [u8] {
        let run = &self.input[self.pos..end];
        self.line += memchr::memchr_iter(b'\n', run).count() as u32;
        self.pos = end;
        run
    }

    fn decode(&self, run: &'a [u8]) -> Cow<'a, str> {
        match std::str::from_utf8(run) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => {
                tracing::warn!(line = self.line, "bad UTF-8 sequence");
                String::from_utf8_lossy(run)
            }
        }
    }

    /// Consume text up to (not including) either delimiter byte or end of input
    pub fn take_until2(&mut self, a: u8, b: u8) -> Cow<'a, str> {
        let end = memchr2(a, b, &self.input[self.pos..])
            .map_or(self.input.len(), |i| self.pos + i);
        let run = self.consume(end);
        self.decode(run)
    }

    /// Consume text up to a delimiter byte and the delimiter itself.
    ///
    /// Returns None, leaving the cursor at end of input, if the delimiter
    /// never appears.
    pub fn take_past(&mut self, delim: u8) -> Option<Cow<'a, str>> {
        let Some(i) = memchr(delim, &self.input[self.pos..]) else {
            self.consume(self.input.len());
            return None;
        };
        let run = self.consume(self.pos + i);
        self.skip(1);
        Some(self.decode(run))
    }

    /// Consume text up to a delimiter sequence and the sequence itself
    pub fn take_past_seq(&mut self, delim: &[u8]) -> Option<Cow<'a, str>> {
        let Some(i) = memmem::find(&self.input[self.pos..], delim) else {
            self.consume(self.input.len());
            return None;
        };
        let run = self.consume(self.pos + i);
        self.consume(self.pos + delim.len());
        Some(self.decode(run))
    }
}
