//! XML Entity Decoding and Escaping
//!
//! Decoding handles:
//! - Named references from a fixed set: &amp; &lt; &gt; &apos; &quot; &nbsp;
//! - Numeric character references: &#123; &#x7B;
//!
//! The lexer decodes references inline while it accumulates text, so this
//! module works on a single reference body (the part between `&` and `;`).
//! Escaping is the inverse used by the writer.

use std::borrow::Cow;

/// Longest reference body scanned before an `&` is treated as literal
pub const MAX_ENTITY_NAME: usize = 32;

/// Substitute for references that cannot be decoded
pub const PLACEHOLDER: char = '?';

const NAMED: [(&str, char); 6] = [
    ("amp", '&'),
    ("lt", '<'),
    ("gt", '>'),
    ("apos", '\''),
    ("quot", '"'),
    ("nbsp", '\u{00A0}'),
];

/// Look up a named entity
pub fn decode_named(name: &str) -> Option<char> {
    NAMED.iter().find(|(n, _)| *n == name).map(|&(_, c)| c)
}

/// Decode a numeric reference body without the leading `#`
pub fn decode_numeric(digits: &str) -> Option<char> {
    let codepoint = match digits.strip_prefix(|c: char| c == 'x' || c == 'X') {
        Some(hex) => u32::from_str_radix(hex, 16).ok()?,
        None => digits.parse::<u32>().ok()?,
    };
    char::from_u32(codepoint)
}

/// Decode a reference body (`amp`, `#65`, `#x42`)
pub fn decode_reference(body: &str) -> Option<char> {
    match body.strip_prefix('#') {
        Some(digits) => decode_numeric(digits),
        None => decode_named(body),
    }
}

/// Can `c` appear in a reference body
#[inline]
pub fn is_reference_char(c: char) -> bool {
    c.is_alphanumeric() || c == '#'
}

#[inline]
fn needs_escape(b: u8) -> bool {
    matches!(b, b'<' | b'>' | b'&' | b'"' | b'\'') || b < 0x20
}

/// Escape text for output
///
/// Returns Borrowed when nothing needs escaping. Control characters below
/// the space code point become numeric references.
pub fn escape(input: &str) -> Cow<'_, str> {
    if !input.bytes().any(needs_escape) {
        return Cow::Borrowed(input);
    }
    let mut result = String::with_capacity(input.len() + 16);
    escape_into(input, &mut result);
    Cow::Owned(result)
}

/// Escape text, appending to `buf`
pub fn escape_into(input: &str, buf: &mut String) {
    for c in input.chars() {
        match c {
            '&' => buf.push_str("&amp;"),
            '<' => buf.push_str("&lt;"),
            '>' => buf.push_str("&gt;"),
            '"' => buf.push_str("&quot;"),
            '\'' => buf.push_str("&apos;"),
            c if (c as u32) < 0x20 => {
                buf.push_str(&format!("&#x{:04x};", c as u32));
            }
            _ => buf.push(c),
        }
    }
}
