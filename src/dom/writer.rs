//! Document serialization
//!
//! Output layout: declaration line, optional DOCTYPE line, then one element
//! per line indented 4 columns per depth. Text is written on its own line
//! one level deeper than its element. Attribute values use single quotes.

use super::document::{Document, Element};
use crate::core::entities::escape_into;
use std::io::{self, Write};

const INDENT: usize = 4;

/// Flush threshold for the output buffer
const CHUNK: usize = 8192;

enum Step<'d> {
    Open(Element<'d>, usize),
    Close(Element<'d>, usize),
}

fn pad(buf: &mut String, depth: usize) {
    buf.extend(std::iter::repeat(' ').take(depth * INDENT));
}

fn open_tag(buf: &mut String, element: Element<'_>, depth: usize) {
    pad(buf, depth);
    buf.push('<');
    buf.push_str(element.name());
    for attr in element.attributes() {
        buf.push(' ');
        buf.push_str(attr.name());
        buf.push_str("='");
        escape_into(attr.value(), buf);
        buf.push('\'');
    }
}

fn text_line(buf: &mut String, text: &str, depth: usize) {
    pad(buf, depth);
    escape_into(text, buf);
    buf.push('\n');
}

fn close_tag(buf: &mut String, element: Element<'_>, depth: usize) {
    pad(buf, depth);
    buf.push_str("</");
    buf.push_str(element.name());
    buf.push_str(">\n");
}

/// Serialize `doc` to `out`
pub fn write_to<W: Write>(doc: &Document, out: &mut W) -> io::Result<()> {
    let mut buf = String::with_capacity(CHUNK * 2);
    match doc.doctype() {
        Some(doctype) => {
            buf.push_str("<?xml version='1.0' encoding='utf-8'?>\n");
            buf.push_str("<!DOCTYPE ");
            buf.push_str(doctype);
            buf.push_str(">\n");
        }
        None => buf.push_str("<?xml version='1.0' encoding='utf-8' standalone='yes'?>\n"),
    }

    let mut stack: Vec<Step<'_>> = doc.roots().map(|e| Step::Open(e, 0)).collect();
    stack.reverse();

    while let Some(step) = stack.pop() {
        match step {
            Step::Close(element, depth) => close_tag(&mut buf, element, depth),
            Step::Open(element, depth) => {
                open_tag(&mut buf, element, depth);
                match (element.has_children(), element.text()) {
                    (true, text) => {
                        buf.push_str(">\n");
                        if let Some(text) = text {
                            text_line(&mut buf, text, depth + 1);
                        }
                        stack.push(Step::Close(element, depth));
                        let first = stack.len();
                        stack.extend(element.children().map(|c| Step::Open(c, depth + 1)));
                        stack[first..].reverse();
                    }
                    (false, Some(text)) => {
                        buf.push_str(">\n");
                        text_line(&mut buf, text, depth + 1);
                        close_tag(&mut buf, element, depth);
                    }
                    (false, None) => buf.push_str("/>\n"),
                }
            }
        }
        if buf.len() >= CHUNK {
            out.write_all(buf.as_bytes())?;
            buf.clear();
        }
    }

    out.write_all(buf.as_bytes())?;
    out.flush()
}

impl Document {
    /// Serialize to any writer
    pub fn write_to<W: Write>(&self, out: &mut W) -> io::Result<()> {
        write_to(self, out)
    }

    /// Serialize to a string
    pub fn to_xml_string(&self) -> String {
        let mut out = Vec::new();
        // Writing into a Vec cannot fail
        let _ = write_to(self, &mut out);
        String::from_utf8_lossy(&out).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::core::parser::parse_bytes;

    fn render(input: &str) -> String {
        parse_bytes(input.as_bytes(), &ParseOptions::new().crush_whitespace(true))
            .unwrap()
            .to_xml_string()
    }

    #[test]
    fn test_standalone_declaration() {
        assert_eq!(
            render("<br/>"),
            "<?xml version='1.0' encoding='utf-8' standalone='yes'?>\n<br/>\n"
        );
    }

    #[test]
    fn test_doctype_declaration() {
        assert_eq!(
            render("<!DOCTYPE html><html/>"),
            "<?xml version='1.0' encoding='utf-8'?>\n<!DOCTYPE html>\n<html/>\n"
        );
    }

    #[test]
    fn test_layout() {
        let out = render("<a x=\"1\"><b>hi</b><c/></a>");
        let expected = "<?xml version='1.0' encoding='utf-8' standalone='yes'?>\n\
<a x='1'>\n    <b>\n        hi\n    </b>\n    <c/>\n</a>\n";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_text_before_children() {
        let out = render("<p>lead<b/></p>");
        assert!(out.ends_with("<p>\n    lead\n    <b/>\n</p>\n"));
    }

    #[test]
    fn test_escaping() {
        let out = render("<a v=\"&apos;&lt;&amp;\">&quot;&gt;</a>");
        assert!(out.contains("<a v='&apos;&lt;&amp;'>"));
        assert!(out.contains("&quot;&gt;"));
    }

    #[test]
    fn test_control_characters() {
        let out = render("<a v=\"x&#9;y\"/>");
        assert!(out.contains("v='x&#x0009;y'"));
    }

    #[test]
    fn test_large_document_chunks() {
        let mut input = String::from("<r>");
        for i in 0..2000 {
            input.push_str(&format!("<item n='{i}'/>"));
        }
        input.push_str("</r>");
        let out = render(&input);
        assert_eq!(out.matches("<item ").count(), 2000);
        assert!(out.ends_with("</r>\n"));
    }
}
