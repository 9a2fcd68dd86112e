//! Table-driven tree builder
//!
//! Each token is looked up in the state table together with the current
//! frame's state; the resulting action mutates the document under
//! construction. One frame exists per open element level, kept on an
//! explicit stack so nesting depth never grows the call stack.
//!
//! Syntax failures are recorded and scanning continues, so one malformed
//! region produces one reported failure. Any failure discards the whole
//! document once the input is exhausted. Arena failures abort at once.

use super::lexer::{is_name_start, LexMode, Lexer, Token};
use super::machine::{transition, Action, State};
use crate::config::ParseOptions;
use crate::dom::node::{AttrId, NodeId};
use crate::dom::Document;
use crate::error::{Error, ErrorKind, Result};

/// One element level under construction
#[derive(Debug)]
struct Frame {
    /// Element whose children this level builds (None at the outermost level)
    parent: Option<NodeId>,
    state: State,
    /// Most recently opened element at this level
    element: Option<NodeId>,
    /// Most recently created attribute of `element`
    attr: Option<AttrId>,
    /// Text seen before the first child, destined for `parent`
    pcdata: String,
    seen_child: bool,
}

impl Frame {
    fn new(parent: Option<NodeId>) -> Self {
        Frame {
            parent,
            state: State::Text,
            element: None,
            attr: None,
            pcdata: String::new(),
            seen_child: false,
        }
    }
}

/// Parse a complete byte buffer into a document
pub fn parse_bytes(input: &[u8], options: &ParseOptions) -> Result<Document> {
    options.validate()?;
    Parser::new(input, options).run()
}

struct Parser<'a> {
    lexer: Lexer<'a>,
    doc: Document,
    options: &'a ParseOptions,
    frames: Vec<Frame>,
}

impl<'a> Parser<'a> {
    fn new(input: &'a [u8], options: &'a ParseOptions) -> Self {
        let mut frames = Vec::with_capacity(32);
        frames.push(Frame::new(None));
        Parser {
            lexer: Lexer::new(input, options.strip_namespace_prefixes),
            doc: Document::new(options.arena_block_size),
            options,
            frames,
        }
    }

    fn run(mut self) -> Result<Document> {
        loop {
            let state = self.top().state;
            let Some(token) = self.lexer.next_token(LexMode::from(state)) else {
                break;
            };
            let (next, action) = transition(state, token.kind);
            if self.options.trace {
                tracing::trace!(
                    line = self.lexer.line(),
                    state = state.as_str(),
                    token = token.kind.as_str(),
                    next = next.as_str(),
                    action = action.as_str(),
                    "transition"
                );
            }
            self.top_mut().state = next;
            self.apply(action, state, token)?;
        }

        self.finish_input();

        if let Some(doctype) = self.lexer.take_doctype() {
            self.doc.set_doctype(&doctype)?;
        }
        match self.lexer.take_failure() {
            Some(err) => Err(Error::Parse(err)),
            None => Ok(self.doc),
        }
    }

    #[inline]
    fn top(&self) -> &Frame {
        // The outermost frame is never popped
        &self.frames[self.frames.len() - 1]
    }

    #[inline]
    fn top_mut(&mut self) -> &mut Frame {
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    fn apply(&mut self, action: Action, state: State, token: Token) -> Result<()> {
        match action {
            Action::Nop => {}
            Action::Error => {
                self.lexer.fail(
                    ErrorKind::Syntax,
                    format!(
                        "syntax error: unexpected {} token in {} state",
                        token.kind.as_str(),
                        state.as_str()
                    ),
                );
            }
            Action::CreateElement => self.create_element(&token.text)?,
            Action::CreateAttribute => self.create_attribute(&token.text)?,
            Action::SetValue => {
                if let Some(attr) = self.top().attr {
                    self.doc.set_attribute_value(attr, &token.text)?;
                }
            }
            Action::Pcdata => self.push_text(&token.text),
            Action::Descend => {
                let parent = self.top().element;
                self.frames.push(Frame::new(parent));
            }
            Action::Ascend => self.ascend()?,
            Action::Verify => self.verify(&token.text),
        }
        Ok(())
    }

    fn check_name(&mut self, name: &str) {
        if !name.chars().next().is_some_and(is_name_start) {
            self.lexer.fail(ErrorKind::IllegalName, format!("'{}' is not a legal name", name));
        }
    }

    fn create_element(&mut self, name: &str) -> Result<()> {
        self.check_name(name);
        let line = self.lexer.line();
        let parent = self.top().parent;
        let id = self.doc.add_element(parent, name, line)?;
        if self.options.trace {
            tracing::debug!(line, id, element = name, "created");
        }
        let frame = self.top_mut();
        frame.element = Some(id);
        frame.attr = None;
        frame.seen_child = true;
        Ok(())
    }

    fn create_attribute(&mut self, name: &str) -> Result<()> {
        self.check_name(name);
        let Some(owner) = self.top().element else {
            return Ok(());
        };
        let id = self.doc.add_attribute(owner, name)?;
        if self.options.trace {
            tracing::debug!(line = self.lexer.line(), owner, attribute = name, "created");
        }
        self.top_mut().attr = Some(id);
        Ok(())
    }

    fn push_text(&mut self, text: &str) {
        let crush = self.options.crush_whitespace;
        let frame = self.top_mut();
        if frame.parent.is_none() || frame.seen_child || text.is_empty() {
            return;
        }
        if crush && text.chars().all(char::is_whitespace) {
            if !frame.pcdata.is_empty() {
                frame.pcdata.push(' ');
            }
            return;
        }
        frame.pcdata.push_str(text);
    }

    /// Close the current level, handing its text to the parent element
    fn ascend(&mut self) -> Result<()> {
        if self.frames.len() == 1 {
            self.lexer.fail(ErrorKind::StrayEndTag, "end tag with no open element");
            return Ok(());
        }
        let Some(frame) = self.frames.pop() else {
            return Ok(());
        };
        if let Some(parent) = frame.parent {
            if !frame.pcdata.is_empty() {
                self.doc.set_pcdata(parent, &frame.pcdata)?;
            }
        }
        Ok(())
    }

    fn verify(&mut self, name: &str) {
        let Some(open) = self.top().element else {
            self.lexer.fail(ErrorKind::Syntax, format!("</{}> without start tag", name));
            return;
        };
        if self.doc.name_is(open, name) {
            return;
        }
        let (expected, line) = match self.doc.element(open) {
            Some(e) => (e.name().to_string(), e.line()),
            None => (String::new(), 0),
        };
        self.lexer.fail(
            ErrorKind::NestingMismatch,
            format!(
                "</{}> found, expecting match for <{}> (re: line {}) - nesting error",
                name, expected, line
            ),
        );
    }

    /// End of input must find every element closed
    fn finish_input(&mut self) {
        if self.frames.len() == 1 && self.top().state == State::Text {
            return;
        }
        let open = self
            .frames
            .iter()
            .rev()
            .find_map(|f| f.parent)
            .or(self.top().element)
            .and_then(|id| self.doc.element(id))
            .map(|e| (e.name().to_string(), e.line()));
        let message = match open {
            Some((name, line)) => format!("unexpected EOF inside <{}> (re: line {})", name, line),
            None => "unexpected EOF".to_string(),
        };
        self.lexer.fail(ErrorKind::UnexpectedEof, message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(input: &str) -> Result<Document> {
        parse_bytes(input.as_bytes(), &ParseOptions::default())
    }

    #[test]
    fn test_simple_tree() {
        let doc = parse("<root><a x='1'>hi</a><b/></root>").unwrap();
        let root = doc.root().unwrap();
        assert_eq!(root.name(), "root");
        let kids: Vec<_> = root.children().map(|e| e.name()).collect();
        assert_eq!(kids, vec!["a", "b"]);
        let a = root.first_child().unwrap();
        assert_eq!(a.text(), Some("hi"));
        assert_eq!(a.attribute("x"), Some("1"));
    }

    #[test]
    fn test_pcdata_before_first_child_only() {
        let doc = parse("<p>lead<b>bold</b>tail</p>").unwrap();
        let p = doc.root().unwrap();
        assert_eq!(p.text(), Some("lead"));
        assert_eq!(p.first_child().unwrap().text(), Some("bold"));
    }

    #[test]
    fn test_empty_document() {
        let doc = parse("").unwrap();
        assert!(doc.root().is_none());
        let doc = parse("<?xml version='1.0'?>\n<!-- nothing -->\n").unwrap();
        assert!(doc.root().is_none());
    }

    #[test]
    fn test_multiple_roots() {
        let doc = parse("<a/><b/>").unwrap();
        let names: Vec<_> = doc.roots().map(|e| e.name()).collect();
        assert_eq!(names, vec!["a", "b"]);
    }

    #[test]
    fn test_line_numbers() {
        let doc = parse("<a>\n  <b/>\n\n  <c/>\n</a>").unwrap();
        let lines: Vec<_> = doc.root().unwrap().children().map(|e| e.line()).collect();
        assert_eq!(lines, vec![2, 4]);
    }

    #[test]
    fn test_nesting_mismatch() {
        let err = parse("<a><b></a>").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::NestingMismatch));
        assert!(err.to_string().contains("</a> found, expecting match for <b>"));
    }

    #[test]
    fn test_unexpected_eof() {
        let err = parse("<a><b>text").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedEof));
        let err = parse("<a x='1").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_stray_end_tag() {
        let err = parse("<a/></a>").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::StrayEndTag));
    }

    #[test]
    fn test_illegal_name() {
        let err = parse("<1a/>").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::IllegalName));
        let err = parse("<a -x='1'/>").unwrap_err();
        assert_eq!(err.kind(), Some(ErrorKind::IllegalName));
    }

    #[test]
    fn test_syntax_error_reported_once_region() {
        let err = parse("<a =></a>").unwrap_err();
        match err {
            Error::Parse(e) => assert_eq!(e.kind, ErrorKind::Syntax),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn test_crush_whitespace() {
        let opts = ParseOptions::new().crush_whitespace(true);
        let doc = parse_bytes(b"<p>  \n\t </p>", &opts).unwrap();
        assert_eq!(doc.root().unwrap().text(), None);

        let doc = parse_bytes(b"<p>a<!-- c -->  \n <!-- d -->b</p>", &opts).unwrap();
        assert_eq!(doc.root().unwrap().text(), Some("a b"));
    }

    #[test]
    fn test_whitespace_kept_without_crush() {
        let doc = parse("<p>  </p>").unwrap();
        assert_eq!(doc.root().unwrap().text(), Some("  "));
    }

    #[test]
    fn test_doctype_stored() {
        let doc = parse("<!DOCTYPE note>\n<note/>").unwrap();
        assert_eq!(doc.doctype(), Some("note"));
    }

    #[test]
    fn test_oversized_token_is_fatal() {
        let opts = ParseOptions::new().arena_block_size(16);
        let err = parse_bytes(b"<a>this text is far too long for one block</a>", &opts).unwrap_err();
        assert!(err.is_fatal());
        assert!(matches!(err, Error::Arena(_)));
    }

    #[test]
    fn test_zero_block_size_rejected() {
        let opts = ParseOptions::new().arena_block_size(0);
        assert!(matches!(parse_bytes(b"<a/>", &opts), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_huge_block_size_rejected_before_allocating() {
        let opts = ParseOptions::new().arena_block_size(usize::MAX);
        assert!(matches!(parse_bytes(b"<a/>", &opts), Err(Error::InvalidOptions(_))));
    }

    #[test]
    fn test_deep_nesting_does_not_recurse() {
        let depth = 50_000;
        let mut input = "<d>".repeat(depth);
        input.push_str(&"</d>".repeat(depth));
        let doc = parse(&input).unwrap();
        assert_eq!(doc.element_count(), depth);
        assert_eq!(doc.name_hits("d"), Some(depth as u32));
    }
}
