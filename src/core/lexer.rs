//! Context-sensitive lexer
//!
//! The same bytes tokenize differently depending on whether the parser is
//! in text (outside any tag) or inside a tag, so every call to
//! `next_token` carries the caller's mode. Entity references are decoded
//! inline wherever text is accumulated.
//!
//! Failures are recorded here too, since the lexer owns the line counter.
//! The first failure is kept for the caller; later ones are counted and
//! logged.

use super::entities::{self, MAX_ENTITY_NAME, PLACEHOLDER};
use super::machine::{State, TokenKind};
use super::scanner::Scanner;
use crate::error::{ErrorKind, ParseError};

/// Which grammar the lexer applies
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LexMode {
    /// Outside any tag: character data and markup openers
    Text,
    /// Between `<name` and the matching `>`
    Tag,
}

impl From<State> for LexMode {
    fn from(state: State) -> Self {
        match state {
            State::Text => LexMode::Text,
            _ => LexMode::Tag,
        }
    }
}

/// A token and its decoded text payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
}

impl Token {
    fn new(kind: TokenKind, text: impl Into<String>) -> Self {
        Token { kind, text: text.into() }
    }

    fn marker(kind: TokenKind) -> Self {
        Token { kind, text: String::new() }
    }
}

enum Step {
    Token(Token),
    Skip,
    Eof,
}

/// Can `c` continue an element or attribute name
#[inline]
pub fn is_name_char(c: char) -> bool {
    c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ':')
}

/// Can `c` start an element or attribute name
#[inline]
pub fn is_name_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

/// Drop everything up to and including the last `:`
pub fn strip_namespace(name: &str) -> &str {
    match name.rfind(':') {
        Some(i) => &name[i + 1..],
        None => name,
    }
}

pub struct Lexer<'a> {
    scanner: Scanner<'a>,
    strip_namespace: bool,
    doctype: Option<String>,
    failure: Option<ParseError>,
    failures: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a [u8], strip_namespace: bool) -> Self {
        Lexer {
            scanner: Scanner::new(input),
            strip_namespace,
            doctype: None,
            failure: None,
            failures: 0,
        }
    }

    /// Current input line
    #[inline]
    pub fn line(&self) -> u32 {
        self.scanner.line()
    }

    /// Record a failure; the parse will be discarded
    pub fn fail(&mut self, kind: ErrorKind, message: impl Into<String>) {
        let message = message.into();
        let line = self.line();
        tracing::warn!(line, kind = %kind, "{}", message);
        self.failures += 1;
        if self.failure.is_none() {
            self.failure = Some(ParseError::new(kind, line, message));
        }
    }

    pub fn has_failed(&self) -> bool {
        self.failures > 0
    }

    /// The first failure, with the count of those after it
    pub fn take_failure(&mut self) -> Option<ParseError> {
        let mut err = self.failure.take()?;
        err.suppressed = self.failures - 1;
        Some(err)
    }

    /// The most recent DOCTYPE declaration body
    pub fn take_doctype(&mut self) -> Option<String> {
        self.doctype.take()
    }

    /// Produce the next token, or None at end of input
    pub fn next_token(&mut self, mode: LexMode) -> Option<Token> {
        loop {
            let step = match self.scanner.peek_byte()? {
                b'<' => {
                    self.scanner.skip(1);
                    self.markup()
                }
                _ => match mode {
                    LexMode::Tag => self.tag_token(),
                    LexMode::Text => Step::Token(self.text_run()),
                },
            };
            match step {
                Step::Token(token) => return Some(token),
                Step::Skip => continue,
                Step::Eof => return None,
            }
        }
    }

    /// Markup after `<`
    fn markup(&mut self) -> Step {
        let mark = self.scanner.mark();
        let Some(c) = self.scanner.next_char() else {
            return Step::Token(Token::marker(TokenKind::Open));
        };
        match c {
            '?' => self.processing_instruction(),
            '!' => self.declaration(),
            '/' => Step::Token(Token::marker(TokenKind::EndTag)),
            c if c.is_whitespace() => {
                self.fail(ErrorKind::WhitespaceAfterOpen, "whitespace following '<'");
                Step::Skip
            }
            _ => {
                self.scanner.reset(mark);
                Step::Token(Token::marker(TokenKind::Open))
            }
        }
    }

    fn processing_instruction(&mut self) -> Step {
        let start = self.line();
        match self.scanner.take_past(b'>') {
            Some(_) => Step::Token(Token::marker(TokenKind::White)),
            None => {
                self.fail(
                    ErrorKind::UnterminatedPi,
                    format!("EOF in processing instruction (re: line {})", start),
                );
                Step::Eof
            }
        }
    }

    /// `<!` constructs: comment, DOCTYPE, CDATA
    fn declaration(&mut self) -> Step {
        let start = self.line();
        if self.scanner.starts_with(b"--") {
            self.scanner.skip(2);
            if self.scanner.take_past_seq(b"-->").is_none() {
                self.fail(
                    ErrorKind::UnterminatedComment,
                    format!("EOF in comment (re: line {})", start),
                );
                return Step::Eof;
            }
            return Step::Token(Token::marker(TokenKind::White));
        }

        if self.scanner.starts_with(b"DOCTYPE") {
            let mark = self.scanner.mark();
            self.scanner.skip(7);
            if self.scanner.peek_byte().is_some_and(|b| b.is_ascii_whitespace()) {
                return self.doctype(start);
            }
            self.scanner.reset(mark);
        }

        if self.scanner.starts_with(b"[CDATA[") {
            self.scanner.skip(7);
            return self.cdata(start);
        }

        self.fail(ErrorKind::UnknownDeclaration, "<!name not known");
        match self.scanner.take_past(b'>') {
            Some(_) => Step::Token(Token::marker(TokenKind::White)),
            None => Step::Eof,
        }
    }

    fn doctype(&mut self, start: u32) -> Step {
        match self.scanner.take_past(b'>') {
            Some(body) => {
                self.doctype = Some(body.trim().to_string());
                Step::Token(Token::marker(TokenKind::White))
            }
            None => {
                self.fail(
                    ErrorKind::UnterminatedDoctype,
                    format!("EOF in DOCTYPE (re: line {})", start),
                );
                Step::Eof
            }
        }
    }

    /// CDATA content is returned as character data, references still decoded
    fn cdata(&mut self, start: u32) -> Step {
        let Some(raw) = self.scanner.take_past_seq(b"]]>") else {
            self.fail(
                ErrorKind::UnterminatedCdata,
                format!("EOF in CDATA (re: line {})", start),
            );
            return Step::Eof;
        };
        let raw = raw.into_owned();
        let mut text = String::with_capacity(raw.len());
        let mut sub = Scanner::raw(raw.as_bytes());
        loop {
            text.push_str(&sub.take_until2(b'&', b'&'));
            if sub.is_eof() {
                break;
            }
            sub.skip(1);
            text.push(resolve_entity(&mut sub, start));
        }
        Step::Token(Token::new(TokenKind::Name, text))
    }

    /// Character data up to the next `<` or end of input
    fn text_run(&mut self) -> Token {
        let mut text = String::new();
        loop {
            text.push_str(&self.scanner.take_until2(b'<', b'&'));
            if self.scanner.peek_byte() != Some(b'&') {
                break;
            }
            self.scanner.skip(1);
            let c = self.entity();
            text.push(c);
        }
        Token::new(TokenKind::Name, text)
    }

    /// Inside a tag
    fn tag_token(&mut self) -> Step {
        let Some(c) = self.scanner.next_char() else {
            return Step::Eof;
        };
        match c {
            '=' => Step::Token(Token::marker(TokenKind::Equal)),
            '>' => Step::Token(Token::marker(TokenKind::Close)),
            '/' => {
                if self.scanner.peek_byte() == Some(b'>') {
                    self.scanner.skip(1);
                    Step::Token(Token::marker(TokenKind::Empty))
                } else {
                    Step::Skip
                }
            }
            '\'' | '"' => self.quoted(c as u8),
            c if c.is_whitespace() => {
                let mut white = String::from(c);
                while let Some(n) = self.scanner.peek_char().filter(|n| n.is_whitespace()) {
                    white.push(n);
                    self.scanner.next_char();
                }
                Step::Token(Token::new(TokenKind::White, white))
            }
            c => {
                let mut name = String::from(c);
                while let Some(n) = self.scanner.peek_char().filter(|&n| is_name_char(n)) {
                    name.push(n);
                    self.scanner.next_char();
                }
                if self.strip_namespace {
                    name = strip_namespace(&name).to_string();
                }
                Step::Token(Token::new(TokenKind::Name, name))
            }
        }
    }

    /// Attribute value up to the matching quote
    fn quoted(&mut self, quote: u8) -> Step {
        let mut value = String::new();
        loop {
            value.push_str(&self.scanner.take_until2(quote, b'&'));
            match self.scanner.peek_byte() {
                Some(b'&') => {
                    self.scanner.skip(1);
                    let c = self.entity();
                    value.push(c);
                }
                Some(_) => {
                    self.scanner.skip(1);
                    return Step::Token(Token::new(TokenKind::Name, value));
                }
                None => return Step::Eof,
            }
        }
    }

    fn entity(&mut self) -> char {
        let line = self.line();
        resolve_entity(&mut self.scanner, line)
    }
}

/// Decode a reference whose `&` was just consumed.
///
/// A body that is not closed by `;` within `MAX_ENTITY_NAME` reference
/// characters is not a reference: the `&` is returned literally and the
/// cursor rewound to just after it.
fn resolve_entity(scanner: &mut Scanner<'_>, line: u32) -> char {
    let mark = scanner.mark();
    let mut body = String::new();
    loop {
        match scanner.next_char() {
            Some(';') => break,
            Some(c) if entities::is_reference_char(c) && body.len() < MAX_ENTITY_NAME => {
                body.push(c)
            }
            _ => {
                tracing::warn!(line, "unquoted '&' - passed through");
                scanner.reset(mark);
                return '&';
            }
        }
    }

    match entities::decode_reference(&body) {
        Some(c) => c,
        None => {
            tracing::warn!(line, "'&{};' unknown/unsupported entity reference", body);
            PLACEHOLDER
        }
    }
}
