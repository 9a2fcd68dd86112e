//! Error types
//!
//! Parsing is all-or-nothing: any failure discards the whole document.
//! Recoverable input defects (unknown entities, bare ampersands, bad
//! UTF-8) never surface here; they are logged as warnings instead.

use std::fmt;
use thiserror::Error;

/// Fatal allocation failure inside a document arena.
///
/// This is a configuration defect, not a property of the input: the block
/// size must exceed the longest single token the lexer can produce.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ArenaError {
    #[error("arena object too big ({requested} > {block_size})")]
    Oversized { requested: usize, block_size: usize },
}

/// Category of a parse failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Element or attribute name not starting with a letter or underscore
    IllegalName,
    UnterminatedComment,
    UnterminatedCdata,
    UnterminatedDoctype,
    UnterminatedPi,
    /// `<!` followed by something other than a comment, CDATA or DOCTYPE
    UnknownDeclaration,
    /// Whitespace directly after `<`
    WhitespaceAfterOpen,
    /// Input ended inside an open element
    UnexpectedEof,
    /// End tag name differs from the open element's name
    NestingMismatch,
    /// End tag with no open element
    StrayEndTag,
    /// Token not allowed in the current parser state
    Syntax,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::IllegalName => "illegal name",
            ErrorKind::UnterminatedComment => "unterminated comment",
            ErrorKind::UnterminatedCdata => "unterminated cdata",
            ErrorKind::UnterminatedDoctype => "unterminated doctype",
            ErrorKind::UnterminatedPi => "unterminated processing instruction",
            ErrorKind::UnknownDeclaration => "unknown declaration",
            ErrorKind::WhitespaceAfterOpen => "whitespace after '<'",
            ErrorKind::UnexpectedEof => "unexpected end of input",
            ErrorKind::NestingMismatch => "nesting mismatch",
            ErrorKind::StrayEndTag => "stray end tag",
            ErrorKind::Syntax => "syntax error",
        };
        f.write_str(s)
    }
}

/// A parse failure with the line it was detected on
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{line}: {message}")]
pub struct ParseError {
    pub kind: ErrorKind,
    pub line: u32,
    pub message: String,
    /// Number of further failures seen after this one
    pub suppressed: usize,
}

impl ParseError {
    pub fn new(kind: ErrorKind, line: u32, message: impl Into<String>) -> Self {
        ParseError {
            kind,
            line,
            message: message.into(),
            suppressed: 0,
        }
    }
}

/// Top-level error returned by the parse entry points
#[derive(Debug, Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("parse failed: {0}")]
    Parse(#[from] ParseError),

    #[error("fatal: {0}")]
    Arena(#[from] ArenaError),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

impl Error {
    /// The parse failure kind, if this is a parse failure
    pub fn kind(&self) -> Option<ErrorKind> {
        match self {
            Error::Parse(e) => Some(e.kind),
            _ => None,
        }
    }

    /// True for failures caused by configuration rather than input
    pub fn is_fatal(&self) -> bool {
        matches!(self, Error::Arena(_) | Error::InvalidOptions(_))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
