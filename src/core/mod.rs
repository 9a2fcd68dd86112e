//! Core XML parsing primitives
//!
//! This module contains the building blocks of the parser:
//! - Scanner: rune cursor with line counting, memchr-accelerated runs
//! - Entities: reference decoding and output escaping
//! - Lexer: context-sensitive tokenizer driven by the parser state
//! - Machine: the state/action table
//! - Parser: table-driven tree builder

pub mod entities;
pub mod lexer;
pub mod machine;
pub mod parser;
pub mod scanner;
