//! docxml - XML document trees for office-format converters
//!
//! Parses imperfect real-world XML (Office Open XML payloads) into an
//! arena-backed tree and answers the small set of questions converters ask:
//! - `parse` a byte stream into a `Document` (all or nothing)
//! - `find_path` / `find_path_filtered` by slash-separated element names
//! - `attribute` lookup, chainable over missing elements
//! - serialize the tree back to text
//! - `release` the whole document at once
//!
//! Layers:
//! - core: scanner, entities, context-sensitive lexer, state table, parser
//! - dom: arena, name interning, tree storage, queries, writer
//! - reader: stream input
//! - strategy: parallel parse and lookups (rayon)
//! - nif: optional BEAM bindings (`nif` feature)

pub mod config;
pub mod core;
pub mod dom;
pub mod error;
pub mod reader;
pub mod strategy;

#[cfg(feature = "nif")]
mod nif;
#[cfg(feature = "nif")]
mod resource;
#[cfg(feature = "nif")]
mod term;

use std::io::Read;

pub use config::{ParseOptions, DEFAULT_BLOCK_SIZE, MAX_BLOCK_SIZE};
pub use dom::{attribute, find_path, find_path_filtered, ArenaStats, Attribute, Document, Element};
pub use error::{ArenaError, Error, ErrorKind, ParseError, Result};

// ============================================================================
// Allocator Configuration
// ============================================================================

#[cfg(feature = "memory_tracking")]
mod tracking {
    use std::alloc::{GlobalAlloc, Layout};
    use std::sync::atomic::{AtomicUsize, Ordering};

    pub static ALLOCATED: AtomicUsize = AtomicUsize::new(0);
    pub static PEAK_ALLOCATED: AtomicUsize = AtomicUsize::new(0);

    pub struct TrackingAllocator;

    #[cfg(feature = "mimalloc")]
    static UNDERLYING: mimalloc::MiMalloc = mimalloc::MiMalloc;

    #[cfg(not(feature = "mimalloc"))]
    static UNDERLYING: std::alloc::System = std::alloc::System;

    unsafe impl GlobalAlloc for TrackingAllocator {
        unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
            let ptr = UNDERLYING.alloc(layout);
            if !ptr.is_null() {
                let current = ALLOCATED.fetch_add(layout.size(), Ordering::Relaxed) + layout.size();
                PEAK_ALLOCATED.fetch_max(current, Ordering::Relaxed);
            }
            ptr
        }

        unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
            ALLOCATED.fetch_sub(layout.size(), Ordering::Relaxed);
            UNDERLYING.dealloc(ptr, layout)
        }
    }
}

#[cfg(feature = "memory_tracking")]
#[global_allocator]
static GLOBAL: tracking::TrackingAllocator = tracking::TrackingAllocator;

#[cfg(all(feature = "mimalloc", not(feature = "memory_tracking")))]
#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

/// Bytes currently allocated through the tracking allocator
#[cfg(feature = "memory_tracking")]
pub fn allocated_bytes() -> (usize, usize) {
    use std::sync::atomic::Ordering;
    (
        tracking::ALLOCATED.load(Ordering::SeqCst),
        tracking::PEAK_ALLOCATED.load(Ordering::SeqCst),
    )
}

// ============================================================================
// Entry Points
// ============================================================================

/// Parse a complete byte buffer
///
/// Any failure anywhere in the input yields an error and no document.
pub fn parse(input: &[u8], options: &ParseOptions) -> Result<Document> {
    core::parser::parse_bytes(input, options)
}

pub fn parse_str(input: &str, options: &ParseOptions) -> Result<Document> {
    parse(input.as_bytes(), options)
}

/// Read a stream to the end, then parse it
pub fn parse_reader<R: Read>(reader: R, options: &ParseOptions) -> Result<Document> {
    options.validate()?;
    let input = reader::read_all(reader)?;
    parse(&input, options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_parse_str() {
        let doc = parse_str("<a><b x='1'/></a>", &ParseOptions::default()).unwrap();
        assert_eq!(attribute(doc.find_path("/a/b"), "x"), Some("1"));
    }

    #[test]
    fn test_parse_reader() {
        let doc = parse_reader(Cursor::new(b"\xEF\xBB\xBF<root/>".to_vec()), &ParseOptions::default())
            .unwrap();
        assert_eq!(doc.root().unwrap().name(), "root");
    }

    struct Broken;

    impl Read for Broken {
        fn read(&mut self, _: &mut [u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::BrokenPipe, "closed"))
        }
    }

    #[test]
    fn test_reader_error() {
        let err = parse_reader(Broken, &ParseOptions::default()).unwrap_err();
        assert!(matches!(err, Error::Io(_)));
        assert!(!err.is_fatal());
    }
}
