//! Per-parse configuration

use crate::error::Error;

/// Default arena block size in bytes
pub const DEFAULT_BLOCK_SIZE: usize = 8192;

/// Largest block size arena spans can address
pub const MAX_BLOCK_SIZE: usize = u32::MAX as usize;

/// Options threaded explicitly into every parse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseOptions {
    /// Collapse whitespace-only text runs; drop them when nothing precedes them
    pub crush_whitespace: bool,
    /// Drop everything up to and including the last `:` of element/attribute names
    pub strip_namespace_prefixes: bool,
    /// Bytes per arena block; must exceed the longest single token
    pub arena_block_size: usize,
    /// Emit per-transition trace events
    pub trace: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        ParseOptions {
            crush_whitespace: false,
            strip_namespace_prefixes: false,
            arena_block_size: DEFAULT_BLOCK_SIZE,
            trace: false,
        }
    }
}

impl ParseOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn crush_whitespace(mut self, on: bool) -> Self {
        self.crush_whitespace = on;
        self
    }

    pub fn strip_namespace_prefixes(mut self, on: bool) -> Self {
        self.strip_namespace_prefixes = on;
        self
    }

    pub fn arena_block_size(mut self, size: usize) -> Self {
        self.arena_block_size = size;
        self
    }

    pub fn trace(mut self, on: bool) -> Self {
        self.trace = on;
        self
    }

    /// Reject configurations no parse could succeed with
    pub fn validate(&self) -> Result<(), Error> {
        if self.arena_block_size == 0 {
            return Err(Error::InvalidOptions(
                "arena_block_size must be greater than zero".to_string(),
            ));
        }
        if self.arena_block_size > MAX_BLOCK_SIZE {
            return Err(Error::InvalidOptions(format!(
                "arena_block_size {} exceeds {}",
                self.arena_block_size, MAX_BLOCK_SIZE
            )));
        }
        Ok(())
    }
}
