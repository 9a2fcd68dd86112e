//! Block Bump Allocator
//!
//! Owns every byte of string data for one parsed document:
//! - Fixed-capacity blocks, handed out front to back
//! - Allocation sizes rounded up to the natural alignment
//! - Objects never move and are never freed individually
//! - The whole chain is released together
//!
//! Allocations are addressed by `Span` handles rather than pointers, so a
//! span can never outlive or alias the block it points into.

use crate::error::ArenaError;

/// Allocation granularity
pub const ALIGN: usize = std::mem::align_of::<u64>();

#[inline]
fn round_up(n: usize) -> usize {
    n.checked_add(ALIGN - 1).map_or(usize::MAX, |x| x & !(ALIGN - 1))
}

/// Handle to an allocation: (block index, offset in block, length)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    block: u32,
    offset: u32,
    len: u32,
}

impl Span {
    #[inline]
    pub fn len(&self) -> usize {
        self.len as usize
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

struct Block {
    data: Box<[u8]>,
    free: usize,
}

impl Block {
    fn new(size: usize) -> Self {
        Block {
            data: vec![0u8; size].into_boxed_slice(),
            free: 0,
        }
    }

    #[inline]
    fn remaining(&self) -> usize {
        self.data.len() - self.free
    }
}

/// Bump allocator over a stack of fixed-size blocks.
///
/// The last block in `blocks` is the active one; older blocks are full
/// (or close to it) and are only read from.
pub struct Arena {
    blocks: Vec<Block>,
    block_size: usize,
    allocations: usize,
}

impl Arena {
    /// Create an empty arena; no block is allocated until first use
    pub fn new(block_size: usize) -> Self {
        Arena {
            blocks: Vec::new(),
            block_size,
            allocations: 0,
        }
    }

    /// Configured bytes per block
    pub fn block_size(&self) -> usize {
        self.block_size
    }

    /// Allocate `n` zero-filled bytes
    pub fn alloc(&mut self, n: usize) -> Result<Span, ArenaError> {
        let len = round_up(n);
        if len > self.block_size {
            return Err(ArenaError::Oversized {
                requested: n,
                block_size: self.block_size,
            });
        }
        self.allocations += 1;
        if n == 0 {
            return Ok(Span::default());
        }

        let needs_block = match self.blocks.last() {
            Some(b) => b.remaining() < len,
            None => true,
        };
        if needs_block {
            self.blocks.push(Block::new(self.block_size));
        }

        let index = self.blocks.len() - 1;
        let block = &mut self.blocks[index];
        let offset = block.free;
        block.free += len;

        Ok(Span {
            block: index as u32,
            offset: offset as u32,
            len: n as u32,
        })
    }

    /// Copy a string into the arena
    pub fn alloc_str(&mut self, s: &str) -> Result<Span, ArenaError> {
        let span = self.alloc(s.len())?;
        if let Some(dst) = self.bytes_mut(span) {
            dst.copy_from_slice(s.as_bytes());
        }
        Ok(span)
    }

    /// Bytes of an allocation
    pub fn bytes(&self, span: Span) -> Option<&[u8]> {
        if span.len == 0 {
            return Some(&[][..]);
        }
        let block = self.blocks.get(span.block as usize)?;
        let start = span.offset as usize;
        block.data.get(start..start + span.len as usize)
    }

    fn bytes_mut(&mut self, span: Span) -> Option<&mut [u8]> {
        if span.len == 0 {
            return Some(&mut [][..]);
        }
        let block = self.blocks.get_mut(span.block as usize)?;
        let start = span.offset as usize;
        block.data.get_mut(start..start + span.len as usize)
    }

    /// A string previously stored with `alloc_str`
    pub fn str(&self, span: Span) -> Option<&str> {
        self.bytes(span).and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Number of blocks currently held
    pub fn block_count(&self) -> usize {
        self.blocks.len()
    }

    /// Number of allocation requests served
    pub fn allocations(&self) -> usize {
        self.allocations
    }

    /// Bytes handed out, including alignment padding
    pub fn bytes_used(&self) -> usize {
        self.blocks.iter().map(|b| b.free).sum()
    }

    /// Free every block
    pub fn release(&mut self) {
        self.blocks.clear();
    }
}

impl std::fmt::Debug for Arena {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Arena")
            .field("block_size", &self.block_size)
            .field("blocks", &self.blocks.len())
            .field("bytes_used", &self.bytes_used())
            .finish()
    }
}
