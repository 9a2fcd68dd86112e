//! Name Interning Pool
//!
//! Element and attribute names repeat thousands of times in office
//! documents, so each distinct name is stored once in the arena and every
//! occurrence refers to the same entry. Two byte-equal names always get
//! the same `NameId` within one document, which lets the parser compare
//! names by id.
//!
//! Uses hash-based lookup; collisions are resolved by comparing the stored
//! bytes. Values and pcdata are not interned.

use super::arena::{Arena, Span};
use crate::error::ArenaError;
use std::collections::HashMap;
use std::hash::{Hash, Hasher};

/// Canonical name handle (index into the pool)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NameId(u32);

impl NameId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone, Copy)]
struct InternEntry {
    span: Span,
    hits: u32,
}

/// Content-addressed name store with per-name hit counters
#[derive(Debug, Default)]
pub struct InternPool {
    entries: Vec<InternEntry>,
    /// Hash of name bytes -> ids with that hash
    hash_index: HashMap<u64, Vec<u32>>,
    requests: usize,
}

impl InternPool {
    pub fn new() -> Self {
        InternPool {
            entries: Vec::with_capacity(64),
            hash_index: HashMap::new(),
            requests: 0,
        }
    }

    #[inline]
    fn compute_hash(s: &[u8]) -> u64 {
        use std::collections::hash_map::DefaultHasher;
        let mut hasher = DefaultHasher::new();
        s.hash(&mut hasher);
        hasher.finish()
    }

    fn find(&self, arena: &Arena, hash: u64, s: &str) -> Option<u32> {
        let ids = self.hash_index.get(&hash)?;
        ids.iter()
            .copied()
            .find(|&id| arena.str(self.entries[id as usize].span) == Some(s))
    }

    /// Return the canonical id for `s`, copying it into the arena on first sight
    pub fn intern(&mut self, arena: &mut Arena, s: &str) -> Result<NameId, ArenaError> {
        self.requests += 1;
        let hash = Self::compute_hash(s.as_bytes());

        if let Some(id) = self.find(arena, hash, s) {
            self.entries[id as usize].hits += 1;
            return Ok(NameId(id));
        }

        let span = arena.alloc_str(s)?;
        let id = self.entries.len() as u32;
        self.entries.push(InternEntry { span, hits: 1 });
        self.hash_index.entry(hash).or_default().push(id);
        Ok(NameId(id))
    }

    /// Look a name up without counting a hit
    pub fn lookup(&self, arena: &Arena, s: &str) -> Option<NameId> {
        let hash = Self::compute_hash(s.as_bytes());
        self.find(arena, hash, s).map(NameId)
    }

    /// Resolve an id to its stored string
    pub fn resolve<'a>(&self, arena: &'a Arena, id: NameId) -> Option<&'a str> {
        let entry = self.entries.get(id.index())?;
        arena.str(entry.span)
    }

    /// How many times this name was interned
    pub fn hits(&self, id: NameId) -> u32 {
        self.entries.get(id.index()).map_or(0, |e| e.hits)
    }

    /// Number of distinct names
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Total intern requests, hits included
    pub fn requests(&self) -> usize {
        self.requests
    }
}
