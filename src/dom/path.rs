//! Compiled lookup paths
//!
//! Converters issue the same handful of paths against every document, so
//! the split form is cached in an LRU keyed by the path text.

use super::document::Document;
use super::strings::NameId;
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::Arc;

/// Default number of compiled paths kept
pub const DEFAULT_PATH_CACHE: usize = 256;

/// A `/`-separated path split into name segments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledPath {
    segments: Vec<Box<str>>,
}

impl CompiledPath {
    /// Split `path`, ignoring a leading `/` and empty segments
    pub fn compile(path: &str) -> Self {
        let segments = path
            .split('/')
            .filter(|s| !s.is_empty())
            .map(Box::from)
            .collect();
        CompiledPath { segments }
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(|s| &**s)
    }

    pub fn len(&self) -> usize {
        self.segments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// Map each segment to its name id in `doc`; None if any name is absent
    pub(crate) fn resolve(&self, doc: &Document) -> Option<Vec<NameId>> {
        self.segments.iter().map(|s| doc.name_id(s)).collect()
    }
}

/// Bounded cache of compiled paths
pub struct PathCache {
    cache: LruCache<String, Arc<CompiledPath>>,
    misses: u64,
}

impl PathCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        PathCache {
            cache: LruCache::new(capacity),
            misses: 0,
        }
    }

    pub fn get_or_compile(&mut self, path: &str) -> Arc<CompiledPath> {
        if let Some(hit) = self.cache.get(path) {
            return Arc::clone(hit);
        }
        self.misses += 1;
        let compiled = Arc::new(CompiledPath::compile(path));
        self.cache.put(path.to_string(), Arc::clone(&compiled));
        compiled
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    /// Paths compiled because they were not cached
    pub fn misses(&self) -> u64 {
        self.misses
    }
}

impl Default for PathCache {
    fn default() -> Self {
        Self::new(DEFAULT_PATH_CACHE)
    }
}
