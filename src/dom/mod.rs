//! DOM Module - Arena-based XML Document
//!
//! Implements the document tree using:
//! - A block bump arena owning every string of one document
//! - NodeId (u32) indices for parent and sibling links
//! - Interned element/attribute names with hit counters
//! - Path lookup, compiled path caching and serialization

pub mod arena;
pub mod document;
pub mod node;
pub mod path;
pub mod query;
pub mod strings;
pub mod writer;

pub use arena::{Arena, Span};
pub use document::{ArenaStats, Attribute, Attributes, Document, Element, Siblings};
pub use node::{AttrId, NodeId};
pub use path::{CompiledPath, PathCache};
pub use query::{attribute, find_compiled, find_path, find_path_filtered};
pub use strings::{InternPool, NameId};
