//! Multi-document strategies
//!
//! - Parallel: rayon-backed parsing of many inputs and batched path lookups

pub mod parallel;

pub use parallel::{find_paths, map_each, parse_all};
