//! Input collection
//!
//! - BufferedReader: chunked reads from any `io::Read` into one buffer

pub mod buffered;

pub use buffered::{read_all, BufferedReader};
