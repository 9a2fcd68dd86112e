//! Parallel parsing and lookup
//!
//! Documents share nothing, so independent inputs parse on separate rayon
//! workers. A parsed document is read-only, so many path lookups against
//! it can also run at once.

use rayon::prelude::*;

use crate::config::ParseOptions;
use crate::core::parser::parse_bytes;
use crate::dom::{find_path, Document, NodeId};
use crate::error::Result;

/// Parse many documents in parallel; results keep the input order
pub fn parse_all(inputs: &[&[u8]], options: &ParseOptions) -> Vec<Result<Document>> {
    inputs
        .par_iter()
        .map(|input| parse_bytes(input, options))
        .collect()
}

/// Resolve many paths against one document in parallel
///
/// Returns the matching element id per path, in input order.
pub fn find_paths(doc: &Document, paths: &[&str]) -> Vec<Option<NodeId>> {
    paths
        .par_iter()
        .map(|path| find_path(doc.root(), path).map(|e| e.id()))
        .collect()
}

/// Resolve `path` and map the match, for each document in parallel
pub fn map_each<F, T>(docs: &[Document], path: &str, mapper: F) -> Vec<Option<T>>
where
    F: Fn(crate::dom::Element<'_>) -> T + Sync + Send,
    T: Send,
{
    docs.par_iter()
        .map(|doc| find_path(doc.root(), path).map(&mapper))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, ErrorKind};

    #[test]
    fn test_parse_all_keeps_order() {
        let inputs: [&[u8]; 3] = [b"<a/>", b"<b><c/></b>", b"<d>"];
        let results = parse_all(&inputs, &ParseOptions::default());
        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().root().unwrap().name(), "a");
        assert_eq!(results[1].as_ref().unwrap().element_count(), 2);
        let err = results[2].as_ref().unwrap_err();
        assert!(matches!(err, Error::Parse(_)));
        assert_eq!(err.kind(), Some(ErrorKind::UnexpectedEof));
    }

    #[test]
    fn test_find_paths() {
        let doc = parse_bytes(b"<r><a/><b/><c/></r>", &ParseOptions::default()).unwrap();
        let found = find_paths(&doc, &["/r/a", "/r/c", "/r/x"]);
        assert_eq!(found.len(), 3);
        assert_eq!(doc.element(found[0].unwrap()).unwrap().name(), "a");
        assert_eq!(doc.element(found[1].unwrap()).unwrap().name(), "c");
        assert!(found[2].is_none());
    }

    #[test]
    fn test_map_each() {
        let opts = ParseOptions::default();
        let inputs: [&[u8]; 3] = [b"<r v='1'/>", b"<r v='2'/>", b"<s/>"];
        let docs: Vec<Document> = inputs
            .iter()
            .map(|input| parse_bytes(input, &opts).unwrap())
            .collect();
        let values = map_each(&docs, "/r", |e| e.attribute("v").map(str::to_string));
        assert_eq!(values, vec![Some(Some("1".to_string())), Some(Some("2".to_string())), None]);
    }
}
