//! Path and attribute lookup
//!
//! Paths are `/`-separated element names. Matching is depth-biased and
//! left to right: an intermediate segment descends into each matching
//! sibling's children in turn, the final segment returns the first match
//! that passes the optional attribute filter. A final-segment match that
//! fails the filter has its subtree searched for a deeper match of the
//! same name before the search moves on.

use super::document::{Document, Element};
use super::path::CompiledPath;
use super::strings::NameId;

/// Attribute requirement on the final path segment
#[derive(Debug, Clone, Copy)]
struct Filter<'q> {
    name: NameId,
    value: Option<&'q str>,
}

impl Filter<'_> {
    fn accepts(&self, element: Element<'_>) -> bool {
        element.attributes().any(|a| {
            a.name_id() == self.name && self.value.map_or(true, |v| a.value() == v)
        })
    }
}

/// Find the first element matching `path`, starting at the sibling list `start`
pub fn find_path<'d>(start: Option<Element<'d>>, path: &str) -> Option<Element<'d>> {
    find_path_filtered(start, path, None, None)
}

/// Like `find_path`, but the final element must carry attribute `attr`
/// (with value `value`, when given)
pub fn find_path_filtered<'d>(
    start: Option<Element<'d>>,
    path: &str,
    attr: Option<&str>,
    value: Option<&str>,
) -> Option<Element<'d>> {
    find_compiled(start, &CompiledPath::compile(path), attr, value)
}

/// Find using a pre-split path
pub fn find_compiled<'d>(
    start: Option<Element<'d>>,
    path: &CompiledPath,
    attr: Option<&str>,
    value: Option<&str>,
) -> Option<Element<'d>> {
    let start = start?;
    let doc = start.document();
    // A name never interned cannot match anything in this document
    let segments = path.resolve(doc)?;
    let filter = match attr {
        Some(name) => Some(Filter { name: doc.name_id(name)?, value }),
        None => None,
    };
    look(Some(start), &segments, filter)
}

fn look<'d>(
    start: Option<Element<'d>>,
    segments: &[NameId],
    filter: Option<Filter<'_>>,
) -> Option<Element<'d>> {
    let (&first, rest) = segments.split_first()?;
    if rest.is_empty() {
        return look_last(start, first, filter);
    }
    let mut cursor = start;
    while let Some(element) = cursor {
        cursor = element.next_sibling();
        if element.name_id() != first {
            continue;
        }
        if let Some(found) = look(element.first_child(), rest, filter) {
            return Some(found);
        }
    }
    None
}

/// Final segment: preorder walk over matching elements only
fn look_last<'d>(
    start: Option<Element<'d>>,
    name: NameId,
    filter: Option<Filter<'_>>,
) -> Option<Element<'d>> {
    let mut stack = vec![start];
    while let Some(top) = stack.last_mut() {
        let Some(element) = *top else {
            stack.pop();
            continue;
        };
        *top = element.next_sibling();
        if element.name_id() != name {
            continue;
        }
        match filter {
            None => return Some(element),
            Some(f) if f.accepts(element) => return Some(element),
            Some(_) => stack.push(element.first_child()),
        }
    }
    None
}

/// Attribute value of a possibly-missing element
///
/// Allows `attribute(find_path(..), "name")` chains without checking each step.
pub fn attribute<'d>(element: Option<Element<'d>>, name: &str) -> Option<&'d str> {
    element?.attribute(name)
}

impl Document {
    /// `find_path` from the outermost sibling list
    pub fn find_path(&self, path: &str) -> Option<Element<'_>> {
        find_path(self.root(), path)
    }

    pub fn find_path_filtered(
        &self,
        path: &str,
        attr: Option<&str>,
        value: Option<&str>,
    ) -> Option<Element<'_>> {
        find_path_filtered(self.root(), path, attr, value)
    }
}

impl<'d> Element<'d> {
    /// `find_path` over this element's children
    pub fn find(&self, path: &str) -> Option<Element<'d>> {
        find_path(self.first_child(), path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ParseOptions;
    use crate::core::parser::parse_bytes;

    const SHEET: &str = r#"<workbook>
        <sheets>
            <sheet name="one" id="1"/>
            <sheet name="two" id="2"/>
        </sheets>
        <sheets>
            <sheet name="three" id="3" hidden="1"/>
        </sheets>
        <defs><sheet name="nested"><sheet name="inner" state="x"/></sheet></defs>
    </workbook>"#;

    fn doc() -> Document {
        parse_bytes(SHEET.as_bytes(), &ParseOptions::default()).unwrap()
    }

    #[test]
    fn test_find_first() {
        let doc = doc();
        let sheet = doc.find_path("/workbook/sheets/sheet").unwrap();
        assert_eq!(sheet.attribute("name"), Some("one"));
    }

    #[test]
    fn test_leading_and_empty_segments() {
        let doc = doc();
        let a = doc.find_path("workbook//sheets/sheet").unwrap();
        let b = doc.find_path("/workbook/sheets/sheet").unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_exact_segment_match() {
        let doc = doc();
        assert!(doc.find_path("/workbook/sheet").is_none());
        assert!(doc.find_path("/work").is_none());
        assert!(doc.find_path("").is_none());
    }

    #[test]
    fn test_filter_by_value() {
        let doc = doc();
        let two = doc
            .find_path_filtered("/workbook/sheets/sheet", Some("name"), Some("two"))
            .unwrap();
        assert_eq!(two.attribute("id"), Some("2"));
    }

    #[test]
    fn test_filter_moves_to_next_branch() {
        let doc = doc();
        let hidden = doc
            .find_path_filtered("/workbook/sheets/sheet", Some("hidden"), None)
            .unwrap();
        assert_eq!(hidden.attribute("name"), Some("three"));
    }

    #[test]
    fn test_filter_searches_subtree() {
        let doc = doc();
        let inner = doc
            .find_path_filtered("/workbook/defs/sheet", Some("state"), None)
            .unwrap();
        assert_eq!(inner.attribute("name"), Some("inner"));
    }

    #[test]
    fn test_unfiltered_equivalence() {
        let doc = doc();
        for path in ["/workbook/sheets/sheet", "/workbook/defs/sheet", "/workbook/nope"] {
            assert_eq!(doc.find_path(path), doc.find_path_filtered(path, None, None));
        }
    }

    #[test]
    fn test_unknown_attribute_filter() {
        let doc = doc();
        assert!(doc
            .find_path_filtered("/workbook/sheets/sheet", Some("color"), None)
            .is_none());
    }

    #[test]
    fn test_attribute_chaining() {
        let doc = doc();
        assert_eq!(attribute(doc.find_path("/workbook/sheets/sheet"), "id"), Some("1"));
        assert_eq!(attribute(doc.find_path("/missing"), "id"), None);
        assert_eq!(attribute(None, "id"), None);
    }

    #[test]
    fn test_empty_branch_falls_through_to_later_sibling() {
        let doc = parse_bytes(
            b"<wb><sheets><other/></sheets><sheets><sheet n='2'/></sheets></wb>",
            &ParseOptions::default(),
        )
        .unwrap();
        let sheet = doc.find_path("/wb/sheets/sheet").unwrap();
        assert_eq!(sheet.attribute("n"), Some("2"));
        assert_eq!(doc.find_path_filtered("/wb/sheets/sheet", None, None), Some(sheet));
    }

    #[test]
    fn test_element_find() {
        let doc = doc();
        let defs = doc.find_path("/workbook/defs").unwrap();
        assert_eq!(defs.find("sheet/sheet").unwrap().attribute("name"), Some("inner"));
    }
}
