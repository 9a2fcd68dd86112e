//! Element and attribute records
//!
//! Uses NodeId / AttrId (u32) indices into the document's vectors, so
//! parent and sibling links are plain integers and never dangle.

use super::arena::Span;
use super::strings::NameId;

/// Compact element identifier (index into the element vector)
pub type NodeId = u32;

/// Compact attribute identifier (index into the attribute vector)
pub type AttrId = u32;

/// A stored element
#[derive(Debug, Clone)]
pub struct ElementNode {
    /// Interned element name
    pub name: NameId,
    /// Character data before the first child, if any
    pub pcdata: Option<Span>,
    /// Parent element (None at the outermost level)
    pub parent: Option<NodeId>,
    pub first_child: Option<NodeId>,
    pub last_child: Option<NodeId>,
    pub next_sibling: Option<NodeId>,
    pub first_attr: Option<AttrId>,
    pub last_attr: Option<AttrId>,
    /// Source line the element opened on
    pub line: u32,
}

impl ElementNode {
    pub fn new(name: NameId, parent: Option<NodeId>, line: u32) -> Self {
        ElementNode {
            name,
            pcdata: None,
            parent,
            first_child: None,
            last_child: None,
            next_sibling: None,
            first_attr: None,
            last_attr: None,
            line,
        }
    }

    #[inline]
    pub fn has_children(&self) -> bool {
        self.first_child.is_some()
    }

    #[inline]
    pub fn has_attributes(&self) -> bool {
        self.first_attr.is_some()
    }
}

/// A stored attribute
#[derive(Debug, Clone)]
pub struct AttributeNode {
    /// Interned attribute name
    pub name: NameId,
    /// Value copied into the arena (not interned)
    pub value: Span,
    /// Owning element
    pub owner: NodeId,
    pub next: Option<AttrId>,
}

impl AttributeNode {
    pub fn new(name: NameId, owner: NodeId) -> Self {
        AttributeNode {
            name,
            value: Span::default(),
            owner,
            next: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::arena::Arena;
    use crate::dom::strings::InternPool;

    #[test]
    fn test_element_node() {
        let mut arena = Arena::new(64);
        let mut pool = InternPool::new();
        let name = pool.intern(&mut arena, "row").unwrap();
        let elem = ElementNode::new(name, Some(3), 12);
        assert_eq!(elem.parent, Some(3));
        assert_eq!(elem.line, 12);
        assert!(!elem.has_children());
        assert!(!elem.has_attributes());
    }

    #[test]
    fn test_attribute_defaults_to_empty_value() {
        let mut arena = Arena::new(64);
        let mut pool = InternPool::new();
        let name = pool.intern(&mut arena, "r").unwrap();
        let attr = AttributeNode::new(name, 0);
        assert!(attr.value.is_empty());
        assert_eq!(attr.owner, 0);
    }
}
