//! XML Document - arena-backed element tree
//!
//! A `Document` owns everything produced by one successful parse:
//! - Element and attribute records, addressed by index
//! - The arena holding every name, value and pcdata string
//! - The intern pool mapping names to their single stored copy
//!
//! Nothing is freed individually; dropping (or `release`-ing) the document
//! frees it all at once. After parsing the tree is read-only and is
//! accessed through the borrowed `Element` / `Attribute` handles.

use super::arena::Arena;
use super::node::{AttrId, AttributeNode, ElementNode, NodeId};
use super::strings::{InternPool, NameId};
use crate::error::ArenaError;
use std::fmt;

/// Allocation statistics for one document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArenaStats {
    /// Arena blocks held
    pub blocks: usize,
    /// Bytes handed out, padding included
    pub bytes_used: usize,
    /// Name intern requests
    pub interned: usize,
    /// Distinct names stored
    pub unique_names: usize,
    /// Intern requests answered by an existing entry
    pub hits: usize,
    /// Values, pcdata and doctype copied without interning
    pub copied: usize,
}

/// A parsed XML document
pub struct Document {
    arena: Arena,
    names: InternPool,
    elements: Vec<ElementNode>,
    attributes: Vec<AttributeNode>,
    /// First element at the outermost level
    root: Option<NodeId>,
    last_root: Option<NodeId>,
    doctype: Option<super::arena::Span>,
    copied: usize,
}

impl Document {
    pub(crate) fn new(block_size: usize) -> Self {
        Document {
            arena: Arena::new(block_size),
            names: InternPool::new(),
            elements: Vec::with_capacity(256),
            attributes: Vec::with_capacity(128),
            root: None,
            last_root: None,
            doctype: None,
            copied: 0,
        }
    }

    // ------------------------------------------------------------------
    // Construction (parser only)
    // ------------------------------------------------------------------

    /// Append a new element to `parent`'s child list (or the outermost list)
    pub(crate) fn add_element(
        &mut self,
        parent: Option<NodeId>,
        name: &str,
        line: u32,
    ) -> Result<NodeId, ArenaError> {
        let name = self.names.intern(&mut self.arena, name)?;
        let id = self.elements.len() as NodeId;
        self.elements.push(ElementNode::new(name, parent, line));

        let prev = match parent {
            Some(p) => {
                let node = &mut self.elements[p as usize];
                let prev = node.last_child.replace(id);
                if prev.is_none() {
                    node.first_child = Some(id);
                }
                prev
            }
            None => {
                let prev = self.last_root.replace(id);
                if prev.is_none() {
                    self.root = Some(id);
                }
                prev
            }
        };
        if let Some(prev) = prev {
            self.elements[prev as usize].next_sibling = Some(id);
        }
        Ok(id)
    }

    /// Append a valueless attribute to an element
    pub(crate) fn add_attribute(&mut self, owner: NodeId, name: &str) -> Result<AttrId, ArenaError> {
        let name = self.names.intern(&mut self.arena, name)?;
        let id = self.attributes.len() as AttrId;
        self.attributes.push(AttributeNode::new(name, owner));

        let node = &mut self.elements[owner as usize];
        match node.last_attr.replace(id) {
            Some(prev) => self.attributes[prev as usize].next = Some(id),
            None => node.first_attr = Some(id),
        }
        Ok(id)
    }

    pub(crate) fn set_attribute_value(&mut self, attr: AttrId, value: &str) -> Result<(), ArenaError> {
        let span = self.arena.alloc_str(value)?;
        self.copied += 1;
        self.attributes[attr as usize].value = span;
        Ok(())
    }

    pub(crate) fn set_pcdata(&mut self, node: NodeId, text: &str) -> Result<(), ArenaError> {
        let span = self.arena.alloc_str(text)?;
        self.copied += 1;
        self.elements[node as usize].pcdata = Some(span);
        Ok(())
    }

    pub(crate) fn set_doctype(&mut self, doctype: &str) -> Result<(), ArenaError> {
        let span = self.arena.alloc_str(doctype)?;
        self.copied += 1;
        self.doctype = Some(span);
        Ok(())
    }

    /// Compare an element's name with a candidate by intern id
    pub(crate) fn name_is(&self, node: NodeId, name: &str) -> bool {
        self.names.lookup(&self.arena, name) == Some(self.elements[node as usize].name)
    }

    pub(crate) fn name_id(&self, name: &str) -> Option<NameId> {
        self.names.lookup(&self.arena, name)
    }

    fn resolve(&self, name: NameId) -> &str {
        self.names.resolve(&self.arena, name).unwrap_or("")
    }

    // ------------------------------------------------------------------
    // Access
    // ------------------------------------------------------------------

    /// First element at the outermost level
    pub fn root(&self) -> Option<Element<'_>> {
        self.root.map(|id| Element { doc: self, id })
    }

    /// Every element at the outermost level, in document order
    pub fn roots(&self) -> Siblings<'_> {
        Siblings { doc: self, next: self.root }
    }

    /// Element by id
    pub fn element(&self, id: NodeId) -> Option<Element<'_>> {
        if (id as usize) < self.elements.len() {
            Some(Element { doc: self, id })
        } else {
            None
        }
    }

    /// The DOCTYPE declaration body, trimmed
    pub fn doctype(&self) -> Option<&str> {
        self.doctype.and_then(|span| self.arena.str(span))
    }

    pub fn element_count(&self) -> usize {
        self.elements.len()
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// How often a name occurred as an element or attribute name
    pub fn name_hits(&self, name: &str) -> Option<u32> {
        self.names.lookup(&self.arena, name).map(|id| self.names.hits(id))
    }

    /// Number of distinct element and attribute names
    pub fn unique_names(&self) -> usize {
        self.names.len()
    }

    pub fn stats(&self) -> ArenaStats {
        ArenaStats {
            blocks: self.arena.block_count(),
            bytes_used: self.arena.bytes_used(),
            interned: self.names.requests(),
            unique_names: self.names.len(),
            hits: self.names.requests() - self.names.len(),
            copied: self.copied,
        }
    }

    /// Free the whole document at once
    pub fn release(mut self) -> ArenaStats {
        let stats = self.stats();
        tracing::debug!(
            blocks = stats.blocks,
            bytes = stats.bytes_used,
            interned = stats.interned,
            unique = stats.unique_names,
            copied = stats.copied,
            "releasing document"
        );
        self.arena.release();
        stats
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("elements", &self.elements.len())
            .field("attributes", &self.attributes.len())
            .field("doctype", &self.doctype())
            .field("arena", &self.arena)
            .finish()
    }
}

/// Borrowed handle to an element
#[derive(Clone, Copy)]
pub struct Element<'d> {
    doc: &'d Document,
    id: NodeId,
}

impl<'d> Element<'d> {
    #[inline]
    fn node(&self) -> &'d ElementNode {
        &self.doc.elements[self.id as usize]
    }

    #[inline]
    fn at(&self, id: Option<NodeId>) -> Option<Element<'d>> {
        id.map(|id| Element { doc: self.doc, id })
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn document(&self) -> &'d Document {
        self.doc
    }

    pub fn name(&self) -> &'d str {
        self.doc.resolve(self.node().name)
    }

    /// Interned name id; equal ids mean equal names within one document
    pub fn name_id(&self) -> NameId {
        self.node().name
    }

    /// Character data before the first child
    pub fn text(&self) -> Option<&'d str> {
        self.node().pcdata.and_then(|span| self.doc.arena.str(span))
    }

    /// Source line the element opened on
    pub fn line(&self) -> u32 {
        self.node().line
    }

    pub fn parent(&self) -> Option<Element<'d>> {
        self.at(self.node().parent)
    }

    pub fn first_child(&self) -> Option<Element<'d>> {
        self.at(self.node().first_child)
    }

    pub fn next_sibling(&self) -> Option<Element<'d>> {
        self.at(self.node().next_sibling)
    }

    pub fn has_children(&self) -> bool {
        self.node().has_children()
    }

    pub fn children(&self) -> Siblings<'d> {
        Siblings { doc: self.doc, next: self.node().first_child }
    }

    pub fn attributes(&self) -> Attributes<'d> {
        Attributes { doc: self.doc, next: self.node().first_attr }
    }

    /// Value of the first attribute named `name`
    pub fn attribute(&self, name: &str) -> Option<&'d str> {
        let id = self.doc.name_id(name)?;
        self.attributes().find(|a| a.name_id() == id).map(|a| a.value())
    }
}

impl PartialEq for Element<'_> {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.doc, other.doc) && self.id == other.id
    }
}

impl Eq for Element<'_> {}

impl fmt::Debug for Element<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Element")
            .field("id", &self.id)
            .field("name", &self.name())
            .field("line", &self.line())
            .finish()
    }
}

/// Borrowed handle to an attribute
#[derive(Clone, Copy)]
pub struct Attribute<'d> {
    doc: &'d Document,
    id: AttrId,
}

impl<'d> Attribute<'d> {
    #[inline]
    fn node(&self) -> &'d AttributeNode {
        &self.doc.attributes[self.id as usize]
    }

    pub fn name(&self) -> &'d str {
        self.doc.resolve(self.node().name)
    }

    pub fn name_id(&self) -> NameId {
        self.node().name
    }

    pub fn value(&self) -> &'d str {
        self.doc.arena.str(self.node().value).unwrap_or("")
    }

    pub fn owner(&self) -> Element<'d> {
        Element { doc: self.doc, id: self.node().owner }
    }
}

impl fmt::Debug for Attribute<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Attribute")
            .field(&self.name())
            .field(&self.value())
            .finish()
    }
}

/// Iterator over a sibling chain
pub struct Siblings<'d> {
    doc: &'d Document,
    next: Option<NodeId>,
}

impl<'d> Iterator for Siblings<'d> {
    type Item = Element<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.elements[id as usize].next_sibling;
        Some(Element { doc: self.doc, id })
    }
}

/// Iterator over an element's attributes in document order
pub struct Attributes<'d> {
    doc: &'d Document,
    next: Option<AttrId>,
}

impl<'d> Iterator for Attributes<'d> {
    type Item = Attribute<'d>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.next?;
        self.next = self.doc.attributes[id as usize].next;
        Some(Attribute { doc: self.doc, id })
    }
}
