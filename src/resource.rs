//! ResourceArc wrapper
//!
//! A parsed document held between NIF calls.

use crate::dom::Document;
use rustler::ResourceArc;
use std::sync::Mutex;

/// Document storage for a ResourceArc
///
/// `None` once the document has been released.
pub struct DocumentResource {
    pub doc: Mutex<Option<Document>>,
}

impl DocumentResource {
    pub fn new(doc: Document) -> Self {
        DocumentResource {
            doc: Mutex::new(Some(doc)),
        }
    }

    /// Run `f` against the document.
    ///
    /// # Errors
    ///
    /// Returns `"mutex_poisoned"` if the document mutex is poisoned,
    /// or `"released"` if the document was already released.
    pub fn with_document<F, R>(&self, f: F) -> Result<R, &'static str>
    where
        F: FnOnce(&Document) -> R,
    {
        let guard = self.doc.lock().map_err(|_| "mutex_poisoned")?;
        let doc = guard.as_ref().ok_or("released")?;
        Ok(f(doc))
    }

    /// Take the document out, leaving the resource empty
    pub fn take(&self) -> Result<Option<Document>, &'static str> {
        let mut guard = self.doc.lock().map_err(|_| "mutex_poisoned")?;
        Ok(guard.take())
    }
}

#[rustler::resource_impl]
impl rustler::Resource for DocumentResource {}

/// Type alias for the ResourceArc
pub type DocumentRef = ResourceArc<DocumentResource>;
