//! BEAM binding surface
//!
//! Documents live in a ResourceArc between calls; lookups borrow them
//! under the resource mutex. Compiled paths are shared across documents.

use rustler::types::atom::{error, nil, ok};
use rustler::{Binary, Encoder, Env, NewBinary, NifResult, ResourceArc, Term};
use std::sync::{Mutex, OnceLock};

use crate::config::ParseOptions;
use crate::core::machine;
use crate::dom::{find_compiled, CompiledPath, PathCache};
use crate::resource::{DocumentRef, DocumentResource};
use crate::strategy::parallel;
use crate::term::{element_to_term, opt_str_to_term, stats_to_term, str_to_binary};

static PATHS: OnceLock<Mutex<PathCache>> = OnceLock::new();

fn compiled(path: &str) -> std::sync::Arc<CompiledPath> {
    let cache = PATHS.get_or_init(|| Mutex::new(PathCache::default()));
    match cache.lock() {
        Ok(mut guard) => guard.get_or_compile(path),
        Err(_) => std::sync::Arc::new(CompiledPath::compile(path)),
    }
}

fn resource_error(reason: &'static str) -> rustler::Error {
    rustler::Error::Term(Box::new(reason))
}

// ============================================================================
// Memory Tracking
// ============================================================================

#[cfg(feature = "memory_tracking")]
use std::sync::atomic::Ordering;

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory() -> usize {
    crate::tracking::ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(feature = "memory_tracking")]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    crate::tracking::PEAK_ALLOCATED.load(Ordering::SeqCst)
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory() -> usize {
    0
}

#[cfg(not(feature = "memory_tracking"))]
#[rustler::nif]
fn get_rust_memory_peak() -> usize {
    0
}

// ============================================================================
// Parsing
// ============================================================================

/// Parse into a document resource: `{:ok, doc}` or `{:error, reason}`
#[rustler::nif(schedule = "DirtyCpu")]
fn parse<'a>(env: Env<'a>, input: Binary<'a>, crush: bool, strip: bool) -> NifResult<Term<'a>> {
    let options = ParseOptions::new()
        .crush_whitespace(crush)
        .strip_namespace_prefixes(strip);
    match crate::parse(input.as_slice(), &options) {
        Ok(doc) => {
            let arc = ResourceArc::new(DocumentResource::new(doc));
            Ok((ok(), arc).encode(env))
        }
        Err(e) => Ok((error(), e.to_string()).encode(env)),
    }
}

/// Free the document now; returns its final arena statistics
#[rustler::nif]
fn release<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    match doc_ref.take().map_err(resource_error)? {
        Some(doc) => Ok(stats_to_term(env, doc.release())),
        None => Ok(nil().encode(env)),
    }
}

#[rustler::nif]
fn stats<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    doc_ref
        .with_document(|doc| stats_to_term(env, doc.stats()))
        .map_err(resource_error)
}

// ============================================================================
// Queries
// ============================================================================

/// First element matching `path`, with optional attribute filter
#[rustler::nif]
fn find<'a>(
    env: Env<'a>,
    doc_ref: DocumentRef,
    path: &str,
    attr: Option<&str>,
    value: Option<&str>,
) -> NifResult<Term<'a>> {
    let path = compiled(path);
    doc_ref
        .with_document(|doc| match find_compiled(doc.root(), &path, attr, value) {
            Some(elem) => element_to_term(env, elem),
            None => nil().encode(env),
        })
        .map_err(resource_error)
}

/// Attribute `name` of the element at `path`
#[rustler::nif]
fn attribute<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str, name: &str) -> NifResult<Term<'a>> {
    let path = compiled(path);
    doc_ref
        .with_document(|doc| {
            let elem = find_compiled(doc.root(), &path, None, None);
            opt_str_to_term(env, crate::dom::attribute(elem, name))
        })
        .map_err(resource_error)
}

/// Text of the element at `path`
#[rustler::nif]
fn text<'a>(env: Env<'a>, doc_ref: DocumentRef, path: &str) -> NifResult<Term<'a>> {
    let path = compiled(path);
    doc_ref
        .with_document(|doc| {
            let elem = find_compiled(doc.root(), &path, None, None);
            opt_str_to_term(env, elem.and_then(|e| e.text()))
        })
        .map_err(resource_error)
}

/// Many path lookups in parallel
#[rustler::nif(schedule = "DirtyCpu")]
fn find_many<'a>(env: Env<'a>, doc_ref: DocumentRef, paths: Vec<&str>) -> NifResult<Term<'a>> {
    doc_ref
        .with_document(|doc| {
            let found = parallel::find_paths(doc, &paths);
            let terms: Vec<Term<'a>> = found
                .into_iter()
                .map(|id| match id.and_then(|id| doc.element(id)) {
                    Some(elem) => element_to_term(env, elem),
                    None => nil().encode(env),
                })
                .collect();
            terms.encode(env)
        })
        .map_err(resource_error)
}

// ============================================================================
// Output
// ============================================================================

#[rustler::nif(schedule = "DirtyCpu")]
fn serialize<'a>(env: Env<'a>, doc_ref: DocumentRef) -> NifResult<Term<'a>> {
    doc_ref
        .with_document(|doc| {
            let mut out = Vec::new();
            match doc.write_to(&mut out) {
                Ok(()) => {
                    let mut binary = NewBinary::new(env, out.len());
                    binary.as_mut_slice().copy_from_slice(&out);
                    let term: Term<'a> = binary.into();
                    term
                }
                Err(e) => (error(), e.to_string()).encode(env),
            }
        })
        .map_err(resource_error)
}

/// Graphviz rendering of the parser state table
#[rustler::nif]
fn state_diagram<'a>(env: Env<'a>) -> Term<'a> {
    str_to_binary(env, &machine::to_dot())
}

rustler::init!("Elixir.DocXml.Native");
