//! Elixir Term Conversion Utilities
//!
//! Converts elements and statistics to Elixir terms.

use crate::dom::{ArenaStats, Element};
use rustler::{Encoder, Env, NewBinary, Term};

rustler::atoms! {
    element,
    blocks,
    bytes_used,
    interned,
    unique_names,
    hits,
    copied,
}

/// Convert an element subtree to `{:element, name, attrs, text, children}`
pub fn element_to_term<'a>(env: Env<'a>, elem: Element<'_>) -> Term<'a> {
    let name_term = str_to_binary(env, elem.name());

    let attrs: Vec<Term<'a>> = elem
        .attributes()
        .map(|a| (str_to_binary(env, a.name()), str_to_binary(env, a.value())).encode(env))
        .collect();

    let text = match elem.text() {
        Some(t) => str_to_binary(env, t),
        None => rustler::types::atom::nil().encode(env),
    };

    let children: Vec<Term<'a>> = elem.children().map(|c| element_to_term(env, c)).collect();

    (element(), name_term, attrs, text, children).encode(env)
}

/// Optional string to binary or nil
pub fn opt_str_to_term<'a>(env: Env<'a>, s: Option<&str>) -> Term<'a> {
    match s {
        Some(s) => str_to_binary(env, s),
        None => rustler::types::atom::nil().encode(env),
    }
}

/// Arena statistics as a keyword list
pub fn stats_to_term<'a>(env: Env<'a>, stats: ArenaStats) -> Term<'a> {
    vec![
        (blocks(), stats.blocks),
        (bytes_used(), stats.bytes_used),
        (interned(), stats.interned),
        (unique_names(), stats.unique_names),
        (hits(), stats.hits),
        (copied(), stats.copied),
    ]
    .encode(env)
}

/// Convert a string to a binary term (more efficient than .encode())
#[inline]
pub fn str_to_binary<'a>(env: Env<'a>, s: &str) -> Term<'a> {
    let bytes = s.as_bytes();
    let mut binary = NewBinary::new(env, bytes.len());
    binary.as_mut_slice().copy_from_slice(bytes);
    binary.into()
}
