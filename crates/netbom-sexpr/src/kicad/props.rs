//! Common KiCad-ish S-expression query helpers.
//!
//! Netlist exports use small list nodes that behave like key/value properties:
//! `(tag "value")`, `(tag value)`, `(tag 123)`. Depending on the KiCad version the
//! value is quoted or not, so these helpers accept both.

use crate::Sexpr;
use crate::find_child_list;

/// Placeholder KiCad writes for an unset property.
pub const UNSET: &str = "~";

/// Find a direct child list `(tag ...)` within `list`.
pub fn child_list<'a>(list: &'a [Sexpr], tag: &str) -> Option<&'a [Sexpr]> {
    find_child_list(list, tag)
}

/// Find an atom property `(tag VALUE)` or `(tag "VALUE")` within `list`.
pub fn atom_prop(list: &[Sexpr], tag: &str) -> Option<String> {
    child_list(list, tag)?
        .get(1)?
        .as_atom()
        .map(|s| s.to_string())
}

/// Like [`atom_prop`], but treats the `~` placeholder and empty text as absent.
pub fn non_empty_atom_prop(list: &[Sexpr], tag: &str) -> Option<String> {
    atom_prop(list, tag).filter(|s| !s.is_empty() && s != UNSET)
}

/// Find an integer property `(tag 123)` within `list`.
pub fn int_prop(list: &[Sexpr], tag: &str) -> Option<i64> {
    child_list(list, tag)?.get(1)?.as_int()
}
