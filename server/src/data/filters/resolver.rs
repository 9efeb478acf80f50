//! Field resolution
//!
//! Decides whether a filter field names a structured event column or a key in
//! the event's dynamic attribute payload.

use std::collections::HashSet;

/// Where a field's value lives
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Column,
    DynamicAttribute,
}

/// Resolve a field against the known attribute names.
///
/// Policy "attribute wins": exact membership in `known` makes the field a
/// dynamic attribute even when a column of the same name exists. Anything
/// else is a column. Dotted names are opaque keys, not nested paths.
pub fn resolve(field: &str, known: &HashSet<String>) -> FieldKind {
    if known.contains(field) {
        FieldKind::DynamicAttribute
    } else {
        FieldKind::Column
    }
}
