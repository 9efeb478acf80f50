//! `manta check`: compile a filter offline
//!
//! Prints the predicate and its bound parameters, or a stage-tagged error
//! with a caret under the failing position.

use std::collections::HashSet;
use std::fmt::Write;

use crate::data::filters::{AttributeStorage, FilterCompiler, FilterError, QueryFragment};
use crate::data::sql::Backend;

/// Compile `filter` as the server would, with `attributes` as the known set
pub fn check(
    filter: &str,
    attributes: &[String],
    dialect: Backend,
    storage: AttributeStorage,
) -> Result<String, (FilterError, String)> {
    let known: HashSet<String> = attributes.iter().cloned().collect();
    let compiler = FilterCompiler::new(dialect).storage(storage);

    match compiler.compile(filter, &known) {
        Ok(fragment) => Ok(render_fragment(&fragment, dialect, storage)),
        Err(e) => {
            let diagnostic = render_error(filter, &e);
            Err((e, diagnostic))
        }
    }
}

fn render_fragment(fragment: &QueryFragment, dialect: Backend, storage: AttributeStorage) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "dialect: {}", dialect);
    let _ = writeln!(out, "storage: {}", storage);
    let _ = writeln!(out, "sql:     {}", fragment.sql);
    if fragment.params.is_empty() {
        let _ = writeln!(out, "params:  (none)");
    } else {
        let _ = writeln!(out, "params:");
        for (i, value) in fragment.params.iter().enumerate() {
            let _ = writeln!(out, "  {:>3}: {}", i + 1, value);
        }
    }
    out
}

/// Filter text with a caret under the failing character, when the position is known
fn render_error(filter: &str, e: &FilterError) -> String {
    match e.position() {
        Some(position) => {
            let column = filter
                .char_indices()
                .take_while(|(i, _)| *i < position)
                .count();
            format!("  {}\n  {}^", filter, " ".repeat(column))
        }
        None => format!("  {}", filter),
    }
}
