//! SQLite SQL dialect implementation

use super::SqlDialect;

/// SQLite SQL dialect
pub struct SqliteDialect;

impl SqlDialect for SqliteDialect {
    fn name(&self) -> &'static str {
        "sqlite"
    }

    fn placeholder(&self, _index: usize) -> String {
        "?".to_string()
    }

    fn json_entries(&self, col: &str, alias: &str) -> String {
        format!("json_each({}) {}", col, alias)
    }

    fn json_entry_text(&self, alias: &str) -> String {
        // Same CASE the v2 migration uses to backfill event_attributes
        format!(
            "CASE {a}.type WHEN 'true' THEN 'true' WHEN 'false' THEN 'false' \
             WHEN 'object' THEN {a}.value WHEN 'array' THEN {a}.value \
             ELSE CAST({a}.atom AS TEXT) END",
            a = alias
        )
    }

    fn is_numeric_text(&self, expr: &str) -> String {
        // json_type() raises on malformed input, so it only runs on valid JSON
        format!(
            "(CASE WHEN json_valid({e}) THEN json_type({e}) END IN ('integer', 'real'))",
            e = expr
        )
    }

    fn cast_to_numeric(&self, expr: &str) -> String {
        format!("CAST({} AS REAL)", expr)
    }

    fn cast_to_date(&self, expr: &str) -> String {
        format!("date({})", expr)
    }
}
