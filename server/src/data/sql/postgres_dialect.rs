//! PostgreSQL SQL dialect implementation
//!
//! Assumes `attributes` is a `jsonb` column.

use super::SqlDialect;

/// PostgreSQL SQL dialect
pub struct PostgresDialect;

impl SqlDialect for PostgresDialect {
    fn name(&self) -> &'static str {
        "postgres"
    }

    fn placeholder(&self, index: usize) -> String {
        format!("${}", index)
    }

    fn json_entries(&self, col: &str, alias: &str) -> String {
        format!("jsonb_each_text({}) {}", col, alias)
    }

    fn json_entry_text(&self, alias: &str) -> String {
        format!("{}.value", alias)
    }

    fn is_numeric_text(&self, expr: &str) -> String {
        format!(
            "({} ~ '^-?(0|[1-9][0-9]*)(\\.[0-9]+)?([eE][-+]?[0-9]+)?$')",
            expr
        )
    }

    fn cast_to_numeric(&self, expr: &str) -> String {
        format!("CAST({} AS NUMERIC)", expr)
    }

    fn cast_to_date(&self, expr: &str) -> String {
        format!("CAST({} AS DATE)", expr)
    }
}
