//! SQL dialect trait for multi-database support
//!
//! This trait defines the interface for generating database-specific SQL syntax
//! used by the filter compiler.

/// SQL dialect trait for generating database-specific SQL
///
/// Different databases have different syntax for:
/// - Parameter placeholders (? vs $1)
/// - Iterating the members of a JSON object
/// - Type checks and casts
pub trait SqlDialect: Send + Sync {
    /// Get the dialect name
    fn name(&self) -> &'static str;

    /// Generate a parameter placeholder for the given index (1-based)
    ///
    /// - SQLite: Always returns "?"
    /// - PostgreSQL: Returns "$1", "$2", etc.
    fn placeholder(&self, index: usize) -> String;

    /// Quote an identifier, doubling any embedded quote
    fn quote_identifier(&self, ident: &str) -> String {
        format!("\"{}\"", ident.replace('"', "\"\""))
    }

    /// `FROM` item listing the top-level members of a JSON object column,
    /// one row per member with the member name in `alias.key`
    ///
    /// - SQLite: `json_each(col) alias`
    /// - PostgreSQL: `jsonb_each_text(col) alias`
    fn json_entries(&self, col: &str, alias: &str) -> String;

    /// Text of a member row from [`SqlDialect::json_entries`]
    ///
    /// Matches the `event_attributes.value` mirror: strings unquoted,
    /// booleans as `true`/`false`, numbers in their JSON spelling, nested
    /// values as JSON text and `null` as NULL.
    fn json_entry_text(&self, alias: &str) -> String;

    /// Boolean expression: the text `expr` spells a JSON number
    ///
    /// Non-numeric text must not reach [`SqlDialect::cast_to_numeric`]; SQLite
    /// would read it as 0.
    fn is_numeric_text(&self, expr: &str) -> String;

    /// Cast an expression to a numeric type
    ///
    /// - SQLite: `CAST(x AS REAL)`
    /// - PostgreSQL: `CAST(x AS NUMERIC)`
    fn cast_to_numeric(&self, expr: &str) -> String;

    /// Numeric value of a text expression, NULL when it is not a number
    fn numeric_text(&self, expr: &str) -> String {
        format!(
            "CASE WHEN {} THEN {} END",
            self.is_numeric_text(expr),
            self.cast_to_numeric(expr)
        )
    }

    /// Truncate an expression to a calendar date
    ///
    /// - SQLite: `date(x)`
    /// - PostgreSQL: `CAST(x AS DATE)`
    fn cast_to_date(&self, expr: &str) -> String;
}
