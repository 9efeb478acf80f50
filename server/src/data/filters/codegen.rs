//! Predicate compiler
//!
//! Lowers a [`Predicate`] into a parameterized SQL boolean expression for one
//! [`SqlDialect`]. Every literal and every attribute key becomes a bound
//! parameter; only column names (already restricted by the tokenizer, and
//! quoted here) and fixed SQL keywords end up in the predicate text.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::ast::{Condition, Literal, Predicate, float_text};
use super::error::CompileError;
use super::fragment::{QueryFragment, SqlParams, SqlValue};
use super::resolver::{FieldKind, resolve};
use super::token::Operator;
use crate::data::sql::{Backend, SqlDialect};

/// Column whitelists for filterable tables
pub mod columns {
    /// Structured columns of the `events` table a filter may reference
    pub const EVENT_FILTERABLE: &[&str] = &[
        "id",
        "trace_id",
        "span_id",
        "parent_span_id",
        "message",
        "service_name",
        "start_timestamp",
        "end_timestamp",
        "duration",
        "is_trace",
    ];
}

/// How dynamic attributes are stored next to the event row
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttributeStorage {
    /// JSON object in the row's `attributes` column
    #[default]
    Json,
    /// One `event_attributes(event_id, name, value)` row per key
    KeyValue,
}

impl AttributeStorage {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeStorage::Json => "json",
            AttributeStorage::KeyValue => "key_value",
        }
    }
}

impl fmt::Display for AttributeStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AttributeStorage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(AttributeStorage::Json),
            "key_value" | "key-value" | "kv" => Ok(AttributeStorage::KeyValue),
            _ => Err(format!(
                "Invalid attribute storage '{}'. Valid options: json, key_value",
                s
            )),
        }
    }
}

/// Configurable filter compiler
///
/// The default targets SQLite with JSON attribute storage, row alias `e`
/// and no column whitelist.
#[derive(Debug, Clone)]
pub struct FilterCompiler {
    backend: Backend,
    storage: AttributeStorage,
    alias: String,
    columns: Option<&'static [&'static str]>,
}

impl Default for FilterCompiler {
    fn default() -> Self {
        Self::new(Backend::Sqlite)
    }
}

impl FilterCompiler {
    pub fn new(backend: Backend) -> Self {
        Self {
            backend,
            storage: AttributeStorage::default(),
            alias: "e".to_string(),
            columns: None,
        }
    }

    pub fn storage(mut self, storage: AttributeStorage) -> Self {
        self.storage = storage;
        self
    }

    /// Alias of the events row in the surrounding query
    pub fn alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = alias.into();
        self
    }

    /// Reject column fields outside this list
    pub fn columns(mut self, columns: &'static [&'static str]) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn backend(&self) -> Backend {
        self.backend
    }

    pub fn attribute_storage(&self) -> AttributeStorage {
        self.storage
    }

    fn dialect(&self) -> &'static dyn SqlDialect {
        self.backend.dialect()
    }

    /// Lower an already parsed predicate
    pub fn compile_predicate(
        &self,
        predicate: &Predicate,
        known: &HashSet<String>,
    ) -> Result<QueryFragment, CompileError> {
        let mut params = SqlParams::default();
        let sql = self.lower(predicate, known, &mut params)?;
        Ok(QueryFragment {
            sql,
            params: params.into_inner(),
        })
    }

    fn lower(
        &self,
        predicate: &Predicate,
        known: &HashSet<String>,
        params: &mut SqlParams,
    ) -> Result<String, CompileError> {
        let (children, joiner) = match predicate {
            Predicate::Condition(condition) => return self.condition(condition, known, params),
            Predicate::And(children) => (children, " AND "),
            Predicate::Or(children) => (children, " OR "),
        };

        let parts = children
            .iter()
            .map(|child| self.lower(child, known, params))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(format!("({})", parts.join(joiner)))
    }

    fn condition(
        &self,
        condition: &Condition,
        known: &HashSet<String>,
        params: &mut SqlParams,
    ) -> Result<String, CompileError> {
        let dialect = self.dialect();
        let field = condition.field.as_str();

        if resolve(field, known) == FieldKind::Column {
            if self.columns.is_some_and(|columns| !columns.contains(&field)) {
                return Err(CompileError::UnknownField {
                    field: field.to_string(),
                });
            }
            let lhs = format!("{}.{}", self.alias, dialect.quote_identifier(field));
            return Ok(self.comparison(&lhs, false, condition, params));
        }

        // Both storages expose the attribute as the same text value, so a
        // filter matches the same rows whichever one is configured
        let name = dialect.placeholder(params.push(SqlValue::Text(field.to_string())));
        let (source, key, value) = match self.storage {
            AttributeStorage::Json => (
                dialect.json_entries(&format!("{}.attributes", self.alias), "j"),
                "j.key".to_string(),
                dialect.json_entry_text("j"),
            ),
            AttributeStorage::KeyValue => (
                "event_attributes a".to_string(),
                format!("a.event_id = {}.id AND a.name", self.alias),
                "a.value".to_string(),
            ),
        };
        let cmp = self.comparison(&value, true, condition, params);
        Ok(format!(
            "EXISTS (SELECT 1 FROM {} WHERE {} = {} AND {})",
            source, key, name, cmp
        ))
    }

    /// `lhs <op> <param>`; `attribute` marks an untyped text value, which
    /// compares numerically only when it spells a number
    fn comparison(
        &self,
        lhs: &str,
        attribute: bool,
        condition: &Condition,
        params: &mut SqlParams,
    ) -> String {
        let dialect = self.dialect();
        let op = condition.operator;

        if op == Operator::Like {
            let pattern = format!("%{}%", escape_like(&like_text(&condition.value)));
            let ph = dialect.placeholder(params.push(SqlValue::Text(pattern)));
            return format!("{} LIKE {} ESCAPE '\\'", lhs, ph);
        }

        let (lhs, value) = match &condition.value {
            Literal::Date(date) => {
                let ph = dialect.placeholder(params.push(SqlValue::Date(*date)));
                return format!(
                    "{} {} {}",
                    dialect.cast_to_date(lhs),
                    op,
                    dialect.cast_to_date(&ph)
                );
            }
            Literal::String(s) => (lhs.to_string(), SqlValue::Text(s.clone())),
            Literal::Integer(i) if attribute => {
                (dialect.numeric_text(lhs), SqlValue::Integer(*i))
            }
            Literal::Float(v) if attribute => (dialect.numeric_text(lhs), SqlValue::Float(*v)),
            Literal::Integer(i) => (lhs.to_string(), SqlValue::Integer(*i)),
            Literal::Float(v) => (lhs.to_string(), SqlValue::Float(*v)),
        };
        let ph = dialect.placeholder(params.push(value));
        format!("{} {} {}", lhs, op, ph)
    }
}

/// Escape LIKE metacharacters so user text matches literally under `ESCAPE '\'`
fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Text a LIKE pattern is built from
fn like_text(value: &Literal) -> String {
    match value {
        Literal::String(s) => s.clone(),
        Literal::Integer(i) => i.to_string(),
        Literal::Float(v) => float_text(*v),
        Literal::Date(d) => SqlValue::date_text(d),
    }
}
