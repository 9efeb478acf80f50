//! Compiled filter output

use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// A bound query parameter
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum SqlValue {
    Text(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl SqlValue {
    /// Date parameters as stored in SQLite, which has no native date type
    pub fn date_text(date: &NaiveDate) -> String {
        date.format("%Y-%m-%d").to_string()
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Text(s) => write!(f, "{:?}", s),
            SqlValue::Integer(i) => write!(f, "{}", i),
            SqlValue::Float(v) => write!(f, "{:?}", v),
            SqlValue::Date(d) => write!(f, "{}", Self::date_text(d)),
        }
    }
}

/// Boolean predicate plus its parameters, in placeholder order
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryFragment {
    pub sql: String,
    pub params: Vec<SqlValue>,
}

/// Accumulates parameters while predicate text is being emitted
#[derive(Debug, Default)]
pub(crate) struct SqlParams {
    values: Vec<SqlValue>,
}

impl SqlParams {
    /// Push a value, returning its 1-based index
    pub(crate) fn push(&mut self, value: SqlValue) -> usize {
        self.values.push(value);
        self.values.len()
    }

    pub(crate) fn into_inner(self) -> Vec<SqlValue> {
        self.values
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_params_are_numbered_in_push_order() {
        let mut params = SqlParams::default();
        assert_eq!(params.push(SqlValue::Integer(1)), 1);
        assert_eq!(params.push(SqlValue::Text("x".into())), 2);
        assert_eq!(
            params.into_inner(),
            vec![SqlValue::Integer(1), SqlValue::Text("x".into())]
        );
    }

    #[test]
    fn test_display() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 9).unwrap();
        assert_eq!(SqlValue::Date(date).to_string(), "2024-03-09");
        assert_eq!(SqlValue::Text("a'b".into()).to_string(), "\"a'b\"");
        assert_eq!(SqlValue::Float(2.0).to_string(), "2.0");
    }
}
