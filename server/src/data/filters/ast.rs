//! Predicate AST produced by the parser

use std::fmt;

use chrono::NaiveDate;

use super::token::Operator;

/// Literal value on the right-hand side of a condition
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
}

impl Literal {
    pub fn is_numeric(&self) -> bool {
        matches!(self, Literal::Integer(_) | Literal::Float(_))
    }
}

/// Plain decimal spelling of a float that lexes back as a float
///
/// `Display` for `f64` never uses an exponent but drops `.0` from whole
/// values, which would read back as an integer.
pub(crate) fn float_text(v: f64) -> String {
    let text = v.to_string();
    if text.contains('.') {
        text
    } else {
        format!("{}.0", text)
    }
}

impl fmt::Display for Literal {
    /// Renders the literal back in filter syntax
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::String(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Integer(i) => write!(f, "{}", i),
            Literal::Float(v) => f.write_str(&float_text(*v)),
            Literal::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
        }
    }
}

/// Leaf predicate: `field operator literal`
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Literal,
}

/// Boolean predicate tree. `And`/`Or` always hold at least two children.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Condition(Condition),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
}

impl Predicate {
    /// Number of leaf conditions in the tree
    pub fn condition_count(&self) -> usize {
        match self {
            Predicate::Condition(_) => 1,
            Predicate::And(children) | Predicate::Or(children) => {
                children.iter().map(Predicate::condition_count).sum()
            }
        }
    }
}

impl fmt::Display for Predicate {
    /// Renders the tree in filter syntax with every group parenthesized,
    /// so parsing the output yields the same tree
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (children, joiner) = match self {
            Predicate::Condition(c) => {
                return write!(f, "{} {} {}", c.field, c.operator, c.value);
            }
            Predicate::And(children) => (children, " AND "),
            Predicate::Or(children) => (children, " OR "),
        };

        f.write_str("(")?;
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                f.write_str(joiner)?;
            }
            write!(f, "{}", child)?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_text_has_no_exponent() {
        assert_eq!(float_text(1e23), "100000000000000000000000.0");
        assert_eq!(float_text(1e-7), "0.0000001");
        assert_eq!(float_text(3.0), "3.0");
        assert_eq!(float_text(-0.25), "-0.25");
    }

    #[test]
    fn test_float_literal_display() {
        assert_eq!(Literal::Float(2.0).to_string(), "2.0");
        assert_eq!(Literal::Integer(2).to_string(), "2");
    }
}
