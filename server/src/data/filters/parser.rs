//! Recursive-descent filter parser
//!
//! Grammar, lowest precedence first:
//!
//! ```text
//! or        := and (OR and)*
//! and       := term (AND term)*
//! term      := condition | '(' or ')'
//! condition := IDENTIFIER OPERATOR literal
//! literal   := STRING | NUMBER | DATE
//! ```
//!
//! `AND` binds tighter than `OR`. Chains of the same connective are collected
//! into one n-ary node, a single operand is returned unwrapped.

use super::ast::{Condition, Literal, Predicate};
use super::error::ParseError;
use super::token::{Token, TokenKind};

/// Maximum parenthesis nesting accepted before giving up
pub const MAX_NESTING_DEPTH: usize = 64;

/// Parse a token stream into a predicate tree
pub fn parse(tokens: &[Token]) -> Result<Predicate, ParseError> {
    if tokens.is_empty() {
        return Err(ParseError::Empty);
    }

    let mut parser = Parser {
        tokens,
        pos: 0,
        depth: 0,
    };
    let predicate = parser.or_expr()?;

    if let Some(token) = parser.peek() {
        return Err(match token.kind {
            TokenKind::CloseParen => ParseError::UnexpectedToken {
                expected: "AND, OR or end of input",
                found: token.kind.describe(),
                position: token.position,
            },
            _ => ParseError::TrailingInput {
                found: token.kind.describe(),
                position: token.position,
            },
        });
    }

    Ok(predicate)
}

struct Parser<'a> {
    tokens: &'a [Token],
    pos: usize,
    depth: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> Option<&'a Token> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<&'a Token> {
        let token = self.tokens.get(self.pos);
        if token.is_some() {
            self.pos += 1;
        }
        token
    }

    /// Position just past the last token, used for end-of-input errors
    fn end_position(&self) -> usize {
        self.tokens
            .last()
            .map(|t| t.position + t.text.len())
            .unwrap_or(0)
    }

    fn or_expr(&mut self) -> Result<Predicate, ParseError> {
        let first = self.and_expr()?;
        let mut operands = vec![first];
        while self.peek().is_some_and(|t| t.kind == TokenKind::Or) {
            self.pos += 1;
            operands.push(self.and_expr()?);
        }
        Ok(collapse(operands, Predicate::Or))
    }

    fn and_expr(&mut self) -> Result<Predicate, ParseError> {
        let first = self.term()?;
        let mut operands = vec![first];
        while self.peek().is_some_and(|t| t.kind == TokenKind::And) {
            self.pos += 1;
            operands.push(self.term()?);
        }
        Ok(collapse(operands, Predicate::And))
    }

    fn term(&mut self) -> Result<Predicate, ParseError> {
        let Some(token) = self.peek() else {
            return Err(ParseError::UnexpectedEnd {
                expected: "condition or '('",
                position: self.end_position(),
            });
        };

        match &token.kind {
            TokenKind::OpenParen => self.group(token),
            TokenKind::Identifier(field) => {
                self.pos += 1;
                self.condition(field.clone()).map(Predicate::Condition)
            }
            _ => Err(ParseError::UnexpectedToken {
                expected: "condition or '('",
                found: token.kind.describe(),
                position: token.position,
            }),
        }
    }

    fn group(&mut self, open: &'a Token) -> Result<Predicate, ParseError> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::NestingTooDeep {
                max: MAX_NESTING_DEPTH,
                position: open.position,
            });
        }

        self.pos += 1;
        self.depth += 1;
        let inner = self.or_expr()?;
        self.depth -= 1;

        match self.next() {
            Some(t) if t.kind == TokenKind::CloseParen => Ok(inner),
            Some(t) => Err(ParseError::UnexpectedToken {
                expected: "')'",
                found: t.kind.describe(),
                position: t.position,
            }),
            None => Err(ParseError::UnmatchedParen {
                position: open.position,
            }),
        }
    }

    /// Operator and literal following an already consumed field name
    fn condition(&mut self, field: String) -> Result<Condition, ParseError> {
        let operator = match self.next() {
            Some(Token {
                kind: TokenKind::Operator(op),
                ..
            }) => *op,
            Some(t) => {
                return Err(ParseError::UnexpectedToken {
                    expected: "operator",
                    found: t.kind.describe(),
                    position: t.position,
                });
            }
            None => {
                return Err(ParseError::UnexpectedEnd {
                    expected: "operator",
                    position: self.end_position(),
                });
            }
        };

        let value = match self.next() {
            Some(t) => match &t.kind {
                TokenKind::String(s) => Literal::String(s.clone()),
                TokenKind::Integer(i) => Literal::Integer(*i),
                TokenKind::Float(f) => Literal::Float(*f),
                TokenKind::Date(d) => Literal::Date(*d),
                other => {
                    return Err(ParseError::UnexpectedToken {
                        expected: "literal",
                        found: other.describe(),
                        position: t.position,
                    });
                }
            },
            None => {
                return Err(ParseError::UnexpectedEnd {
                    expected: "literal",
                    position: self.end_position(),
                });
            }
        };

        Ok(Condition {
            field,
            operator,
            value,
        })
    }
}

fn collapse(mut operands: Vec<Predicate>, build: fn(Vec<Predicate>) -> Predicate) -> Predicate {
    if operands.len() == 1 {
        operands.remove(0)
    } else {
        build(operands)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filters::token::{Operator, tokenize};

    fn parse_str(input: &str) -> Result<Predicate, ParseError> {
        parse(&tokenize(input).unwrap())
    }

    fn cond(field: &str, value: i64) -> Predicate {
        Predicate::Condition(Condition {
            field: field.to_string(),
            operator: Operator::Eq,
            value: Literal::Integer(value),
        })
    }

    #[test]
    fn test_single_condition() {
        assert_eq!(parse_str("a = 1").unwrap(), cond("a", 1));
    }

    #[test]
    fn test_and_binds_tighter_than_or() {
        let tree = parse_str("a=1 OR b=2 AND c=3").unwrap();
        assert_eq!(
            tree,
            Predicate::Or(vec![
                cond("a", 1),
                Predicate::And(vec![cond("b", 2), cond("c", 3)]),
            ])
        );
    }

    #[test]
    fn test_and_first_then_or() {
        let tree = parse_str("a=1 AND b=2 OR c=3").unwrap();
        assert_eq!(
            tree,
            Predicate::Or(vec![
                Predicate::And(vec![cond("a", 1), cond("b", 2)]),
                cond("c", 3),
            ])
        );
    }

    #[test]
    fn test_chains_are_flat() {
        let tree = parse_str("a=1 AND b=2 AND c=3").unwrap();
        assert_eq!(
            tree,
            Predicate::And(vec![cond("a", 1), cond("b", 2), cond("c", 3)])
        );
    }

    #[test]
    fn test_parentheses_override_precedence() {
        let tree = parse_str("(a=1 OR b=2) AND c=3").unwrap();
        assert_eq!(
            tree,
            Predicate::And(vec![
                Predicate::Or(vec![cond("a", 1), cond("b", 2)]),
                cond("c", 3),
            ])
        );
    }

    #[test]
    fn test_redundant_parentheses_unwrap() {
        assert_eq!(parse_str("((a = 1))").unwrap(), cond("a", 1));
    }

    #[test]
    fn test_grouping_survives_reserialization() {
        let inputs = [
            "(a=1 OR b=2) AND (c=3 OR (d=4 AND e=5))",
            "a = 'it''s' OR (b > 2.5 AND c <= 2024-01-31)",
            "x ~ 'foo' AND (y != -3 OR z >= 10)",
            "big > 100000000000000000000000.0 OR tiny < 0.0000001 OR whole = 3.0",
        ];
        for input in inputs {
            let tree = parse_str(input).unwrap();
            let reparsed = parse_str(&tree.to_string()).unwrap();
            assert_eq!(tree, reparsed, "input: {}", input);
        }
    }

    #[test]
    fn test_literal_types() {
        let tree = parse_str("d >= 2024-01-01 AND n = 'x' AND f < 1.5").unwrap();
        let Predicate::And(children) = tree else {
            panic!("expected And");
        };
        let values: Vec<&Literal> = children
            .iter()
            .map(|c| match c {
                Predicate::Condition(c) => &c.value,
                _ => panic!("expected condition"),
            })
            .collect();
        assert!(matches!(values[0], Literal::Date(_)));
        assert_eq!(values[1], &Literal::String("x".to_string()));
        assert_eq!(values[2], &Literal::Float(1.5));
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(&[]).unwrap_err(), ParseError::Empty);
    }

    #[test]
    fn test_missing_literal() {
        let err = parse_str("a = ").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedEnd {
                expected: "literal",
                position: 3
            }
        );
    }

    #[test]
    fn test_missing_operator() {
        let err = parse_str("a 1").unwrap_err();
        assert_eq!(
            err,
            ParseError::UnexpectedToken {
                expected: "operator",
                found: "number literal",
                position: 2
            }
        );
    }

    #[test]
    fn test_identifier_as_value() {
        let err = parse_str("a = b").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                expected: "literal",
                found: "identifier",
                position: 4
            }
        ));
    }

    #[test]
    fn test_unmatched_open_paren() {
        let err = parse_str("(a=1").unwrap_err();
        assert_eq!(err, ParseError::UnmatchedParen { position: 0 });
    }

    #[test]
    fn test_unmatched_close_paren() {
        let err = parse_str("a=1)").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken { position: 3, .. }
        ));
    }

    #[test]
    fn test_trailing_tokens() {
        let err = parse_str("a=1 b=2").unwrap_err();
        assert_eq!(
            err,
            ParseError::TrailingInput {
                found: "identifier",
                position: 4
            }
        );
    }

    #[test]
    fn test_dangling_connective() {
        let err = parse_str("a=1 AND").unwrap_err();
        assert!(matches!(err, ParseError::UnexpectedEnd { position: 7, .. }));
    }

    #[test]
    fn test_keyword_cannot_be_field() {
        let err = parse_str("or = 1").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                found: "OR",
                position: 0,
                ..
            }
        ));
    }

    #[test]
    fn test_empty_group() {
        let err = parse_str("()").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedToken {
                found: "')'",
                position: 1,
                ..
            }
        ));
    }

    #[test]
    fn test_nesting_limit() {
        let deep = format!(
            "{}a=1{}",
            "(".repeat(MAX_NESTING_DEPTH + 1),
            ")".repeat(MAX_NESTING_DEPTH + 1)
        );
        let err = parse_str(&deep).unwrap_err();
        assert!(matches!(err, ParseError::NestingTooDeep { .. }));

        let ok = format!(
            "{}a=1{}",
            "(".repeat(MAX_NESTING_DEPTH),
            ")".repeat(MAX_NESTING_DEPTH)
        );
        assert_eq!(parse_str(&ok).unwrap(), cond("a", 1));
    }
}
