//! Filter tokenizer
//!
//! Turns raw filter text into a flat list of typed tokens. Knows nothing about
//! grammar: `a = = 1` tokenizes fine and is rejected later by the parser.

use std::fmt;

use chrono::NaiveDate;

use super::error::LexError;

/// Comparison operators accepted by the filter language
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Eq,
    Ne,
    Gt,
    Gte,
    Lt,
    Lte,
    /// `LIKE`, `contains` or `~`
    Like,
}

impl Operator {
    pub fn as_str(&self) -> &'static str {
        match self {
            Operator::Eq => "=",
            Operator::Ne => "!=",
            Operator::Gt => ">",
            Operator::Gte => ">=",
            Operator::Lt => "<",
            Operator::Lte => "<=",
            Operator::Like => "LIKE",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Token kinds, carrying the decoded payload where there is one
#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    Identifier(String),
    /// Unescaped string content (without the surrounding quotes)
    String(String),
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Operator(Operator),
    And,
    Or,
    OpenParen,
    CloseParen,
}

impl TokenKind {
    /// Short human-readable name used in parse error messages
    pub fn describe(&self) -> &'static str {
        match self {
            TokenKind::Identifier(_) => "identifier",
            TokenKind::String(_) => "string literal",
            TokenKind::Integer(_) | TokenKind::Float(_) => "number literal",
            TokenKind::Date(_) => "date literal",
            TokenKind::Operator(_) => "operator",
            TokenKind::And => "AND",
            TokenKind::Or => "OR",
            TokenKind::OpenParen => "'('",
            TokenKind::CloseParen => "')'",
        }
    }
}

/// A token with its original text and byte offset in the input
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub text: String,
    pub position: usize,
}

/// Tokenize a filter expression
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input).run()
}

struct Lexer<'a> {
    input: &'a str,
    bytes: &'a [u8],
    pos: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    fn new(input: &'a str) -> Self {
        Self {
            input,
            bytes: input.as_bytes(),
            pos: 0,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(c) = self.peek_char() {
            if c.is_whitespace() {
                self.pos += c.len_utf8();
                continue;
            }

            let start = self.pos;
            let kind = match c {
                '(' => self.single(TokenKind::OpenParen),
                ')' => self.single(TokenKind::CloseParen),
                '=' => self.single(TokenKind::Operator(Operator::Eq)),
                '~' => self.single(TokenKind::Operator(Operator::Like)),
                '!' if self.byte_at(start + 1) == Some(b'=') => {
                    self.pos += 2;
                    TokenKind::Operator(Operator::Ne)
                }
                '>' | '<' => self.comparison(c),
                '\'' => self.string()?,
                '-' if self.byte_at(start + 1).is_some_and(|b| b.is_ascii_digit()) => {
                    self.number()?
                }
                c if c.is_ascii_digit() => {
                    if self.looks_like_date() {
                        self.date()?
                    } else {
                        self.number()?
                    }
                }
                c if c.is_ascii_alphabetic() || c == '_' => self.word(),
                _ => return Err(LexError::UnexpectedCharacter { ch: c, position: start }),
            };

            self.tokens.push(Token {
                kind,
                text: self.input[start..self.pos].to_string(),
                position: start,
            });
        }

        Ok(self.tokens)
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn byte_at(&self, idx: usize) -> Option<u8> {
        self.bytes.get(idx).copied()
    }

    fn single(&mut self, kind: TokenKind) -> TokenKind {
        self.pos += 1;
        kind
    }

    fn comparison(&mut self, c: char) -> TokenKind {
        let with_eq = self.byte_at(self.pos + 1) == Some(b'=');
        self.pos += if with_eq { 2 } else { 1 };
        let op = match (c, with_eq) {
            ('>', true) => Operator::Gte,
            ('>', false) => Operator::Gt,
            ('<', true) => Operator::Lte,
            _ => Operator::Lt,
        };
        TokenKind::Operator(op)
    }

    /// Single-quoted string, `''` inside the quotes is an escaped quote
    fn string(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.pos += 1;
        let mut value = String::new();

        loop {
            let Some(c) = self.peek_char() else {
                return Err(LexError::UnterminatedString { position: start });
            };
            self.pos += c.len_utf8();
            if c == '\'' {
                if self.byte_at(self.pos) == Some(b'\'') {
                    self.pos += 1;
                    value.push('\'');
                } else {
                    return Ok(TokenKind::String(value));
                }
            } else {
                value.push(c);
            }
        }
    }

    /// `DDDD-DD-DD` not followed by another identifier/number character
    fn looks_like_date(&self) -> bool {
        let shape = b"dddd-dd-dd";
        let matches_shape = shape.iter().enumerate().all(|(i, s)| {
            self.byte_at(self.pos + i).is_some_and(|b| match s {
                b'd' => b.is_ascii_digit(),
                other => b == *other,
            })
        });
        matches_shape
            && !self
                .byte_at(self.pos + shape.len())
                .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'.' || b == b'_')
    }

    fn date(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        self.pos += 10;
        let text = &self.input[start..self.pos];
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(TokenKind::Date)
            .map_err(|_| LexError::InvalidDate {
                text: text.to_string(),
                position: start,
            })
    }

    /// `-?\d+(\.\d+)?`
    fn number(&mut self) -> Result<TokenKind, LexError> {
        let start = self.pos;
        if self.byte_at(self.pos) == Some(b'-') {
            self.pos += 1;
        }
        self.skip_digits();

        let mut is_float = false;
        if self.byte_at(self.pos) == Some(b'.')
            && self.byte_at(self.pos + 1).is_some_and(|b| b.is_ascii_digit())
        {
            is_float = true;
            self.pos += 1;
            self.skip_digits();
        }

        let text = &self.input[start..self.pos];
        let invalid = || LexError::InvalidNumber {
            text: text.to_string(),
            position: start,
        };
        if is_float {
            text.parse::<f64>().map(TokenKind::Float).map_err(|_| invalid())
        } else {
            text.parse::<i64>().map(TokenKind::Integer).map_err(|_| invalid())
        }
    }

    fn skip_digits(&mut self) {
        while self.byte_at(self.pos).is_some_and(|b| b.is_ascii_digit()) {
            self.pos += 1;
        }
    }

    /// Identifier or keyword; keywords are matched case-insensitively
    fn word(&mut self) -> TokenKind {
        let start = self.pos;
        while self
            .byte_at(self.pos)
            .is_some_and(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'.')
        {
            self.pos += 1;
        }
        let text = &self.input[start..self.pos];

        if text.eq_ignore_ascii_case("and") {
            TokenKind::And
        } else if text.eq_ignore_ascii_case("or") {
            TokenKind::Or
        } else if text.eq_ignore_ascii_case("like") || text.eq_ignore_ascii_case("contains") {
            TokenKind::Operator(Operator::Like)
        } else {
            TokenKind::Identifier(text.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(input: &str) -> Vec<TokenKind> {
        tokenize(input)
            .unwrap()
            .into_iter()
            .map(|t| t.kind)
            .collect()
    }

    #[test]
    fn test_simple_condition() {
        assert_eq!(
            kinds("status = 200"),
            vec![
                TokenKind::Identifier("status".to_string()),
                TokenKind::Operator(Operator::Eq),
                TokenKind::Integer(200),
            ]
        );
    }

    #[test]
    fn test_positions_are_byte_offsets() {
        let tokens = tokenize("  a >= 'x'").unwrap();
        let positions: Vec<usize> = tokens.iter().map(|t| t.position).collect();
        assert_eq!(positions, vec![2, 4, 7]);
        assert_eq!(tokens[2].text, "'x'");
    }

    #[test]
    fn test_all_operators() {
        assert_eq!(
            kinds("= != > >= < <= ~ LIKE contains"),
            vec![
                TokenKind::Operator(Operator::Eq),
                TokenKind::Operator(Operator::Ne),
                TokenKind::Operator(Operator::Gt),
                TokenKind::Operator(Operator::Gte),
                TokenKind::Operator(Operator::Lt),
                TokenKind::Operator(Operator::Lte),
                TokenKind::Operator(Operator::Like),
                TokenKind::Operator(Operator::Like),
                TokenKind::Operator(Operator::Like),
            ]
        );
    }

    #[test]
    fn test_keywords_case_insensitive() {
        assert_eq!(
            kinds("and AND And or OR Like CONTAINS"),
            vec![
                TokenKind::And,
                TokenKind::And,
                TokenKind::And,
                TokenKind::Or,
                TokenKind::Or,
                TokenKind::Operator(Operator::Like),
                TokenKind::Operator(Operator::Like),
            ]
        );
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        assert_eq!(
            kinds("order android"),
            vec![
                TokenKind::Identifier("order".to_string()),
                TokenKind::Identifier("android".to_string()),
            ]
        );
    }

    #[test]
    fn test_dotted_identifier() {
        assert_eq!(
            kinds("resource.service.name"),
            vec![TokenKind::Identifier("resource.service.name".to_string())]
        );
    }

    #[test]
    fn test_string_with_escaped_quote() {
        assert_eq!(
            kinds("'x'' OR ''='"),
            vec![TokenKind::String("x' OR '=".to_string())]
        );
    }

    #[test]
    fn test_unterminated_string() {
        let err = tokenize("name = 'abc").unwrap_err();
        assert_eq!(err, LexError::UnterminatedString { position: 7 });
    }

    #[test]
    fn test_date_literal() {
        assert_eq!(
            kinds("2024-03-15"),
            vec![TokenKind::Date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap())]
        );
    }

    #[test]
    fn test_invalid_calendar_date() {
        let err = tokenize("d > 2024-13-40").unwrap_err();
        assert!(matches!(err, LexError::InvalidDate { position: 4, .. }));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(
            kinds("5 -12 2.5 -0.25"),
            vec![
                TokenKind::Integer(5),
                TokenKind::Integer(-12),
                TokenKind::Float(2.5),
                TokenKind::Float(-0.25),
            ]
        );
    }

    #[test]
    fn test_parens_without_spaces() {
        assert_eq!(
            kinds("(a=1)"),
            vec![
                TokenKind::OpenParen,
                TokenKind::Identifier("a".to_string()),
                TokenKind::Operator(Operator::Eq),
                TokenKind::Integer(1),
                TokenKind::CloseParen,
            ]
        );
    }

    #[test]
    fn test_unexpected_character() {
        let err = tokenize("a ? 1").unwrap_err();
        assert_eq!(
            err,
            LexError::UnexpectedCharacter {
                ch: '?',
                position: 2
            }
        );
    }

    #[test]
    fn test_lone_bang_is_error() {
        let err = tokenize("a ! 1").unwrap_err();
        assert_eq!(err.position(), 2);
    }

    #[test]
    fn test_integer_overflow() {
        let err = tokenize("n > 99999999999999999999").unwrap_err();
        assert!(matches!(err, LexError::InvalidNumber { position: 4, .. }));
    }

    #[test]
    fn test_empty_input() {
        assert!(tokenize("   ").unwrap().is_empty());
    }
}
