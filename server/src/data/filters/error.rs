//! Filter compilation errors
//!
//! Each pipeline stage has its own error type; the facade wraps the first one
//! it hits in a [`FilterError`] tagged with the stage that produced it.

use std::fmt;

use thiserror::Error;

/// Pipeline stage that produced a [`FilterError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileStage {
    Lexing,
    Parsing,
    Compiling,
}

impl CompileStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompileStage::Lexing => "lexing",
            CompileStage::Parsing => "parsing",
            CompileStage::Compiling => "compiling",
        }
    }
}

impl fmt::Display for CompileStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tokenizer failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at position {position}")]
    UnexpectedCharacter { ch: char, position: usize },

    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("invalid date '{text}' at position {position}")]
    InvalidDate { text: String, position: usize },

    #[error("invalid number '{text}' at position {position}")]
    InvalidNumber { text: String, position: usize },
}

impl LexError {
    pub fn position(&self) -> usize {
        match self {
            Self::UnexpectedCharacter { position, .. }
            | Self::UnterminatedString { position }
            | Self::InvalidDate { position, .. }
            | Self::InvalidNumber { position, .. } => *position,
        }
    }
}

/// Parser failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("empty filter expression")]
    Empty,

    #[error("expected {expected} but found {found} at position {position}")]
    UnexpectedToken {
        expected: &'static str,
        found: &'static str,
        position: usize,
    },

    #[error("expected {expected} but reached end of input at position {position}")]
    UnexpectedEnd {
        expected: &'static str,
        position: usize,
    },

    #[error("unmatched '(' at position {position}")]
    UnmatchedParen { position: usize },

    #[error("unexpected {found} after complete expression at position {position}")]
    TrailingInput { found: &'static str, position: usize },

    #[error("expression nested deeper than {max} levels at position {position}")]
    NestingTooDeep { max: usize, position: usize },
}

impl ParseError {
    pub fn position(&self) -> usize {
        match self {
            Self::Empty => 0,
            Self::UnexpectedToken { position, .. }
            | Self::UnexpectedEnd { position, .. }
            | Self::UnmatchedParen { position }
            | Self::TrailingInput { position, .. }
            | Self::NestingTooDeep { position, .. } => *position,
        }
    }
}

/// Code generation failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("unknown field '{field}'")]
    UnknownField { field: String },
}

/// Error kinds surfaced by the facade, one per stage
#[derive(Error, Debug, Clone, PartialEq)]
pub enum FilterErrorKind {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Terminal failure of a filter compilation
#[derive(Error, Debug, Clone, PartialEq)]
#[error("could not understand filter ({stage}): {kind}")]
pub struct FilterError {
    stage: CompileStage,
    kind: FilterErrorKind,
}

impl FilterError {
    pub fn stage(&self) -> CompileStage {
        self.stage
    }

    pub fn kind(&self) -> &FilterErrorKind {
        &self.kind
    }

    /// Byte offset in the filter text, when the failing stage knows one
    pub fn position(&self) -> Option<usize> {
        match &self.kind {
            FilterErrorKind::Lex(e) => Some(e.position()),
            FilterErrorKind::Parse(e) => Some(e.position()),
            FilterErrorKind::Compile(_) => None,
        }
    }
}

impl From<LexError> for FilterError {
    fn from(e: LexError) -> Self {
        Self {
            stage: CompileStage::Lexing,
            kind: e.into(),
        }
    }
}

impl From<ParseError> for FilterError {
    fn from(e: ParseError) -> Self {
        Self {
            stage: CompileStage::Parsing,
            kind: e.into(),
        }
    }
}

impl From<CompileError> for FilterError {
    fn from(e: CompileError) -> Self {
        Self {
            stage: CompileStage::Compiling,
            kind: e.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_tagging() {
        let err: FilterError = LexError::UnterminatedString { position: 3 }.into();
        assert_eq!(err.stage(), CompileStage::Lexing);
        assert_eq!(err.position(), Some(3));

        let err: FilterError = ParseError::Empty.into();
        assert_eq!(err.stage(), CompileStage::Parsing);
        assert_eq!(err.position(), Some(0));

        let err: FilterError = CompileError::UnknownField {
            field: "nope".to_string(),
        }
        .into();
        assert_eq!(err.stage(), CompileStage::Compiling);
        assert_eq!(err.position(), None);
    }

    #[test]
    fn test_display() {
        let err: FilterError = ParseError::UnexpectedToken {
            expected: "operator",
            found: "number literal",
            position: 2,
        }
        .into();
        assert_eq!(
            err.to_string(),
            "could not understand filter (parsing): expected operator but found number literal at position 2"
        );
    }
}
