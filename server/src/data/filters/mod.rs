//! Filter expression compiler
//!
//! Compiles the search-box filter language into a parameterized SQL predicate:
//!
//! ```text
//! service.name = 'checkout' AND (status >= 400 OR duration > 500)
//! ```
//!
//! Pipeline: [`tokenize`] → [`parse`] → [`FilterCompiler::compile_predicate`].
//! The first failing stage aborts the call; a broken filter never yields a
//! partial predicate.
//!
//! # Example
//!
//! ```
//! use std::collections::HashSet;
//! use manta_server::data::filters::compile;
//!
//! let known: HashSet<String> = ["http.status".to_string()].into_iter().collect();
//! let fragment = compile("http.status >= 500 OR message ~ 'timeout'", &known).unwrap();
//! assert_eq!(fragment.params.len(), 3);
//! ```

mod ast;
mod codegen;
mod error;
mod fragment;
mod parser;
mod resolver;
mod token;

use std::collections::HashSet;

pub use ast::{Condition, Literal, Predicate};
pub use codegen::{AttributeStorage, FilterCompiler, columns};
pub use error::{
    CompileError, CompileStage, FilterError, FilterErrorKind, LexError, ParseError,
};
pub use fragment::{QueryFragment, SqlValue};
pub use parser::{MAX_NESTING_DEPTH, parse};
pub use resolver::{FieldKind, resolve};
pub use token::{Operator, Token, TokenKind, tokenize};

/// Compile filter text for SQLite with JSON attribute storage
pub fn compile(text: &str, known: &HashSet<String>) -> Result<QueryFragment, FilterError> {
    FilterCompiler::default().compile(text, known)
}

impl FilterCompiler {
    /// Tokenize, parse and lower `text`
    ///
    /// `known` holds the attribute names observed in stored events; a field
    /// in that set is looked up in the attribute payload.
    pub fn compile(
        &self,
        text: &str,
        known: &HashSet<String>,
    ) -> Result<QueryFragment, FilterError> {
        tracing::debug!(
            len = text.len(),
            known = known.len(),
            dialect = self.backend().name(),
            storage = %self.attribute_storage(),
            "Compiling filter"
        );

        let result = self.run(text, known);
        match &result {
            Ok(fragment) => {
                tracing::debug!(params = fragment.params.len(), "Filter compiled");
                tracing::trace!(sql = %fragment.sql, params = ?fragment.params, "Compiled predicate");
            }
            Err(e) => {
                tracing::debug!(stage = %e.stage(), position = ?e.position(), "Filter rejected");
            }
        }
        result
    }

    fn run(&self, text: &str, known: &HashSet<String>) -> Result<QueryFragment, FilterError> {
        let tokens = tokenize(text)?;
        tracing::trace!(tokens = tokens.len(), "Filter tokenized");

        let predicate = parse(&tokens)?;
        tracing::trace!(
            conditions = predicate.condition_count(),
            tree = %predicate,
            "Filter parsed"
        );

        Ok(self.compile_predicate(&predicate, known)?)
    }
}
