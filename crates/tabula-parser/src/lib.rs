//! Tabula script parser using Winnow
//!
//! Scripts are parsed with recursive descent and one function per precedence
//! level. The entry point is [`parse`], which requires the whole source to be a
//! single expression.

mod combinators;
mod expression;

pub use combinators::MAX_NESTING;
pub use expression::parse;

use thiserror::Error;

/// Syntax error with its location in the source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Syntax error at line {line}, column {column}: {message}")]
pub struct ParseError {
    /// Byte offset of the error
    pub offset: usize,
    /// 1-based line of the error
    pub line: usize,
    /// 1-based column of the error, in characters
    pub column: usize,
    pub message: String,
}

impl ParseError {
    pub(crate) fn at(source: &str, offset: usize, message: impl Into<String>) -> Self {
        let offset = offset.min(source.len());
        let before = source.get(..offset).unwrap_or(source);
        let line = before.matches('\n').count() + 1;
        let column = before
            .rsplit('\n')
            .next()
            .map_or(0, |l| l.chars().count())
            + 1;
        Self {
            offset,
            line,
            column,
            message: message.into(),
        }
    }
}
