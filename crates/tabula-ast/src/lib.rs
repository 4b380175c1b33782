//! Tabula script language abstract syntax tree
//!
//! Scripts are single expressions: literals, the `this` subject, function and
//! method calls, unary and binary operators and the conditional operator.

mod expression;
mod literal;
mod operator;

pub use expression::*;
pub use literal::*;
pub use operator::*;

use serde::{Deserialize, Serialize};

/// Byte range of a node in the script source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Start byte offset (inclusive)
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
}

impl Span {
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub const fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub const fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Type alias for boxed expressions
pub type BoxExpr = Box<Expression>;
