//! Literal AST nodes

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A literal value in a script
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Literal {
    Null,
    Boolean(bool),
    /// Integer literal (64-bit signed)
    Integer(i64),
    /// Decimal literal, any number with a fraction or exponent
    Decimal(Decimal),
    /// String literal, escapes already resolved
    String(String),
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Null => f.write_str("null"),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::String(s) => {
                f.write_str("'")?;
                for c in s.chars() {
                    match c {
                        '\'' => f.write_str("\\'")?,
                        '\\' => f.write_str("\\\\")?,
                        '\n' => f.write_str("\\n")?,
                        '\t' => f.write_str("\\t")?,
                        '\r' => f.write_str("\\r")?,
                        c => write!(f, "{}", c)?,
                    }
                }
                f.write_str("'")
            }
        }
    }
}
