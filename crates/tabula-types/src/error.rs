//! Value model errors

use crate::RawKind;
use thiserror::Error;

/// Result type for value model operations
pub type ValueResult<T> = Result<T, ValueError>;

/// Errors raised by value types and values
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValueError {
    /// Lookup of an unknown type name
    #[error("No such value type: {0}")]
    NoSuchType(String),

    /// No registered type accepts the input representation
    #[error("No value type accepts {0:?} input")]
    NoTypeForRepresentation(RawKind),

    /// Input could not be coerced into the requested type
    #[error("Cannot coerce {from} to {to}: {message}")]
    Coercion {
        from: String,
        to: String,
        message: String,
    },

    /// Operands of different types
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Deferred payload failed to load
    #[error(transparent)]
    Load(#[from] LoadError),

    /// Scalar accessor applied to a sequence value
    #[error("Scalar accessor applied to a sequence value")]
    SequenceAccess,

    /// Sequence accessor applied to a scalar value
    #[error("Sequence accessor applied to a scalar value")]
    ScalarAccess,
}

impl ValueError {
    /// Create a coercion error
    pub fn coercion(
        from: impl Into<String>,
        to: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self::Coercion {
            from: from.into(),
            to: to.into(),
            message: message.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }
}

/// Failure materializing a deferred value
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Value load failed: {message}")]
pub struct LoadError {
    message: String,
}

impl LoadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
