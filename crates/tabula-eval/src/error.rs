//! Evaluation errors for the script engine

use tabula_model::ModelError;
use tabula_parser::ParseError;
use tabula_types::ValueError;
use thiserror::Error;

/// Result type for compilation and evaluation
pub type EvalResult<T> = Result<T, EvalError>;

/// Errors that can occur compiling or evaluating a script
#[derive(Debug, Error, Clone)]
pub enum EvalError {
    /// The script does not parse
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Call to a function the registry does not know
    #[error("Undefined function: {name}")]
    UndefinedFunction { name: String },

    /// Call with a number of arguments outside the function's arity
    #[error("Function {name} expects {expected} arguments, found {found}")]
    Arity {
        name: String,
        expected: String,
        found: usize,
    },

    /// Subject-based function called without a receiver or `this`
    #[error("Function {function} requires a subject")]
    NoSubject { function: String },

    /// Type mismatch error
    #[error("Type mismatch: expected {expected}, found {found}")]
    TypeMismatch { expected: String, found: String },

    /// Invalid operand error
    #[error("Invalid operand for {operator}: {message}")]
    InvalidOperand { operator: String, message: String },

    /// Unsupported operator
    #[error("Unsupported operator: {operator} for types {types}")]
    UnsupportedOperator { operator: String, types: String },

    /// Division by zero
    #[error("Division by zero")]
    DivisionByZero,

    /// Arithmetic overflow
    #[error("Arithmetic overflow in {operation}")]
    Overflow { operation: String },

    /// Nested evaluations exceeded the configured depth, usually a cyclic derivation
    #[error("Maximum evaluation depth of {max_depth} exceeded")]
    RecursionLimit { max_depth: usize },

    /// Failure in the data model: lookups, joins, stored values
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Failure in the value model: coercion, access, deferred loads
    #[error(transparent)]
    Value(#[from] ValueError),

    /// Internal error (should not happen)
    #[error("Internal evaluation error: {message}")]
    Internal { message: String },
}

impl EvalError {
    /// Create an undefined function error
    pub fn undefined_function(name: impl Into<String>) -> Self {
        Self::UndefinedFunction { name: name.into() }
    }

    /// Create a missing subject error
    pub fn no_subject(function: impl Into<String>) -> Self {
        Self::NoSubject {
            function: function.into(),
        }
    }

    /// Create a type mismatch error
    pub fn type_mismatch(expected: impl Into<String>, found: impl Into<String>) -> Self {
        Self::TypeMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create an invalid operand error
    pub fn invalid_operand(operator: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidOperand {
            operator: operator.into(),
            message: message.into(),
        }
    }

    /// Create an unsupported operator error
    pub fn unsupported_operator(operator: impl Into<String>, types: impl Into<String>) -> Self {
        Self::UnsupportedOperator {
            operator: operator.into(),
            types: types.into(),
        }
    }

    /// Create an overflow error
    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::Overflow {
            operation: operation.into(),
        }
    }

    /// Create an internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether the error was raised before evaluation started
    pub fn is_compile_error(&self) -> bool {
        matches!(
            self,
            Self::Parse(_) | Self::UndefinedFunction { .. } | Self::Arity { .. }
        )
    }
}
