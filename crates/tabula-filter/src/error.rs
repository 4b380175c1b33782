//! Filter errors

use tabula_eval::EvalError;
use thiserror::Error;

/// Result type for building and applying filters
pub type FilterResult<T> = Result<T, FilterError>;

#[derive(Debug, Clone, Error)]
pub enum FilterError {
    /// A script filter failed to compile or evaluate
    #[error(transparent)]
    Eval(#[from] EvalError),

    #[error("Invalid pattern {pattern}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// Builder misuse: a mandatory field was not provided
    #[error("Missing {field} for {filter} filter")]
    MissingArgument { filter: String, field: String },

    /// A script filter produced something other than one boolean
    #[error("Filter script must yield a boolean, found {found}")]
    NotBoolean { found: String },
}

impl FilterError {
    pub fn missing(filter: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingArgument {
            filter: filter.into(),
            field: field.into(),
        }
    }

    pub(crate) fn pattern(pattern: &str, source: regex::Error) -> Self {
        Self::Pattern {
            pattern: pattern.to_string(),
            source,
        }
    }
}
