//! Data model errors

use tabula_types::ValueError;
use std::sync::Arc;
use thiserror::Error;

/// Result type for data model operations
pub type ModelResult<T> = Result<T, ModelError>;

/// Errors raised by datasources, tables, variables and value sources
#[derive(Debug, Clone, Error)]
pub enum ModelError {
    /// A reference without a table was resolved outside any value set
    #[error("Cannot resolve table without a context")]
    NoContext,

    #[error("No such datasource: {name}")]
    NoSuchDatasource { name: String },

    #[error("Datasource already registered: {name}")]
    DuplicateDatasource { name: String },

    #[error("No such value table: {name}")]
    NoSuchValueTable { name: String },

    #[error("No such value set: {entity} in table {table}")]
    NoSuchValueSet { table: String, entity: String },

    #[error("No such variable: {name} in table {table}")]
    NoSuchVariable { table: String, name: String },

    /// Builder misuse: a mandatory field was not provided
    #[error("Missing {field} for {target}")]
    MissingArgument { target: String, field: String },

    #[error("Duplicate value table {name} in datasource {datasource}")]
    DuplicateValueTable { datasource: String, name: String },

    #[error("Duplicate variable {name} in table {table}")]
    DuplicateVariable { table: String, name: String },

    #[error("Duplicate row {identifier} in table {table}")]
    DuplicateRow { table: String, identifier: String },

    #[error("Duplicate category {category} in variable {variable}")]
    DuplicateCategory { variable: String, category: String },

    /// A variable reference that does not follow `[datasource.]table:variable`
    #[error("Invalid variable reference: {reference}")]
    InvalidReference { reference: String },

    /// The owning datasource was dropped while a table was still in use
    #[error("Datasource of table {table} is no longer available")]
    Detached { table: String },

    #[error(transparent)]
    Value(#[from] ValueError),

    /// A derived variable failed to compute its value
    #[error("Cannot derive variable {variable}: {source}")]
    Derivation {
        variable: String,
        #[source]
        source: Arc<dyn std::error::Error + Send + Sync>,
    },

    /// Backend failure reading a stored value
    #[error("Backend error: {message}")]
    Backend { message: String },
}

impl ModelError {
    pub fn missing(target: impl Into<String>, field: impl Into<String>) -> Self {
        Self::MissingArgument {
            target: target.into(),
            field: field.into(),
        }
    }

    pub fn no_such_variable(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::NoSuchVariable {
            table: table.into(),
            name: name.into(),
        }
    }

    pub fn derivation(
        variable: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self::Derivation {
            variable: variable.into(),
            source: Arc::new(source),
        }
    }

    pub fn backend(message: impl Into<String>) -> Self {
        Self::Backend {
            message: message.into(),
        }
    }
}
