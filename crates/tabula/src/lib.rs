//! Tabula: typed values and script-derived variables for tabular data
//!
//! This crate bundles the Tabula layers:
//! - A typed value model with null and sequence semantics
//! - Datasources, value tables, variables and value sources
//! - A script engine deriving variables from other variables
//! - Include/exclude filter chains
//!
//! # Example
//!
//! ```ignore
//! use tabula::prelude::*;
//!
//! let datasource = StaticDatasource::builder("study")
//!     .table(
//!         StaticTable::builder("Participants", "Participant")
//!             .variable(visit)
//!             .derived_over(age, "dayOfYear()", VariableReference::variable("visit"))
//!             .row("p1", [("visit", CalendarDate::new(2012, 2, 1))]),
//!     )
//!     .build()?;
//! ```

// Re-export all public APIs from internal crates
pub use tabula_ast as ast;
pub use tabula_eval as eval;
pub use tabula_filter as filter;
pub use tabula_model as model;
pub use tabula_parser as parser;
pub use tabula_types as types;

// Convenience re-exports
pub use tabula_eval::{EvalError, ScriptEngine};
pub use tabula_model::ModelError;
pub use tabula_parser::parse;
pub use tabula_types::{Value, ValueError, ValueType};

/// The types most programs need
pub mod prelude {
    pub use tabula_eval::{
        EngineConfig, EvalError, EvalResult, EvaluationContext, ScriptEngine,
        ScriptTableBuilderExt, ScriptValueSource, ScriptVariableValueSource,
    };
    pub use tabula_filter::{
        EntityIdFilter, ExcludeAllFilter, Filter, FilterChain, FilterKind, ScriptFilter,
        VariableAttributeFilter, VariableNameFilter,
    };
    pub use tabula_model::{
        Datasource, DatasourceRegistry, ModelError, ModelResult, StaticDatasource, StaticTable,
        ValueSet, ValueTable, Variable, VariableEntity, VariableReference, VariableValueSource,
    };
    pub use tabula_types::{CalendarDate, RawValue, Value, ValueError, ValueType};
}
