//! Tabula Script Evaluation Engine
//!
//! This crate compiles derivation scripts and evaluates them against value
//! sets of the data model:
//!
//! - **Operators**: arithmetic, comparison and three-valued logic, lifted over
//!   sequences and propagating nulls
//! - **Date Functions**: `year`, `dayOfYear`, `weekOfYear`, `after`, `format`, ...
//! - **Value Functions**: `newValue`, `type`, `size`, `first`, `valueAt`, ...
//! - **Context Functions**: `$('table:variable')`, `entityId`, `currentTable`, ...
//! - **Derived Variables**: [`ScriptVariableValueSource`] computes a variable's
//!   value from its script
//!
//! # Example
//!
//! ```ignore
//! use tabula_eval::ScriptEngine;
//!
//! let engine = ScriptEngine::global();
//! let value = engine.evaluate_script("$('visit').dayOfYear()", &value_set)?;
//! ```
//!
//! # Architecture
//!
//! - `ScriptEngine`: compiles scripts into `Program`s and dispatches calls
//!   through the `FunctionRegistry`
//! - `EvaluationContext`: the stack of datasource, table, variable, value set
//!   and subject frames of one call chain
//! - `operators`: operator implementations
//!
//! # Null and Sequence Propagation
//!
//! A scalar function applied to a null yields a null of its result type, and
//! applied to a sequence yields the sequence of its results. `&&` and `||`
//! follow three-valued logic:
//!
//! - `And`: false dominates (null && false = false)
//! - `Or`: true dominates (null || true = true)

pub mod config;
pub mod context;
pub mod engine;
pub mod error;
mod functions;
pub mod operators;
pub mod program;
pub mod registry;
pub mod source;
mod temporal;

// Re-export main types
pub use config::{DEFAULT_MAX_DEPTH, EngineConfig};
pub use context::{ContextScope, EvaluationContext, Frame};
pub use engine::ScriptEngine;
pub use error::{EvalError, EvalResult};
pub use program::Program;
pub use registry::{Call, FunctionDefinition, FunctionFn, FunctionRegistry, ReturnType};
pub use source::{
    SCRIPT_ATTRIBUTE, SUBJECT_ATTRIBUTE, ScriptTableBuilderExt, ScriptValueSource,
    ScriptVariableValueSource,
};
