//! Tabula filter chains
//!
//! This crate provides:
//! - The [`Filter`] contract: a stateless include or exclude predicate that
//!   may answer "no opinion"
//! - [`FilterChain`], which combines ordered filters into a membership decision
//! - Script filters over value sets, entity identifier filters and variable
//!   name and attribute filters

mod chain;
mod entity;
mod error;
mod script;
mod variable;

pub use chain::{Decision, Filter, FilterChain, FilterKind};
pub use entity::{EntityIdFilter, ExcludeAllFilter};
pub use error::{FilterError, FilterResult};
pub use script::{ScriptFilter, ScriptFilterBuilder};
pub use variable::{VariableAttributeFilter, VariableAttributeFilterBuilder, VariableNameFilter};
