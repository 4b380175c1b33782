//! Tabula data model
//!
//! This crate provides:
//! - Variable entities and immutable variable metadata with builders
//! - Backend contracts for datasources, value tables and value sets
//! - Variable value sources (constant, stored column, bean property)
//! - The datasource registry and variable reference resolution
//! - An in-memory datasource

mod datasource;
mod entity;
mod error;
mod memory;
mod reference;
mod registry;
mod source;
mod variable;

pub use datasource::{Datasource, ValueSet, ValueTable};
pub use entity::VariableEntity;
pub use error::{ModelError, ModelResult};
pub use memory::{StaticDatasource, StaticDatasourceBuilder, StaticTable, StaticTableBuilder};
pub use reference::VariableReference;
pub use registry::DatasourceRegistry;
pub use source::{
    BeanPropertyValueSource, BeanResolver, ColumnReader, ColumnValueSource, ConstantValueSource,
    VariableValueSource, variable_value,
};
pub use variable::{Attribute, AttributeBuilder, Category, CategoryBuilder, Variable, VariableBuilder};

// Re-export the value model so backends need a single dependency
pub use tabula_types;
