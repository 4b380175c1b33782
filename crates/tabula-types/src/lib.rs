//! Tabula type system
//!
//! This crate defines the typed value model shared by every Tabula layer:
//! - Value types (Text, Integer, Decimal, Boolean, Date, DateTime, Binary, Locale)
//! - The process-wide value type registry
//! - Self-normalizing calendar dates
//! - Values with null, sequence and deferred-load semantics

mod calendar;
mod error;
mod loader;
mod raw;
mod registry;
mod value;
mod value_type;

pub use calendar::CalendarDate;
pub use error::{LoadError, ValueError, ValueResult};
pub use loader::ValueLoader;
pub use raw::{RawKind, RawValue};
pub use registry::{ValueTypeRegistry, value_types};
pub use value::{Materialized, Scalar, Value};
pub use value_type::ValueType;
