//! Process-wide value type registry

use crate::{RawKind, ValueError, ValueResult, ValueType};
use once_cell::sync::Lazy;

/// Registration order; classification by representation picks the first match
static REGISTRY: Lazy<ValueTypeRegistry> = Lazy::new(|| ValueTypeRegistry {
    types: vec![
        ValueType::Text,
        ValueType::Locale,
        ValueType::Decimal,
        ValueType::Integer,
        ValueType::Boolean,
        ValueType::Binary,
        ValueType::Date,
        ValueType::DateTime,
    ],
});

/// Immutable registry of every value type
#[derive(Debug)]
pub struct ValueTypeRegistry {
    types: Vec<ValueType>,
}

impl ValueTypeRegistry {
    pub fn get() -> &'static ValueTypeRegistry {
        &REGISTRY
    }

    pub fn for_name(&self, name: &str) -> ValueResult<ValueType> {
        self.types
            .iter()
            .find(|t| t.name().eq_ignore_ascii_case(name))
            .copied()
            .ok_or_else(|| ValueError::NoSuchType(name.to_string()))
    }

    pub fn for_representation(&self, kind: RawKind) -> ValueResult<ValueType> {
        self.types
            .iter()
            .find(|t| t.accepts(kind))
            .copied()
            .ok_or(ValueError::NoTypeForRepresentation(kind))
    }

    pub fn iter(&self) -> impl Iterator<Item = ValueType> + '_ {
        self.types.iter().copied()
    }
}

/// Every registered type, in registration order
pub fn value_types() -> &'static [ValueType] {
    &REGISTRY.types
}
