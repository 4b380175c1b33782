//! Variable value sources
//!
//! A [`VariableValueSource`] produces the value of one variable for a value
//! set. Implementations must be pure with respect to the value set: the same
//! value set always yields an equal value, and sources are shared between
//! threads without synchronization.

use crate::{ModelResult, ValueSet, Variable};
use serde_json::Value as JsonValue;
use std::any::Any;
use std::sync::Arc;
use tabula_types::{RawValue, Value, ValueType};

pub trait VariableValueSource: Send + Sync {
    fn variable(&self) -> &Arc<Variable>;

    fn value_type(&self) -> ValueType {
        self.variable().value_type()
    }

    fn value(&self, value_set: &ValueSet) -> ModelResult<Value>;

    fn as_any(&self) -> &dyn Any;
}

/// Coerce a raw backend value into a variable's value, honoring repeatability
pub fn variable_value(variable: &Variable, raw: RawValue) -> ModelResult<Value> {
    let value_type = variable.value_type();
    if !variable.is_repeatable() {
        return Ok(value_type.value_of(raw)?);
    }
    Ok(match raw {
        RawValue::Null => value_type.null_sequence(),
        RawValue::List(items) => value_type.sequence_of_raw(items)?,
        single => value_type.sequence_of_raw([single])?,
    })
}

/// Always yields the same value
#[derive(Debug)]
pub struct ConstantValueSource {
    variable: Arc<Variable>,
    value: Value,
}

impl ConstantValueSource {
    pub fn new(variable: Arc<Variable>, value: Value) -> ModelResult<Self> {
        let value = variable.value_type().convert(&value)?;
        Ok(Self { variable, value })
    }
}

impl VariableValueSource for ConstantValueSource {
    fn variable(&self) -> &Arc<Variable> {
        &self.variable
    }

    fn value(&self, _value_set: &ValueSet) -> ModelResult<Value> {
        Ok(self.value.clone())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Backend access to a stored column
pub trait ColumnReader: Send + Sync {
    /// Raw stored value of `variable` in the row of `value_set`
    fn read(&self, value_set: &ValueSet, variable: &Variable) -> ModelResult<RawValue>;
}

/// A stored column read through a backend [`ColumnReader`]
pub struct ColumnValueSource {
    variable: Arc<Variable>,
    reader: Arc<dyn ColumnReader>,
}

impl ColumnValueSource {
    pub fn new(variable: Arc<Variable>, reader: Arc<dyn ColumnReader>) -> Self {
        Self { variable, reader }
    }
}

impl VariableValueSource for ColumnValueSource {
    fn variable(&self) -> &Arc<Variable> {
        &self.variable
    }

    fn value(&self, value_set: &ValueSet) -> ModelResult<Value> {
        let raw = self.reader.read(value_set, &self.variable)?;
        variable_value(&self.variable, raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Finds the document ("bean") backing a value set
pub trait BeanResolver: Send + Sync {
    fn resolve(&self, value_set: &ValueSet, variable: &Variable) -> ModelResult<Option<JsonValue>>;
}

/// Extracts a property path such as `address.city` or `visits.0.date` from a bean
///
/// A null or missing segment anywhere along the path yields a null value.
pub struct BeanPropertyValueSource {
    variable: Arc<Variable>,
    resolver: Arc<dyn BeanResolver>,
    path: Vec<String>,
}

impl BeanPropertyValueSource {
    pub fn new(variable: Arc<Variable>, resolver: Arc<dyn BeanResolver>, path: &str) -> Self {
        Self {
            variable,
            resolver,
            path: path
                .split('.')
                .filter(|segment| !segment.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    pub fn property_path(&self) -> String {
        self.path.join(".")
    }

    fn property<'a>(&self, bean: &'a JsonValue) -> Option<&'a JsonValue> {
        self.path.iter().try_fold(bean, |node, segment| match node {
            JsonValue::Object(map) => map.get(segment),
            JsonValue::Array(items) => segment.parse::<usize>().ok().and_then(|i| items.get(i)),
            _ => None,
        })
    }
}

impl VariableValueSource for BeanPropertyValueSource {
    fn variable(&self) -> &Arc<Variable> {
        &self.variable
    }

    fn value(&self, value_set: &ValueSet) -> ModelResult<Value> {
        let bean = self.resolver.resolve(value_set, &self.variable)?;
        let raw = bean
            .as_ref()
            .and_then(|bean| self.property(bean))
            .map_or(RawValue::Null, RawValue::from);
        variable_value(&self.variable, raw)
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
