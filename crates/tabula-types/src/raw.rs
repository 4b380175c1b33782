//! Raw input representations accepted by value type coercion

use crate::CalendarDate;
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;

/// An external, not yet typed, input to [`crate::ValueType::value_of`]
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Null,
    Boolean(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Binary(Vec<u8>),
    /// A calendar date without time
    Date(NaiveDate),
    /// An already normalized calendar date
    Calendar(CalendarDate),
    /// An instant with its UTC offset
    DateTime(DateTime<FixedOffset>),
    /// Several inputs, for repeatable variables
    List(Vec<RawValue>),
}

/// Discriminant of a [`RawValue`], used by acceptance predicates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RawKind {
    Null,
    Boolean,
    Integer,
    Float,
    Decimal,
    Text,
    Binary,
    Date,
    Calendar,
    DateTime,
    List,
}

impl RawValue {
    pub fn kind(&self) -> RawKind {
        match self {
            Self::Null => RawKind::Null,
            Self::Boolean(_) => RawKind::Boolean,
            Self::Integer(_) => RawKind::Integer,
            Self::Float(_) => RawKind::Float,
            Self::Decimal(_) => RawKind::Decimal,
            Self::Text(_) => RawKind::Text,
            Self::Binary(_) => RawKind::Binary,
            Self::Date(_) => RawKind::Date,
            Self::Calendar(_) => RawKind::Calendar,
            Self::DateTime(_) => RawKind::DateTime,
            Self::List(_) => RawKind::List,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

impl From<bool> for RawValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<i32> for RawValue {
    fn from(value: i32) -> Self {
        Self::Integer(i64::from(value))
    }
}

impl From<i64> for RawValue {
    fn from(value: i64) -> Self {
        Self::Integer(value)
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<Decimal> for RawValue {
    fn from(value: Decimal) -> Self {
        Self::Decimal(value)
    }
}

impl From<&str> for RawValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for RawValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for RawValue {
    fn from(value: Vec<u8>) -> Self {
        Self::Binary(value)
    }
}

impl From<NaiveDate> for RawValue {
    fn from(value: NaiveDate) -> Self {
        Self::Date(value)
    }
}

impl From<CalendarDate> for RawValue {
    fn from(value: CalendarDate) -> Self {
        Self::Calendar(value)
    }
}

impl From<DateTime<FixedOffset>> for RawValue {
    fn from(value: DateTime<FixedOffset>) -> Self {
        Self::DateTime(value)
    }
}

impl From<DateTime<Utc>> for RawValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value.fixed_offset())
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(Self::Null, Into::into)
    }
}

impl From<&JsonValue> for RawValue {
    fn from(value: &JsonValue) -> Self {
        match value {
            JsonValue::Null => Self::Null,
            JsonValue::Bool(b) => Self::Boolean(*b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Self::Integer(i),
                None => n.as_f64().map_or(Self::Null, Self::Float),
            },
            JsonValue::String(s) => Self::Text(s.clone()),
            JsonValue::Array(items) => Self::List(items.iter().map(Self::from).collect()),
            JsonValue::Object(_) => Self::Text(value.to_string()),
        }
    }
}
