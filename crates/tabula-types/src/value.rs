//! Typed values
//!
//! A [`Value`] pairs a [`ValueType`] with a payload that is null, one scalar,
//! an ordered sequence of scalar values, or a deferred loader.

use crate::loader::DeferredValue;
use crate::value_type::{DATE_TIME_FORMAT, encode_hex};
use crate::{CalendarDate, RawValue, ValueError, ValueResult, ValueType};
use chrono::{DateTime, FixedOffset};
use rust_decimal::Decimal;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

/// A materialized, non-null, single payload
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Text(String),
    Integer(i64),
    Decimal(Decimal),
    Boolean(bool),
    Date(CalendarDate),
    DateTime(DateTime<FixedOffset>),
    Binary(Vec<u8>),
    Locale(String),
}

impl Scalar {
    pub fn value_type(&self) -> ValueType {
        match self {
            Self::Text(_) => ValueType::Text,
            Self::Integer(_) => ValueType::Integer,
            Self::Decimal(_) => ValueType::Decimal,
            Self::Boolean(_) => ValueType::Boolean,
            Self::Date(_) => ValueType::Date,
            Self::DateTime(_) => ValueType::DateTime,
            Self::Binary(_) => ValueType::Binary,
            Self::Locale(_) => ValueType::Locale,
        }
    }

    /// Convert back to the raw representation this payload was coerced from
    pub fn to_raw(&self) -> RawValue {
        match self {
            Self::Text(s) | Self::Locale(s) => RawValue::Text(s.clone()),
            Self::Integer(i) => RawValue::Integer(*i),
            Self::Decimal(d) => RawValue::Decimal(*d),
            Self::Boolean(b) => RawValue::Boolean(*b),
            Self::Date(d) => RawValue::Calendar(*d),
            Self::DateTime(dt) => RawValue::DateTime(*dt),
            Self::Binary(bytes) => RawValue::Binary(bytes.clone()),
        }
    }
}

/// Ordering within one kind; payloads of different kinds are unordered
impl PartialOrd for Scalar {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) | (Self::Locale(a), Self::Locale(b)) => Some(a.cmp(b)),
            (Self::Integer(a), Self::Integer(b)) => Some(a.cmp(b)),
            (Self::Decimal(a), Self::Decimal(b)) => Some(a.cmp(b)),
            (Self::Boolean(a), Self::Boolean(b)) => Some(a.cmp(b)),
            (Self::Date(a), Self::Date(b)) => Some(a.cmp(b)),
            (Self::DateTime(a), Self::DateTime(b)) => Some(a.cmp(b)),
            (Self::Binary(a), Self::Binary(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Locale(s) => f.write_str(s),
            Self::Integer(i) => write!(f, "{}", i),
            Self::Decimal(d) => write!(f, "{}", d),
            Self::Boolean(b) => write!(f, "{}", b),
            Self::Date(d) => write!(f, "{}", d),
            Self::DateTime(dt) => write!(f, "{}", dt.format(DATE_TIME_FORMAT)),
            Self::Binary(bytes) => f.write_str(&encode_hex(bytes)),
        }
    }
}

/// A borrowed view of a materialized payload
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Materialized<'a> {
    Scalar(&'a Scalar),
    Sequence(&'a [Value]),
}

#[derive(Debug, Clone)]
enum Payload {
    Null { sequence: bool },
    Scalar(Scalar),
    Sequence(Vec<Value>),
    Deferred(Arc<DeferredValue>),
}

/// An immutable typed value
#[derive(Debug, Clone)]
pub struct Value {
    value_type: ValueType,
    payload: Payload,
}

impl Value {
    pub(crate) fn null(value_type: ValueType) -> Self {
        Self {
            value_type,
            payload: Payload::Null { sequence: false },
        }
    }

    pub(crate) fn null_sequence(value_type: ValueType) -> Self {
        Self {
            value_type,
            payload: Payload::Null { sequence: true },
        }
    }

    pub(crate) fn from_scalar(value_type: ValueType, scalar: Scalar) -> Self {
        Self {
            value_type,
            payload: Payload::Scalar(scalar),
        }
    }

    pub(crate) fn from_elements(value_type: ValueType, elements: Vec<Value>) -> Self {
        Self {
            value_type,
            payload: Payload::Sequence(elements),
        }
    }

    pub(crate) fn from_deferred(value_type: ValueType, deferred: DeferredValue) -> Self {
        Self {
            value_type,
            payload: Payload::Deferred(Arc::new(deferred)),
        }
    }

    pub fn text(value: impl Into<String>) -> Self {
        Self::from_scalar(ValueType::Text, Scalar::Text(value.into()))
    }

    pub fn integer(value: i64) -> Self {
        Self::from_scalar(ValueType::Integer, Scalar::Integer(value))
    }

    pub fn decimal(value: Decimal) -> Self {
        Self::from_scalar(ValueType::Decimal, Scalar::Decimal(value))
    }

    pub fn boolean(value: bool) -> Self {
        Self::from_scalar(ValueType::Boolean, Scalar::Boolean(value))
    }

    pub fn date(value: CalendarDate) -> Self {
        Self::from_scalar(ValueType::Date, Scalar::Date(value))
    }

    pub fn date_time(value: DateTime<FixedOffset>) -> Self {
        use chrono::SubsecRound;
        Self::from_scalar(ValueType::DateTime, Scalar::DateTime(value.trunc_subsecs(3)))
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Whether the payload is absent; never materializes a deferred payload
    pub fn is_null(&self) -> bool {
        match &self.payload {
            Payload::Null { .. } => true,
            Payload::Deferred(deferred) => deferred.is_null(),
            Payload::Scalar(_) | Payload::Sequence(_) => false,
        }
    }

    pub fn is_sequence(&self) -> bool {
        matches!(
            self.payload,
            Payload::Null { sequence: true } | Payload::Sequence(_)
        )
    }

    /// The scalar payload, `None` when null
    pub fn scalar(&self) -> ValueResult<Option<&Scalar>> {
        match &self.payload {
            Payload::Null { sequence: false } => Ok(None),
            Payload::Scalar(scalar) => Ok(Some(scalar)),
            Payload::Deferred(deferred) => deferred.materialize(self.value_type),
            Payload::Null { sequence: true } | Payload::Sequence(_) => Err(ValueError::SequenceAccess),
        }
    }

    /// The ordered elements of a sequence, `None` when null
    pub fn elements(&self) -> ValueResult<Option<&[Value]>> {
        match &self.payload {
            Payload::Null { sequence: true } => Ok(None),
            Payload::Sequence(elements) => Ok(Some(elements)),
            _ => Err(ValueError::ScalarAccess),
        }
    }

    /// The materialized payload, whatever its shape
    pub fn get(&self) -> ValueResult<Option<Materialized<'_>>> {
        if self.is_sequence() {
            Ok(self.elements()?.map(Materialized::Sequence))
        } else {
            Ok(self.scalar()?.map(Materialized::Scalar))
        }
    }

    /// Number of elements of a sequence, 1 for a non-null scalar, 0 for null
    pub fn size(&self) -> usize {
        match &self.payload {
            Payload::Null { .. } => 0,
            Payload::Sequence(elements) => elements.len(),
            Payload::Scalar(_) => 1,
            Payload::Deferred(deferred) => usize::from(!deferred.is_null()),
        }
    }

    pub fn as_bool(&self) -> ValueResult<Option<bool>> {
        match self.scalar()? {
            None => Ok(None),
            Some(Scalar::Boolean(b)) => Ok(Some(*b)),
            Some(other) => Err(ValueError::type_mismatch("boolean", other.value_type().name())),
        }
    }

    pub fn as_i64(&self) -> ValueResult<Option<i64>> {
        match self.scalar()? {
            None => Ok(None),
            Some(Scalar::Integer(i)) => Ok(Some(*i)),
            Some(other) => Err(ValueError::type_mismatch("integer", other.value_type().name())),
        }
    }

    pub fn as_str(&self) -> ValueResult<Option<&str>> {
        match self.scalar()? {
            None => Ok(None),
            Some(Scalar::Text(s)) | Some(Scalar::Locale(s)) => Ok(Some(s)),
            Some(other) => Err(ValueError::type_mismatch("text", other.value_type().name())),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.value_type != other.value_type || self.is_sequence() != other.is_sequence() {
            return false;
        }
        if self.is_sequence() {
            match (self.elements(), other.elements()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        } else {
            match (self.scalar(), other.scalar()) {
                (Ok(a), Ok(b)) => a == b,
                _ => false,
            }
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Ok(None) => f.write_str("null"),
            Ok(Some(Materialized::Scalar(scalar))) => write!(f, "{}", scalar),
            Ok(Some(Materialized::Sequence(elements))) => {
                for (i, element) in elements.iter().enumerate() {
                    if i > 0 {
                        f.write_str(",")?;
                    }
                    write!(f, "{}", element)?;
                }
                Ok(())
            }
            Err(ValueError::Load(e)) => write!(f, "<load failed: {}>", e.message()),
            Err(e) => write!(f, "<{}>", e),
        }
    }
}

/// Serialized as `{"type": name, "value": text | null | [text | null, ...]}`
///
/// A null sequence is `{"type": name, "value": null, "sequence": true}`.
#[derive(Serialize, Deserialize)]
struct ValueRepr {
    #[serde(rename = "type")]
    value_type: ValueType,
    value: ValueReprPayload,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    sequence: bool,
}

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum ValueReprPayload {
    Sequence(Vec<Option<String>>),
    Scalar(Option<String>),
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        use serde::ser::Error as _;
        let text = |value: &Value| -> Result<Option<String>, S::Error> {
            Ok(value
                .scalar()
                .map_err(S::Error::custom)?
                .map(ToString::to_string))
        };
        let value = match self.get().map_err(S::Error::custom)? {
            Some(Materialized::Sequence(elements)) => ValueReprPayload::Sequence(
                elements.iter().map(text).collect::<Result<_, _>>()?,
            ),
            Some(Materialized::Scalar(scalar)) => ValueReprPayload::Scalar(Some(scalar.to_string())),
            None => ValueReprPayload::Scalar(None),
        };
        ValueRepr {
            value_type: self.value_type,
            value,
            sequence: self.is_null() && self.is_sequence(),
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Value {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let repr = ValueRepr::deserialize(deserializer)?;
        let value_type = repr.value_type;
        match repr.value {
            ValueReprPayload::Scalar(None) if repr.sequence => Ok(value_type.null_sequence()),
            ValueReprPayload::Scalar(text) => value_type.value_of(text),
            ValueReprPayload::Sequence(items) => value_type
                .sequence_of_raw(items.into_iter().map(RawValue::from)),
        }
        .map_err(D::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_null_never_equals_non_null() {
        assert_ne!(ValueType::Integer.null_value(), Value::integer(0));
        assert_eq!(ValueType::Integer.null_value(), ValueType::Integer.null_value());
        assert_ne!(ValueType::Integer.null_value(), ValueType::Text.null_value());
    }

    #[test]
    fn test_accessor_shape_errors() {
        let sequence = ValueType::Integer
            .sequence_of([Value::integer(1), Value::integer(2)])
            .unwrap();
        assert_eq!(sequence.scalar(), Err(ValueError::SequenceAccess));
        assert_eq!(Value::integer(1).elements(), Err(ValueError::ScalarAccess));
        assert_eq!(sequence.size(), 2);
        assert_eq!(sequence.to_string(), "1,2");
    }

    #[test]
    fn test_null_sequence_is_sequence() {
        let value = ValueType::Text.null_sequence();
        assert!(value.is_null());
        assert!(value.is_sequence());
        assert_eq!(value.elements(), Ok(None));
    }

    #[test]
    fn test_serde_round_trip() {
        let value = ValueType::Date
            .sequence_of_raw([RawValue::from("2012-03-01"), RawValue::Null])
            .unwrap();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"date","value":["2012-03-01",null]}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert_eq!(back, value);
    }

    #[test]
    fn test_serde_keeps_null_sequences() {
        let value = ValueType::Integer.null_sequence();
        let json = serde_json::to_string(&value).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":null,"sequence":true}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert!(back.is_null());
        assert!(back.is_sequence());
        assert_eq!(back, value);

        let empty = ValueType::Integer.sequence_of(Vec::new()).unwrap();
        let json = serde_json::to_string(&empty).unwrap();
        assert_eq!(json, r#"{"type":"integer","value":[]}"#);
        let back: Value = serde_json::from_str(&json).unwrap();
        assert!(!back.is_null());
        assert_eq!(back.size(), 0);

        let scalar: Value = serde_json::from_str(r#"{"type":"integer","value":null}"#).unwrap();
        assert!(scalar.is_null());
        assert!(!scalar.is_sequence());
    }
}
