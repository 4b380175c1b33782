//! Value types and their coercion rules
//!
//! Every kind owns its payload representation, its null sentinel, its ordering,
//! the raw input representations it accepts and a string serialization that
//! round-trips through [`ValueType::value_of`].

use crate::loader::DeferredValue;
use crate::{CalendarDate, RawKind, RawValue, Scalar, Value, ValueError, ValueResult, ValueTypeRegistry};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Offset, SubsecRound, TimeZone, Utc};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::Decimal;
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Canonical text form of a DateTime payload
pub(crate) const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f%z";

const DATE_FORMATS: [&str; 8] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%Y %m %d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%d %m %Y",
];

const ZONED_DATE_TIME_FORMATS: [&str; 5] = [
    "%Y-%m-%dT%H:%M:%S%.f%z",
    "%Y-%m-%dT%H:%M:%S%z",
    "%Y-%m-%dT%H:%M%z",
    "%Y-%m-%d %H:%M:%S%.f%z",
    "%Y-%m-%d %H:%M:%S%z",
];

const LOCAL_DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

static LOCALE_TAG: Lazy<Result<Regex, regex::Error>> =
    Lazy::new(|| Regex::new(r"^([A-Za-z]{2,3})(?:[_-]([A-Za-z]{2}|[0-9]{3}))?$"));

/// The closed set of value kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    Text,
    Locale,
    Decimal,
    Integer,
    Boolean,
    Binary,
    Date,
    DateTime,
}

impl ValueType {
    /// Registered name of this type
    pub fn name(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Locale => "locale",
            Self::Decimal => "decimal",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Binary => "binary",
            Self::Date => "date",
            Self::DateTime => "datetime",
        }
    }

    /// Look up a type by its registered name
    pub fn for_name(name: &str) -> ValueResult<Self> {
        ValueTypeRegistry::get().for_name(name)
    }

    /// First registered type accepting the input representation
    pub fn for_representation(kind: RawKind) -> ValueResult<Self> {
        ValueTypeRegistry::get().for_representation(kind)
    }

    pub fn is_numeric(&self) -> bool {
        matches!(self, Self::Integer | Self::Decimal)
    }

    pub fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::DateTime)
    }

    /// Acceptance predicate used to classify raw input
    ///
    /// Acceptance sets overlap, so classification depends on registration order.
    pub fn accepts(&self, kind: RawKind) -> bool {
        match self {
            Self::Text => kind == RawKind::Text,
            Self::Locale => false,
            Self::Decimal => matches!(kind, RawKind::Float | RawKind::Decimal),
            Self::Integer => kind == RawKind::Integer,
            Self::Boolean => kind == RawKind::Boolean,
            Self::Binary => kind == RawKind::Binary,
            Self::Date => matches!(kind, RawKind::Date | RawKind::Calendar),
            Self::DateTime => matches!(kind, RawKind::DateTime | RawKind::Date | RawKind::Calendar),
        }
    }

    pub fn null_value(&self) -> Value {
        Value::null(*self)
    }

    pub fn null_sequence(&self) -> Value {
        Value::null_sequence(*self)
    }

    /// Coerce a raw input into a scalar value of this type
    ///
    /// A null input always yields this type's null value.
    pub fn value_of(&self, raw: impl Into<RawValue>) -> ValueResult<Value> {
        let raw = raw.into();
        if let RawValue::List(_) = raw {
            return Err(ValueError::coercion("list", self.name(), "use sequence_of_raw for lists"));
        }
        Ok(match self.coerce(raw)? {
            Some(scalar) => Value::from_scalar(*self, scalar),
            None => self.null_value(),
        })
    }

    /// Coerce each raw input into an element of a sequence value
    pub fn sequence_of_raw(&self, items: impl IntoIterator<Item = RawValue>) -> ValueResult<Value> {
        let elements = items
            .into_iter()
            .map(|raw| self.value_of(raw))
            .collect::<ValueResult<Vec<_>>>()?;
        Ok(Value::from_elements(*self, elements))
    }

    /// Build a sequence value, converting elements of another type
    pub fn sequence_of(&self, values: impl IntoIterator<Item = Value>) -> ValueResult<Value> {
        let elements = values
            .into_iter()
            .map(|value| {
                if value.is_sequence() {
                    Err(ValueError::SequenceAccess)
                } else if value.value_type() == *self {
                    Ok(value)
                } else {
                    self.convert(&value)
                }
            })
            .collect::<ValueResult<Vec<_>>>()?;
        Ok(Value::from_elements(*self, elements))
    }

    /// Wrap a loader whose payload is loaded on first access
    pub fn deferred(&self, loader: Arc<dyn crate::ValueLoader>) -> Value {
        Value::from_deferred(*self, DeferredValue::new(loader))
    }

    /// Wrap a payload that is already of this type
    pub fn wrap(&self, scalar: Scalar) -> ValueResult<Value> {
        if scalar.value_type() != *self {
            return Err(ValueError::type_mismatch(self.name(), scalar.value_type().name()));
        }
        Ok(Value::from_scalar(*self, scalar))
    }

    /// Re-type a value, element-wise for sequences
    pub fn convert(&self, value: &Value) -> ValueResult<Value> {
        if value.value_type() == *self {
            return Ok(value.clone());
        }
        if value.is_sequence() {
            return match value.elements()? {
                Some(elements) => self.sequence_of(elements.iter().cloned()),
                None => Ok(self.null_sequence()),
            };
        }
        match value.scalar()? {
            Some(scalar) => self.value_of(scalar.to_raw()),
            None => Ok(self.null_value()),
        }
    }

    /// Order two values of this type, nulls first
    pub fn compare(&self, left: &Value, right: &Value) -> ValueResult<Ordering> {
        for value in [left, right] {
            if value.value_type() != *self {
                return Err(ValueError::type_mismatch(self.name(), value.value_type().name()));
            }
        }
        match (left.is_sequence(), right.is_sequence()) {
            (false, false) => compare_scalars(left.scalar()?, right.scalar()?),
            (true, true) => match (left.elements()?, right.elements()?) {
                (None, None) => Ok(Ordering::Equal),
                (None, Some(_)) => Ok(Ordering::Less),
                (Some(_), None) => Ok(Ordering::Greater),
                (Some(a), Some(b)) => {
                    for (x, y) in a.iter().zip(b.iter()) {
                        let ordering = self.compare(x, y)?;
                        if ordering != Ordering::Equal {
                            return Ok(ordering);
                        }
                    }
                    Ok(a.len().cmp(&b.len()))
                }
            },
            _ => Err(ValueError::SequenceAccess),
        }
    }

    /// Coerce a raw input into this type's payload, `None` for null input
    pub(crate) fn coerce(self, raw: RawValue) -> ValueResult<Option<Scalar>> {
        if raw.is_null() {
            return Ok(None);
        }
        let scalar = match self {
            Self::Text => Scalar::Text(coerce_text(raw)?),
            Self::Locale => Scalar::Locale(coerce_locale(raw)?),
            Self::Decimal => Scalar::Decimal(coerce_decimal(raw)?),
            Self::Integer => Scalar::Integer(coerce_integer(raw)?),
            Self::Boolean => Scalar::Boolean(coerce_boolean(raw)?),
            Self::Binary => Scalar::Binary(coerce_binary(raw)?),
            Self::Date => Scalar::Date(coerce_date(raw)?),
            Self::DateTime => Scalar::DateTime(coerce_date_time(raw)?),
        };
        Ok(Some(scalar))
    }
}

fn compare_scalars(left: Option<&Scalar>, right: Option<&Scalar>) -> ValueResult<Ordering> {
    match (left, right) {
        (None, None) => Ok(Ordering::Equal),
        (None, Some(_)) => Ok(Ordering::Less),
        (Some(_), None) => Ok(Ordering::Greater),
        (Some(a), Some(b)) => a.partial_cmp(b).ok_or_else(|| {
            ValueError::type_mismatch(a.value_type().name(), b.value_type().name())
        }),
    }
}

fn unsupported(raw: &RawValue, to: ValueType) -> ValueError {
    ValueError::coercion(
        format!("{:?}", raw.kind()),
        to.name(),
        "unsupported input representation",
    )
}

fn coerce_text(raw: RawValue) -> ValueResult<String> {
    Ok(match raw {
        RawValue::Text(s) => s,
        RawValue::Boolean(b) => b.to_string(),
        RawValue::Integer(i) => i.to_string(),
        RawValue::Float(f) => f.to_string(),
        RawValue::Decimal(d) => d.to_string(),
        RawValue::Date(d) => CalendarDate::from_naive(d).to_string(),
        RawValue::Calendar(c) => c.to_string(),
        RawValue::DateTime(dt) => dt.trunc_subsecs(3).format(DATE_TIME_FORMAT).to_string(),
        other => return Err(unsupported(&other, ValueType::Text)),
    })
}

fn coerce_locale(raw: RawValue) -> ValueResult<String> {
    let RawValue::Text(text) = raw else {
        return Err(unsupported(&raw, ValueType::Locale));
    };
    let regex = LOCALE_TAG
        .as_ref()
        .map_err(|e| ValueError::coercion(&text, "locale", e.to_string()))?;
    let captures = regex
        .captures(text.trim())
        .ok_or_else(|| ValueError::coercion(&text, "locale", "not a language[_COUNTRY] tag"))?;
    let language = captures[1].to_ascii_lowercase();
    Ok(match captures.get(2) {
        Some(country) => format!("{}_{}", language, country.as_str().to_ascii_uppercase()),
        None => language,
    })
}

fn coerce_decimal(raw: RawValue) -> ValueResult<Decimal> {
    match raw {
        RawValue::Decimal(d) => Ok(d),
        RawValue::Integer(i) => Ok(Decimal::from(i)),
        RawValue::Float(f) => Decimal::from_f64(f)
            .ok_or_else(|| ValueError::coercion(f.to_string(), "decimal", "not representable")),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            Decimal::from_str(trimmed)
                .or_else(|_| Decimal::from_scientific(trimmed))
                .map_err(|e| ValueError::coercion(&s, "decimal", e.to_string()))
        }
        other => Err(unsupported(&other, ValueType::Decimal)),
    }
}

fn coerce_integer(raw: RawValue) -> ValueResult<i64> {
    match raw {
        RawValue::Integer(i) => Ok(i),
        RawValue::Float(f) => {
            let truncated = f.trunc();
            if truncated.is_finite() && truncated >= i64::MIN as f64 && truncated <= i64::MAX as f64 {
                Ok(truncated as i64)
            } else {
                Err(ValueError::coercion(f.to_string(), "integer", "out of range"))
            }
        }
        RawValue::Decimal(d) => d
            .trunc()
            .to_i64()
            .ok_or_else(|| ValueError::coercion(d.to_string(), "integer", "out of range")),
        RawValue::Text(s) => s
            .trim()
            .parse::<i64>()
            .map_err(|e| ValueError::coercion(&s, "integer", e.to_string())),
        other => Err(unsupported(&other, ValueType::Integer)),
    }
}

fn coerce_boolean(raw: RawValue) -> ValueResult<bool> {
    match raw {
        RawValue::Boolean(b) => Ok(b),
        RawValue::Text(s) => {
            let trimmed = s.trim();
            if trimmed.eq_ignore_ascii_case("true") {
                Ok(true)
            } else if trimmed.eq_ignore_ascii_case("false") {
                Ok(false)
            } else {
                Err(ValueError::coercion(&s, "boolean", "expected true or false"))
            }
        }
        other => Err(unsupported(&other, ValueType::Boolean)),
    }
}

fn coerce_binary(raw: RawValue) -> ValueResult<Vec<u8>> {
    match raw {
        RawValue::Binary(bytes) => Ok(bytes),
        RawValue::Text(s) => decode_hex(s.trim())
            .ok_or_else(|| ValueError::coercion(&s, "binary", "expected hexadecimal digits")),
        other => Err(unsupported(&other, ValueType::Binary)),
    }
}

fn coerce_date(raw: RawValue) -> ValueResult<CalendarDate> {
    match raw {
        RawValue::Calendar(c) => Ok(c),
        RawValue::Date(d) => Ok(CalendarDate::from_naive(d)),
        RawValue::DateTime(dt) => Ok(CalendarDate::from_date_time(&dt)),
        RawValue::Text(s) => parse_date(&s).map(CalendarDate::from_naive),
        other => Err(unsupported(&other, ValueType::Date)),
    }
}

fn coerce_date_time(raw: RawValue) -> ValueResult<DateTime<FixedOffset>> {
    match raw {
        RawValue::DateTime(dt) => Ok(dt.trunc_subsecs(3)),
        RawValue::Date(d) => start_of_day(d)
            .ok_or_else(|| ValueError::coercion(d.to_string(), "datetime", "out of range")),
        RawValue::Calendar(c) => c
            .start_of_day()
            .ok_or_else(|| ValueError::coercion(c.to_string(), "datetime", "out of range")),
        RawValue::Text(s) => parse_date_time(&s).map(|dt| dt.trunc_subsecs(3)),
        other => Err(unsupported(&other, ValueType::DateTime)),
    }
}

fn parse_date(text: &str) -> ValueResult<NaiveDate> {
    let trimmed = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        .ok_or_else(|| ValueError::coercion(text, "date", "unrecognized date format"))
}

fn parse_date_time(text: &str) -> ValueResult<DateTime<FixedOffset>> {
    let trimmed = text.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt);
    }
    if let Some(dt) = ZONED_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| DateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(dt);
    }
    if let Some(naive) = LOCAL_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(trimmed, format).ok())
    {
        return Ok(Utc.fix().from_utc_datetime(&naive));
    }
    parse_date(trimmed)
        .ok()
        .and_then(start_of_day)
        .ok_or_else(|| ValueError::coercion(text, "datetime", "unrecognized date-time format"))
}

/// Midnight UTC of a date
pub(crate) fn start_of_day(date: NaiveDate) -> Option<DateTime<FixedOffset>> {
    date.and_hms_opt(0, 0, 0)
        .map(|naive| Utc.fix().from_utc_datetime(&naive))
}

pub(crate) fn encode_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}

fn decode_hex(text: &str) -> Option<Vec<u8>> {
    if text.len() % 2 != 0 {
        return None;
    }
    text.as_bytes()
        .chunks(2)
        .map(|pair| {
            std::str::from_utf8(pair)
                .ok()
                .and_then(|digits| u8::from_str_radix(digits, 16).ok())
        })
        .collect()
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ValueType {
    type Err = ValueError;

    fn from_str(s: &str) -> ValueResult<Self> {
        Self::for_name(s)
    }
}

impl Serialize for ValueType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for ValueType {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Self::for_name(&name).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locale_normalization() {
        let value = ValueType::Locale.value_of("fr-ca").unwrap();
        assert_eq!(value.to_string(), "fr_CA");
        assert!(ValueType::Locale.value_of("not a locale").is_err());
    }

    #[test]
    fn test_hex_round_trip() {
        let bytes = vec![0x00, 0x7f, 0xff];
        assert_eq!(decode_hex(&encode_hex(&bytes)), Some(bytes));
        assert_eq!(decode_hex("abc"), None);
        assert_eq!(decode_hex("zz"), None);
    }

    #[test]
    fn test_date_formats() {
        let expected = CalendarDate::new(2012, 2, 1);
        for text in ["2012-03-01", "2012/03/01", "01/03/2012", "01.03.2012"] {
            let value = ValueType::Date.value_of(text).unwrap();
            assert_eq!(value.scalar().unwrap(), Some(&Scalar::Date(expected)), "{}", text);
        }
    }

    #[test]
    fn test_date_time_without_zone_is_utc() {
        let value = ValueType::DateTime.value_of("2011-11-01T10:00:00").unwrap();
        assert_eq!(value.to_string(), "2011-11-01T10:00:00.000+0000");
    }

    #[test]
    fn test_integer_truncates_fractional_input() {
        assert_eq!(ValueType::Integer.value_of(3.9).unwrap(), Value::integer(3));
        assert_eq!(ValueType::Integer.value_of(-3.9).unwrap(), Value::integer(-3));
        assert!(ValueType::Integer.value_of("3.9").is_err());
    }
}
