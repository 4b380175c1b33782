//! Date and date-time operands
//!
//! Temporal built-ins accept any mix of `date` and `datetime` values. A date
//! is read as midnight UTC of that day.

use crate::error::{EvalError, EvalResult};
use chrono::{DateTime, FixedOffset};
use tabula_types::Scalar;

/// The instant a temporal scalar denotes, keeping a date-time's own offset
pub(crate) fn instant(operator: &str, scalar: &Scalar) -> EvalResult<DateTime<FixedOffset>> {
    match scalar {
        Scalar::DateTime(dt) => Ok(*dt),
        Scalar::Date(date) => date
            .start_of_day()
            .ok_or_else(|| EvalError::overflow(operator)),
        other => Err(EvalError::type_mismatch(
            "date or datetime",
            other.value_type().name(),
        )),
    }
}

pub(crate) fn is_temporal(scalar: &Scalar) -> bool {
    matches!(scalar, Scalar::Date(_) | Scalar::DateTime(_))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tabula_types::CalendarDate;

    #[test]
    fn test_date_is_midnight_utc() {
        let dt = instant("test", &Scalar::Date(CalendarDate::new(2012, 2, 1))).unwrap();
        assert_eq!(dt.to_rfc3339(), "2012-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_non_temporal_is_rejected() {
        assert!(matches!(
            instant("test", &Scalar::Integer(1)),
            Err(EvalError::TypeMismatch { .. })
        ));
    }
}
