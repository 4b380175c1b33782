//! Comparison Operators
//!
//! Implements: `==`, `!=`, `<`, `<=`, `>`, `>=`.
//! All comparisons yield booleans, propagate null and lift over sequences.
//! Operands of different types are compared after promotion: integers to
//! decimals, dates to date-times, anything else to the left operand's type.

use super::lift_binary;
use crate::error::{EvalError, EvalResult};
use crate::temporal::{instant, is_temporal};
use rust_decimal::Decimal;
use std::cmp::Ordering;
use tabula_ast::BinaryOp;
use tabula_types::{Scalar, Value, ValueType};

/// Evaluate a comparison operator
pub fn compare(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    lift_binary(op.symbol(), left, right, ValueType::Boolean, &|a, b| {
        let ordering = order(op.symbol(), a, b)?;
        let result = match op {
            BinaryOp::Equal => ordering == Ordering::Equal,
            BinaryOp::NotEqual => ordering != Ordering::Equal,
            BinaryOp::Less => ordering == Ordering::Less,
            BinaryOp::LessOrEqual => ordering != Ordering::Greater,
            BinaryOp::Greater => ordering == Ordering::Greater,
            BinaryOp::GreaterOrEqual => ordering != Ordering::Less,
            other => {
                return Err(EvalError::internal(format!(
                    "{} is not a comparison",
                    other.symbol()
                )));
            }
        };
        Ok(Value::boolean(result))
    })
}

/// Order two non-null scalars, promoting mixed operands
pub(crate) fn order(operator: &str, left: &Scalar, right: &Scalar) -> EvalResult<Ordering> {
    if let Some(ordering) = left.partial_cmp(right) {
        return Ok(ordering);
    }
    match (left, right) {
        (Scalar::Integer(a), Scalar::Decimal(b)) => Ok(Decimal::from(*a).cmp(b)),
        (Scalar::Decimal(a), Scalar::Integer(b)) => Ok(a.cmp(&Decimal::from(*b))),
        (a, b) if is_temporal(a) && is_temporal(b) => {
            Ok(instant(operator, a)?.cmp(&instant(operator, b)?))
        }
        (a, b) => {
            let promoted = a.value_type().value_of(b.to_raw())?;
            match promoted.scalar()? {
                Some(b) => a.partial_cmp(b).ok_or_else(|| {
                    EvalError::type_mismatch(a.value_type().name(), b.value_type().name())
                }),
                None => Err(EvalError::internal("promotion produced null")),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tabula_types::CalendarDate;

    fn check(op: BinaryOp, left: Value, right: Value) -> Option<bool> {
        compare(op, &left, &right).unwrap().as_bool().unwrap()
    }

    #[rstest]
    #[case(BinaryOp::Equal, Value::integer(1), Value::integer(1), true)]
    #[case(BinaryOp::NotEqual, Value::integer(1), Value::integer(1), false)]
    #[case(BinaryOp::Less, Value::integer(1), Value::integer(2), true)]
    #[case(BinaryOp::LessOrEqual, Value::integer(2), Value::integer(2), true)]
    #[case(BinaryOp::Greater, Value::text("b"), Value::text("a"), true)]
    #[case(BinaryOp::GreaterOrEqual, Value::integer(1), Value::integer(2), false)]
    #[case(BinaryOp::Equal, Value::integer(2), Value::decimal(Decimal::new(20, 1)), true)]
    #[case(BinaryOp::Less, Value::decimal(Decimal::new(15, 1)), Value::integer(2), true)]
    #[case(BinaryOp::Equal, Value::text("42"), Value::integer(42), true)]
    #[case(BinaryOp::Equal, Value::boolean(true), Value::boolean(false), false)]
    fn test_scalar_comparisons(
        #[case] op: BinaryOp,
        #[case] left: Value,
        #[case] right: Value,
        #[case] expected: bool,
    ) {
        assert_eq!(check(op, left, right), Some(expected));
    }

    #[test]
    fn test_date_and_date_time_compare_as_instants() {
        let date = Value::date(CalendarDate::new(2011, 10, 1));
        let morning = ValueType::DateTime.value_of("2011-11-01T10:00:00Z").unwrap();
        assert_eq!(check(BinaryOp::Less, date.clone(), morning.clone()), Some(true));
        assert_eq!(check(BinaryOp::Greater, morning, date), Some(true));
    }

    #[test]
    fn test_null_propagates() {
        assert_eq!(
            check(BinaryOp::Equal, ValueType::Integer.null_value(), Value::integer(1)),
            None
        );
        assert_eq!(
            check(BinaryOp::Equal, ValueType::Text.null_value(), ValueType::Text.null_value()),
            None
        );
    }

    #[test]
    fn test_sequence_lifting() {
        let ages = ValueType::Integer
            .sequence_of([Value::integer(10), Value::integer(30)])
            .unwrap();
        let result = compare(BinaryOp::Greater, &ages, &Value::integer(18)).unwrap();
        assert_eq!(result.value_type(), ValueType::Boolean);
        assert_eq!(result.to_string(), "false,true");
    }

    #[test]
    fn test_incomparable_operands() {
        assert!(compare(BinaryOp::Less, &Value::integer(1), &Value::text("x")).is_err());
    }
}
