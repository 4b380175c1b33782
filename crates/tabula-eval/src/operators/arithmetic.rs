//! Arithmetic Operators
//!
//! Implements: `+`, `-`, `*`, `/`, `%` and unary `-`.
//! - Integer operands stay integers, except `/` which always yields a decimal
//! - Mixed integer and decimal operands compute in decimal
//! - `+` with a text operand concatenates display forms
//! - Date and datetime operands add or subtract whole days; subtracting two
//!   temporal operands yields the number of days between them

use super::{lift_binary, lift_unary, scalar_of};
use crate::error::{EvalError, EvalResult};
use crate::temporal::{instant, is_temporal};
use chrono::{DateTime, FixedOffset, TimeDelta};
use rust_decimal::Decimal;
use tabula_ast::BinaryOp;
use tabula_types::{Scalar, Value, ValueType};

/// Evaluate a binary arithmetic operator
pub fn arithmetic(op: BinaryOp, left: &Value, right: &Value) -> EvalResult<Value> {
    let result_type = result_type(op, left.value_type(), right.value_type())?;
    lift_binary(op.symbol(), left, right, result_type, &|a, b| {
        apply(op, a, b)
    })
}

/// Evaluate unary negation
pub fn negate(operand: &Value) -> EvalResult<Value> {
    let value_type = operand.value_type();
    if !value_type.is_numeric() {
        return Err(EvalError::unsupported_operator("-", value_type.name()));
    }
    lift_unary(operand, value_type, &mut |value| match scalar_of("-", value)? {
        Scalar::Integer(i) => i
            .checked_neg()
            .map(Value::integer)
            .ok_or_else(|| EvalError::overflow("-")),
        Scalar::Decimal(d) => Ok(Value::decimal(-*d)),
        other => Err(EvalError::unsupported_operator("-", other.value_type().name())),
    })
}

/// Static result type of an arithmetic operator
///
/// Computed from the operand types alone so that null operands still yield
/// a correctly typed null.
fn result_type(op: BinaryOp, left: ValueType, right: ValueType) -> EvalResult<ValueType> {
    use ValueType::{Decimal, Integer, Text};

    let unsupported = || {
        EvalError::unsupported_operator(op.symbol(), format!("{} and {}", left, right))
    };
    if op == BinaryOp::Add && (left == Text || right == Text) {
        return Ok(Text);
    }
    if left.is_numeric() && right.is_numeric() {
        return Ok(match op {
            BinaryOp::Divide => Decimal,
            _ if left == Integer && right == Integer => Integer,
            _ => Decimal,
        });
    }
    match op {
        BinaryOp::Add if left.is_temporal() && right == Integer => Ok(left),
        BinaryOp::Add if left == Integer && right.is_temporal() => Ok(right),
        BinaryOp::Subtract if left.is_temporal() && right == Integer => Ok(left),
        BinaryOp::Subtract if left.is_temporal() && right.is_temporal() => Ok(Integer),
        _ => Err(unsupported()),
    }
}

fn apply(op: BinaryOp, left: &Scalar, right: &Scalar) -> EvalResult<Value> {
    if op == BinaryOp::Add && (matches!(left, Scalar::Text(_)) || matches!(right, Scalar::Text(_))) {
        return Ok(Value::text(format!("{}{}", left, right)));
    }
    match (left, right) {
        (Scalar::Integer(a), Scalar::Integer(b)) => integer_op(op, *a, *b),
        (Scalar::Integer(_) | Scalar::Decimal(_), Scalar::Integer(_) | Scalar::Decimal(_)) => {
            decimal_op(op, to_decimal(left), to_decimal(right))
        }
        (temporal, Scalar::Integer(days)) if is_temporal(temporal) => {
            let days = if op == BinaryOp::Subtract {
                days.checked_neg().ok_or_else(|| EvalError::overflow(op.symbol()))?
            } else {
                *days
            };
            add_days(op.symbol(), temporal, days)
        }
        (Scalar::Integer(days), temporal) if op == BinaryOp::Add && is_temporal(temporal) => {
            add_days(op.symbol(), temporal, *days)
        }
        (a, b) if op == BinaryOp::Subtract && is_temporal(a) && is_temporal(b) => {
            days_between(op.symbol(), a, b)
        }
        (a, b) => Err(EvalError::unsupported_operator(
            op.symbol(),
            format!("{} and {}", a.value_type(), b.value_type()),
        )),
    }
}

fn to_decimal(scalar: &Scalar) -> Decimal {
    match scalar {
        Scalar::Integer(i) => Decimal::from(*i),
        Scalar::Decimal(d) => *d,
        _ => Decimal::ZERO,
    }
}

fn integer_op(op: BinaryOp, a: i64, b: i64) -> EvalResult<Value> {
    let overflow = || EvalError::overflow(op.symbol());
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Subtract => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide => return decimal_op(op, Decimal::from(a), Decimal::from(b)),
        BinaryOp::Modulo => {
            if b == 0 {
                return Err(EvalError::DivisionByZero);
            }
            a.checked_rem(b)
        }
        _ => return Err(EvalError::unsupported_operator(op.symbol(), "integer and integer")),
    };
    result.map(Value::integer).ok_or_else(overflow)
}

fn decimal_op(op: BinaryOp, a: Decimal, b: Decimal) -> EvalResult<Value> {
    let result = match op {
        BinaryOp::Add => a.checked_add(b),
        BinaryOp::Subtract => a.checked_sub(b),
        BinaryOp::Multiply => a.checked_mul(b),
        BinaryOp::Divide | BinaryOp::Modulo if b.is_zero() => {
            return Err(EvalError::DivisionByZero);
        }
        BinaryOp::Divide => a.checked_div(b),
        BinaryOp::Modulo => a.checked_rem(b),
        _ => return Err(EvalError::unsupported_operator(op.symbol(), "decimal and decimal")),
    };
    result
        .map(|d| Value::decimal(d.normalize()))
        .ok_or_else(|| EvalError::overflow(op.symbol()))
}

/// Shift a date or date-time by whole days
pub(crate) fn add_days(operator: &str, temporal: &Scalar, days: i64) -> EvalResult<Value> {
    let overflow = || EvalError::overflow(operator);
    match temporal {
        Scalar::Date(date) => {
            let days = i32::try_from(days).map_err(|_| overflow())?;
            Ok(Value::date(date.add_days(days)))
        }
        Scalar::DateTime(dt) => {
            let delta = TimeDelta::try_days(days).ok_or_else(overflow)?;
            let shifted: DateTime<FixedOffset> = dt.checked_add_signed(delta).ok_or_else(overflow)?;
            Ok(Value::date_time(shifted))
        }
        other => Err(EvalError::type_mismatch("date or datetime", other.value_type().name())),
    }
}

fn days_between(operator: &str, left: &Scalar, right: &Scalar) -> EvalResult<Value> {
    let elapsed = instant(operator, left)? - instant(operator, right)?;
    Ok(Value::integer(elapsed.num_days()))
}
