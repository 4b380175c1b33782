//! Script operator implementations
//!
//! This module contains implementations for the script operators organized by category:
//! - Arithmetic operators (`+ - * / %`, unary `-`)
//! - Comparison operators (`== != < <= > >=`)
//! - Logical operators (`&& || !`, conditional)
//!
//! Arithmetic and comparison operators propagate null and lift over
//! sequences element by element through [`lift_unary`] and [`lift_binary`].

pub mod arithmetic;
pub mod comparison;
pub mod logical;

use crate::error::{EvalError, EvalResult};
use tabula_types::{Scalar, Value, ValueType};

/// Map a function over a value, propagating null and lifting over sequences
///
/// The operation only ever sees non-null scalar values.
pub(crate) fn lift_unary(
    value: &Value,
    result_type: ValueType,
    op: &mut dyn FnMut(&Value) -> EvalResult<Value>,
) -> EvalResult<Value> {
    if value.is_sequence() {
        let Some(elements) = value.elements()? else {
            return Ok(result_type.null_sequence());
        };
        let mut results = Vec::with_capacity(elements.len());
        for element in elements {
            results.push(lift_unary(element, result_type, op)?);
        }
        return Ok(result_type.sequence_of(results)?);
    }
    if value.is_null() {
        return Ok(result_type.null_value());
    }
    op(value)
}

/// Combine two values, propagating null and lifting over sequences
///
/// A sequence paired with a scalar applies the scalar to every element; two
/// sequences are combined pairwise and must have the same length.
pub(crate) fn lift_binary(
    operator: &str,
    left: &Value,
    right: &Value,
    result_type: ValueType,
    op: &dyn Fn(&Scalar, &Scalar) -> EvalResult<Value>,
) -> EvalResult<Value> {
    match (left.is_sequence(), right.is_sequence()) {
        (false, false) => match (left.scalar()?, right.scalar()?) {
            (Some(a), Some(b)) => op(a, b),
            _ => Ok(result_type.null_value()),
        },
        (true, false) => {
            let Some(elements) = left.elements()? else {
                return Ok(result_type.null_sequence());
            };
            let results = elements
                .iter()
                .map(|element| lift_binary(operator, element, right, result_type, op))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(result_type.sequence_of(results)?)
        }
        (false, true) => {
            let Some(elements) = right.elements()? else {
                return Ok(result_type.null_sequence());
            };
            let results = elements
                .iter()
                .map(|element| lift_binary(operator, left, element, result_type, op))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(result_type.sequence_of(results)?)
        }
        (true, true) => {
            let (Some(a), Some(b)) = (left.elements()?, right.elements()?) else {
                return Ok(result_type.null_sequence());
            };
            if a.len() != b.len() {
                return Err(EvalError::invalid_operand(
                    operator,
                    format!("sequences of different sizes ({} and {})", a.len(), b.len()),
                ));
            }
            let results = a
                .iter()
                .zip(b)
                .map(|(x, y)| lift_binary(operator, x, y, result_type, op))
                .collect::<EvalResult<Vec<_>>>()?;
            Ok(result_type.sequence_of(results)?)
        }
    }
}

/// The non-null scalar of a value handed to a lifted operation
pub(crate) fn scalar_of<'a>(operator: &str, value: &'a Value) -> EvalResult<&'a Scalar> {
    value
        .scalar()?
        .ok_or_else(|| EvalError::internal(format!("{} applied to null", operator)))
}
