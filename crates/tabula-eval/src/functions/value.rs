//! Value functions
//!
//! These operate on whole values, null or sequence included, so they are not
//! lifted.

use crate::error::{EvalError, EvalResult};
use crate::registry::{Call, FunctionDefinition, FunctionRegistry, ReturnType};
use tabula_types::{Value, ValueType};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(
        FunctionDefinition::new("newValue", ReturnType::Subject)
            .arguments(1, 2)
            .with_implementation(|call, _ctx| {
                let value = argument(call, 0)?;
                match call.arg(1) {
                    Some(name) => Ok(named_type(call, name)?.convert(value)?),
                    None => Ok(value.clone()),
                }
            }),
    );

    registry.register(
        FunctionDefinition::new("isNull", ReturnType::Fixed(ValueType::Boolean))
            .with_implementation(|call, _ctx| {
                Ok(Value::boolean(call.subject.is_none_or(Value::is_null)))
            }),
    );

    // type() names the subject's type, type(name) converts it
    registry.register(
        FunctionDefinition::new("type", ReturnType::Subject)
            .arguments(0, 1)
            .with_implementation(|call, _ctx| {
                let subject = call.subject()?;
                match call.arg(0) {
                    Some(name) => Ok(named_type(call, name)?.convert(subject)?),
                    None => Ok(Value::text(subject.value_type().name())),
                }
            }),
    );

    registry.register(
        FunctionDefinition::new("size", ReturnType::Fixed(ValueType::Integer))
            .with_implementation(|call, _ctx| {
                let size = i64::try_from(call.subject()?.size())
                    .map_err(|_| EvalError::overflow("size"))?;
                Ok(Value::integer(size))
            }),
    );

    registry.register(
        FunctionDefinition::new("first", ReturnType::Subject)
            .with_implementation(|call, _ctx| element(call, |elements| elements.first())),
    );
    registry.register(
        FunctionDefinition::new("last", ReturnType::Subject)
            .with_implementation(|call, _ctx| element(call, |elements| elements.last())),
    );
    registry.register(
        FunctionDefinition::new("valueAt", ReturnType::Subject)
            .arguments(1, 1)
            .with_implementation(|call, _ctx| {
                let Some(index) = argument(call, 0)?.as_i64()? else {
                    return Ok(call.subject()?.value_type().null_value());
                };
                element(call, |elements| {
                    usize::try_from(index).ok().and_then(|i| elements.get(i))
                })
            }),
    );
}

fn argument<'a>(call: &Call<'a>, index: usize) -> EvalResult<&'a Value> {
    call.arg(index)
        .ok_or_else(|| EvalError::invalid_operand(call.function, format!("missing argument {}", index + 1)))
}

fn named_type(call: &Call<'_>, name: &Value) -> EvalResult<ValueType> {
    let name = name
        .as_str()?
        .ok_or_else(|| EvalError::invalid_operand(call.function, "type name is null"))?;
    Ok(ValueType::for_name(name)?)
}

/// Pick one element of a sequence subject; a scalar subject is its own only element
fn element(
    call: &Call<'_>,
    pick: impl FnOnce(&[Value]) -> Option<&Value>,
) -> EvalResult<Value> {
    let subject = call.subject()?;
    let value_type = subject.value_type();
    if !subject.is_sequence() {
        let only = std::slice::from_ref(subject);
        return Ok(pick(only).cloned().unwrap_or_else(|| value_type.null_value()));
    }
    Ok(subject
        .elements()?
        .and_then(pick)
        .cloned()
        .unwrap_or_else(|| value_type.null_value()))
}

#[cfg(test)]
mod tests {
    use crate::error::EvalError;
    use crate::functions::testing::eval;
    use pretty_assertions::assert_eq;
    use tabula_types::{RawValue, Value, ValueError, ValueType};

    fn sequence() -> Value {
        ValueType::Integer
            .sequence_of_raw([RawValue::Integer(3), RawValue::Integer(5), RawValue::Integer(8)])
            .unwrap()
    }

    #[test]
    fn test_new_value() {
        let subject = Value::integer(0);
        assert_eq!(eval("newValue('12')", subject.clone()).unwrap(), Value::text("12"));
        assert_eq!(eval("newValue('12', 'integer')", subject.clone()).unwrap(), Value::integer(12));
        assert_eq!(
            eval("newValue('2012-03-01', 'date').dayOfYear()", subject.clone()).unwrap(),
            Value::integer(61)
        );
        assert!(matches!(
            eval("newValue('x', 'nope')", subject.clone()),
            Err(EvalError::Value(ValueError::NoSuchType(_)))
        ));
        assert!(matches!(
            eval("newValue('x', 'integer')", subject),
            Err(EvalError::Value(ValueError::Coercion { .. }))
        ));
    }

    #[test]
    fn test_is_null() {
        assert_eq!(eval("isNull()", ValueType::Date.null_value()).unwrap(), Value::boolean(true));
        assert_eq!(eval("isNull()", Value::integer(1)).unwrap(), Value::boolean(false));
        assert_eq!(eval("isNull()", ValueType::Integer.null_sequence()).unwrap(), Value::boolean(true));
        assert_eq!(eval("isNull()", sequence()).unwrap(), Value::boolean(false));
    }

    #[test]
    fn test_type() {
        assert_eq!(eval("type()", Value::integer(1)).unwrap(), Value::text("integer"));
        assert_eq!(eval("type()", ValueType::Date.null_value()).unwrap(), Value::text("date"));
        assert_eq!(eval("type('text')", Value::integer(1)).unwrap(), Value::text("1"));
        let converted = eval("type('decimal')", sequence()).unwrap();
        assert!(converted.is_sequence());
        assert_eq!(converted.value_type(), ValueType::Decimal);
    }

    #[test]
    fn test_size_first_last() {
        assert_eq!(eval("size()", sequence()).unwrap(), Value::integer(3));
        assert_eq!(eval("size()", Value::integer(1)).unwrap(), Value::integer(1));
        assert_eq!(eval("size()", ValueType::Integer.null_value()).unwrap(), Value::integer(0));
        assert_eq!(eval("first()", sequence()).unwrap(), Value::integer(3));
        assert_eq!(eval("last()", sequence()).unwrap(), Value::integer(8));
        assert_eq!(eval("first()", Value::integer(7)).unwrap(), Value::integer(7));
        assert_eq!(
            eval("last()", ValueType::Integer.null_sequence()).unwrap(),
            ValueType::Integer.null_value()
        );
    }

    #[test]
    fn test_value_at() {
        assert_eq!(eval("valueAt(1)", sequence()).unwrap(), Value::integer(5));
        assert_eq!(eval("valueAt(3)", sequence()).unwrap(), ValueType::Integer.null_value());
        assert_eq!(eval("valueAt(-1)", sequence()).unwrap(), ValueType::Integer.null_value());
        assert_eq!(eval("valueAt(null)", sequence()).unwrap(), ValueType::Integer.null_value());
        assert_eq!(eval("valueAt(0)", Value::integer(7)).unwrap(), Value::integer(7));
    }
}
