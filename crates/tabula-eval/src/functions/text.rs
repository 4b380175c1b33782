//! Text functions
//!
//! Non-text subjects are read through their display form.

use crate::registry::{FunctionDefinition, FunctionRegistry, ReturnType};
use tabula_types::{Value, ValueType};

pub(super) fn register(registry: &mut FunctionRegistry) {
    text_function(registry, "trim", |s| s.trim().to_string());
    text_function(registry, "upper", str::to_uppercase);
    text_function(registry, "lower", str::to_lowercase);
}

fn text_function(registry: &mut FunctionRegistry, name: &str, apply: fn(&str) -> String) {
    registry.register(
        FunctionDefinition::new(name, ReturnType::Fixed(ValueType::Text))
            .lifted()
            .with_implementation(move |call, _ctx| {
                Ok(Value::text(apply(&call.scalar()?.to_string())))
            }),
    );
}

#[cfg(test)]
mod tests {
    use crate::functions::testing::eval;
    use tabula_types::{Value, ValueType};

    #[test]
    fn test_text_functions() {
        assert_eq!(eval("trim()", Value::text("  a b ")).unwrap(), Value::text("a b"));
        assert_eq!(eval("upper()", Value::text("abc")).unwrap(), Value::text("ABC"));
        assert_eq!(eval("'MiXed'.lower()", Value::integer(0)).unwrap(), Value::text("mixed"));
        assert_eq!(eval("lower()", Value::boolean(true)).unwrap(), Value::text("true"));
    }

    #[test]
    fn test_text_functions_propagate() {
        assert_eq!(eval("upper()", ValueType::Text.null_value()).unwrap(), ValueType::Text.null_value());
        let words = ValueType::Text
            .sequence_of([Value::text("a"), Value::text("b")])
            .unwrap();
        assert_eq!(eval("upper()", words).unwrap().to_string(), "A,B");
    }
}
