//! Context functions
//!
//! `$('table:variable')` reads another variable of the current entity, the
//! others describe the frames the script runs in.

use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use crate::registry::{Call, FunctionDefinition, FunctionRegistry, ReturnType};
use crate::source::resolve_reference;
use tabula_model::{ModelError, VariableReference};
use tabula_types::{Value, ValueType};

pub(super) fn register(registry: &mut FunctionRegistry) {
    registry.register(
        FunctionDefinition::new("$", ReturnType::Fixed(ValueType::Text))
            .arguments(1, 1)
            .with_implementation(|call, ctx| {
                let reference = reference_argument(call)?;
                resolve_reference(ctx, &VariableReference::parse(reference)?)
            }),
    );

    describe(registry, "currentVariable", |ctx| {
        ctx.current_variable().map(|variable| variable.name().to_string())
    });
    describe(registry, "currentTable", |ctx| {
        ctx.current_table().map(|table| table.name().to_string())
    });
    describe(registry, "currentDatasource", |ctx| {
        ctx.current_datasource().map(|ds| ds.name().to_string())
    });
    describe(registry, "entityId", |ctx| {
        ctx.current_value_set()
            .map(|value_set| value_set.entity().identifier().to_string())
    });
    describe(registry, "entityType", |ctx| {
        ctx.current_value_set()
            .map(|value_set| value_set.entity().entity_type().to_string())
    });
}

fn reference_argument<'a>(call: &Call<'a>) -> EvalResult<&'a str> {
    let argument = call
        .arg(0)
        .ok_or_else(|| EvalError::invalid_operand(call.function, "missing variable reference"))?;
    argument
        .as_str()?
        .ok_or_else(|| EvalError::invalid_operand(call.function, "variable reference is null"))
}

/// A text function naming one frame of the context
fn describe(
    registry: &mut FunctionRegistry,
    name: &str,
    read: fn(&EvaluationContext) -> Option<String>,
) {
    registry.register(
        FunctionDefinition::new(name, ReturnType::Fixed(ValueType::Text)).with_implementation(
            move |_call, ctx| {
                read(ctx)
                    .map(Value::text)
                    .ok_or(EvalError::Model(ModelError::NoContext))
            },
        ),
    );
}
