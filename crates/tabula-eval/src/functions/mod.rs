//! Built-in script functions
//!
//! - Date and time functions (`year`, `dayOfYear`, `after`, `format`, ...)
//! - Text functions (`trim`, `upper`, `lower`)
//! - Value functions (`newValue`, `type`, `size`, `valueAt`, ...)
//! - Context functions (`$`, `currentVariable`, `entityId`, ...)

mod context;
mod datetime;
mod format;
mod text;
mod value;

use crate::registry::FunctionRegistry;

/// Register every built-in function
pub(crate) fn register_standard_functions(registry: &mut FunctionRegistry) {
    datetime::register(registry);
    text::register(registry);
    value::register(registry);
    context::register(registry);
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::engine::ScriptEngine;
    use crate::error::EvalResult;
    use tabula_types::Value;

    /// Evaluate a script with `this` bound to a subject
    pub(crate) fn eval(source: &str, subject: Value) -> EvalResult<Value> {
        let engine = ScriptEngine::global();
        let program = engine.compile(source)?;
        let mut ctx = engine.new_context();
        let mut scope = ctx.push_subject(subject);
        engine.evaluate(&program, &mut scope)
    }
}
