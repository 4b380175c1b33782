//! Script-derived values
//!
//! A [`ScriptValueSource`] pairs a script with the engine that runs it and
//! compiles it once, on first use. A [`ScriptVariableValueSource`] is the
//! value source of a derived variable: it evaluates its script against a
//! value set and coerces the result to the variable's declared type.
//!
//! References to other derived variables are evaluated on the caller's
//! context, so the depth limit catches cyclic definitions.

use crate::context::EvaluationContext;
use crate::engine::ScriptEngine;
use crate::error::{EvalError, EvalResult};
use crate::program::Program;
use log::debug;
use once_cell::sync::OnceCell;
use std::any::Any;
use std::fmt;
use std::sync::Arc;
use tabula_model::{
    ModelError, ModelResult, StaticTableBuilder, ValueSet, Variable, VariableReference,
    VariableValueSource,
};
use tabula_types::Value;

/// Attribute holding the script of a derived variable
pub const SCRIPT_ATTRIBUTE: &str = "script";

/// Attribute holding the reference bound to `this` in a derived variable's script
pub const SUBJECT_ATTRIBUTE: &str = "subject";

/// A script compiled lazily and evaluated against value sets
pub struct ScriptValueSource {
    script: String,
    engine: ScriptEngine,
    program: OnceCell<EvalResult<Arc<Program>>>,
}

impl ScriptValueSource {
    pub fn new(script: impl Into<String>, engine: ScriptEngine) -> Self {
        Self {
            script: script.into(),
            engine,
            program: OnceCell::new(),
        }
    }

    pub fn script(&self) -> &str {
        &self.script
    }

    pub fn engine(&self) -> &ScriptEngine {
        &self.engine
    }

    /// Compile now instead of on first evaluation
    pub fn initialise(&self) -> EvalResult<()> {
        self.program().map(|_| ())
    }

    /// The compiled program; a compilation failure is kept and returned again
    pub fn program(&self) -> EvalResult<Arc<Program>> {
        self.program
            .get_or_init(|| {
                self.engine.compile(&self.script).map(Arc::new).inspect_err(|e| {
                    debug!("Script {:?} failed to compile: {}", self.script, e);
                })
            })
            .clone()
    }

    /// Evaluate against a value set on a fresh context
    pub fn evaluate(&self, value_set: &ValueSet) -> EvalResult<Value> {
        let mut ctx = self.engine.new_context();
        self.evaluate_in(&mut ctx, value_set)
    }

    /// Evaluate against a value set on top of an existing context
    pub fn evaluate_in(&self, ctx: &mut EvaluationContext, value_set: &ValueSet) -> EvalResult<Value> {
        let program = self.program()?;
        let mut scope = ctx.enter(value_set, None)?;
        self.engine.evaluate(&program, &mut scope)
    }
}

impl fmt::Debug for ScriptValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptValueSource")
            .field("script", &self.script)
            .field("compiled", &self.program.get().map(Result::is_ok))
            .finish()
    }
}

/// Value source of a variable derived by a script
pub struct ScriptVariableValueSource {
    variable: Arc<Variable>,
    script: ScriptValueSource,
    subject: Option<VariableReference>,
}

impl ScriptVariableValueSource {
    /// Build from the variable's `script` attribute and optional `subject` attribute
    pub fn new(variable: Arc<Variable>, engine: ScriptEngine) -> ModelResult<Self> {
        let script = variable
            .attribute_text(SCRIPT_ATTRIBUTE)
            .ok_or_else(|| ModelError::missing(variable.name(), SCRIPT_ATTRIBUTE))?;
        let subject = variable
            .attribute_text(SUBJECT_ATTRIBUTE)
            .map(|reference| VariableReference::parse(&reference))
            .transpose()?;
        Ok(Self {
            script: ScriptValueSource::new(script, engine),
            variable,
            subject,
        })
    }

    pub fn with_script(variable: Arc<Variable>, script: impl Into<String>, engine: ScriptEngine) -> Self {
        Self {
            variable,
            script: ScriptValueSource::new(script, engine),
            subject: None,
        }
    }

    /// Bind `this` to the value of another variable of the same entity
    pub fn with_subject(mut self, subject: VariableReference) -> Self {
        self.subject = Some(subject);
        self
    }

    pub fn script(&self) -> &ScriptValueSource {
        &self.script
    }

    pub fn subject(&self) -> Option<&VariableReference> {
        self.subject.as_ref()
    }

    pub fn initialise(&self) -> EvalResult<()> {
        self.script.initialise()
    }

    /// Evaluate on a fresh context
    pub fn evaluate(&self, value_set: &ValueSet) -> EvalResult<Value> {
        let mut ctx = self.script.engine.new_context();
        self.evaluate_in(&mut ctx, value_set)
    }

    /// Evaluate on top of an existing context and coerce to the variable's type
    pub fn evaluate_in(&self, ctx: &mut EvaluationContext, value_set: &ValueSet) -> EvalResult<Value> {
        let program = self.script.program()?;
        let engine = &self.script.engine;
        let mut scope = ctx.enter(value_set, Some(self.variable.clone()))?;
        let value = match &self.subject {
            Some(reference) => {
                let subject = resolve_reference(&mut scope, reference)?;
                let mut scope = scope.push_subject(subject);
                engine.evaluate(&program, &mut scope)?
            }
            None => engine.evaluate(&program, &mut scope)?,
        };
        self.coerce(value)
    }

    fn coerce(&self, value: Value) -> EvalResult<Value> {
        let value_type = self.variable.value_type();
        if self.variable.is_repeatable() {
            return Ok(if value.is_sequence() {
                value_type.convert(&value)?
            } else if value.is_null() {
                value_type.null_sequence()
            } else {
                value_type.sequence_of([value])?
            });
        }
        if value.is_sequence() {
            return Err(EvalError::type_mismatch(
                format!("{} value for {}", value_type, self.variable.name()),
                format!("{} sequence", value.value_type()),
            ));
        }
        Ok(value_type.convert(&value)?)
    }
}

impl fmt::Debug for ScriptVariableValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptVariableValueSource")
            .field("variable", &self.variable.name())
            .field("script", &self.script.script)
            .field("subject", &self.subject.as_ref().map(ToString::to_string))
            .finish()
    }
}

impl VariableValueSource for ScriptVariableValueSource {
    fn variable(&self) -> &Arc<Variable> {
        &self.variable
    }

    fn value(&self, value_set: &ValueSet) -> ModelResult<Value> {
        self.evaluate(value_set).map_err(|e| match e {
            EvalError::Model(e) => e,
            other => ModelError::derivation(self.variable.name(), other),
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Value of a referenced variable for the entity of the context value set
///
/// Script-derived variables are evaluated on `ctx` itself rather than on a
/// fresh context.
pub(crate) fn resolve_reference(
    ctx: &mut EvaluationContext,
    reference: &VariableReference,
) -> EvalResult<Value> {
    let context = ctx
        .current_value_set()
        .cloned()
        .ok_or(ModelError::NoContext)?;
    let joined = reference.join(&context)?;
    let source = joined
        .table()
        .variable_value_source(reference.variable_name())?;
    match source.as_any().downcast_ref::<ScriptVariableValueSource>() {
        Some(script) => script.evaluate_in(ctx, &joined),
        None => Ok(source.value(&joined)?),
    }
}

/// Derived variables on in-memory tables
pub trait ScriptTableBuilderExt {
    /// Add a variable derived by a script run on the global engine
    fn derived(self, variable: Variable, script: &str) -> Self;

    /// Add a derived variable whose `this` is another variable's value
    fn derived_over(self, variable: Variable, script: &str, subject: VariableReference) -> Self;
}

impl ScriptTableBuilderExt for StaticTableBuilder {
    fn derived(self, variable: Variable, script: &str) -> Self {
        self.source(Arc::new(ScriptVariableValueSource::with_script(
            Arc::new(variable),
            script,
            ScriptEngine::global().clone(),
        )))
    }

    fn derived_over(self, variable: Variable, script: &str, subject: VariableReference) -> Self {
        self.source(Arc::new(
            ScriptVariableValueSource::with_script(
                Arc::new(variable),
                script,
                ScriptEngine::global().clone(),
            )
            .with_subject(subject),
        ))
    }
}
