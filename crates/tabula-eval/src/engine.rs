//! Script Evaluation Engine
//!
//! This module provides the [`ScriptEngine`] which compiles scripts into
//! [`Program`]s and evaluates them against an evaluation context.

use crate::config::EngineConfig;
use crate::context::EvaluationContext;
use crate::error::{EvalError, EvalResult};
use crate::operators::{arithmetic, comparison, lift_unary, logical};
use crate::program::{CompiledCall, Node, Program};
use crate::registry::{Call, FunctionRegistry};
use log::{debug, trace};
use once_cell::sync::Lazy;
use std::sync::Arc;
use tabula_ast::{BinaryOp, UnaryOp};
use tabula_model::ValueSet;
use tabula_types::Value;

static GLOBAL: Lazy<ScriptEngine> = Lazy::new(ScriptEngine::new);

/// The script engine
///
/// Holds the function registry and configuration. Cloning is cheap and
/// clones share the registry.
#[derive(Debug, Clone)]
pub struct ScriptEngine {
    /// Function registry
    registry: Arc<FunctionRegistry>,
    config: EngineConfig,
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl ScriptEngine {
    /// Create a new engine with the built-in functions and default settings
    pub fn new() -> Self {
        Self::with_config(EngineConfig::default())
    }

    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_registry(FunctionRegistry::with_standard_functions(), config)
    }

    /// Create an engine with a custom registry
    pub fn with_registry(registry: FunctionRegistry, config: EngineConfig) -> Self {
        Self {
            registry: Arc::new(registry),
            config,
        }
    }

    /// The process-wide engine with default settings
    pub fn global() -> &'static ScriptEngine {
        &GLOBAL
    }

    pub fn registry(&self) -> &FunctionRegistry {
        &self.registry
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// A fresh context for one evaluation call chain
    pub fn new_context(&self) -> EvaluationContext {
        EvaluationContext::with_config(&self.config)
    }

    /// Parse a script and bind its calls
    pub fn compile(&self, source: &str) -> EvalResult<Program> {
        let program = Program::compile(source, &self.registry)?;
        debug!("Compiled script: {}", source);
        Ok(program)
    }

    /// Run a compiled program on the current frames of a context
    pub fn evaluate(&self, program: &Program, ctx: &mut EvaluationContext) -> EvalResult<Value> {
        trace!("Evaluating script: {}", program.source());
        self.eval_node(&program.root, ctx)
    }

    /// Compile and evaluate a script against one value set
    pub fn evaluate_script(&self, source: &str, value_set: &ValueSet) -> EvalResult<Value> {
        let program = self.compile(source)?;
        let mut ctx = self.new_context();
        let mut scope = ctx.enter(value_set, None)?;
        self.evaluate(&program, &mut scope)
    }

    /// Main node evaluation dispatcher
    pub(crate) fn eval_node(&self, node: &Node, ctx: &mut EvaluationContext) -> EvalResult<Value> {
        match node {
            Node::Literal(value) => Ok(value.clone()),
            Node::This => ctx
                .subject()
                .cloned()
                .ok_or_else(|| EvalError::no_subject("this")),
            Node::Call(call) => self.eval_call(call, ctx),
            Node::Unary { op, operand } => {
                let operand = self.eval_node(operand, ctx)?;
                match op {
                    UnaryOp::Not => logical::not(&operand),
                    UnaryOp::Negate => arithmetic::negate(&operand),
                }
            }
            Node::Chain { first, rest } => {
                let mut left = self.eval_node(first, ctx)?;
                for (op, right) in rest {
                    left = self.eval_binary(*op, left, right, ctx)?;
                }
                Ok(left)
            }
            Node::Conditional {
                condition,
                then_node,
                else_node,
            } => self.eval_conditional(condition, then_node, else_node, ctx),
        }
    }

    fn eval_binary(
        &self,
        op: BinaryOp,
        left: Value,
        right: &Node,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<Value> {
        match op {
            BinaryOp::And => self.eval_and(&left, right, ctx),
            BinaryOp::Or => self.eval_or(&left, right, ctx),
            _ => {
                let right = self.eval_node(right, ctx)?;
                if op.is_comparison() {
                    comparison::compare(op, &left, &right)
                } else {
                    arithmetic::arithmetic(op, &left, &right)
                }
            }
        }
    }

    fn eval_call(&self, call: &CompiledCall, ctx: &mut EvaluationContext) -> EvalResult<Value> {
        let subject = match &call.receiver {
            Some(receiver) => Some(self.eval_node(receiver, ctx)?),
            None => ctx.subject().cloned(),
        };
        let args = call
            .args
            .iter()
            .map(|arg| self.eval_node(arg, ctx))
            .collect::<EvalResult<Vec<_>>>()?;
        let function = &call.function;
        let implementation = &call.implementation;

        if !function.lifted {
            let invocation = Call {
                function: &function.name,
                subject: subject.as_ref(),
                args: &args,
            };
            return implementation(&invocation, ctx);
        }

        let subject = subject.ok_or_else(|| EvalError::no_subject(&function.name))?;
        let result_type = function.return_type.resolve(subject.value_type());
        lift_unary(&subject, result_type, &mut |element| {
            let invocation = Call {
                function: &function.name,
                subject: Some(element),
                args: &args,
            };
            implementation(&invocation, ctx)
        })
    }
}
