//! Logical Operators
//!
//! Implements: `&&`, `||`, `!` and the conditional operator.
//! `&&` and `||` use three-valued logic and only evaluate their right operand
//! when the left one does not decide the result.

use super::lift_unary;
use crate::context::EvaluationContext;
use crate::engine::ScriptEngine;
use crate::error::EvalResult;
use crate::program::Node;
use tabula_types::{Value, ValueType};

/// Truth of a condition operand; null of any type is unknown
pub(crate) fn truth(value: &Value) -> EvalResult<Option<bool>> {
    if value.is_null() && !value.is_sequence() {
        return Ok(None);
    }
    Ok(value.as_bool()?)
}

fn three_valued(value: Option<bool>) -> Value {
    match value {
        Some(b) => Value::boolean(b),
        None => ValueType::Boolean.null_value(),
    }
}

/// Evaluate `!`, lifted over sequences
pub fn not(operand: &Value) -> EvalResult<Value> {
    lift_unary(operand, ValueType::Boolean, &mut |value| {
        Ok(three_valued(value.as_bool()?.map(|b| !b)))
    })
}

impl ScriptEngine {
    /// Evaluate `&&` with three-valued logic
    ///
    /// Truth table:
    /// | A     | B     | A && B |
    /// |-------|-------|--------|
    /// | true  | true  | true   |
    /// | true  | false | false  |
    /// | true  | null  | null   |
    /// | false | any   | false  |
    /// | null  | true  | null   |
    /// | null  | false | false  |
    /// | null  | null  | null   |
    pub(crate) fn eval_and(
        &self,
        left: &Value,
        right: &Node,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<Value> {
        let left = truth(left)?;
        if left == Some(false) {
            return Ok(Value::boolean(false));
        }
        let right = truth(&self.eval_node(right, ctx)?)?;
        Ok(three_valued(match (left, right) {
            (_, Some(false)) => Some(false),
            (Some(true), Some(true)) => Some(true),
            _ => None,
        }))
    }

    /// Evaluate `||` with three-valued logic
    ///
    /// Truth table:
    /// | A     | B     | A \|\| B |
    /// |-------|-------|----------|
    /// | true  | any   | true     |
    /// | false | true  | true     |
    /// | false | false | false    |
    /// | false | null  | null     |
    /// | null  | true  | true     |
    /// | null  | false | null     |
    /// | null  | null  | null     |
    pub(crate) fn eval_or(
        &self,
        left: &Value,
        right: &Node,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<Value> {
        let left = truth(left)?;
        if left == Some(true) {
            return Ok(Value::boolean(true));
        }
        let right = truth(&self.eval_node(right, ctx)?)?;
        Ok(three_valued(match (left, right) {
            (_, Some(true)) => Some(true),
            (Some(false), Some(false)) => Some(false),
            _ => None,
        }))
    }

    /// Evaluate `condition ? then : else`; a null condition takes the else branch
    pub(crate) fn eval_conditional(
        &self,
        condition: &Node,
        then_node: &Node,
        else_node: &Node,
        ctx: &mut EvaluationContext,
    ) -> EvalResult<Value> {
        match truth(&self.eval_node(condition, ctx)?)? {
            Some(true) => self.eval_node(then_node, ctx),
            _ => self.eval_node(else_node, ctx),
        }
    }
}
