//! Compiled scripts
//!
//! Compilation parses the source and binds every call to its function
//! definition. The resulting [`Program`] is immutable and shared between
//! threads; each evaluation brings its own [`crate::EvaluationContext`].

use crate::error::{EvalError, EvalResult};
use crate::registry::{FunctionDefinition, FunctionFn, FunctionRegistry};
use std::fmt;
use std::sync::Arc;
use tabula_ast::{BinaryExpr, BinaryOp, Expression, Literal, Span, UnaryOp};
use tabula_types::{Value, ValueType};

/// A compiled script
#[derive(Debug)]
pub struct Program {
    source: String,
    pub(crate) root: Node,
}

impl Program {
    pub(crate) fn compile(source: &str, registry: &FunctionRegistry) -> EvalResult<Self> {
        let expression = tabula_parser::parse(source)?;
        let root = Node::compile(expression, registry)?;
        Ok(Self {
            source: source.to_string(),
            root,
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

#[derive(Debug)]
pub(crate) enum Node {
    Literal(Value),
    This,
    Call(CompiledCall),
    Unary {
        op: UnaryOp,
        operand: Box<Node>,
    },
    /// Left-associative operator chain `first op1 right1 op2 right2 ...`
    Chain {
        first: Box<Node>,
        rest: Vec<(BinaryOp, Node)>,
    },
    Conditional {
        condition: Box<Node>,
        then_node: Box<Node>,
        else_node: Box<Node>,
    },
}

pub(crate) struct CompiledCall {
    pub(crate) function: Arc<FunctionDefinition>,
    pub(crate) implementation: FunctionFn,
    pub(crate) receiver: Option<Box<Node>>,
    pub(crate) args: Vec<Node>,
    pub(crate) span: Span,
}

impl fmt::Debug for CompiledCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledCall")
            .field("function", &self.function.name)
            .field("receiver", &self.receiver)
            .field("args", &self.args)
            .field("span", &self.span)
            .finish()
    }
}

impl Node {
    fn compile(expression: Expression, registry: &FunctionRegistry) -> EvalResult<Self> {
        let compile_boxed = |e: Box<Expression>| Self::compile(*e, registry).map(Box::new);
        Ok(match expression {
            Expression::Literal(literal) => Self::Literal(literal_value(&literal)),
            Expression::This => Self::This,
            Expression::Call(call) => {
                let function = registry
                    .get(&call.name)
                    .ok_or_else(|| EvalError::undefined_function(&call.name))?;
                function.check_arity(call.args.len())?;
                let implementation = function
                    .implementation
                    .clone()
                    .ok_or_else(|| EvalError::undefined_function(&call.name))?;
                let receiver = call.receiver.map(compile_boxed).transpose()?;
                let args = call
                    .args
                    .into_iter()
                    .map(|arg| Self::compile(arg, registry))
                    .collect::<EvalResult<Vec<_>>>()?;
                Self::Call(CompiledCall {
                    function: function.clone(),
                    implementation,
                    receiver,
                    args,
                    span: call.span,
                })
            }
            Expression::Unary(unary) => Self::Unary {
                op: unary.op,
                operand: compile_boxed(unary.operand)?,
            },
            Expression::Binary(binary) => Self::compile_chain(binary, registry)?,
            Expression::Conditional(conditional) => Self::Conditional {
                condition: compile_boxed(conditional.condition)?,
                then_node: compile_boxed(conditional.then_expr)?,
                else_node: compile_boxed(conditional.else_expr)?,
            },
        })
    }

    /// Flatten the left spine of binary operators into one chain
    fn compile_chain(binary: BinaryExpr, registry: &FunctionRegistry) -> EvalResult<Self> {
        let mut operands = vec![(binary.op, *binary.right)];
        let mut first = *binary.left;
        while let Expression::Binary(left) = first {
            operands.push((left.op, *left.right));
            first = *left.left;
        }
        let first = Box::new(Self::compile(first, registry)?);
        let rest = operands
            .into_iter()
            .rev()
            .map(|(op, right)| Ok((op, Self::compile(right, registry)?)))
            .collect::<EvalResult<Vec<_>>>()?;
        Ok(Self::Chain { first, rest })
    }
}

fn literal_value(literal: &Literal) -> Value {
    match literal {
        Literal::Null => ValueType::Text.null_value(),
        Literal::Boolean(b) => Value::boolean(*b),
        Literal::Integer(i) => Value::integer(*i),
        Literal::Decimal(d) => Value::decimal(*d),
        Literal::String(s) => Value::text(s.clone()),
    }
}
