//! Expression AST nodes

use crate::{BinaryOp, BoxExpr, Literal, Span, UnaryOp};
use serde::{Deserialize, Serialize};
use std::fmt;

/// All script expression kinds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expression {
    Literal(Literal),
    /// The current subject
    This,
    /// Function call `name(args)` or method call `receiver.name(args)`
    Call(CallExpr),
    Unary(UnaryExpr),
    Binary(BinaryExpr),
    /// Conditional `condition ? then : else`
    Conditional(ConditionalExpr),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallExpr {
    /// Explicit subject of a method call
    pub receiver: Option<BoxExpr>,
    pub name: String,
    pub args: Vec<Expression>,
    /// Location of the function name
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnaryExpr {
    pub op: UnaryOp,
    pub operand: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BinaryExpr {
    pub op: BinaryOp,
    pub left: BoxExpr,
    pub right: BoxExpr,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConditionalExpr {
    pub condition: BoxExpr,
    pub then_expr: BoxExpr,
    pub else_expr: BoxExpr,
}

impl Expression {
    pub fn literal(literal: Literal) -> Self {
        Self::Literal(literal)
    }

    pub fn call(name: impl Into<String>, args: Vec<Expression>, span: Span) -> Self {
        Self::Call(CallExpr {
            receiver: None,
            name: name.into(),
            args,
            span,
        })
    }

    pub fn method(receiver: Expression, name: impl Into<String>, args: Vec<Expression>, span: Span) -> Self {
        Self::Call(CallExpr {
            receiver: Some(Box::new(receiver)),
            name: name.into(),
            args,
            span,
        })
    }

    pub fn unary(op: UnaryOp, operand: Expression) -> Self {
        Self::Unary(UnaryExpr {
            op,
            operand: Box::new(operand),
        })
    }

    pub fn binary(op: BinaryOp, left: Expression, right: Expression) -> Self {
        Self::Binary(BinaryExpr {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    pub fn conditional(condition: Expression, then_expr: Expression, else_expr: Expression) -> Self {
        Self::Conditional(ConditionalExpr {
            condition: Box::new(condition),
            then_expr: Box::new(then_expr),
            else_expr: Box::new(else_expr),
        })
    }

    /// Visit this expression and every nested expression, depth first
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Expression)) {
        visit(self);
        match self {
            Self::Literal(_) | Self::This => {}
            Self::Call(call) => {
                if let Some(receiver) = &call.receiver {
                    receiver.walk(visit);
                }
                for arg in &call.args {
                    arg.walk(visit);
                }
            }
            Self::Unary(unary) => unary.operand.walk(visit),
            Self::Binary(binary) => {
                binary.left.walk(visit);
                binary.right.walk(visit);
            }
            Self::Conditional(cond) => {
                cond.condition.walk(visit);
                cond.then_expr.walk(visit);
                cond.else_expr.walk(visit);
            }
        }
    }
}

/// Fully parenthesized rendering, so precedence is visible
impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(literal) => write!(f, "{}", literal),
            Self::This => f.write_str("this"),
            Self::Call(call) => {
                if let Some(receiver) = &call.receiver {
                    write!(f, "{}.", receiver)?;
                }
                write!(f, "{}(", call.name)?;
                for (i, arg) in call.args.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                f.write_str(")")
            }
            Self::Unary(unary) => write!(f, "({}{})", unary.op.symbol(), unary.operand),
            Self::Binary(binary) => write!(
                f,
                "({} {} {})",
                binary.left,
                binary.op.symbol(),
                binary.right
            ),
            Self::Conditional(cond) => write!(
                f,
                "({} ? {} : {})",
                cond.condition, cond.then_expr, cond.else_expr
            ),
        }
    }
}
