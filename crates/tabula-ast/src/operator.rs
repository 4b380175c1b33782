//! Script operators with precedence information

use serde::{Deserialize, Serialize};

/// Binary operators, lowest precedence first
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BinaryOp {
    // Precedence 2 (1 is the conditional operator)
    /// Three-valued logical or
    Or,

    // Precedence 3
    /// Three-valued logical and
    And,

    // Precedence 4
    Equal,
    NotEqual,

    // Precedence 5
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,

    // Precedence 6
    /// Addition, text concatenation, date shift by days
    Add,
    Subtract,

    // Precedence 7
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    /// Get the precedence level (2-7, higher binds tighter)
    pub const fn precedence(&self) -> u8 {
        match self {
            Self::Or => 2,
            Self::And => 3,
            Self::Equal | Self::NotEqual => 4,
            Self::Less | Self::LessOrEqual | Self::Greater | Self::GreaterOrEqual => 5,
            Self::Add | Self::Subtract => 6,
            Self::Multiply | Self::Divide | Self::Modulo => 7,
        }
    }

    pub const fn is_comparison(&self) -> bool {
        matches!(
            self,
            Self::Equal
                | Self::NotEqual
                | Self::Less
                | Self::LessOrEqual
                | Self::Greater
                | Self::GreaterOrEqual
        )
    }

    pub const fn is_logical(&self) -> bool {
        matches!(self, Self::And | Self::Or)
    }

    pub const fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            Self::Add | Self::Subtract | Self::Multiply | Self::Divide | Self::Modulo
        )
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Or => "||",
            Self::And => "&&",
            Self::Equal => "==",
            Self::NotEqual => "!=",
            Self::Less => "<",
            Self::LessOrEqual => "<=",
            Self::Greater => ">",
            Self::GreaterOrEqual => ">=",
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::Modulo => "%",
        }
    }
}

/// Unary operators (precedence 8, highest)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UnaryOp {
    /// Logical not
    Not,
    /// Unary minus (negation)
    Negate,
}

impl UnaryOp {
    pub const fn precedence(&self) -> u8 {
        8
    }

    pub const fn symbol(&self) -> &'static str {
        match self {
            Self::Not => "!",
            Self::Negate => "-",
        }
    }
}
