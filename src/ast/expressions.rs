use crate::lexer::tokens::Token;

use super::ast::Expr;

// LITERALS

/// Null Expression
/// Represents the `null` literal.
#[derive(Debug, Clone, PartialEq)]
pub struct NullExpr {
    pub token: Token,
}

/// Bool Expression
/// Represents the `true` and `false` literals.
#[derive(Debug, Clone, PartialEq)]
pub struct BoolExpr {
    pub value: bool,
    pub token: Token,
}

/// Int Expression
/// Represents an integer literal, decimal or `0x` hexadecimal.
#[derive(Debug, Clone, PartialEq)]
pub struct IntExpr {
    pub value: i64,
    pub token: Token,
}

/// Float Expression
/// Represents a floating point literal.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatExpr {
    pub value: f64,
    pub token: Token,
}

/// String Expression
/// Represents a single-quoted string literal. `value` is already unescaped.
#[derive(Debug, Clone, PartialEq)]
pub struct StringExpr {
    pub value: String,
    pub token: Token,
}

/// Variable Expression
/// Represents a context name such as `github` or `matrix`. The name is
/// lowercased since context access is case-insensitive.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableExpr {
    pub name: String,
    pub token: Token,
}

// COMPLEX

/// Object Dereference Expression
/// Represents `receiver.property`. The property is lowercased.
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectDerefExpr {
    pub receiver: Box<Expr>,
    pub property: String,
    pub token: Token,
}

/// Array Dereference Expression
/// Represents the object filter `receiver.*`.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrayDerefExpr {
    pub receiver: Box<Expr>,
    pub token: Token,
}

/// Index Access Expression
/// Represents `operand[index]`.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexAccessExpr {
    pub operand: Box<Expr>,
    pub index: Box<Expr>,
    pub token: Token,
}

/// Not Expression
/// Represents `!operand`.
#[derive(Debug, Clone, PartialEq)]
pub struct NotExpr {
    pub operand: Box<Expr>,
    pub token: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOpKind {
    Less,
    LessEquals,
    Greater,
    GreaterEquals,
    Equals,
    NotEquals,
}

impl CompareOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            CompareOpKind::Less => "<",
            CompareOpKind::LessEquals => "<=",
            CompareOpKind::Greater => ">",
            CompareOpKind::GreaterEquals => ">=",
            CompareOpKind::Equals => "==",
            CompareOpKind::NotEquals => "!=",
        }
    }
}

/// Compare Expression
/// Represents `left <op> right` for `==`, `!=`, `<`, `<=`, `>` and `>=`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompareExpr {
    pub kind: CompareOpKind,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub token: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogicalOpKind {
    And,
    Or,
}

impl LogicalOpKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogicalOpKind::And => "&&",
            LogicalOpKind::Or => "||",
        }
    }
}

/// Logical Expression
/// Represents `left && right` and `left || right`.
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalExpr {
    pub kind: LogicalOpKind,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub token: Token,
}

/// Function Call Expression
/// Represents `callee(args...)`. Functions are not values, so the callee is
/// just the name as written.
#[derive(Debug, Clone, PartialEq)]
pub struct FuncCallExpr {
    pub callee: String,
    pub args: Vec<Expr>,
    pub token: Token,
}
