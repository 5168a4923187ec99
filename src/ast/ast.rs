use std::fmt::Display;

use crate::{lexer::tokens::Token, Position};

use super::expressions::{
    ArrayDerefExpr, BoolExpr, CompareExpr, FloatExpr, FuncCallExpr, IndexAccessExpr, IntExpr,
    LogicalExpr, NotExpr, NullExpr, ObjectDerefExpr, StringExpr, VariableExpr,
};

/// Expression Kinds
#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub enum ExprKind {
    Variable,
    Null,
    Bool,
    Int,
    Float,
    String,
    ObjectDeref,
    ArrayDeref,
    IndexAccess,
    Not,
    Compare,
    Logical,
    FuncCall,
}

/// Expression
///
/// A node of the expression syntax tree. Every node keeps the token it
/// starts with, so errors can point at it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Variable(VariableExpr),
    Null(NullExpr),
    Bool(BoolExpr),
    Int(IntExpr),
    Float(FloatExpr),
    String(StringExpr),
    ObjectDeref(ObjectDerefExpr),
    ArrayDeref(ArrayDerefExpr),
    IndexAccess(IndexAccessExpr),
    Not(NotExpr),
    Compare(CompareExpr),
    Logical(LogicalExpr),
    FuncCall(FuncCallExpr),
}

impl Expr {
    pub fn get_expr_kind(&self) -> ExprKind {
        match self {
            Expr::Variable(_) => ExprKind::Variable,
            Expr::Null(_) => ExprKind::Null,
            Expr::Bool(_) => ExprKind::Bool,
            Expr::Int(_) => ExprKind::Int,
            Expr::Float(_) => ExprKind::Float,
            Expr::String(_) => ExprKind::String,
            Expr::ObjectDeref(_) => ExprKind::ObjectDeref,
            Expr::ArrayDeref(_) => ExprKind::ArrayDeref,
            Expr::IndexAccess(_) => ExprKind::IndexAccess,
            Expr::Not(_) => ExprKind::Not,
            Expr::Compare(_) => ExprKind::Compare,
            Expr::Logical(_) => ExprKind::Logical,
            Expr::FuncCall(_) => ExprKind::FuncCall,
        }
    }

    /// The leading token of the node.
    pub fn get_token(&self) -> &Token {
        match self {
            Expr::Variable(e) => &e.token,
            Expr::Null(e) => &e.token,
            Expr::Bool(e) => &e.token,
            Expr::Int(e) => &e.token,
            Expr::Float(e) => &e.token,
            Expr::String(e) => &e.token,
            Expr::ObjectDeref(e) => &e.token,
            Expr::ArrayDeref(e) => &e.token,
            Expr::IndexAccess(e) => &e.token,
            Expr::Not(e) => &e.token,
            Expr::Compare(e) => &e.token,
            Expr::Logical(e) => &e.token,
            Expr::FuncCall(e) => &e.token,
        }
    }

    pub fn get_position(&self) -> Position {
        self.get_token().position
    }

    /// Direct children in the order the visitor leaves them.
    ///
    /// The index of an index access comes before its operand. Taint tracking
    /// relies on this: in `foo[aaa.bbb].bar` the `aaa.bbb` chain must be
    /// finished before the `foo` chain starts.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Variable(_)
            | Expr::Null(_)
            | Expr::Bool(_)
            | Expr::Int(_)
            | Expr::Float(_)
            | Expr::String(_) => vec![],
            Expr::ObjectDeref(e) => vec![&*e.receiver],
            Expr::ArrayDeref(e) => vec![&*e.receiver],
            Expr::IndexAccess(e) => vec![&*e.index, &*e.operand],
            Expr::Not(e) => vec![&*e.operand],
            Expr::Compare(e) => vec![&*e.left, &*e.right],
            Expr::Logical(e) => vec![&*e.left, &*e.right],
            Expr::FuncCall(e) => e.args.iter().collect(),
        }
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Expr::Variable(e) => write!(f, "{}", e.name),
            Expr::Null(_) => write!(f, "null"),
            Expr::Bool(e) => write!(f, "{}", e.value),
            Expr::Int(e) => write!(f, "{}", e.value),
            Expr::Float(e) => write!(f, "{}", e.value),
            Expr::String(e) => write!(f, "'{}'", e.value.replace('\'', "''")),
            Expr::ObjectDeref(e) => write!(f, "{}.{}", e.receiver, e.property),
            Expr::ArrayDeref(e) => write!(f, "{}.*", e.receiver),
            Expr::IndexAccess(e) => write!(f, "{}[{}]", e.operand, e.index),
            Expr::Not(e) => write!(f, "!{}", e.operand),
            Expr::Compare(e) => write!(f, "({} {} {})", e.left, e.kind.as_str(), e.right),
            Expr::Logical(e) => write!(f, "({} {} {})", e.left, e.kind.as_str(), e.right),
            Expr::FuncCall(e) => {
                write!(f, "{}(", e.callee)?;
                for (i, arg) in e.args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}
