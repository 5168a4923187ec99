//! Parser module for building the expression tree.
//!
//! This module contains the recursive-descent parser that transforms a
//! stream of tokens into an [`Expr`](crate::ast::ast::Expr). Precedence from
//! lowest to highest:
//!
//! - logical or `||`
//! - logical and `&&`
//! - comparison `==`, `!=`, `<`, `<=`, `>`, `>=`
//! - prefix not `!`
//! - postfix property access `.name`, object filter `.*`, index `[...]`
//! - primary: variable, function call, parenthesized expression, literal
//!
//! Context and property names are lowercased here since access to them is
//! case-insensitive.

pub mod expr;
pub mod parser;
