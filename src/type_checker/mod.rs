//! Semantic analysis of parsed expressions.
//!
//! This module infers the type of every node of an expression tree and
//! reports misuse:
//!
//! - Undefined contexts, properties and functions
//! - Contexts and special functions used where they are not available
//! - Function calls matching no overload, including `format()` placeholder
//!   and `fromJSON()` literal checks
//! - Potentially untrusted inputs flowing into the expression
//!
//! The semantic checker and the untrusted input checker subscribe to the
//! same traversal of the tree, see [`crate::ast::visitor`].

pub mod availability;
pub mod builtins;
pub mod functions;
pub mod type_checker;
pub mod untrusted;

#[cfg(test)]
mod tests;
