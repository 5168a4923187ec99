//! Generic traversal of the expression tree.
//!
//! [`walk`] visits a tree once and fans every event out to a list of
//! subscribers. The contract is fixed:
//!
//! - `enter` is called in pre-order, `leave` in post-order
//! - for one node, subscribers are called in slice order
//! - children are visited in the order of [`Expr::children`]: the index of
//!   an index access before its operand, left before right for binary
//!   operators, and arguments in order for function calls
//!
//! Both the semantic checker and the untrusted input checker are driven by
//! the `leave` events of this traversal.

use super::ast::Expr;

pub trait Visitor {
    fn enter(&mut self, _expr: &Expr) {}
    fn leave(&mut self, expr: &Expr);
}

pub fn walk(expr: &Expr, subscribers: &mut [&mut dyn Visitor]) {
    for subscriber in subscribers.iter_mut() {
        subscriber.enter(expr);
    }

    for child in expr.children() {
        walk(child, subscribers);
    }

    for subscriber in subscribers.iter_mut() {
        subscriber.leave(expr);
    }
}
