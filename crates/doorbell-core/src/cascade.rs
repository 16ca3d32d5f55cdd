// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Children-first ("cascading") traversal.
//!
//! A cascading visitor installs [`descend`] as its `before_each` hook. For
//! every node, the hook visits the node's children with the same visitor,
//! in order, and attaches their results to the call before the node's own
//! operation runs:
//!
//! ```ignore
//! impl Visitor<Expr> for Evaluator {
//!     // ...
//!     fn before_each<'a>(&mut self, call: Call<'a, Expr, Self>) -> HookResult<Call<'a, Expr, Self>, EvalError> {
//!         cascade::descend(self, call)
//!     }
//! }
//!
//! impl Cascade<Expr> for Evaluator {}
//! ```
//!
//! Traversal is depth-first and left-to-right. Children are visited in the
//! nested phase, so they trigger `before_each`/`after_each` but never
//! `before_all`/`after_all`. Cycles are not detected: a cyclic child graph
//! recurses until the stack is exhausted.

use tracing::trace;

use crate::traversal::Call;
use crate::visitor::{Children, HookResult, Visitee, Visitor};

/// Child retrieval policy for cascading visitors.
pub trait Cascade<S: Children>: Visitor<S> {
    /// Children of `subject` to visit before it, in visiting order.
    fn children<'s>(&self, subject: &'s S) -> Vec<&'s S> {
        subject.children().iter().collect()
    }
}

/// Visit the children of `call`'s subject and attach their results.
///
/// Every child receives a clone of the call's extra arguments.
pub fn descend<'a, S, V>(visitor: &mut V, mut call: Call<'a, S, V>) -> HookResult<Call<'a, S, V>, V::Error>
where
    S: Visitee + Children,
    V: Cascade<S>,
{
    let traversal = call.traversal();
    let children = visitor.children(call.subject());
    trace!(
        kind = call.subject().kind_name(),
        children = children.len(),
        depth = traversal.depth(),
        "cascading into children"
    );
    let mut results = Vec::with_capacity(children.len());
    for child in children {
        results.push(traversal.accept(child, visitor, call.args().clone())?);
    }
    call.set_children(results);
    Ok(call)
}
