// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Call wrapping: top-level traversals versus nested steps.
//!
//! Every `accept` carries an explicit [`Traversal`] context inside its
//! [`Call`]. A call made from outside any traversal is in the
//! [`Phase::TopLevel`] phase; calls made for children while a traversal is
//! running are [`Phase::Nested`].
//!
//! # Hook Order
//!
//! For a dispatchable operation entered at top level:
//!
//! 1. `before_all(call)`
//! 2. switch to the nested phase
//! 3. `before_each(call)`, the operation, `after_each(output)`
//! 4. `after_all(output)`
//!
//! Nested calls only run step 3. Plain operations run without hooks.
//!
//! The context lives in the call frame, so an early return (including an
//! error from any hook) cannot leave a visitor stuck in the nested phase: the
//! next `accept` starts a fresh top-level traversal.

use std::fmt;

use tracing::trace;

use crate::binding::Dispatcher;
use crate::error::DispatchError;
use crate::router;
use crate::visitor::{Operation, OperationKind, Outcome, Visitee, Visitor};

/// Whether a call starts a traversal or continues one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    /// No traversal in progress on entry.
    TopLevel,
    /// Inside a running traversal.
    Nested,
}

/// Explicit traversal state threaded through every call.
pub struct Traversal<'a, S> {
    dispatcher: &'a Dispatcher<S>,
    depth: usize,
    phase: Phase,
}

impl<'a, S> Traversal<'a, S> {
    pub(crate) fn start(dispatcher: &'a Dispatcher<S>) -> Self {
        Self {
            dispatcher,
            depth: 0,
            phase: Phase::TopLevel,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Distance from the root subject (0 for the root).
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_top_level(&self) -> bool {
        self.phase == Phase::TopLevel
    }

    pub fn dispatcher(&self) -> &'a Dispatcher<S> {
        self.dispatcher
    }

    fn entered(self) -> Self {
        Self {
            phase: Phase::Nested,
            ..self
        }
    }

    fn descend(self) -> Self {
        Self {
            depth: self.depth + 1,
            phase: Phase::Nested,
            ..self
        }
    }
}

impl<'a, S: Visitee> Traversal<'a, S> {
    /// Visit `child` as a nested step of this traversal.
    ///
    /// Resolution and execution failures of the child go through the same
    /// recovery hooks as a top-level `accept`.
    pub fn accept<V: Visitor<S>>(&self, child: &'a S, visitor: &mut V, args: V::Args) -> Outcome<S, V> {
        router::route(child, visitor, args, self.descend())
    }
}

impl<S> Clone for Traversal<'_, S> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S> Copy for Traversal<'_, S> {}

impl<S> fmt::Debug for Traversal<'_, S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Traversal")
            .field("depth", &self.depth)
            .field("phase", &self.phase)
            .finish()
    }
}

// ============================================================================
// Calls
// ============================================================================

/// The arguments of one operation invocation.
///
/// Hooks receive and return a `Call`, so they can rewrite the extra
/// arguments or attach child results before the operation runs.
pub struct Call<'a, S, V: Visitor<S>> {
    subject: &'a S,
    children: Option<Vec<V::Output>>,
    args: V::Args,
    traversal: Traversal<'a, S>,
}

impl<'a, S, V: Visitor<S>> Call<'a, S, V> {
    pub(crate) fn new(subject: &'a S, args: V::Args, traversal: Traversal<'a, S>) -> Self {
        Self {
            subject,
            children: None,
            args,
            traversal,
        }
    }

    pub fn subject(&self) -> &'a S {
        self.subject
    }

    pub fn args(&self) -> &V::Args {
        &self.args
    }

    pub fn args_mut(&mut self) -> &mut V::Args {
        &mut self.args
    }

    /// Child results, once a cascading hook has visited the children.
    pub fn children(&self) -> Option<&[V::Output]> {
        self.children.as_deref()
    }

    pub fn set_children(&mut self, results: Vec<V::Output>) {
        self.children = Some(results);
    }

    /// Remove and return the child results (empty if none were attached).
    pub fn take_children(&mut self) -> Vec<V::Output> {
        self.children.take().unwrap_or_default()
    }

    pub fn traversal(&self) -> Traversal<'a, S> {
        self.traversal
    }

    /// Split into subject, child results, and extra arguments.
    pub fn into_parts(self) -> (&'a S, Vec<V::Output>, V::Args) {
        (self.subject, self.children.unwrap_or_default(), self.args)
    }
}

impl<S, V> fmt::Debug for Call<'_, S, V>
where
    S: fmt::Debug,
    V: Visitor<S>,
    V::Args: fmt::Debug,
    V::Output: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Call")
            .field("subject", &self.subject)
            .field("children", &self.children)
            .field("args", &self.args)
            .field("traversal", &self.traversal)
            .finish()
    }
}

// ============================================================================
// Invocation
// ============================================================================

/// Invoke `operation`, applying the hooks that match the call's phase.
pub(crate) fn invoke<S, V: Visitor<S>>(
    visitor: &mut V,
    operation: Operation<S, V>,
    call: Call<'_, S, V>,
) -> Outcome<S, V> {
    if operation.kind() == OperationKind::Plain {
        return operation
            .call(visitor, call)
            .map_err(DispatchError::Execution);
    }

    match call.traversal.phase {
        Phase::TopLevel => {
            trace!("traversal started");
            let mut call = visitor.before_all(call)?;
            call.traversal = call.traversal.entered();
            let output = invoke(visitor, operation, call)?;
            let output = visitor.after_all(output)?;
            trace!("traversal finished");
            Ok(output)
        }
        Phase::Nested => {
            let depth = call.traversal.depth;
            let call = visitor.before_each(call)?;
            trace!(depth, "invoking operation");
            let output = operation
                .call(visitor, call)
                .map_err(DispatchError::Execution)?;
            visitor.after_each(output)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
