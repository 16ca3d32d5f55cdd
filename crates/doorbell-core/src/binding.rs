// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Dispatch binding: from a subject to the visitor operation that handles it.
//!
//! A [`Dispatcher`] owns the frozen [`BindingTable`] of one subject type. It
//! offers both invocation conventions:
//!
//! - **Split**: [`Dispatcher::resolve`] only finds the bound operation;
//!   [`Dispatcher::accept`] resolves, invokes, and routes failures to the
//!   visitor's recovery hooks. Resolution and execution failures are told
//!   apart and routed to different hooks.
//! - **Combined**: [`Dispatcher::accept_direct`] (bound method) and
//!   [`Dispatcher::accept_method`] (a method named by the subject itself)
//!   resolve and invoke in one step and return failures unrouted.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{DeclarationResult, NotImplemented};
use crate::registry::{BindingTable, KindRegistry};
use crate::router;
use crate::traversal::{invoke, Call, Traversal};
use crate::visitor::{Operation, Outcome, Visitee, Visitor};

/// Dispatch entry point for subjects of type `S`.
pub struct Dispatcher<S> {
    table: BindingTable,
    _subject: PhantomData<fn(&S)>,
}

impl<S: Visitee> Dispatcher<S> {
    /// Wrap a frozen table after checking that every kind of `S` is bound.
    pub fn new(table: BindingTable) -> DeclarationResult<Self> {
        table.require(S::KINDS)?;
        Ok(Self {
            table,
            _subject: PhantomData,
        })
    }

    /// Freeze `registry` and wrap the result.
    pub fn from_registry(registry: &KindRegistry) -> DeclarationResult<Self> {
        Self::new(registry.freeze()?)
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// The visitor method bound to `subject`'s kind.
    pub fn method_for(&self, subject: &S) -> Result<&str, NotImplemented> {
        let kind = subject.kind_name();
        self.table
            .method_for(kind)
            .ok_or_else(|| NotImplemented::unbound(kind))
    }

    /// Resolve-only primitive: the operation `visitor` binds for `subject`.
    pub fn resolve<V: Visitor<S>>(&self, subject: &S, visitor: &V) -> Result<Operation<S, V>, NotImplemented> {
        let method = self.method_for(subject)?;
        visitor
            .operations()
            .get(method)
            .ok_or_else(|| NotImplemented::missing_method(subject.kind_name(), method))
    }

    /// Visit `subject` as a new top-level traversal, routing failures to the
    /// visitor's recovery hooks.
    pub fn accept<V: Visitor<S>>(&self, subject: &S, visitor: &mut V, args: V::Args) -> Outcome<S, V> {
        router::route(subject, visitor, args, Traversal::start(self))
    }

    /// Resolve and invoke in one step; failures are returned unrouted.
    pub fn accept_direct<V: Visitor<S>>(&self, subject: &S, visitor: &mut V, args: V::Args) -> Outcome<S, V> {
        let operation = self.resolve(subject, visitor)?;
        invoke(visitor, operation, Call::new(subject, args, Traversal::start(self)))
    }

    /// Invoke the operation registered under `method`, bypassing the binding
    /// table. For subjects that name their visitor method themselves.
    pub fn accept_method<V: Visitor<S>>(
        &self,
        subject: &S,
        visitor: &mut V,
        method: &str,
        args: V::Args,
    ) -> Outcome<S, V> {
        let operation = visitor
            .operations()
            .get(method)
            .ok_or_else(|| NotImplemented::missing_method(subject.kind_name(), method))?;
        invoke(visitor, operation, Call::new(subject, args, Traversal::start(self)))
    }
}

impl<S> fmt::Debug for Dispatcher<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatcher")
            .field("table", &self.table)
            .finish()
    }
}

// ============================================================================
// Tests
// ============================================================================
