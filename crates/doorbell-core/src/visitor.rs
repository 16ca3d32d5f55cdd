// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Subject and visitor capability traits.
//!
//! A subject type is usually a closed enum: one variant per kind, each
//! reporting its kind name through [`Visitee::kind_name`]. It never names a
//! concrete visitor.
//!
//! A visitor implements [`Visitor`] for the subject type it processes. Its
//! operations live in an [`OperationTable`] keyed by method name; the
//! remaining trait methods are hooks with defaults:
//!
//! - recovery hooks `on_not_implemented` / `on_error` re-raise by default;
//! - wrapping hooks `before_all` / `after_all` (once per top-level `accept`)
//!   and `before_each` / `after_each` (once per node) are identity by default.
//!
//! ```ignore
//! impl Visitor<Expr> for Evaluator {
//!     type Args = ();
//!     type Output = i64;
//!     type Error = EvalError;
//!
//!     fn operations(&self) -> &OperationTable<Expr, Self> {
//!         &self.operations
//!     }
//! }
//! ```

use std::collections::BTreeMap;
use std::fmt;

use crate::error::{DeclarationError, DeclarationResult, DispatchError, NotImplemented};
use crate::naming::{is_identifier, VISIT_PREFIX};
use crate::traversal::Call;

// ============================================================================
// Subject Side
// ============================================================================

/// A value that can be visited.
pub trait Visitee {
    /// Every kind name values of this type can report.
    ///
    /// Checked against the binding table before the first dispatch.
    const KINDS: &'static [&'static str];

    /// Kind name of this value, as declared in the kind registry.
    fn kind_name(&self) -> &'static str;
}

/// Default child accessor used by cascading traversal.
pub trait Children: Sized {
    /// Ordered children of this value.
    fn children(&self) -> &[Self];
}

// ============================================================================
// Visitor Side
// ============================================================================

/// Result of visiting one subject.
pub type Outcome<S, V> =
    Result<<V as Visitor<S>>::Output, DispatchError<<V as Visitor<S>>::Error>>;

/// Result of a wrapping hook.
pub type HookResult<T, E> = Result<T, DispatchError<E>>;

/// An operation set over subjects of type `S`.
pub trait Visitor<S>: Sized {
    /// Extra arguments forwarded from `accept` to the operation.
    type Args: Clone;
    /// Value produced by each operation.
    type Output;
    /// Failure raised by an operation.
    type Error;

    /// Operations this visitor exposes, keyed by method name.
    fn operations(&self) -> &OperationTable<S, Self>;

    /// Recovery hook for resolution failures.
    ///
    /// The returned value becomes the result of `accept`.
    fn on_not_implemented(
        &mut self,
        subject: &S,
        failure: NotImplemented,
        args: Self::Args,
    ) -> Outcome<S, Self> {
        let _ = (subject, args);
        Err(DispatchError::NotImplemented(failure))
    }

    /// Recovery hook for failures raised once the operation was resolved.
    ///
    /// Covers the operation itself, its wrapping hooks, and anything those
    /// hooks visit: a child that fails inside a cascade arrives here as the
    /// parent's failure, whether it was an execution failure or a missing
    /// operation. The returned value becomes the result of `accept`.
    fn on_error(
        &mut self,
        subject: &S,
        error: DispatchError<Self::Error>,
        args: Self::Args,
    ) -> Outcome<S, Self> {
        let _ = (subject, args);
        Err(error)
    }

    /// Runs once when a top-level traversal starts.
    fn before_all<'a>(&mut self, call: Call<'a, S, Self>) -> HookResult<Call<'a, S, Self>, Self::Error> {
        Ok(call)
    }

    /// Runs once when a top-level traversal finishes successfully.
    fn after_all(&mut self, output: Self::Output) -> Outcome<S, Self> {
        Ok(output)
    }

    /// Runs before the operation of every visited node, the root included.
    fn before_each<'a>(&mut self, call: Call<'a, S, Self>) -> HookResult<Call<'a, S, Self>, Self::Error> {
        Ok(call)
    }

    /// Runs after the operation of every visited node, the root included.
    fn after_each(&mut self, output: Self::Output) -> Outcome<S, Self> {
        Ok(output)
    }
}

// ============================================================================
// Operations
// ============================================================================

/// How an operation participates in dispatch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    /// Wrapped by the traversal hooks.
    Dispatchable,
    /// Called as-is; hooks never run around it.
    Plain,
}

impl OperationKind {
    /// Classification by naming convention: `visit_*` methods are dispatchable.
    pub fn for_method(method: &str) -> Self {
        if method.starts_with(VISIT_PREFIX) {
            OperationKind::Dispatchable
        } else {
            OperationKind::Plain
        }
    }
}

/// Signature of a visitor operation.
pub type OperationFn<S, V> = for<'a> fn(
    &mut V,
    Call<'a, S, V>,
) -> Result<<V as Visitor<S>>::Output, <V as Visitor<S>>::Error>;

/// A classified visitor operation.
pub struct Operation<S, V: Visitor<S>> {
    kind: OperationKind,
    func: OperationFn<S, V>,
}

impl<S, V: Visitor<S>> Operation<S, V> {
    pub fn kind(&self) -> OperationKind {
        self.kind
    }

    pub(crate) fn call(&self, visitor: &mut V, call: Call<'_, S, V>) -> Result<V::Output, V::Error> {
        (self.func)(visitor, call)
    }
}

impl<S, V: Visitor<S>> Clone for Operation<S, V> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S, V: Visitor<S>> Copy for Operation<S, V> {}

impl<S, V: Visitor<S>> fmt::Debug for Operation<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation").field("kind", &self.kind).finish()
    }
}

/// A visitor's operations, classified once when the table is built.
///
/// ```ignore
/// let operations = OperationTable::new()
///     .visit("Value", Evaluator::visit_value)?
///     .visitor_method("goto_Add", Evaluator::goto_add)?
///     .non_visitor_method("visit_Raw", Evaluator::raw)?;
/// ```
pub struct OperationTable<S, V: Visitor<S>> {
    operations: BTreeMap<String, Operation<S, V>>,
}

impl<S, V: Visitor<S>> OperationTable<S, V> {
    pub fn new() -> Self {
        Self {
            operations: BTreeMap::new(),
        }
    }

    /// Register the dispatchable operation `visit_<name>`.
    pub fn visit(self, name: &str, func: OperationFn<S, V>) -> DeclarationResult<Self> {
        if !is_identifier(name) {
            return Err(DeclarationError::InvalidName {
                name: name.to_string(),
            });
        }
        self.insert(format!("{VISIT_PREFIX}{name}"), OperationKind::Dispatchable, func)
    }

    /// Register a dispatchable operation under an arbitrary method name.
    pub fn visitor_method(self, method: &str, func: OperationFn<S, V>) -> DeclarationResult<Self> {
        self.insert_checked(method, OperationKind::Dispatchable, func)
    }

    /// Register a plain operation, even if its name looks dispatchable.
    pub fn non_visitor_method(self, method: &str, func: OperationFn<S, V>) -> DeclarationResult<Self> {
        self.insert_checked(method, OperationKind::Plain, func)
    }

    /// Register an operation classified by naming convention.
    pub fn method(self, method: &str, func: OperationFn<S, V>) -> DeclarationResult<Self> {
        self.insert_checked(method, OperationKind::for_method(method), func)
    }

    /// Look up an operation by method name.
    pub fn get(&self, method: &str) -> Option<Operation<S, V>> {
        self.operations.get(method).copied()
    }

    pub fn contains(&self, method: &str) -> bool {
        self.operations.contains_key(method)
    }

    /// Registered method names with their classification, sorted by name.
    pub fn methods(&self) -> impl Iterator<Item = (&str, OperationKind)> {
        self.operations
            .iter()
            .map(|(method, operation)| (method.as_str(), operation.kind))
    }

    pub fn len(&self) -> usize {
        self.operations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }

    fn insert_checked(
        self,
        method: &str,
        kind: OperationKind,
        func: OperationFn<S, V>,
    ) -> DeclarationResult<Self> {
        if !is_identifier(method) {
            return Err(DeclarationError::InvalidName {
                name: method.to_string(),
            });
        }
        self.insert(method.to_string(), kind, func)
    }

    fn insert(
        mut self,
        method: String,
        kind: OperationKind,
        func: OperationFn<S, V>,
    ) -> DeclarationResult<Self> {
        if self.operations.contains_key(&method) {
            return Err(DeclarationError::DuplicateOperation { method });
        }
        self.operations.insert(method, Operation { kind, func });
        Ok(self)
    }
}

impl<S, V: Visitor<S>> Default for OperationTable<S, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S, V: Visitor<S>> fmt::Debug for OperationTable<S, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.methods()).finish()
    }
}
