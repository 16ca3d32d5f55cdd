// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Error types for kind declaration and visitor dispatch.
//!
//! Two families of failure exist and they surface at different times:
//!
//! - [`DeclarationError`]: structural problems in the kind table or in a
//!   visitor's operation table. These are reported while the tables are being
//!   built, never on first visit.
//! - [`DispatchError`]: per-call failures. A [`NotImplemented`] resolution
//!   failure or an `Execution` failure raised by the bound operation. Both are
//!   offered to the visitor's recovery hooks before reaching the caller.

use thiserror::Error;

// ============================================================================
// Declaration Errors
// ============================================================================

/// Errors raised while declaring subject kinds or visitor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DeclarationError {
    /// A dispatch or method name does not match `[A-Za-z_][A-Za-z0-9_]*`.
    #[error("invalid visitor method name {name:?}")]
    InvalidName { name: String },

    /// An auto-derived name is already held by another kind of the lineage.
    #[error("visitor method name already used: {name} (declaring {kind})")]
    Collision { name: String, kind: String },

    /// Suspend or override requested outside of any naming lineage.
    #[error("auto-naming not yet applied to {kind} or any of its ancestors")]
    NotApplicable { kind: String },

    /// The kind was never declared.
    #[error("unknown kind: {kind}")]
    UnknownKind { kind: String },

    /// The declared parent kind does not exist (parents are declared first).
    #[error("kind {kind} declares unknown parent {parent}")]
    UnknownParent { kind: String, parent: String },

    /// The kind name was declared twice.
    #[error("kind already declared: {kind}")]
    DuplicateKind { kind: String },

    /// The kind resolves to no dispatch name (it, and every ancestor, is abstract).
    #[error("kind {kind} has no dispatch binding")]
    Unbound { kind: String },

    /// A visitor operation table registers the same method twice.
    #[error("visitor method registered twice: {method}")]
    DuplicateOperation { method: String },
}

/// Result type for declaration operations.
pub type DeclarationResult<T> = Result<T, DeclarationError>;

// ============================================================================
// Dispatch Errors
// ============================================================================

/// No operation is bound on the visitor for a subject's dispatch name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("visitor does not implement {} for kind {kind}", .method.as_deref().unwrap_or("any operation"))]
pub struct NotImplemented {
    /// Kind name of the subject being visited.
    pub kind: String,
    /// The missing method (`visit_<name>`), or `None` when the kind itself is unbound.
    pub method: Option<String>,
}

impl NotImplemented {
    /// Resolution failure for a bound kind whose method is missing on the visitor.
    pub fn missing_method(kind: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            method: Some(method.into()),
        }
    }

    /// Resolution failure for a kind absent from (or abstract in) the binding table.
    pub fn unbound(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            method: None,
        }
    }
}

/// Per-call dispatch failure.
///
/// `E` is the visitor's own error type; it is carried unchanged so callers
/// can match on the original failure.
#[derive(Debug, Error)]
pub enum DispatchError<E> {
    /// Resolution failure: nothing to invoke.
    #[error(transparent)]
    NotImplemented(#[from] NotImplemented),

    /// Execution failure: the resolved operation returned an error.
    #[error("visitor operation failed: {0}")]
    Execution(E),
}

impl<E> DispatchError<E> {
    /// Returns the resolution failure, if this is one.
    pub fn as_not_implemented(&self) -> Option<&NotImplemented> {
        match self {
            DispatchError::NotImplemented(failure) => Some(failure),
            DispatchError::Execution(_) => None,
        }
    }

    /// Consumes the error and returns the visitor's original execution error.
    pub fn into_execution(self) -> Option<E> {
        match self {
            DispatchError::Execution(err) => Some(err),
            DispatchError::NotImplemented(_) => None,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
