// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Core of doorbell: double dispatch between subjects and visitors.
//!
//! This crate provides:
//! - Dispatch names and naming lineages (`naming`)
//! - The upfront kind declaration pass and frozen binding table (`registry`)
//! - JSON declaration documents (`declarations`)
//! - Subject and visitor capability traits (`visitor`)
//! - The dispatcher with split and combined accept forms (`binding`)
//! - Top-level versus nested call wrapping (`traversal`)
//! - Children-first traversal (`cascade`)
//! - Error types (`error`)
//!
//! Failure routing to visitor recovery hooks lives in a private `router`
//! module used by [`Dispatcher::accept`].

pub mod binding;
pub mod cascade;
pub mod declarations;
pub mod error;
pub mod naming;
pub mod registry;
pub mod traversal;
pub mod visitor;

mod router;

pub use binding::Dispatcher;
pub use cascade::{descend, Cascade};
pub use declarations::{KindDecl, KindDeclarations, NamingDecl};
pub use error::{DeclarationError, DeclarationResult, DispatchError, NotImplemented};
pub use naming::{resolve_explicit, DispatchName, Lineage, NamingFn, NamingRule};
pub use registry::{Binding, BindingTable, BoundKind, KindRegistry, Naming};
pub use traversal::{Call, Phase, Traversal};
pub use visitor::{
    Children, HookResult, Operation, OperationFn, OperationKind, OperationTable, Outcome, Visitee,
    Visitor,
};
