//! Doorbell: double dispatch between subjects and visitors.
//!
//! Subjects report a kind name; a kind registry, built once up front, binds
//! each kind to a visitor method (`visit_<name>`). Visitors implement the
//! methods they care about, optionally wrap every traversal in hooks, and
//! may visit children before their parents.

// Core engine - re-exported from doorbell-core
pub use doorbell_core::binding;
pub use doorbell_core::cascade;
pub use doorbell_core::declarations;
pub use doorbell_core::naming;
pub use doorbell_core::registry;
pub use doorbell_core::traversal;
pub use doorbell_core::visitor;

pub use doorbell_core::{
    Binding, BindingTable, Call, Cascade, Children, DeclarationError, DispatchError, Dispatcher,
    KindDeclarations, KindRegistry, Naming, NamingFn, NamingRule, NotImplemented, OperationTable,
    Visitee, Visitor,
};

// Arithmetic subjects and visitors used by `doorbell eval`
pub mod arith;

// Front door
pub mod error;
pub mod output;
