//! Shared arithmetic subjects for integration tests.

#![allow(dead_code)]

use doorbell_core::{Children, Dispatcher, KindRegistry, Naming, Visitee};

/// Arithmetic expression tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Value(i64),
    Add(Vec<Node>),
    Mult(Vec<Node>),
    /// Has no operation of its own; visited by naming `visit_ManyArgs` directly.
    ManyArgs,
    /// Declared, but no test visitor handles it.
    Orphan,
}

impl Visitee for Node {
    const KINDS: &'static [&'static str] = &["Value", "Add", "Mult", "ManyArgs", "Orphan"];

    fn kind_name(&self) -> &'static str {
        match self {
            Node::Value(_) => "Value",
            Node::Add(_) => "Add",
            Node::Mult(_) => "Mult",
            Node::ManyArgs => "ManyArgs",
            Node::Orphan => "Orphan",
        }
    }
}

impl Children for Node {
    fn children(&self) -> &[Node] {
        match self {
            Node::Add(children) | Node::Mult(children) => children,
            _ => &[],
        }
    }
}

/// `Value` and `Add` bind their own names, `Mult` binds `Multiply`,
/// `ManyArgs` inherits `Value`'s binding.
pub fn registry() -> KindRegistry {
    let mut registry = KindRegistry::new();
    registry
        .declare("Value", None, Naming::Explicit("Value".into()))
        .unwrap();
    registry
        .declare("Add", Some("Value"), Naming::Explicit("Add".into()))
        .unwrap();
    registry
        .declare("Mult", Some("Add"), Naming::Explicit("Multiply".into()))
        .unwrap();
    registry
        .declare("ManyArgs", Some("Value"), Naming::Inherit)
        .unwrap();
    registry
        .declare("Orphan", None, Naming::Explicit("Orphan".into()))
        .unwrap();
    registry
}

pub fn dispatcher() -> Dispatcher<Node> {
    Dispatcher::from_registry(&registry()).unwrap()
}

pub fn one() -> Node {
    Node::Value(1)
}

/// `Add[1, 1]`
pub fn add_one_one() -> Node {
    Node::Add(vec![one(), one()])
}
