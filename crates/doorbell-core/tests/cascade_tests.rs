//! Integration tests for children-first traversal.

mod support;

use doorbell_core::{
    cascade, Call, Cascade, Children, DispatchError, HookResult, NotImplemented, OperationTable,
    Outcome, Visitee, Visitor,
};
use support::{add_one_one, dispatcher, one, Node};

/// Cascading calculator; extra arguments are a list of integers.
struct Calculator {
    operations: OperationTable<Node, Self>,
    visited: Vec<String>,
}

impl Calculator {
    fn new() -> Self {
        let operations = OperationTable::<Node, Self>::new()
            .visit("Value", Calculator::visit_value)
            .unwrap()
            .visit("Add", Calculator::visit_add)
            .unwrap()
            .visit("Multiply", Calculator::visit_multiply)
            .unwrap()
            .visit("ManyArgs", Calculator::visit_many_args)
            .unwrap();
        Self {
            operations,
            visited: Vec::new(),
        }
    }

    fn visit_value(&mut self, call: Call<'_, Node, Self>) -> Result<i64, String> {
        match call.subject() {
            Node::Value(value) => Ok(*value),
            other => Err(format!("not a value: {other:?}")),
        }
    }

    fn visit_add(&mut self, mut call: Call<'_, Node, Self>) -> Result<i64, String> {
        Ok(call.take_children().into_iter().sum())
    }

    fn visit_multiply(&mut self, mut call: Call<'_, Node, Self>) -> Result<i64, String> {
        Ok(call.take_children().into_iter().product())
    }

    fn visit_many_args(&mut self, call: Call<'_, Node, Self>) -> Result<i64, String> {
        let (_, children, args) = call.into_parts();
        assert!(children.is_empty());
        Ok(args.len() as i64)
    }
}

impl Visitor<Node> for Calculator {
    type Args = Vec<i64>;
    type Output = i64;
    type Error = String;

    fn operations(&self) -> &OperationTable<Node, Self> {
        &self.operations
    }

    fn before_each<'a>(&mut self, call: Call<'a, Node, Self>) -> HookResult<Call<'a, Node, Self>, String> {
        let call = cascade::descend(self, call)?;
        self.visited.push(label(call.subject()));
        Ok(call)
    }
}

impl Cascade<Node> for Calculator {}

fn label(node: &Node) -> String {
    match node {
        Node::Value(v) => format!("{}({v})", node.kind_name()),
        _ => node.kind_name().to_string(),
    }
}

#[test]
fn test_add() {
    let mut calculator = Calculator::new();
    let result = dispatcher()
        .accept(&add_one_one(), &mut calculator, vec![])
        .unwrap();
    assert_eq!(result, 2);
}

#[test]
fn test_multiply() {
    let mut calculator = Calculator::new();
    let mult = Node::Mult(vec![one(), one()]);
    let result = dispatcher().accept(&mult, &mut calculator, vec![]).unwrap();
    assert_eq!(result, 1);
}

#[test]
fn test_combined() {
    let mut calculator = Calculator::new();
    let mult = Node::Mult(vec![add_one_one(), add_one_one()]);
    let result = dispatcher().accept(&mult, &mut calculator, vec![]).unwrap();
    assert_eq!(result, 4);
}

#[test]
fn test_many_arguments() {
    let mut calculator = Calculator::new();
    let result = dispatcher()
        .accept_method(&Node::ManyArgs, &mut calculator, "visit_ManyArgs", vec![1, 2, 3])
        .unwrap();
    assert_eq!(result, 3);
}

#[test]
fn children_are_resolved_depth_first_left_to_right() {
    let mut calculator = Calculator::new();
    let tree = Node::Mult(vec![
        Node::Add(vec![Node::Value(1), Node::Value(2)]),
        Node::Value(3),
    ]);
    let result = dispatcher().accept(&tree, &mut calculator, vec![]).unwrap();
    assert_eq!(result, 9);
    assert_eq!(
        calculator.visited,
        ["Value(1)", "Value(2)", "Add", "Value(3)", "Mult"]
    );
}

#[test]
fn child_failure_propagates_through_the_parent() {
    let mut calculator = Calculator::new();
    let tree = Node::Add(vec![Node::Value(1), Node::Orphan]);
    let err = dispatcher().accept(&tree, &mut calculator, vec![]).unwrap_err();
    let failure = err.as_not_implemented().unwrap();
    assert_eq!(failure.kind, "Orphan");
    assert_eq!(failure.method.as_deref(), Some("visit_Orphan"));
}

/// Cascading visitor that only descends into the first child and forwards
/// its extra arguments to every child.
struct FirstOnly {
    operations: OperationTable<Node, Self>,
    child_args: Vec<String>,
}

impl FirstOnly {
    fn new() -> Self {
        let operations = OperationTable::<Node, Self>::new()
            .visit("Value", FirstOnly::visit_any)
            .unwrap()
            .visit("Add", FirstOnly::visit_any)
            .unwrap();
        Self {
            operations,
            child_args: Vec::new(),
        }
    }

    fn visit_any(&mut self, call: Call<'_, Node, Self>) -> Result<String, String> {
        let (subject, children, args) = call.into_parts();
        self.child_args.push(args.clone());
        Ok(format!("{subject:?}/{}/{args}", children.join(",")))
    }
}

impl Visitor<Node> for FirstOnly {
    type Args = String;
    type Output = String;
    type Error = String;

    fn operations(&self) -> &OperationTable<Node, Self> {
        &self.operations
    }

    fn before_each<'a>(&mut self, call: Call<'a, Node, Self>) -> HookResult<Call<'a, Node, Self>, String> {
        cascade::descend(self, call)
    }
}

impl Cascade<Node> for FirstOnly {
    fn children<'s>(&self, subject: &'s Node) -> Vec<&'s Node> {
        subject.children().iter().take(1).collect()
    }
}

#[test]
fn child_retrieval_policy_can_be_overridden() {
    let mut visitor = FirstOnly::new();
    let tree = Node::Add(vec![Node::Value(7), Node::Value(8)]);
    let result = dispatcher()
        .accept(&tree, &mut visitor, "x".to_string())
        .unwrap();
    assert_eq!(result, format!("{tree:?}/Value(7)//x/x"));
    assert_eq!(visitor.child_args, ["x", "x"]);
}

/// The cascading hook's result is what the operation sees; a recovery hook
/// returning a value for a failed child lets the parent continue.
struct Lenient {
    operations: OperationTable<Node, Self>,
}

impl Visitor<Node> for Lenient {
    type Args = ();
    type Output = i64;
    type Error = String;

    fn operations(&self) -> &OperationTable<Node, Self> {
        &self.operations
    }

    fn on_not_implemented(
        &mut self,
        _subject: &Node,
        _failure: NotImplemented,
        _args: (),
    ) -> Outcome<Node, Self> {
        Ok(100)
    }

    fn before_each<'a>(&mut self, call: Call<'a, Node, Self>) -> HookResult<Call<'a, Node, Self>, String> {
        cascade::descend(self, call)
    }
}

impl Cascade<Node> for Lenient {}

#[test]
fn recovered_child_result_is_threaded_into_parent() {
    let operations = OperationTable::<Node, Lenient>::new()
        .visit("Value", |_, call| match call.subject() {
            Node::Value(v) => Ok(*v),
            _ => Err("unexpected".to_string()),
        })
        .unwrap()
        .visit("Add", |_, mut call| Ok(call.take_children().into_iter().sum()))
        .unwrap();
    let mut visitor = Lenient { operations };
    let tree = Node::Add(vec![Node::Value(1), Node::Orphan]);
    let result: Result<i64, DispatchError<String>> = dispatcher().accept(&tree, &mut visitor, ());
    assert_eq!(result.unwrap(), 101);
}

/// Cascading visitor whose `Add` recovers any failure from below; every
/// other kind re-raises.
struct Guarded {
    operations: OperationTable<Node, Self>,
    ran: Vec<String>,
    failures: Vec<(String, String)>,
}

impl Guarded {
    fn new() -> Self {
        let operations = OperationTable::<Node, Self>::new()
            .visit("Value", Guarded::visit_value)
            .unwrap()
            .visit("Add", Guarded::visit_add)
            .unwrap();
        Self {
            operations,
            ran: Vec::new(),
            failures: Vec::new(),
        }
    }

    fn visit_value(&mut self, call: Call<'_, Node, Self>) -> Result<i64, String> {
        match call.subject() {
            Node::Value(0) => Err("zero".to_string()),
            Node::Value(value) => {
                self.ran.push(label(call.subject()));
                Ok(*value)
            }
            other => Err(format!("not a value: {other:?}")),
        }
    }

    fn visit_add(&mut self, mut call: Call<'_, Node, Self>) -> Result<i64, String> {
        self.ran.push(label(call.subject()));
        Ok(call.take_children().into_iter().sum())
    }
}

impl Visitor<Node> for Guarded {
    type Args = ();
    type Output = i64;
    type Error = String;

    fn operations(&self) -> &OperationTable<Node, Self> {
        &self.operations
    }

    fn on_error(&mut self, subject: &Node, error: DispatchError<String>, _args: ()) -> Outcome<Node, Self> {
        self.failures.push((label(subject), error.to_string()));
        match subject {
            Node::Add(_) => Ok(-1),
            _ => Err(error),
        }
    }

    fn before_each<'a>(&mut self, call: Call<'a, Node, Self>) -> HookResult<Call<'a, Node, Self>, String> {
        cascade::descend(self, call)
    }
}

impl Cascade<Node> for Guarded {}

#[test]
fn child_execution_failure_reaches_parent_on_error() {
    let mut visitor = Guarded::new();
    let tree = Node::Add(vec![Node::Value(1), Node::Value(0), Node::Value(5)]);
    let result = dispatcher().accept(&tree, &mut visitor, ()).unwrap();
    assert_eq!(result, -1);
    // The failing child stops the cascade; the parent's operation never runs.
    assert_eq!(visitor.ran, ["Value(1)"]);
    assert_eq!(
        visitor.failures,
        [
            ("Value(0)".to_string(), "visitor operation failed: zero".to_string()),
            ("Add".to_string(), "visitor operation failed: zero".to_string()),
        ]
    );
}

#[test]
fn child_missing_operation_reaches_parent_on_error() {
    let mut visitor = Guarded::new();
    let tree = Node::Add(vec![Node::Value(1), Node::Orphan]);
    let result = dispatcher().accept(&tree, &mut visitor, ()).unwrap();
    assert_eq!(result, -1);
    assert_eq!(visitor.ran, ["Value(1)"]);
    assert_eq!(
        visitor.failures,
        [(
            "Add".to_string(),
            "visitor does not implement visit_Orphan for kind Orphan".to_string()
        )]
    );
}

#[test]
fn unrecovered_child_failure_keeps_its_kind() {
    let mut visitor = Guarded::new();
    let tree = Node::Mult(vec![Node::Value(0)]);
    let err = dispatcher().accept(&tree, &mut visitor, ()).unwrap_err();
    // Mult has no operation, so it fails before any child is visited.
    assert_eq!(err.as_not_implemented().unwrap().kind, "Mult");
    assert!(visitor.failures.is_empty());
}
