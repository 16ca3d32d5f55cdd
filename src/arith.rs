//! Arithmetic expression trees: the subject type behind `doorbell eval`.
//!
//! Expressions are read from JSON:
//!
//! ```json
//! { "multiply": [ { "add": [ { "value": 1 }, { "value": 2 } ] }, { "value": 3 } ] }
//! ```
//!
//! Two cascading visitors process them: [`Evaluator`] computes the value with
//! checked arithmetic, [`Printer`] renders infix notation.

use std::convert::Infallible;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, trace, warn};

use doorbell_core::{
    cascade, Call, Cascade, Children, DeclarationResult, Dispatcher, HookResult, KindRegistry,
    Naming, NamingFn, NamingRule, NotImplemented, OperationTable, Outcome, Visitee, Visitor,
};

// ============================================================================
// Subjects
// ============================================================================

/// An arithmetic expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    Value(i64),
    Add(Vec<Expr>),
    #[serde(rename = "multiply")]
    Mult(Vec<Expr>),
    Negate(Box<Expr>),
    /// A named variable. The evaluator has no operation for it.
    Var(String),
}

impl Visitee for Expr {
    const KINDS: &'static [&'static str] = &["Value", "Add", "Mult", "Neg", "Var"];

    fn kind_name(&self) -> &'static str {
        match self {
            Expr::Value(_) => "Value",
            Expr::Add(_) => "Add",
            Expr::Mult(_) => "Mult",
            Expr::Negate(_) => "Neg",
            Expr::Var(_) => "Var",
        }
    }
}

impl Children for Expr {
    fn children(&self) -> &[Expr] {
        match self {
            Expr::Add(terms) | Expr::Mult(terms) => terms,
            Expr::Negate(operand) => std::slice::from_ref(operand.as_ref()),
            Expr::Value(_) | Expr::Var(_) => &[],
        }
    }
}

impl Expr {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}

/// Kind table for [`Expr`].
///
/// | Kind    | Method          | How                         |
/// |---------|-----------------|-----------------------------|
/// | `Value` | `visit_Value`   | auto-named under `Expr`     |
/// | `Add`   | `visit_Add`     | auto-named under `Expr`     |
/// | `Mult`  | `visit_Multiply`| explicit                    |
/// | `Neg`   | `visit_UnaryNeg`| derived, prefix `Unary`     |
/// | `Var`   | `visit_Var`     | auto-named under `Expr`     |
pub fn registry() -> DeclarationResult<KindRegistry> {
    let mut registry = KindRegistry::new();
    registry.declare("Expr", None, Naming::Auto(NamingFn::identity()))?;
    registry.declare("Value", Some("Expr"), Naming::Inherit)?;
    registry.declare("Add", Some("Expr"), Naming::Inherit)?;
    registry.declare("Mult", Some("Add"), Naming::Explicit("Multiply".to_string()))?;
    registry.declare(
        "Neg",
        Some("Expr"),
        Naming::Derived(NamingRule::Prefix("Unary".to_string()).into()),
    )?;
    registry.declare("Var", Some("Expr"), Naming::Inherit)?;
    Ok(registry)
}

pub fn dispatcher() -> DeclarationResult<Dispatcher<Expr>> {
    Dispatcher::from_registry(&registry()?)
}

// ============================================================================
// Evaluator
// ============================================================================

/// Failure raised by an [`Evaluator`] operation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("integer overflow in {op}")]
    Overflow { op: &'static str },

    #[error("operation bound to the wrong kind: {kind}")]
    Malformed { kind: &'static str },
}

/// Computes the value of an expression, children first.
pub struct Evaluator {
    operations: OperationTable<Expr, Self>,
    lenient: bool,
    nodes_visited: usize,
}

impl Evaluator {
    pub fn new() -> DeclarationResult<Self> {
        let operations = OperationTable::<Expr, Self>::new()
            .visit("Value", Evaluator::visit_value)?
            .visit("Add", Evaluator::visit_add)?
            .visit("Multiply", Evaluator::visit_multiply)?
            .visit("UnaryNeg", Evaluator::visit_unary_neg)?;
        Ok(Self {
            operations,
            lenient: false,
            nodes_visited: 0,
        })
    }

    /// Treat kinds without an operation as `0` instead of failing.
    pub fn lenient(mut self, lenient: bool) -> Self {
        self.lenient = lenient;
        self
    }

    /// Nodes whose operation ran during the last traversal.
    pub fn nodes_visited(&self) -> usize {
        self.nodes_visited
    }

    fn visit_value(&mut self, call: Call<'_, Expr, Self>) -> Result<i64, EvalError> {
        match call.subject() {
            Expr::Value(value) => Ok(*value),
            other => Err(EvalError::Malformed {
                kind: other.kind_name(),
            }),
        }
    }

    fn visit_add(&mut self, mut call: Call<'_, Expr, Self>) -> Result<i64, EvalError> {
        call.take_children()
            .into_iter()
            .try_fold(0i64, |acc, term| acc.checked_add(term))
            .ok_or(EvalError::Overflow { op: "add" })
    }

    fn visit_multiply(&mut self, mut call: Call<'_, Expr, Self>) -> Result<i64, EvalError> {
        call.take_children()
            .into_iter()
            .try_fold(1i64, |acc, factor| acc.checked_mul(factor))
            .ok_or(EvalError::Overflow { op: "multiply" })
    }

    fn visit_unary_neg(&mut self, mut call: Call<'_, Expr, Self>) -> Result<i64, EvalError> {
        let kind = call.subject().kind_name();
        let operand = call
            .take_children()
            .into_iter()
            .next()
            .ok_or(EvalError::Malformed { kind })?;
        operand
            .checked_neg()
            .ok_or(EvalError::Overflow { op: "negate" })
    }
}

impl Visitor<Expr> for Evaluator {
    type Args = ();
    type Output = i64;
    type Error = EvalError;

    fn operations(&self) -> &OperationTable<Expr, Self> {
        &self.operations
    }

    fn on_not_implemented(&mut self, subject: &Expr, failure: NotImplemented, _args: ()) -> Outcome<Expr, Self> {
        if !self.lenient {
            return Err(failure.into());
        }
        warn!(kind = subject.kind_name(), "no operation, evaluating as 0");
        Ok(0)
    }

    fn before_all<'a>(&mut self, call: Call<'a, Expr, Self>) -> HookResult<Call<'a, Expr, Self>, EvalError> {
        self.nodes_visited = 0;
        debug!(root = call.subject().kind_name(), "evaluation started");
        Ok(call)
    }

    fn after_all(&mut self, output: i64) -> Outcome<Expr, Self> {
        debug!(value = output, nodes = self.nodes_visited, "evaluation finished");
        Ok(output)
    }

    fn before_each<'a>(&mut self, call: Call<'a, Expr, Self>) -> HookResult<Call<'a, Expr, Self>, EvalError> {
        cascade::descend(self, call)
    }

    fn after_each(&mut self, output: i64) -> Outcome<Expr, Self> {
        self.nodes_visited += 1;
        trace!(value = output, "node evaluated");
        Ok(output)
    }
}

impl Cascade<Expr> for Evaluator {}

// ============================================================================
// Printer
// ============================================================================

/// Renders an expression in infix notation with minimal parentheses.
pub struct Printer {
    operations: OperationTable<Expr, Self>,
}

impl Printer {
    pub fn new() -> DeclarationResult<Self> {
        let operations = OperationTable::<Expr, Self>::new()
            .visit("Value", Printer::visit_leaf)?
            .visit("Var", Printer::visit_leaf)?
            .visit("Add", Printer::visit_add)?
            .visit("Multiply", Printer::visit_multiply)?
            .visit("UnaryNeg", Printer::visit_unary_neg)?;
        Ok(Self { operations })
    }

    fn visit_leaf(&mut self, call: Call<'_, Expr, Self>) -> Result<String, Infallible> {
        Ok(match call.subject() {
            Expr::Value(value) => value.to_string(),
            Expr::Var(name) => name.clone(),
            other => other.kind_name().to_string(),
        })
    }

    fn visit_add(&mut self, call: Call<'_, Expr, Self>) -> Result<String, Infallible> {
        let (_, terms, _) = call.into_parts();
        if terms.is_empty() {
            return Ok("0".to_string());
        }
        Ok(terms.join(" + "))
    }

    fn visit_multiply(&mut self, call: Call<'_, Expr, Self>) -> Result<String, Infallible> {
        let (subject, factors, _) = call.into_parts();
        if factors.is_empty() {
            return Ok("1".to_string());
        }
        let factors: Vec<String> = subject
            .children()
            .iter()
            .zip(factors)
            .map(|(child, text)| match child {
                Expr::Add(_) => format!("({text})"),
                _ => text,
            })
            .collect();
        Ok(factors.join(" * "))
    }

    fn visit_unary_neg(&mut self, call: Call<'_, Expr, Self>) -> Result<String, Infallible> {
        let (subject, operand, _) = call.into_parts();
        let text = operand.concat();
        Ok(match subject.children().first() {
            Some(Expr::Add(_) | Expr::Mult(_) | Expr::Negate(_)) => format!("-({text})"),
            Some(Expr::Value(value)) if *value < 0 => format!("-({text})"),
            _ => format!("-{text}"),
        })
    }
}

impl Visitor<Expr> for Printer {
    type Args = ();
    type Output = String;
    type Error = Infallible;

    fn operations(&self) -> &OperationTable<Expr, Self> {
        &self.operations
    }

    fn before_each<'a>(&mut self, call: Call<'a, Expr, Self>) -> HookResult<Call<'a, Expr, Self>, Infallible> {
        cascade::descend(self, call)
    }
}

impl Cascade<Expr> for Printer {}

// ============================================================================
// Tests
// ============================================================================
