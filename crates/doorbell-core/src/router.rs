// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Failure routing for the split `accept` form.
//!
//! | Failure                        | Hook                    |
//! |--------------------------------|-------------------------|
//! | no operation for the kind      | `on_not_implemented`    |
//! | operation (or its hooks) failed | `on_error`             |
//!
//! A child visited from inside a hook fails through its own hooks first. If
//! it still fails, the parent's `on_error` receives the failure, including a
//! child's missing operation.
//!
//! The hook's return value becomes the result of `accept`. The default hooks
//! return the failure unchanged, so nothing is ever swallowed. An error
//! returned by a hook itself propagates as-is.

use tracing::debug;

use crate::traversal::{invoke, Call, Traversal};
use crate::visitor::{Outcome, Visitee, Visitor};

/// Resolve, invoke, and route failures for one subject.
pub(crate) fn route<'a, S: Visitee, V: Visitor<S>>(
    subject: &'a S,
    visitor: &mut V,
    args: V::Args,
    traversal: Traversal<'a, S>,
) -> Outcome<S, V> {
    let operation = match traversal.dispatcher().resolve(subject, visitor) {
        Ok(operation) => operation,
        Err(failure) => {
            debug!(
                kind = %failure.kind,
                method = ?failure.method,
                depth = traversal.depth(),
                "routing resolution failure"
            );
            return visitor.on_not_implemented(subject, failure, args);
        }
    };

    match invoke(visitor, operation, Call::new(subject, args.clone(), traversal)) {
        Err(error) => {
            debug!(
                kind = subject.kind_name(),
                depth = traversal.depth(),
                nested_lookup = error.as_not_implemented().is_some(),
                "routing execution failure"
            );
            visitor.on_error(subject, error, args)
        }
        outcome => outcome,
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::Dispatcher;
    use crate::error::{DispatchError, NotImplemented};
    use crate::registry::{KindRegistry, Naming};
    use crate::visitor::OperationTable;

    #[derive(Debug)]
    enum Token {
        Word(&'static str),
        Number(i64),
    }

    impl Visitee for Token {
        const KINDS: &'static [&'static str] = &["Word", "Number"];

        fn kind_name(&self) -> &'static str {
            match self {
                Token::Word(_) => "Word",
                Token::Number(_) => "Number",
            }
        }
    }

    fn dispatcher() -> Dispatcher<Token> {
        let mut registry = KindRegistry::new();
        registry
            .declare("Token", None, Naming::Auto(Default::default()))
            .unwrap();
        registry.declare("Word", Some("Token"), Naming::Inherit).unwrap();
        registry.declare("Number", Some("Token"), Naming::Inherit).unwrap();
        Dispatcher::from_registry(&registry).unwrap()
    }

    #[derive(Debug, PartialEq)]
    enum Seen {
        Missing(String, Option<String>, u8),
        Failed(String, u8),
    }

    struct Lengths {
        operations: OperationTable<Token, Self>,
        recover: bool,
        seen: Vec<Seen>,
    }

    impl Lengths {
        fn new(recover: bool) -> Self {
            let operations = OperationTable::<Token, Self>::new()
                .visit("Word", Lengths::visit_word)
                .unwrap();
            Self {
                operations,
                recover,
                seen: Vec::new(),
            }
        }

        fn visit_word(&mut self, call: Call<'_, Token, Self>) -> Result<usize, String> {
            match call.subject() {
                Token::Word("") => Err("empty word".to_string()),
                Token::Word(word) => Ok(word.len() + usize::from(*call.args())),
                Token::Number(_) => Err("not a word".to_string()),
            }
        }
    }

    impl Visitor<Token> for Lengths {
        type Args = u8;
        type Output = usize;
        type Error = String;

        fn operations(&self) -> &OperationTable<Token, Self> {
            &self.operations
        }

        fn on_not_implemented(
            &mut self,
            _subject: &Token,
            failure: NotImplemented,
            args: u8,
        ) -> Outcome<Token, Self> {
            if !self.recover {
                return Err(failure.into());
            }
            self.seen
                .push(Seen::Missing(failure.kind.clone(), failure.method.clone(), args));
            Ok(0)
        }

        fn on_error(
            &mut self,
            _subject: &Token,
            error: DispatchError<String>,
            args: u8,
        ) -> Outcome<Token, Self> {
            if !self.recover {
                return Err(error);
            }
            self.seen.push(Seen::Failed(error.to_string(), args));
            Ok(usize::MAX)
        }
    }

    #[test]
    fn resolution_failure_goes_to_on_not_implemented_with_args() {
        let mut visitor = Lengths::new(true);
        let result = dispatcher().accept(&Token::Number(3), &mut visitor, 7).unwrap();
        assert_eq!(result, 0);
        assert_eq!(
            visitor.seen,
            [Seen::Missing(
                "Number".to_string(),
                Some("visit_Number".to_string()),
                7
            )]
        );
    }

    #[test]
    fn execution_failure_goes_to_on_error_with_args() {
        let mut visitor = Lengths::new(true);
        let result = dispatcher().accept(&Token::Word(""), &mut visitor, 2).unwrap();
        assert_eq!(result, usize::MAX);
        assert_eq!(
            visitor.seen,
            [Seen::Failed("visitor operation failed: empty word".to_string(), 2)]
        );
    }

    #[test]
    fn hook_failure_propagates_unwrapped() {
        let mut visitor = Lengths::new(false);
        let err = dispatcher()
            .accept(&Token::Word(""), &mut visitor, 0)
            .unwrap_err();
        assert_eq!(err.into_execution().as_deref(), Some("empty word"));
    }

    #[test]
    fn extra_args_reach_the_operation() {
        let mut visitor = Lengths::new(true);
        let result = dispatcher().accept(&Token::Word("abc"), &mut visitor, 4).unwrap();
        assert_eq!(result, 7);
        assert!(visitor.seen.is_empty());
    }
}
