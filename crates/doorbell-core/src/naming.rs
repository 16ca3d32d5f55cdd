// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Dispatch names and naming lineages.
//!
//! A subject kind is bound to the visitor method `visit_<name>`. The `<name>`
//! part is either given explicitly or derived from the kind name by a
//! [`NamingFn`]. Kinds that share an auto-naming policy form a [`Lineage`],
//! which counts every derived name so that two kinds of one lineage can never
//! resolve to the same visitor method.
//!
//! # Grammar
//!
//! Every dispatch name must match `[A-Za-z_][A-Za-z0-9_]*`:
//!
//! ```
//! use doorbell_core::naming::resolve_explicit;
//!
//! assert_eq!(resolve_explicit("Person").unwrap().method_name(), "visit_Person");
//! assert!(resolve_explicit("123").is_err());
//! ```

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, LazyLock};

use heck::{ToLowerCamelCase, ToSnakeCase};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::{DeclarationError, DeclarationResult};

/// Prefix shared by every dispatchable visitor method.
pub const VISIT_PREFIX: &str = "visit_";

static IDENTIFIER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").unwrap());

/// Returns true if `name` is a valid method-name fragment.
pub fn is_identifier(name: &str) -> bool {
    IDENTIFIER_REGEX.is_match(name)
}

// ============================================================================
// Dispatch Names
// ============================================================================

/// A validated dispatch name; the `<name>` in `visit_<name>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct DispatchName(String);

impl DispatchName {
    /// The bare name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The visitor method this name binds to.
    pub fn method_name(&self) -> String {
        format!("{VISIT_PREFIX}{}", self.0)
    }
}

impl fmt::Display for DispatchName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<&str> for DispatchName {
    type Error = DeclarationError;

    fn try_from(name: &str) -> Result<Self, Self::Error> {
        resolve_explicit(name)
    }
}

/// Validate an explicitly given dispatch name.
pub fn resolve_explicit(name: &str) -> DeclarationResult<DispatchName> {
    if is_identifier(name) {
        Ok(DispatchName(name.to_string()))
    } else {
        Err(DeclarationError::InvalidName {
            name: name.to_string(),
        })
    }
}

// ============================================================================
// Naming Functions
// ============================================================================

/// Built-in naming rules, usable from declaration documents.
///
/// Serialized in snake case: `"identity"`, `"upper"`, `{"prefix": "Ast"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingRule {
    /// The kind name unchanged.
    #[default]
    Identity,
    /// `MyClass` -> `MYCLASS`.
    Upper,
    /// `MyClass` -> `myclass`.
    Lower,
    /// `MyClass` -> `my_class`.
    SnakeCase,
    /// `MyClass` -> `myClass`.
    CamelCase,
    /// Prepend a fixed string.
    Prefix(String),
    /// Append a fixed string.
    Suffix(String),
}

impl NamingRule {
    /// Apply the rule to a kind name.
    pub fn apply(&self, kind: &str) -> String {
        match self {
            NamingRule::Identity => kind.to_string(),
            NamingRule::Upper => kind.to_uppercase(),
            NamingRule::Lower => kind.to_lowercase(),
            NamingRule::SnakeCase => kind.to_snake_case(),
            NamingRule::CamelCase => kind.to_lower_camel_case(),
            NamingRule::Prefix(prefix) => format!("{prefix}{kind}"),
            NamingRule::Suffix(suffix) => format!("{kind}{suffix}"),
        }
    }
}

/// A function from kind name to candidate dispatch name.
///
/// Cheap to clone; kinds of one lineage share the same function value.
#[derive(Clone)]
pub struct NamingFn {
    label: String,
    func: Arc<dyn Fn(&str) -> String + Send + Sync>,
}

impl NamingFn {
    /// Wrap an arbitrary function. `label` only shows up in logs and `Debug`.
    pub fn new<F>(label: impl Into<String>, func: F) -> Self
    where
        F: Fn(&str) -> String + Send + Sync + 'static,
    {
        Self {
            label: label.into(),
            func: Arc::new(func),
        }
    }

    /// The kind name, unchanged.
    pub fn identity() -> Self {
        NamingRule::Identity.into()
    }

    /// Compute the candidate name for `kind`. The result is not validated.
    pub fn apply(&self, kind: &str) -> String {
        (self.func)(kind)
    }

    pub fn label(&self) -> &str {
        &self.label
    }
}

impl Default for NamingFn {
    fn default() -> Self {
        Self::identity()
    }
}

impl From<NamingRule> for NamingFn {
    fn from(rule: NamingRule) -> Self {
        let label = format!("{rule:?}");
        NamingFn::new(label, move |kind| rule.apply(kind))
    }
}

impl fmt::Debug for NamingFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("NamingFn").field(&self.label).finish()
    }
}

// ============================================================================
// Lineages
// ============================================================================

/// Usage counters for the auto-derived names of one kind hierarchy.
///
/// Created when auto-naming is first applied to a kind (the lineage root) and
/// shared by every descendant declared afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lineage {
    root: String,
    usage: BTreeMap<String, usize>,
}

impl Lineage {
    pub fn new(root: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            usage: BTreeMap::new(),
        }
    }

    /// The kind that established this lineage.
    pub fn root(&self) -> &str {
        &self.root
    }

    /// How many registered kinds currently hold `name`.
    pub fn usage(&self, name: &str) -> usize {
        self.usage.get(name).copied().unwrap_or(0)
    }

    /// Names currently held, in sorted order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.usage.keys().map(String::as_str)
    }

    /// Derive, validate, and count the dispatch name for `kind`.
    ///
    /// Fails with [`DeclarationError::Collision`] when the candidate is
    /// already held; the counter is left as it was before the call.
    pub fn resolve_auto(&mut self, kind: &str, naming: &NamingFn) -> DeclarationResult<DispatchName> {
        let name = resolve_explicit(&naming.apply(kind))?;
        self.claim(kind, &name)?;
        Ok(name)
    }

    /// Count `name` as held by `kind`.
    pub fn claim(&mut self, kind: &str, name: &DispatchName) -> DeclarationResult<()> {
        let count = self.usage.entry(name.as_str().to_string()).or_insert(0);
        *count += 1;
        if *count > 1 {
            *count -= 1;
            return Err(DeclarationError::Collision {
                name: name.as_str().to_string(),
                kind: kind.to_string(),
            });
        }
        trace!(lineage = %self.root, %name, kind, "claimed dispatch name");
        Ok(())
    }

    /// Free `name` for reuse. Returns false if it was not held.
    pub fn release(&mut self, name: &DispatchName) -> bool {
        match self.usage.get_mut(name.as_str()) {
            Some(count) => {
                *count -= 1;
                if *count == 0 {
                    self.usage.remove(name.as_str());
                }
                trace!(lineage = %self.root, %name, "released dispatch name");
                true
            }
            None => false,
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
