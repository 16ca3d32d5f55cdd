// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Kind registry: the upfront declaration pass over every subject kind.
//!
//! Kinds are declared parent-first. Each declaration carries a [`Naming`]
//! directive that decides how the kind's dispatch name is bound:
//!
//! | Directive          | Effect                                                       |
//! |--------------------|--------------------------------------------------------------|
//! | `Inherit`          | Auto-name inside an active lineage, otherwise delegate to the parent |
//! | `Explicit(name)`   | Bind `visit_<name>`                                          |
//! | `Derived(f)`       | Bind `visit_<f(kind)>`, no lineage involvement               |
//! | `Auto(f)`          | Establish a lineage, or override the lineage's naming function |
//! | `Suspend`          | Stop auto-naming; delegate to the parent's binding           |
//!
//! Every structural error (bad name, collision, suspend without a lineage) is
//! reported by the `declare` call that causes it. A failed declaration leaves
//! the registry unchanged.
//!
//! Once every kind is declared, [`KindRegistry::freeze`] flattens delegation
//! chains into an immutable [`BindingTable`] read by every dispatch.

use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use crate::error::{DeclarationError, DeclarationResult};
use crate::naming::{is_identifier, resolve_explicit, DispatchName, Lineage, NamingFn};

// ============================================================================
// Directives and Bindings
// ============================================================================

/// How a kind's dispatch name is bound at declaration.
#[derive(Debug, Clone, Default)]
pub enum Naming {
    /// No directive of its own (a plain subclass).
    #[default]
    Inherit,
    /// Bind the given name.
    Explicit(String),
    /// Bind the name computed from the kind name, outside any lineage.
    Derived(NamingFn),
    /// Apply auto-naming with this function to the kind and its descendants.
    Auto(NamingFn),
    /// Stop auto-naming for the kind and its descendants.
    Suspend,
}

/// The binding attached to a declared kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Binding {
    /// Dispatches to `visit_<name>`.
    Bound(DispatchName),
    /// Dispatches like the named parent kind.
    Delegate(String),
    /// No binding anywhere up the chain; subjects of this kind cannot dispatch.
    Abstract,
}

/// Where auto-naming stands for a kind (and, by inheritance, its descendants).
#[derive(Debug, Clone)]
enum AutoScope {
    Outside,
    Active(NamingFn),
    Suspended,
}

#[derive(Debug, Clone)]
struct KindEntry {
    parent: Option<String>,
    lineage: Option<usize>,
    scope: AutoScope,
    binding: Binding,
    /// Name this kind holds in its lineage counter, if auto-registered.
    auto_name: Option<DispatchName>,
}

// ============================================================================
// Registry
// ============================================================================

/// Mutable declaration table for subject kinds.
#[derive(Debug, Clone, Default)]
pub struct KindRegistry {
    kinds: BTreeMap<String, KindEntry>,
    order: Vec<String>,
    lineages: Vec<Lineage>,
}

impl KindRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `kind`, optionally as a child of an already declared `parent`.
    ///
    /// Returns the binding attached to the new kind.
    pub fn declare(
        &mut self,
        kind: &str,
        parent: Option<&str>,
        naming: Naming,
    ) -> DeclarationResult<Binding> {
        if !is_identifier(kind) {
            return Err(DeclarationError::InvalidName {
                name: kind.to_string(),
            });
        }
        if self.kinds.contains_key(kind) {
            return Err(DeclarationError::DuplicateKind {
                kind: kind.to_string(),
            });
        }
        let (lineage, scope) = match parent {
            Some(parent_kind) => {
                let entry =
                    self.kinds
                        .get(parent_kind)
                        .ok_or_else(|| DeclarationError::UnknownParent {
                            kind: kind.to_string(),
                            parent: parent_kind.to_string(),
                        })?;
                (entry.lineage, entry.scope.clone())
            }
            None => (None, AutoScope::Outside),
        };
        let delegate = || {
            parent
                .map(|p| Binding::Delegate(p.to_string()))
                .unwrap_or(Binding::Abstract)
        };

        let mut entry = KindEntry {
            parent: parent.map(str::to_string),
            lineage,
            scope,
            binding: Binding::Abstract,
            auto_name: None,
        };

        match naming {
            Naming::Inherit => match (&entry.scope, entry.lineage) {
                (AutoScope::Active(naming), Some(index)) => {
                    let name = self.lineages[index].resolve_auto(kind, naming)?;
                    entry.auto_name = Some(name.clone());
                    entry.binding = Binding::Bound(name);
                }
                _ => entry.binding = delegate(),
            },
            Naming::Explicit(name) => {
                entry.binding = Binding::Bound(resolve_explicit(&name)?);
            }
            Naming::Derived(naming) => {
                entry.binding = Binding::Bound(resolve_explicit(&naming.apply(kind))?);
            }
            Naming::Auto(naming) => {
                let name = match entry.lineage {
                    Some(index) => self.lineages[index].resolve_auto(kind, &naming)?,
                    None => {
                        let mut lineage = Lineage::new(kind);
                        let name = lineage.resolve_auto(kind, &naming)?;
                        self.lineages.push(lineage);
                        entry.lineage = Some(self.lineages.len() - 1);
                        debug!(kind, naming = naming.label(), "established naming lineage");
                        name
                    }
                };
                entry.scope = AutoScope::Active(naming);
                entry.auto_name = Some(name.clone());
                entry.binding = Binding::Bound(name);
            }
            Naming::Suspend => {
                if entry.lineage.is_none() {
                    return Err(DeclarationError::NotApplicable {
                        kind: kind.to_string(),
                    });
                }
                entry.scope = AutoScope::Suspended;
                entry.binding = delegate();
            }
        }

        debug!(kind, parent, binding = ?entry.binding, "declared kind");
        let binding = entry.binding.clone();
        self.kinds.insert(kind.to_string(), entry);
        self.order.push(kind.to_string());
        Ok(binding)
    }

    /// Install a new naming function on `kind` and re-resolve its own name.
    ///
    /// Kinds declared later under `kind` use the new function; kinds already
    /// declared keep their names.
    pub fn override_naming(&mut self, kind: &str, naming: NamingFn) -> DeclarationResult<Binding> {
        let entry = self.entry(kind)?;
        let index = entry.lineage.ok_or_else(|| DeclarationError::NotApplicable {
            kind: kind.to_string(),
        })?;
        let previous = entry.auto_name.clone();

        let lineage = &mut self.lineages[index];
        if let Some(old) = &previous {
            lineage.release(old);
        }
        let name = match lineage.resolve_auto(kind, &naming) {
            Ok(name) => name,
            Err(err) => {
                if let Some(old) = &previous {
                    lineage.claim(kind, old)?;
                }
                return Err(err);
            }
        };

        debug!(kind, naming = naming.label(), %name, "overrode naming function");
        let entry = self.entry_mut(kind)?;
        entry.scope = AutoScope::Active(naming);
        entry.auto_name = Some(name.clone());
        entry.binding = Binding::Bound(name);
        Ok(entry.binding.clone())
    }

    /// Stop auto-naming at `kind`.
    ///
    /// Frees the name `kind` holds in its lineage (if any) and rebinds it to
    /// delegate to its parent.
    pub fn suspend_auto(&mut self, kind: &str) -> DeclarationResult<Binding> {
        let entry = self.entry(kind)?;
        let index = entry.lineage.ok_or_else(|| DeclarationError::NotApplicable {
            kind: kind.to_string(),
        })?;
        let released = entry.auto_name.clone();
        if let Some(name) = &released {
            self.lineages[index].release(name);
        }

        let entry = self.entry_mut(kind)?;
        entry.scope = AutoScope::Suspended;
        entry.auto_name = None;
        entry.binding = match &entry.parent {
            Some(parent) => Binding::Delegate(parent.clone()),
            None => Binding::Abstract,
        };
        debug!(kind, released = ?released, "suspended auto-naming");
        Ok(entry.binding.clone())
    }

    /// The binding attached to `kind`.
    pub fn binding(&self, kind: &str) -> Option<&Binding> {
        self.kinds.get(kind).map(|entry| &entry.binding)
    }

    /// The lineage `kind` belongs to.
    pub fn lineage_of(&self, kind: &str) -> Option<&Lineage> {
        self.kinds
            .get(kind)
            .and_then(|entry| entry.lineage)
            .map(|index| &self.lineages[index])
    }

    /// Follow delegation from `kind` to the dispatch name it resolves to.
    pub fn resolve(&self, kind: &str) -> DeclarationResult<Option<&DispatchName>> {
        let mut current = self.entry(kind)?;
        loop {
            match &current.binding {
                Binding::Bound(name) => return Ok(Some(name)),
                Binding::Abstract => return Ok(None),
                Binding::Delegate(parent) => current = self.entry(parent)?,
            }
        }
    }

    /// Declared kinds, in declaration order.
    pub fn kinds(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// Resolve every kind and produce the immutable dispatch table.
    pub fn freeze(&self) -> DeclarationResult<BindingTable> {
        let mut entries = Vec::with_capacity(self.order.len());
        for kind in &self.order {
            let name = self.resolve(kind)?.cloned();
            entries.push(BoundKind {
                kind: kind.clone(),
                method: name.as_ref().map(DispatchName::method_name),
                name,
                lineage: self.lineage_of(kind).map(|l| l.root().to_string()),
            });
        }
        debug!(kinds = entries.len(), lineages = self.lineages.len(), "froze binding table");
        Ok(BindingTable::from_entries(entries))
    }

    fn entry(&self, kind: &str) -> DeclarationResult<&KindEntry> {
        self.kinds
            .get(kind)
            .ok_or_else(|| DeclarationError::UnknownKind {
                kind: kind.to_string(),
            })
    }

    fn entry_mut(&mut self, kind: &str) -> DeclarationResult<&mut KindEntry> {
        self.kinds
            .get_mut(kind)
            .ok_or_else(|| DeclarationError::UnknownKind {
                kind: kind.to_string(),
            })
    }
}

// ============================================================================
// Binding Table
// ============================================================================

/// One resolved row of a [`BindingTable`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoundKind {
    pub kind: String,
    /// Resolved dispatch name, `None` for abstract kinds.
    pub name: Option<DispatchName>,
    /// Visitor method, `visit_<name>`.
    pub method: Option<String>,
    /// Root kind of the naming lineage, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lineage: Option<String>,
}

/// Immutable kind -> dispatch name table, built once by [`KindRegistry::freeze`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct BindingTable {
    kinds: Vec<BoundKind>,
    #[serde(skip)]
    index: BTreeMap<String, usize>,
}

impl BindingTable {
    fn from_entries(kinds: Vec<BoundKind>) -> Self {
        let index = kinds
            .iter()
            .enumerate()
            .map(|(position, entry)| (entry.kind.clone(), position))
            .collect();
        Self { kinds, index }
    }

    pub fn get(&self, kind: &str) -> Option<&BoundKind> {
        self.index.get(kind).map(|&position| &self.kinds[position])
    }

    /// The visitor method bound to `kind`, if the kind is declared and concrete.
    pub fn method_for(&self, kind: &str) -> Option<&str> {
        self.get(kind).and_then(|entry| entry.method.as_deref())
    }

    pub fn contains(&self, kind: &str) -> bool {
        self.index.contains_key(kind)
    }

    /// Check that every kind in `kinds` is declared and bound.
    pub fn require(&self, kinds: &[&str]) -> DeclarationResult<()> {
        for kind in kinds {
            let entry = self.get(kind).ok_or_else(|| DeclarationError::UnknownKind {
                kind: kind.to_string(),
            })?;
            if entry.method.is_none() {
                return Err(DeclarationError::Unbound {
                    kind: kind.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Rows in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &BoundKind> {
        self.kinds.iter()
    }

    pub fn len(&self) -> usize {
        self.kinds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kinds.is_empty()
    }
}

// ============================================================================
// Tests
// ============================================================================
