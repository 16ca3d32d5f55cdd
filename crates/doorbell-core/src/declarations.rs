// Copyright (c) Ken Kocienda and other contributors.
//
// This source code is licensed under the MIT license found in the
// LICENSE file in the root directory of this source tree.

//! Declaration documents: kind tables described as JSON.
//!
//! ```json
//! {
//!   "kinds": [
//!     { "kind": "Value", "naming": { "auto": "identity" } },
//!     { "kind": "Add", "parent": "Value" },
//!     { "kind": "Mult", "parent": "Add", "naming": { "explicit": "Multiply" } },
//!     { "kind": "Raw", "parent": "Value", "naming": "suspend" }
//!   ]
//! }
//! ```
//!
//! Kinds are applied in document order, so parents must come first.

use serde::{Deserialize, Serialize};

use crate::error::DeclarationResult;
use crate::naming::NamingRule;
use crate::registry::{KindRegistry, Naming};

/// A whole declaration document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDeclarations {
    pub kinds: Vec<KindDecl>,
}

/// One kind declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindDecl {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub naming: NamingDecl,
}

/// Serializable form of [`Naming`], restricted to built-in naming rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NamingDecl {
    #[default]
    Inherit,
    Suspend,
    Explicit(String),
    Derived(NamingRule),
    Auto(NamingRule),
}

impl From<&NamingDecl> for Naming {
    fn from(decl: &NamingDecl) -> Self {
        match decl {
            NamingDecl::Inherit => Naming::Inherit,
            NamingDecl::Suspend => Naming::Suspend,
            NamingDecl::Explicit(name) => Naming::Explicit(name.clone()),
            NamingDecl::Derived(rule) => Naming::Derived(rule.clone().into()),
            NamingDecl::Auto(rule) => Naming::Auto(rule.clone().into()),
        }
    }
}

impl KindDeclarations {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Declare every kind on `registry`, stopping at the first error.
    pub fn apply(&self, registry: &mut KindRegistry) -> DeclarationResult<()> {
        for decl in &self.kinds {
            registry.declare(&decl.kind, decl.parent.as_deref(), (&decl.naming).into())?;
        }
        Ok(())
    }

    /// Build a fresh registry from this document.
    pub fn to_registry(&self) -> DeclarationResult<KindRegistry> {
        let mut registry = KindRegistry::new();
        self.apply(&mut registry)?;
        Ok(registry)
    }
}

// ============================================================================
// Tests
// ============================================================================
