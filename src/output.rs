//! JSON output types for CLI responses.
//!
//! 1. **Always JSON:** all stdout output is valid JSON
//! 2. **Status first:** every response has `status` as its first field
//! 3. **Deterministic:** same input, same bytes (kinds keep declaration order)
//! 4. **Versioned:** `schema_version` enables forward compatibility

use std::io::{self, Write};

use serde::{Deserialize, Serialize};

use doorbell_core::{BindingTable, BoundKind};

use crate::error::{CliError, ExitCodeKind};

/// Current schema version for all responses.
pub const SCHEMA_VERSION: &str = "1";

// ============================================================================
// Error Info
// ============================================================================

/// Error information for error responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorInfo {
    /// Numeric error code (the process exit status).
    pub code: u8,
    /// Human-readable message.
    pub message: String,
    /// Error-specific structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorInfo {
    /// Create from a CliError.
    pub fn from_error(err: &CliError) -> Self {
        let details = match err {
            CliError::InvalidArguments { details, .. } => details.clone(),
            CliError::Dispatch {
                kind: Some(kind), ..
            } => Some(serde_json::json!({ "kind": kind })),
            _ => None,
        };
        ErrorInfo {
            code: ExitCodeKind::from(err).code(),
            message: err.to_string(),
            details,
        }
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Response for the `check` command.
#[derive(Debug, Clone, Serialize)]
pub struct CheckResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Resolved kinds, in declaration order.
    pub kinds: Vec<BoundKind>,
}

impl CheckResponse {
    pub fn new(table: &BindingTable) -> Self {
        CheckResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            kinds: table.iter().cloned().collect(),
        }
    }
}

/// Response for the `eval` command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalResponse {
    /// Status: "ok".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Infix rendering of the expression.
    pub expression: String,
    /// Evaluated value.
    pub value: i64,
    /// Nodes whose operation ran.
    pub nodes_visited: usize,
}

impl EvalResponse {
    pub fn new(expression: impl Into<String>, value: i64, nodes_visited: usize) -> Self {
        EvalResponse {
            status: "ok".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            expression: expression.into(),
            value,
            nodes_visited,
        }
    }
}

/// Error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Status: "error".
    pub status: String,
    /// Schema version for compatibility.
    pub schema_version: String,
    /// Error information.
    pub error: ErrorInfo,
}

impl ErrorResponse {
    pub fn from_error(err: &CliError) -> Self {
        ErrorResponse {
            status: "error".to_string(),
            schema_version: SCHEMA_VERSION.to_string(),
            error: ErrorInfo::from_error(err),
        }
    }
}

// ============================================================================
// Emit
// ============================================================================

/// Emit a response as pretty-printed JSON to a writer.
pub fn emit_response<T: Serialize>(response: &T, writer: &mut impl Write) -> io::Result<()> {
    let json = serde_json::to_string_pretty(response)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    writeln!(writer, "{json}")
}

// ============================================================================
// Tests
// ============================================================================
