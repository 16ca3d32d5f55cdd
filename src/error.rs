//! Error types and exit code constants for the doorbell CLI.
//!
//! `CliError` is the single error type the binary renders as JSON. Engine
//! errors from `doorbell-core` are bridged into it with `From` impls.
//!
//! ## Exit Codes
//!
//! - `2`: Invalid arguments (unreadable file, malformed JSON)
//! - `3`: Declaration errors (bad name, collision, unbound kind)
//! - `4`: Dispatch errors (missing operation, failed operation)
//! - `10`: Internal errors (bugs, unexpected state)

use std::fmt;

use thiserror::Error;

use doorbell_core::{DeclarationError, DispatchError};

// ============================================================================
// Exit Codes
// ============================================================================

/// Stable exit codes for CLI failures.
///
/// These codes are the process exit status and appear in JSON error responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCodeKind {
    /// Invalid arguments from caller (bad input, malformed document).
    InvalidArguments = 2,
    /// Kind table could not be built.
    DeclarationError = 3,
    /// A visit failed and no recovery hook handled it.
    DispatchError = 4,
    /// Internal errors (bugs, unexpected state).
    InternalError = 10,
}

impl ExitCodeKind {
    /// Get the numeric code value.
    pub fn code(&self) -> u8 {
        *self as u8
    }
}

impl fmt::Display for ExitCodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ============================================================================
// Unified Error Type
// ============================================================================

/// Unified error type for CLI output.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid arguments from caller.
    #[error("invalid arguments: {message}")]
    InvalidArguments {
        message: String,
        details: Option<serde_json::Value>,
    },

    /// The kind table was rejected.
    #[error("declaration error: {0}")]
    Declaration(#[from] DeclarationError),

    /// A visit failed.
    #[error("dispatch error: {message}")]
    Dispatch {
        message: String,
        /// Kind of the subject that could not be dispatched, for resolution failures.
        kind: Option<String>,
    },

    /// Internal error (bug or unexpected state).
    #[error("internal error: {message}")]
    InternalError { message: String },
}

impl CliError {
    pub fn invalid_arguments(message: impl Into<String>, details: Option<serde_json::Value>) -> Self {
        CliError::InvalidArguments {
            message: message.into(),
            details,
        }
    }
}

// ============================================================================
// Error Code Mapping
// ============================================================================

impl From<&CliError> for ExitCodeKind {
    fn from(err: &CliError) -> Self {
        match err {
            CliError::InvalidArguments { .. } => ExitCodeKind::InvalidArguments,
            CliError::Declaration(_) => ExitCodeKind::DeclarationError,
            CliError::Dispatch { .. } => ExitCodeKind::DispatchError,
            CliError::InternalError { .. } => ExitCodeKind::InternalError,
        }
    }
}

// ============================================================================
// Bridges
// ============================================================================

impl<E: fmt::Display> From<DispatchError<E>> for CliError {
    fn from(err: DispatchError<E>) -> Self {
        match err {
            DispatchError::NotImplemented(failure) => CliError::Dispatch {
                message: failure.to_string(),
                kind: Some(failure.kind),
            },
            DispatchError::Execution(err) => CliError::Dispatch {
                message: err.to_string(),
                kind: None,
            },
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(err: serde_json::Error) -> Self {
        CliError::invalid_arguments(
            format!("malformed JSON: {err}"),
            Some(serde_json::json!({
                "line": err.line(),
                "column": err.column(),
            })),
        )
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::InternalError {
            message: err.to_string(),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
