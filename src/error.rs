//! Error types for rule group mutations

use std::fmt;
use thiserror::Error;

/// Result type for mutation operations
pub type Result<T> = std::result::Result<T, RulerError>;

/// Errors raised by the store adapters, the reducer, the planner and the orchestrator.
///
/// The type is `Clone` so the orchestrator can record the error in its request
/// state and hand an identical copy back to the caller.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RulerError {
    /// Target group or namespace is absent
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rename/move target already holds rules
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Unsupported operation, rejected before any store call
    #[error("Precondition failed: {0}")]
    Precondition(String),

    /// The action refers to a rule that is not in the group
    #[error("Rule not found: {0}")]
    RuleNotFound(String),

    /// The remote rejected the payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Network or server failure
    #[error("Remote error{}: {message}", status_suffix(.status))]
    Remote {
        status: Option<u16>,
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Payload encoding or decoding failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn status_suffix(status: &Option<u16>) -> String {
    match status {
        Some(code) => format!(" (HTTP {code})"),
        None => String::new(),
    }
}

impl RulerError {
    /// Create a not found error
    pub fn not_found<E: fmt::Display>(item: E) -> Self {
        Self::NotFound(item.to_string())
    }

    /// Create a conflict error
    pub fn conflict<E: fmt::Display>(msg: E) -> Self {
        Self::Conflict(msg.to_string())
    }

    /// Create a precondition error
    pub fn precondition<E: fmt::Display>(msg: E) -> Self {
        Self::Precondition(msg.to_string())
    }

    /// Create a rule not found error
    pub fn rule_not_found<E: fmt::Display>(uid: E) -> Self {
        Self::RuleNotFound(uid.to_string())
    }

    /// Create a validation error
    pub fn validation<E: fmt::Display>(msg: E) -> Self {
        Self::Validation(msg.to_string())
    }

    /// Create a remote error carrying an optional HTTP status
    pub fn remote<E: fmt::Display>(status: Option<u16>, msg: E) -> Self {
        Self::Remote {
            status,
            message: msg.to_string(),
        }
    }

    /// Create a configuration error
    pub fn configuration<E: fmt::Display>(msg: E) -> Self {
        Self::Configuration(msg.to_string())
    }

    /// Create a serialization error
    pub fn serialization<E: fmt::Display>(err: E) -> Self {
        Self::Serialization(err.to_string())
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }

    /// Check if this is a precondition error
    pub fn is_precondition(&self) -> bool {
        matches!(self, Self::Precondition(_) | Self::RuleNotFound(_))
    }
}

impl From<serde_json::Error> for RulerError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err)
    }
}

impl From<reqwest::Error> for RulerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::serialization(err);
        }
        Self::remote(err.status().map(|s| s.as_u16()), err)
    }
}
