//! Domain error types
//!
//! This module defines the error hierarchy for Aegis. Errors are split by the
//! layer that raises them:
//!
//! - [`AegisError`] is the crate-level error used by startup, configuration and I/O.
//! - [`GovernanceError`] is raised by the governance pipeline for a single request.
//! - [`DetectionError`] is raised by detection engines and never crosses the
//!   pipeline boundary on its own; the adapter wraps it as
//!   [`GovernanceError::DetectionUnavailable`].
//!
//! Error messages never contain prompt text or detected values.

use thiserror::Error;

/// Main Aegis error type
#[derive(Debug, Error)]
pub enum AegisError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Governance pipeline errors
    #[error("Governance error: {0}")]
    Governance(#[from] GovernanceError),

    /// Detection engine errors raised outside a request (e.g. client construction)
    #[error("Detection error: {0}")]
    Detection(#[from] DetectionError),

    /// HTTP server errors
    #[error("Server error: {0}")]
    Server(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl AegisError {
    /// Whether this error was caused by invalid configuration, including
    /// malformed operator rules
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            AegisError::Configuration(_)
                | AegisError::Governance(GovernanceError::InvalidOperatorConfig { .. })
        )
    }
}

/// Errors raised while governing a single request
///
/// Only [`GovernanceError::PolicyViolation`] is meant to be shown to the caller.
/// Every other variant is surfaced as a generic internal failure.
#[derive(Debug, Error)]
pub enum GovernanceError {
    /// The prompt contains a denylisted term
    #[error("Security Violation: Restricted content found ('{term}')")]
    PolicyViolation { term: String },

    /// The detection engine could not be reached, timed out, or answered garbage
    #[error("Detection engine unavailable: {0}")]
    DetectionUnavailable(#[from] DetectionError),

    /// An operator rule is malformed (raised at configuration load time)
    #[error("Invalid operator configuration for '{entity_type}': {reason}")]
    InvalidOperatorConfig { entity_type: String, reason: String },

    /// A detected span violates `0 <= start < end <= len` or splits a character
    #[error("Detected span {start}..{end} is invalid for text of {len} bytes")]
    InvalidSpan { start: usize, end: usize, len: usize },

    /// The request lifecycle attempted an out-of-order transition
    #[error("Illegal pipeline transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    /// An operator failed while rewriting a span
    #[error("Operator '{operator}' failed: {reason}")]
    Operator {
        operator: &'static str,
        reason: String,
    },
}

impl GovernanceError {
    /// Creates an invalid operator configuration error
    pub fn invalid_operator(entity_type: impl Into<String>, reason: impl Into<String>) -> Self {
        GovernanceError::InvalidOperatorConfig {
            entity_type: entity_type.into(),
            reason: reason.into(),
        }
    }

    /// Whether the error is a client-facing rejection rather than an internal failure
    pub fn is_policy_violation(&self) -> bool {
        matches!(self, GovernanceError::PolicyViolation { .. })
    }
}

/// Detection engine errors
#[derive(Debug, Error)]
pub enum DetectionError {
    /// Engine could not be reached
    #[error("Detection engine unreachable: {0}")]
    Unreachable(String),

    /// Engine did not answer in time
    #[error("Detection timed out after {0} ms")]
    Timeout(u64),

    /// Engine answered with a payload that cannot be translated into spans
    #[error("Invalid detection response: {0}")]
    InvalidResponse(String),
}

// Conversion from std::io::Error
impl From<std::io::Error> for AegisError {
    fn from(err: std::io::Error) -> Self {
        AegisError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for AegisError {
    fn from(err: serde_json::Error) -> Self {
        AegisError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for AegisError {
    fn from(err: toml::de::Error) -> Self {
        AegisError::Configuration(format!("TOML parse error: {err}"))
    }
}
