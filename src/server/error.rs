//! HTTP error mapping
//!
//! Policy violations become `422` with the offending term. Everything else is
//! a generic `500` that carries no internal detail and never the prompt.

use crate::domain::GovernanceError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Machine-checkable code for denylist rejections
pub const POLICY_VIOLATION: &str = "POLICY_VIOLATION";

/// Machine-checkable code for every other failure
pub const INTERNAL_GOVERNANCE_ERROR: &str = "INTERNAL_GOVERNANCE_ERROR";

/// Errors returned by the gateway handlers
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Security Violation: Restricted content found ('{term}')")]
    PolicyViolation { term: String },

    #[error("Internal Governance Error")]
    Internal,
}

impl From<GovernanceError> for ApiError {
    fn from(err: GovernanceError) -> Self {
        match err {
            GovernanceError::PolicyViolation { term } => Self::PolicyViolation { term },
            // Already logged with request context by the orchestrator
            _ => Self::Internal,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.to_string();
        let (status, body) = match self {
            ApiError::PolicyViolation { term } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({
                    "error": {
                        "code": POLICY_VIOLATION,
                        "message": message,
                        "term": term,
                    }
                }),
            ),
            ApiError::Internal => (
                StatusCode::INTERNAL_SERVER_ERROR,
                json!({
                    "error": {
                        "code": INTERNAL_GOVERNANCE_ERROR,
                        "message": message,
                    }
                }),
            ),
        };

        (status, Json(body)).into_response()
    }
}
