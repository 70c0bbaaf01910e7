//! Request handlers
//!
//! GET  /         - service identity (no pipeline interaction)
//! POST /v1/gate  - run a prompt through the governance pipeline

use super::error::ApiError;
use super::AppState;
use crate::governance::{GovernanceRequest, GovernanceResponse};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde::Serialize;

/// Health document
#[derive(Debug, Clone, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub version: &'static str,
    pub engine: String,
}

/// GET / - service identity
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(HealthStatus {
            status: "Aegis Online",
            version: env!("CARGO_PKG_VERSION"),
            engine: state.orchestrator.engine_name().to_string(),
        }),
    )
}

/// POST /v1/gate - governance pipeline
pub async fn gate(
    State(state): State<AppState>,
    Json(request): Json<GovernanceRequest>,
) -> Result<Json<GovernanceResponse>, ApiError> {
    let response = state.orchestrator.process(&request).await?;
    Ok(Json(response))
}
