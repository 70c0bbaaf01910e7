//! HTTP gateway
//!
//! Thin axum layer over [`GovernanceOrchestrator`]. Every request runs the
//! pipeline independently; the orchestrator is shared read-only.

pub mod error;
pub mod handlers;

use crate::config::ServerConfig;
use crate::domain::{AegisError, Result};
use crate::governance::GovernanceOrchestrator;
use axum::{
    http::{header, HeaderValue, Method},
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::watch;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<GovernanceOrchestrator>,
}

impl AppState {
    pub fn new(orchestrator: Arc<GovernanceOrchestrator>) -> Self {
        Self { orchestrator }
    }
}

/// CORS layer for the configured origins; `"*"` (or no origins) allows any
fn build_cors(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        cors.allow_origin(Any)
    } else {
        let parsed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(parsed)
    }
}

/// Build the gateway router
pub fn build_router(state: AppState, cors_allowed_origins: &[String]) -> Router {
    Router::new()
        .route("/", get(handlers::health))
        .route("/v1/gate", post(handlers::gate))
        .layer(build_cors(cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until `shutdown` flips to `true`
pub async fn serve(
    config: &ServerConfig,
    orchestrator: Arc<GovernanceOrchestrator>,
    mut shutdown: watch::Receiver<bool>,
) -> Result<()> {
    let addr = config.socket_addr().map_err(AegisError::Configuration)?;
    let app = build_router(AppState::new(orchestrator), &config.cors_allowed_origins);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AegisError::Server(format!("Failed to bind {addr}: {e}")))?;

    tracing::info!(%addr, "Gateway listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            while !*shutdown.borrow() {
                if shutdown.changed().await.is_err() {
                    break;
                }
            }
            tracing::info!("Gateway shutting down gracefully");
        })
        .await
        .map_err(|e| AegisError::Server(e.to_string()))?;

    Ok(())
}
