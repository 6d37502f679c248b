//! Health check HTTP handlers
//!
//! This module provides health check endpoints for monitoring
//! the application's status and dependencies.

use axum::{extract::State, http::StatusCode, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

use crate::web::{AppState, responses::ok};

/// Application health report.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    /// `connected` or `disconnected`
    pub database: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Health check endpoint
///
/// Returns basic application health status including database connectivity
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health status retrieved successfully", body = HealthStatus),
    )
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let database = database_status(&state).await;
    let status = if database == "connected" {
        "healthy"
    } else {
        "unhealthy"
    };

    ok(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: database.to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Readiness check (for orchestrator probes)
#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    responses(
        (status = 200, description = "Service is ready to accept traffic"),
        (status = 503, description = "Service is not ready"),
    )
)]
pub async fn readiness_check(State(state): State<AppState>) -> impl IntoResponse {
    if database_status(&state).await == "connected" {
        ok(serde_json::json!({
            "status": "ready",
            "timestamp": chrono::Utc::now()
        }))
        .into_response()
    } else {
        StatusCode::SERVICE_UNAVAILABLE.into_response()
    }
}

/// Liveness check (for orchestrator probes)
#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    responses(
        (status = 200, description = "Service is alive"),
    )
)]
pub async fn liveness_check() -> impl IntoResponse {
    ok(serde_json::json!({
        "status": "alive",
        "timestamp": chrono::Utc::now()
    }))
}

async fn database_status(state: &AppState) -> &'static str {
    match state.database.connection().ping().await {
        Ok(()) => "connected",
        Err(error) => {
            tracing::warn!("Database ping failed: {}", error);
            "disconnected"
        }
    }
}
