use anyhow::anyhow;
use axum::Json;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use serde::Serialize;
use socialfeed_core::AppError;
use utoipa::ToSchema;

use crate::response::{Envelope, ErrorResponse, envelope};
use crate::state::AppState;

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthStatus {
    pub status: String,
    pub env: String,
    pub version: String,
}

/// Service health
#[utoipa::path(
    get,
    path = "/v1/health",
    responses(
        (status = 200, description = "Service is up", body = Envelope<HealthStatus>),
        (status = 401, description = "Missing or invalid basic credentials", body = ErrorResponse)
    ),
    security(("basic_auth" = [])),
    tag = "Operations"
)]
pub async fn health_check(State(state): State<AppState>) -> Json<Envelope<HealthStatus>> {
    envelope(HealthStatus {
        status: "ok".to_string(),
        env: state.server_config.env.clone(),
        version: state.server_config.version.clone(),
    })
}

/// Prometheus metrics
#[utoipa::path(
    get,
    path = "/v1/debug/metrics",
    responses(
        (status = 200, description = "Prometheus text exposition", body = String, content_type = "text/plain"),
        (status = 401, description = "Missing or invalid basic credentials", body = ErrorResponse),
        (status = 404, description = "Metrics are disabled", body = ErrorResponse)
    ),
    security(("basic_auth" = [])),
    tag = "Operations"
)]
pub async fn metrics_handler(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let handle = state
        .metrics
        .as_ref()
        .ok_or_else(|| AppError::not_found(anyhow!("metrics are disabled")))?;
    Ok((
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        handle.render(),
    ))
}
