use axum::Json;
use axum::extract::State;

use crate::error::ServerError;

use super::AppState;
use super::schemas::{ErrorResponse, HealthResponse, MetricsResponse};

/// `GET /api/health` -- liveness plus a round trip to the metadata index.
#[utoipa::path(
    get,
    path = "/api/health",
    tag = "Health",
    summary = "Health check",
    description = "Reports healthy when the metadata index answers, together with the number of stored assets.",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 500, description = "Metadata index unreachable", body = ErrorResponse),
    )
)]
pub async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ServerError> {
    let assets = state.service.count().await?;
    Ok(Json(HealthResponse { ok: true, assets }))
}

/// `GET /metrics` -- asset service counters as JSON.
#[utoipa::path(
    get,
    path = "/metrics",
    tag = "Health",
    summary = "Service metrics",
    description = "Returns current asset operation counters for monitoring.",
    responses(
        (status = 200, description = "Current metric counters", body = MetricsResponse)
    )
)]
pub async fn metrics(State(state): State<AppState>) -> Json<MetricsResponse> {
    Json(state.service.metrics().snapshot().into())
}
