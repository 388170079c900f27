//! Health check handler.

use crate::models::HealthResponse;
use axum::Json;
use tracing::instrument;

/// Handler for `GET /v1/health`.
///
/// The service holds no external connections of its own; a reachable
/// process is a healthy process.
#[instrument(skip_all, name = "sc.health.check")]
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
    })
}
