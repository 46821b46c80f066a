use axum::{Json, Router, extract::State, routing::get};
use foodwatch_core::domain::health::{entities::DatabaseHealthStatus, ports::HealthCheckService};
use serde::{Deserialize, Serialize};
use tracing::warn;
use utoipa::{OpenApi, ToSchema};

use crate::application::http::server::api_entities::api_error::ApiError;
use crate::application::http::server::app_state::AppState;

#[derive(Debug, Serialize, Deserialize, ToSchema, PartialEq, Eq)]
pub struct LivenessStatus {
    pub status: String,
}

#[utoipa::path(
    get,
    path = "/live",
    tag = "health",
    summary = "Liveness check",
    responses(
        (status = 200, body = LivenessStatus)
    )
)]
pub async fn live() -> Json<LivenessStatus> {
    Json(LivenessStatus {
        status: "UP".to_string(),
    })
}

#[utoipa::path(
    get,
    path = "/ready",
    tag = "health",
    summary = "Readiness check",
    description = "Checks that the database answers.",
    responses(
        (status = 200, body = DatabaseHealthStatus),
        (status = 503, description = "Database unreachable"),
    )
)]
pub async fn ready(State(state): State<AppState>) -> Result<Json<DatabaseHealthStatus>, ApiError> {
    state.service.readiness().await.map(Json).map_err(|e| {
        warn!("readiness check failed: {}", e);
        ApiError::ServiceUnavailable("database is not reachable".to_string())
    })
}

#[derive(OpenApi)]
#[openapi(paths(live, ready))]
pub struct HealthApiDoc;

pub fn health_routes(root_path: &str) -> Router<AppState> {
    Router::new()
        .route(&format!("{root_path}/health/live"), get(live))
        .route(&format!("{root_path}/health/ready"), get(ready))
}
