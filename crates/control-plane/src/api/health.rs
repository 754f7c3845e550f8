// Health endpoint

use axum::{extract::State, routing::get, Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use utoipa::ToSchema;

/// State for health endpoint
#[derive(Clone)]
pub struct HealthState {
    /// Storage backend kind ("postgres" or "memory")
    pub storage: &'static str,
    pub started_at: Instant,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    #[schema(example = "ok")]
    pub status: String,
    pub version: String,
    #[schema(example = "postgres")]
    pub storage: String,
    pub uptime_seconds: u64,
    pub timestamp: DateTime<Utc>,
}

pub fn routes(state: HealthState) -> Router {
    Router::new()
        .route("/api/health", get(health))
        .with_state(state)
}

/// GET /api/health - Liveness check
#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Service is up", body = HealthResponse)
    ),
    tag = "health"
)]
pub async fn health(State(state): State<HealthState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        storage: state.storage.to_string(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        timestamp: Utc::now(),
    })
}
