use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: DateTime<Utc>,
    pub has_api_key: bool,
    pub upstream: String,
}

/// Deployment health check. Reports whether a key is configured, never the key itself.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: Utc::now(),
        has_api_key: state.config.has_api_key(),
        upstream: state.config.upstream_base_url.to_string(),
    })
}
