//! Operational routes: health and effective configuration.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use super::server::SharedState;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub active_channels: usize,
    pub total_connections: usize,
    pub uptime_secs: i64,
}

/// `GET /api/health`.
pub async fn health(State(state): State<SharedState>) -> Json<ApiResponse<HealthResponse>> {
    let active_channels = state.broadcast.get_active_channels().await.len();
    let total_connections = state.broadcast.total_connections().await;
    let uptime_secs = (chrono::Utc::now() - state.started_at).num_seconds();

    Json(ApiResponse::ok(HealthResponse {
        status: "ok",
        active_channels,
        total_connections,
        uptime_secs,
    }))
}

/// `GET /api/config` — the effective configuration. Nothing in `HubConfig`
/// is secret, so it's returned as-is for operational visibility.
pub async fn get_config(State(state): State<SharedState>) -> Json<ApiResponse<crate::config::HubConfig>> {
    Json(ApiResponse::ok(state.config.clone()))
}
