//! Diagnostics endpoint.

use axum::extract::State;
use axum::response::{IntoResponse, Json};
use serde::Serialize;

use super::super::AppState;

#[derive(Serialize)]
struct StatusResponse {
    service: &'static str,
    version: &'static str,
    uptime_secs: u64,
    origin: String,
    renderer_configured: bool,
    cache: CacheStatus,
}

#[derive(Serialize)]
struct CacheStatus {
    entries: usize,
    ttl_secs: u64,
}

/// `GET /_dynrender/status`
pub async fn service_status(State(state): State<AppState>) -> impl IntoResponse {
    Json(StatusResponse {
        service: "dynrender",
        version: env!("CARGO_PKG_VERSION"),
        uptime_secs: state.started_at.elapsed().as_secs(),
        origin: state.settings.origin.url.clone(),
        renderer_configured: state.settings.renderer.base_url.is_some(),
        cache: CacheStatus {
            entries: state.cache.len(),
            ttl_secs: state.cache.ttl_secs(),
        },
    })
}
