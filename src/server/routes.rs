//! Router configuration for the edge service.

use axum::{routing::get, Router};
use tower_http::cors::CorsLayer;

use super::handlers;
use super::AppState;

/// Create the main router.
///
/// The `/_dynrender` prefix is reserved for diagnostics and never proxied;
/// every other path falls through to the edge pipeline.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/_dynrender/status", get(handlers::service_status))
        .fallback(handlers::edge_request)
        .layer(CorsLayer::permissive())
        .with_state(state)
}
