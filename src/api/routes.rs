//! API route definitions

use axum::routing::get;
use axum::Router;
use tower_http::services::ServeDir;

use super::handlers;
use super::handlers::AppState;
use super::session;

/// Create the application router
pub fn app_routes(state: AppState, static_dir: &str) -> Router {
    Router::new()
        // WebSocket chat endpoint
        .route("/ws", get(session::ws_handler))
        // Health check
        .route("/api/health", get(handlers::health))
        // Static client UI
        .fallback_service(ServeDir::new(static_dir))
        .with_state(state)
}
