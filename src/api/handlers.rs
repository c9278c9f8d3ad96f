//! API request handlers

use std::sync::Arc;

use axum::Json;

use crate::api::types::ApiResponse;
use crate::api::types::HealthResponse;
use crate::rag::ChatPipeline;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

/// Health check handler
pub async fn health() -> Json<ApiResponse<HealthResponse>> {
    Json(ApiResponse::success(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    }))
}
