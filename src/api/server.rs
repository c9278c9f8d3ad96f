//! HTTP server implementation

use std::sync::Arc;

use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::ChatPipeline;
use crate::Result;

/// Start the chat server
pub async fn serve(config: &AppConfig, host: String, port: u16, enable_cors: bool) -> Result<()> {
    info!("🚀 Starting ragline server...");

    // Initialize the pipeline collaborators
    let pipeline = Arc::new(ChatPipeline::from_config(config)?);
    let state = AppState { pipeline };

    let mut app = routes::app_routes(state, config.static_dir());

    // Add middleware layers
    app = app
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if enable_cors {
        info!("✅ CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("🌐 Server listening on http://{}", addr);
    info!("");
    info!("Available endpoints:");
    info!("  GET  /ws          - WebSocket chat (sendPrompt / responseChunk / error)");
    info!("  GET  /api/health  - Health check");
    info!("  GET  /            - Static client UI");

    axum::serve(listener, app).await?;

    Ok(())
}
