//! HTTP server implementation

use std::sync::Arc;

use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::Any;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::routes;
use crate::config::AppConfig;
use crate::rag::RagService;
use crate::store::VectorStore;
use crate::Result;

/// Start the API server
pub async fn serve_api(
    config: &AppConfig,
    host: String,
    port: u16,
    enable_cors: bool,
) -> Result<()> {
    info!("Starting API server...");

    // Initialize services
    let store = VectorStore::from_config(config).await?;
    store.init_schema().await?;
    let rag = Arc::new(RagService::new(config, store)?);
    rag.start_background_tasks();

    let state = AppState { rag };

    let mut app = Router::new().nest("/api", routes::api_routes(state));

    // Add middleware layers
    app = app
        .layer(TraceLayer::new_for_http())
        .layer(CompressionLayer::new());

    // Add CORS if enabled
    if enable_cors {
        info!("CORS enabled");
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);
        app = app.layer(cors);
    }

    // Start server
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!("API server listening on http://{}", addr);
    info!("Available endpoints:");
    info!("  GET    /api/health          - Health check");
    info!("  POST   /api/ask             - Answer a question");
    info!("  POST   /api/documents/text  - Ingest inline text");
    info!("  POST   /api/documents/file  - Ingest a server-side file");
    info!("  DELETE /api/documents       - Clear the index");
    info!("  GET    /api/documents/count - Chunk counts");
    info!("  GET    /api/stats           - Statistics");
    info!("  DELETE /api/cache           - Clear the answer cache");

    axum::serve(listener, app).await?;

    Ok(())
}
