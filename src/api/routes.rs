//! API route definitions

use axum::routing::delete;
use axum::routing::get;
use axum::routing::post;
use axum::Router;

use super::handlers::AppState;
use super::handlers::{
    self,
};

/// Create RESTful API router
pub fn api_routes(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health))
        // Question answering
        .route("/ask", post(handlers::ask))
        // Document management
        .route("/documents/text", post(handlers::ingest_text))
        .route("/documents/file", post(handlers::ingest_file))
        .route("/documents", delete(handlers::clear_documents))
        .route("/documents/count", get(handlers::count_documents))
        // Statistics and cache
        .route("/stats", get(handlers::get_stats))
        .route("/cache", delete(handlers::clear_cache))
        .with_state(state)
}
