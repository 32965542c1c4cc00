//! Document management handlers

use axum::extract::State;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::IngestResponse;
use crate::api::types::IngestTextRequest;
use crate::store::ChunkCounts;

/// Ingest inline text as a document (POST /api/documents/text)
pub async fn ingest_text(
    State(state): State<AppState>,
    Json(request): Json<IngestTextRequest>,
) -> Json<ApiResponse<IngestResponse>> {
    info!("POST /api/documents: source={}", request.source);

    match state.rag.index_text(&request.text, &request.source).await {
        Ok(counts) => Json(ApiResponse::success(IngestResponse {
            source: request.source,
            basic_chunks: counts.basic,
            delimiter_chunks: counts.delimiter,
            total_chunks: counts.total,
        })),
        Err(e) => {
            error!("Failed to ingest document: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}

/// Ingest a file already on the server's filesystem (POST /api/documents/file)
pub async fn ingest_file(
    State(state): State<AppState>,
    Json(request): Json<crate::api::types::IngestFileRequest>,
) -> Json<ApiResponse<IngestResponse>> {
    info!("POST /api/documents/file: {}", request.path);

    let path = std::path::PathBuf::from(&request.path);
    match state.rag.index_file(&path).await {
        Ok(counts) => Json(ApiResponse::success(IngestResponse {
            source: request.path,
            basic_chunks: counts.basic,
            delimiter_chunks: counts.delimiter,
            total_chunks: counts.total,
        })),
        Err(e) => {
            error!("Failed to ingest file: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}

/// Chunk counts per collection (GET /api/documents/count)
pub async fn count_documents(State(state): State<AppState>) -> Json<ApiResponse<ChunkCounts>> {
    match state.rag.store().count_chunks().await {
        Ok(counts) => Json(ApiResponse::success(counts)),
        Err(e) => {
            error!("Failed to count chunks: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}

/// Delete all indexed chunks (DELETE /api/documents)
pub async fn clear_documents(State(state): State<AppState>) -> Json<ApiResponse<u64>> {
    info!("DELETE /api/documents");

    match state.rag.store().clear_all().await {
        Ok(deleted) => {
            state.rag.cache().clear().await;
            Json(ApiResponse::success(deleted))
        }
        Err(e) => {
            error!("Failed to clear chunks: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}
