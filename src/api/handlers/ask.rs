//! Question answering handler

use axum::extract::State;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::AskRequest;
use crate::rag::AskResponse;

/// Answer a question (POST /api/ask)
pub async fn ask(
    State(state): State<AppState>,
    Json(request): Json<AskRequest>,
) -> Json<ApiResponse<AskResponse>> {
    info!("POST /api/ask: {:?}", request.question);

    match state
        .rag
        .ask_with_cache(
            &request.question,
            request.mode,
            request.model.as_deref(),
            !request.no_cache,
        )
        .await
    {
        Ok(response) => Json(ApiResponse::success(response)),
        Err(e) => {
            error!("Failed to answer question: {}", e);
            Json(ApiResponse::error(e.to_string()))
        }
    }
}
