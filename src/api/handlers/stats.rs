//! Statistics handler

use axum::extract::State;
use axum::Json;
use tracing::error;
use tracing::info;

use crate::api::handlers::AppState;
use crate::api::types::ApiResponse;
use crate::api::types::CacheStatsResponse;
use crate::api::types::StatsResponse;

/// Query, cache, and index statistics (GET /api/stats)
pub async fn get_stats(State(state): State<AppState>) -> Json<ApiResponse<StatsResponse>> {
    let chunks = match state.rag.store().count_chunks().await {
        Ok(counts) => counts,
        Err(e) => {
            error!("Failed to count chunks: {}", e);
            return Json(ApiResponse::error(e.to_string()));
        }
    };

    let queries = state.rag.stats().snapshot().await;
    let cache_stats = state.rag.cache().stats().await;
    let cache = CacheStatsResponse {
        entries: state.rag.cache().len().await,
        hits: cache_stats.hits,
        misses: cache_stats.misses,
        evictions: cache_stats.evictions,
        hit_rate: cache_stats.hit_rate(),
    };

    Json(ApiResponse::success(StatsResponse {
        queries,
        cache,
        chunks,
    }))
}

/// Drop all cached answers (DELETE /api/cache)
pub async fn clear_cache(State(state): State<AppState>) -> Json<ApiResponse<String>> {
    info!("DELETE /api/cache");
    state.rag.cache().clear().await;
    Json(ApiResponse::success("cache cleared".to_string()))
}
