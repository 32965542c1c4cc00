//! API request and response types

use serde::Deserialize;
use serde::Serialize;

use crate::rag::RetrievalMode;

/// Standard API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: Option<T>,
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Question request
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub question: String,
    #[serde(default)]
    pub mode: RetrievalMode,
    /// Optional model override for this question
    #[serde(default)]
    pub model: Option<String>,
    /// Skip the answer cache for this question
    #[serde(default)]
    pub no_cache: bool,
}

/// Inline document ingestion request
#[derive(Debug, Deserialize)]
pub struct IngestTextRequest {
    pub text: String,
    pub source: String,
}

/// File ingestion request (path local to the server)
#[derive(Debug, Deserialize)]
pub struct IngestFileRequest {
    pub path: String,
}

/// Ingestion result
#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub source: String,
    pub basic_chunks: i64,
    pub delimiter_chunks: i64,
    pub total_chunks: i64,
}

/// Combined statistics response
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    pub queries: crate::stats::StatsSnapshot,
    pub cache: CacheStatsResponse,
    pub chunks: crate::store::ChunkCounts,
}

#[derive(Debug, Serialize)]
pub struct CacheStatsResponse {
    pub entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub hit_rate: f64,
}
