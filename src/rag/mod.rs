//! Retrieval-augmented question answering
//!
//! The pipeline ties the other modules together: embed the question,
//! search both chunk collections, rerank, assemble a context window,
//! and generate an answer with the configured LLM. Answers whose best
//! supporting chunk falls below the similarity threshold are replaced
//! by suggested questions instead of a low-confidence guess.

pub mod context;
pub mod pipeline;
pub mod query;
pub mod rerank;
pub mod retriever;

pub use context::AssembledContext;
pub use context::ContextAssembler;
pub use pipeline::AskResponse;
pub use pipeline::MatchInfo;
pub use pipeline::RagService;
pub use pipeline::RetrievalMode;
pub use query::QueryAnalysis;
pub use query::QueryAnalyzer;
pub use query::QueryIntent;
pub use rerank::Reranker;
pub use retriever::Retriever;

use serde::Serialize;

use crate::store::ScoredChunk;

/// Which collection a search result came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchSource {
    BasicChunking,
    DelimiterChunking,
}

impl SearchSource {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::BasicChunking => "basic_chunking",
            Self::DelimiterChunking => "delimiter_chunking",
        }
    }
}

/// A scored chunk tagged with the collection it was retrieved from
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub chunk: crate::documents::Chunk,
    pub score: f32,
    pub search_source: SearchSource,
}

impl SearchResult {
    pub(crate) fn from_scored(scored: ScoredChunk, search_source: SearchSource) -> Self {
        Self {
            chunk: scored.chunk,
            score: scored.similarity,
            search_source,
        }
    }

    /// Key used for deduplication and rank merging
    ///
    /// Chunks from the two collections often share a prefix even when the
    /// split points differ, so the first 200 characters identify a chunk
    /// well enough without comparing full bodies.
    #[must_use]
    pub fn content_key(&self) -> String {
        self.chunk.content.chars().take(200).collect()
    }
}
