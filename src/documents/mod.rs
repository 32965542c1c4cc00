//! Document loading, chunking and processing
//!
//! Documents enter the system as whole files or raw text, get split into
//! chunks by one of two strategies (character-budget recursive splitting or
//! delimiter splitting), and leave as [`Chunk`]s ready for embedding.

pub mod chunker;
pub mod loader;
pub mod processor;

pub use chunker::ChunkingStrategy;
pub use chunker::DelimiterChunker;
pub use chunker::RecursiveChunker;
pub use loader::DocumentLoader;
pub use processor::DocumentProcessor;

use serde::Deserialize;
use serde::Serialize;

/// A loaded document before chunking
#[derive(Debug, Clone)]
pub struct Document {
    pub content: String,
    pub source: String,
    pub title: Option<String>,
}

impl Document {
    pub fn new(content: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            source: source.into(),
            title: None,
        }
    }

    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// A chunk of document text ready for embedding and indexing
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub content: String,
    pub source: String,
    pub title: Option<String>,
    pub chunk_index: usize,
}
