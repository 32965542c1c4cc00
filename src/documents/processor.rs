//! End-to-end document processing: validate, load, split, stamp metadata

use std::path::Path;

use tracing::info;

use crate::config::ChunkingConfig;
use crate::documents::Chunk;
use crate::documents::ChunkingStrategy;
use crate::documents::DelimiterChunker;
use crate::documents::Document;
use crate::documents::DocumentLoader;
use crate::documents::RecursiveChunker;
use crate::errors::Result;

/// Processor turning files or raw text into indexed-ready chunks
pub struct DocumentProcessor {
    loader: DocumentLoader,
    recursive: RecursiveChunker,
    delimiter: DelimiterChunker,
}

impl DocumentProcessor {
    #[must_use]
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            loader: DocumentLoader::new(config.max_file_size),
            recursive: RecursiveChunker::new(config.chunk_size, config.chunk_overlap),
            delimiter: DelimiterChunker::new(config.delimiter.clone()),
        }
    }

    /// Process a file into chunks using the given strategy
    pub fn process_file(&self, path: &Path, strategy: ChunkingStrategy) -> Result<Vec<Chunk>> {
        let document = self.loader.load(path)?;
        let chunks = self.split(&document, strategy);
        info!(
            "Processed {} into {} chunks ({:?} strategy)",
            document.source,
            chunks.len(),
            strategy
        );
        Ok(chunks)
    }

    /// Process raw text into chunks using the given strategy
    pub fn process_text(
        &self,
        text: &str,
        source: &str,
        strategy: ChunkingStrategy,
    ) -> Result<Vec<Chunk>> {
        if text.trim().is_empty() {
            return Err(crate::errors::DocRagError::Document(
                "Cannot process empty text".to_string(),
            ));
        }

        let document = Document::new(text, source);
        Ok(self.split(&document, strategy))
    }

    fn split(&self, document: &Document, strategy: ChunkingStrategy) -> Vec<Chunk> {
        match strategy {
            ChunkingStrategy::Basic => self.recursive.split(document),
            ChunkingStrategy::Delimiter => self.delimiter.split(document),
        }
    }
}

impl Default for DocumentProcessor {
    fn default() -> Self {
        Self::new(&ChunkingConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_process_text_basic() {
        let processor = DocumentProcessor::default();
        let chunks = processor
            .process_text("short document", "inline", ChunkingStrategy::Basic)
            .unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].source, "inline");
    }

    #[test]
    fn test_process_text_delimiter() {
        let processor = DocumentProcessor::default();
        let chunks = processor
            .process_text("part a/$$/part b", "inline", ChunkingStrategy::Delimiter)
            .unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].content, "part b");
    }

    #[test]
    fn test_process_empty_text_rejected() {
        let processor = DocumentProcessor::default();
        assert!(processor
            .process_text("  ", "inline", ChunkingStrategy::Basic)
            .is_err());
    }

    #[test]
    fn test_process_file_stamps_metadata() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manual.md");
        std::fs::write(&path, "intro/$$/details/$$/appendix").unwrap();

        let processor = DocumentProcessor::default();
        let chunks = processor
            .process_file(&path, ChunkingStrategy::Delimiter)
            .unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].source, "manual.md");
        assert_eq!(chunks[0].title.as_deref(), Some("manual"));
        assert_eq!(chunks[2].chunk_index, 2);
    }
}
