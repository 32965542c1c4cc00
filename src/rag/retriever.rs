//! Chunk retrieval across the two collections

use std::collections::HashSet;
use std::sync::Arc;

use tracing::debug;
use tracing::warn;

use crate::documents::ChunkingStrategy;
use crate::embeddings::EmbeddingService;
use crate::errors::Result;
use crate::rag::SearchResult;
use crate::rag::SearchSource;
use crate::store::VectorStore;

/// Retrieves scored chunks for a query embedding
#[derive(Clone)]
pub struct Retriever {
    store: VectorStore,
    embeddings: Arc<EmbeddingService>,
}

impl Retriever {
    #[must_use]
    pub fn new(store: VectorStore, embeddings: Arc<EmbeddingService>) -> Self {
        Self { store, embeddings }
    }

    /// Search a single collection
    pub async fn search(
        &self,
        query: &str,
        strategy: ChunkingStrategy,
        k: usize,
    ) -> Result<Vec<SearchResult>> {
        let embedding = self.embeddings.generate(query).await?;
        let scored = self.store.search(embedding, strategy, k).await?;
        let source = match strategy {
            ChunkingStrategy::Basic => SearchSource::BasicChunking,
            ChunkingStrategy::Delimiter => SearchSource::DelimiterChunking,
        };
        Ok(scored
            .into_iter()
            .map(|s| SearchResult::from_scored(s, source))
            .collect())
    }

    /// Search both collections and merge
    ///
    /// Each collection contributes up to `k/2 + 1` candidates. Merged
    /// results are deduplicated on their content key, sorted by score,
    /// and truncated to `k`. If the delimiter collection search fails the
    /// basic results are returned alone rather than failing the query.
    pub async fn dual_search(&self, query: &str, k: usize) -> Result<Vec<SearchResult>> {
        let embedding = self.embeddings.generate(query).await?;
        let per_collection = k / 2 + 1;

        let basic = self
            .store
            .search(embedding.clone(), ChunkingStrategy::Basic, per_collection)
            .await?;

        let delimiter = match self
            .store
            .search(embedding, ChunkingStrategy::Delimiter, per_collection)
            .await
        {
            Ok(results) => results,
            Err(e) => {
                warn!("Delimiter collection search failed, using basic only: {e}");
                Vec::new()
            }
        };

        let basic = basic
            .into_iter()
            .map(|s| SearchResult::from_scored(s, SearchSource::BasicChunking))
            .collect();
        let delimiter = delimiter
            .into_iter()
            .map(|s| SearchResult::from_scored(s, SearchSource::DelimiterChunking))
            .collect();

        let merged = merge_results(basic, delimiter, k);
        debug!("Dual search returned {} merged chunks", merged.len());
        Ok(merged)
    }
}

/// Merge two per-collection result sets: dedup on content key, sort by
/// score descending, keep the top `k`
fn merge_results(
    basic: Vec<SearchResult>,
    delimiter: Vec<SearchResult>,
    k: usize,
) -> Vec<SearchResult> {
    let mut merged: Vec<SearchResult> = basic.into_iter().chain(delimiter).collect();

    let mut seen = HashSet::new();
    merged.retain(|r| seen.insert(r.content_key()));

    merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    merged.truncate(k);
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Chunk;

    fn tagged(content: &str, score: f32, source: SearchSource) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                content: content.to_string(),
                source: "doc.txt".to_string(),
                title: None,
                chunk_index: 0,
            },
            score,
            search_source: source,
        }
    }

    #[test]
    fn test_merge_sorts_across_collections() {
        let basic = vec![
            tagged("alpha", 0.6, SearchSource::BasicChunking),
            tagged("beta", 0.9, SearchSource::BasicChunking),
        ];
        let delimiter = vec![tagged("gamma", 0.75, SearchSource::DelimiterChunking)];

        let merged = merge_results(basic, delimiter, 5);
        let contents: Vec<&str> = merged.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["beta", "gamma", "alpha"]);
    }

    #[test]
    fn test_merge_dedups_shared_content_across_collections() {
        // The same section indexed under both strategies shares its first
        // 200 chars; only the first occurrence survives.
        let basic = vec![tagged("shared section body", 0.8, SearchSource::BasicChunking)];
        let delimiter = vec![
            tagged("shared section body", 0.7, SearchSource::DelimiterChunking),
            tagged("unique delimiter section", 0.6, SearchSource::DelimiterChunking),
        ];

        let merged = merge_results(basic, delimiter, 5);
        assert_eq!(merged.len(), 2);
        assert_eq!(merged[0].search_source, SearchSource::BasicChunking);
        assert_eq!(merged[1].chunk.content, "unique delimiter section");
    }

    #[test]
    fn test_merge_truncates_to_k() {
        let basic = vec![
            tagged("a", 0.9, SearchSource::BasicChunking),
            tagged("b", 0.8, SearchSource::BasicChunking),
            tagged("c", 0.7, SearchSource::BasicChunking),
        ];
        let delimiter = vec![
            tagged("d", 0.85, SearchSource::DelimiterChunking),
            tagged("e", 0.65, SearchSource::DelimiterChunking),
        ];

        let merged = merge_results(basic, delimiter, 3);
        assert_eq!(merged.len(), 3);
        let contents: Vec<&str> = merged.iter().map(|r| r.chunk.content.as_str()).collect();
        assert_eq!(contents, vec!["a", "d", "b"]);
    }

    #[test]
    fn test_merge_with_empty_delimiter_set() {
        let basic = vec![
            tagged("only basic one", 0.7, SearchSource::BasicChunking),
            tagged("only basic two", 0.5, SearchSource::BasicChunking),
        ];

        let merged = merge_results(basic, Vec::new(), 5);
        assert_eq!(merged.len(), 2);
        assert!(merged
            .iter()
            .all(|r| r.search_source == SearchSource::BasicChunking));
    }
}
