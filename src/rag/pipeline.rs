//! End-to-end question answering pipeline

use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::cache::QueryCache;
use crate::config::AppConfig;
use crate::documents::ChunkingStrategy;
use crate::documents::DocumentProcessor;
use crate::embeddings::EmbeddingService;
use crate::errors::DocRagError;
use crate::errors::Result;
use crate::llm::build_fallback_answer;
use crate::llm::build_qa_prompt;
use crate::llm::LlmService;
use crate::rag::ContextAssembler;
use crate::rag::QueryAnalyzer;
use crate::rag::QueryIntent;
use crate::rag::Reranker;
use crate::rag::Retriever;
use crate::rag::SearchResult;
use crate::stats::SearchStats;
use crate::store::ChunkCounts;
use crate::store::VectorStore;

/// Which collection(s) a question is answered from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrievalMode {
    Basic,
    Delimiter,
    #[default]
    Dual,
}

impl RetrievalMode {
    #[must_use]
    pub fn parse(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "basic" => Self::Basic,
            "delimiter" | "custom" => Self::Delimiter,
            _ => Self::Dual,
        }
    }
}

/// One supporting chunk in an answer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchInfo {
    pub rank: usize,
    pub score: f32,
    pub score_percent: String,
    pub preview: String,
    pub source: String,
    pub title: Option<String>,
    pub search_source: String,
}

/// Characters of chunk content included in a match preview
const PREVIEW_LENGTH: usize = 2000;

impl MatchInfo {
    fn from_result(rank: usize, result: &SearchResult) -> Self {
        let mut preview: String = result.chunk.content.chars().take(PREVIEW_LENGTH).collect();
        if result.chunk.content.chars().count() > PREVIEW_LENGTH {
            preview.push_str("...");
        }
        Self {
            rank,
            score: result.score,
            score_percent: format!("{:.1}%", result.score * 100.0),
            preview,
            source: result.chunk.source.clone(),
            title: result.chunk.title.clone(),
            search_source: result.search_source.as_str().to_string(),
        }
    }
}

/// Pipeline latency breakdown in milliseconds
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct Timings {
    pub retrieval_ms: u64,
    pub generation_ms: u64,
    pub total_ms: u64,
}

/// A complete answer with its supporting evidence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub matches: Vec<MatchInfo>,
    /// Suggested questions, populated when confidence is low
    pub suggestions: Vec<String>,
    pub low_confidence: bool,
    pub top_similarity: f32,
    pub model_used: String,
    pub from_cache: bool,
    pub timings: Timings,
}

/// The question answering service
#[derive(Clone)]
pub struct RagService {
    store: VectorStore,
    embeddings: Arc<EmbeddingService>,
    llm: Arc<LlmService>,
    processor: Arc<DocumentProcessor>,
    retriever: Retriever,
    analyzer: QueryAnalyzer,
    reranker: Reranker,
    assembler: ContextAssembler,
    cache: QueryCache<AskResponse>,
    stats: SearchStats,
    retrieval_limit: usize,
    similarity_threshold: f32,
    cache_enabled: bool,
}

impl RagService {
    pub fn new(config: &AppConfig, store: VectorStore) -> Result<Self> {
        let embeddings = Arc::new(EmbeddingService::new(config)?);
        let llm = Arc::new(LlmService::new(config)?);
        let processor = Arc::new(DocumentProcessor::new(&config.chunking));
        let retriever = Retriever::new(store.clone(), embeddings.clone());
        let assembler = ContextAssembler::new(
            config.retrieval.max_context_length,
            config.chunking.min_chunk_size,
        );
        let cache = QueryCache::new(config.cache_ttl(), config.cache.max_entries);

        Ok(Self {
            store,
            embeddings,
            llm,
            processor,
            retriever,
            analyzer: QueryAnalyzer,
            reranker: Reranker,
            assembler,
            cache,
            stats: SearchStats::new(),
            retrieval_limit: config.retrieval.retrieval_limit,
            similarity_threshold: config.similarity_threshold(),
            cache_enabled: config.cache.enabled,
        })
    }

    #[must_use]
    pub const fn store(&self) -> &VectorStore {
        &self.store
    }

    #[must_use]
    pub const fn stats(&self) -> &SearchStats {
        &self.stats
    }

    #[must_use]
    pub const fn cache(&self) -> &QueryCache<AskResponse> {
        &self.cache
    }

    /// Start the cache cleanup background task
    pub fn start_background_tasks(&self) {
        if self.cache_enabled {
            self.cache.start_cleanup_task();
        }
    }

    /// Index a document file into both collections
    pub async fn index_file(&self, path: &Path) -> Result<ChunkCounts> {
        let mut basic = 0i64;
        let mut delimiter = 0i64;

        for strategy in [ChunkingStrategy::Basic, ChunkingStrategy::Delimiter] {
            let chunks = self.processor.process_file(path, strategy)?;
            let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embeddings.generate_batch(&texts).await?;
            let inserted = self.store.add_chunks(&chunks, embeddings, strategy).await?;
            match strategy {
                ChunkingStrategy::Basic => basic = inserted as i64,
                ChunkingStrategy::Delimiter => delimiter = inserted as i64,
            }
        }

        info!(
            "Indexed {}: {} basic chunks, {} delimiter chunks",
            path.display(),
            basic,
            delimiter
        );
        Ok(ChunkCounts {
            basic,
            delimiter,
            total: basic + delimiter,
        })
    }

    /// Index raw text into both collections
    pub async fn index_text(&self, text: &str, source: &str) -> Result<ChunkCounts> {
        let mut basic = 0i64;
        let mut delimiter = 0i64;

        for strategy in [ChunkingStrategy::Basic, ChunkingStrategy::Delimiter] {
            let chunks = self.processor.process_text(text, source, strategy)?;
            let texts: Vec<String> = chunks.iter().map(|c| c.content.clone()).collect();
            let embeddings = self.embeddings.generate_batch(&texts).await?;
            let inserted = self.store.add_chunks(&chunks, embeddings, strategy).await?;
            match strategy {
                ChunkingStrategy::Basic => basic = inserted as i64,
                ChunkingStrategy::Delimiter => delimiter = inserted as i64,
            }
        }

        Ok(ChunkCounts {
            basic,
            delimiter,
            total: basic + delimiter,
        })
    }

    /// Answer a question from the indexed documents
    pub async fn ask(
        &self,
        question: &str,
        mode: RetrievalMode,
        model_override: Option<&str>,
    ) -> Result<AskResponse> {
        self.ask_with_cache(question, mode, model_override, true).await
    }

    /// Answer a question, optionally bypassing the answer cache
    pub async fn ask_with_cache(
        &self,
        question: &str,
        mode: RetrievalMode,
        model_override: Option<&str>,
        use_cache: bool,
    ) -> Result<AskResponse> {
        let question = question.trim();
        if question.is_empty() {
            return Err(DocRagError::Document("Question must not be empty".to_string()));
        }

        let started = Instant::now();
        let model = model_override.unwrap_or(self.llm.model()).to_string();
        let cache_key = QueryCache::<AskResponse>::cache_key(question, &model);

        if self.cache_enabled && use_cache {
            if let Some(mut cached) = self.cache.get(&cache_key).await {
                cached.from_cache = true;
                cached.timings.total_ms = elapsed_ms(started);
                self.stats
                    .record_query(question, cached.timings.total_ms, true, cached.low_confidence)
                    .await;
                return Ok(cached);
            }
        }

        let counts = self.store.count_chunks().await?;
        if counts.total == 0 {
            return Err(DocRagError::EmptyIndex);
        }

        let analysis = self.analyzer.analyze(question);
        debug!(
            "Query intent: {}, keywords: {:?}",
            analysis.intent.as_str(),
            analysis.keywords
        );

        let retrieval_started = Instant::now();
        let results = match mode {
            RetrievalMode::Basic => {
                self.retriever
                    .search(question, ChunkingStrategy::Basic, self.retrieval_limit)
                    .await?
            }
            RetrievalMode::Delimiter => {
                self.retriever
                    .search(question, ChunkingStrategy::Delimiter, self.retrieval_limit)
                    .await?
            }
            RetrievalMode::Dual => {
                self.retriever
                    .dual_search(question, self.retrieval_limit)
                    .await?
            }
        };
        let retrieval_ms = elapsed_ms(retrieval_started);

        if results.is_empty() {
            let response = AskResponse {
                answer: build_fallback_answer(&[]),
                matches: Vec::new(),
                suggestions: Vec::new(),
                low_confidence: true,
                top_similarity: 0.0,
                model_used: model,
                from_cache: false,
                timings: Timings {
                    retrieval_ms,
                    generation_ms: 0,
                    total_ms: elapsed_ms(started),
                },
            };
            self.stats
                .record_query(question, response.timings.total_ms, false, true)
                .await;
            return Ok(response);
        }

        let reranked = self.reranker.rerank(question, results, analysis.intent);
        let top_similarity = reranked.first().map_or(0.0, |r| r.score);

        let matches: Vec<MatchInfo> = reranked
            .iter()
            .take(5)
            .enumerate()
            .map(|(i, r)| MatchInfo::from_result(i + 1, r))
            .collect();

        let response = if top_similarity < self.similarity_threshold {
            // Not confident enough to answer: offer what we found instead
            let suggestions = suggest_questions(&reranked);
            info!(
                "Low confidence ({:.1}%), returning {} suggestions",
                top_similarity * 100.0,
                suggestions.len()
            );
            AskResponse {
                answer: build_fallback_answer(&suggestions),
                matches,
                suggestions,
                low_confidence: true,
                top_similarity,
                model_used: model,
                from_cache: false,
                timings: Timings {
                    retrieval_ms,
                    generation_ms: 0,
                    total_ms: elapsed_ms(started),
                },
            }
        } else {
            let context = self.assembler.assemble(&reranked);
            let prompt = build_qa_prompt(question, &context.text);

            let generation_started = Instant::now();
            let answer = self
                .llm
                .generate_with_params(&prompt, 0.0, 2000, model_override)
                .await?;
            let generation_ms = elapsed_ms(generation_started);

            AskResponse {
                answer,
                matches,
                suggestions: Vec::new(),
                low_confidence: false,
                top_similarity,
                model_used: model,
                from_cache: false,
                timings: Timings {
                    retrieval_ms,
                    generation_ms,
                    total_ms: elapsed_ms(started),
                },
            }
        };

        if self.cache_enabled {
            self.cache.set(cache_key, response.clone()).await;
        }
        self.stats
            .record_query(question, response.timings.total_ms, false, response.low_confidence)
            .await;

        Ok(response)
    }
}

fn elapsed_ms(since: Instant) -> u64 {
    u64::try_from(since.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Build suggested questions from the top retrieved chunks
///
/// Each suggestion is phrased from the chunk's topic words, with the
/// template picked by what the chunk talks about.
fn suggest_questions(results: &[SearchResult]) -> Vec<String> {
    let analyzer = QueryAnalyzer;
    let mut suggestions = Vec::new();

    for result in results.iter().take(3) {
        let head: String = result.chunk.content.chars().take(500).collect();
        let topic = match &result.chunk.title {
            Some(title) => title.clone(),
            None => {
                let keywords = analyzer.extract_keywords(&head);
                if keywords.is_empty() {
                    continue;
                }
                keywords[..keywords.len().min(3)].join(" ")
            }
        };

        let lower = head.to_lowercase();
        let suggestion = match topic_intent(&lower) {
            QueryIntent::HowTo => format!("How does {topic} work?"),
            QueryIntent::Definition => format!("What is {topic}?"),
            QueryIntent::Reason => format!("Why does {topic} happen?"),
            QueryIntent::General => format!("Tell me more about {topic}"),
        };

        if !suggestions.contains(&suggestion) {
            suggestions.push(suggestion);
        }
    }

    suggestions
}

fn topic_intent(content_lower: &str) -> QueryIntent {
    if ["step", "procedure", "apply", "register"]
        .iter()
        .any(|m| content_lower.contains(m))
    {
        QueryIntent::HowTo
    } else if ["fee", "cost", "charge", "rate"]
        .iter()
        .any(|m| content_lower.contains(m))
    {
        QueryIntent::Definition
    } else {
        QueryIntent::General
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Chunk;
    use crate::rag::SearchSource;

    fn search_result(content: &str, title: Option<&str>, score: f32) -> SearchResult {
        SearchResult {
            chunk: Chunk {
                content: content.to_string(),
                source: "doc.txt".to_string(),
                title: title.map(String::from),
                chunk_index: 0,
            },
            score,
            search_source: SearchSource::BasicChunking,
        }
    }

    #[test]
    fn test_retrieval_mode_parse() {
        assert_eq!(RetrievalMode::parse("basic"), RetrievalMode::Basic);
        assert_eq!(RetrievalMode::parse("custom"), RetrievalMode::Delimiter);
        assert_eq!(RetrievalMode::parse("delimiter"), RetrievalMode::Delimiter);
        assert_eq!(RetrievalMode::parse("dual"), RetrievalMode::Dual);
        assert_eq!(RetrievalMode::parse("anything"), RetrievalMode::Dual);
    }

    #[test]
    fn test_match_info_preview_truncation() {
        let long = "x".repeat(PREVIEW_LENGTH + 100);
        let info = MatchInfo::from_result(1, &search_result(&long, None, 0.9));
        assert_eq!(info.preview.chars().count(), PREVIEW_LENGTH + 3);
        assert!(info.preview.ends_with("..."));
        assert_eq!(info.score_percent, "90.0%");
    }

    #[test]
    fn test_suggestions_use_titles() {
        let results = vec![
            search_result("card replacement step one", Some("card replacement"), 0.6),
            search_result("annual fee schedule for members", None, 0.5),
        ];
        let suggestions = suggest_questions(&results);
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions[0].contains("card replacement"));
    }

    #[test]
    fn test_suggestions_deduplicated() {
        let results = vec![
            search_result("alpha", Some("limits"), 0.6),
            search_result("beta", Some("limits"), 0.5),
        ];
        let suggestions = suggest_questions(&results);
        assert_eq!(suggestions.len(), 1);
    }
}
