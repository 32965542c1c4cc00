//! Keyword-boost reranking of retrieved chunks

use std::collections::HashMap;

use crate::rag::query::QueryIntent;
use crate::rag::SearchResult;

/// Markers that signal step-by-step procedural content
const STEP_MARKERS: &[&str] = &["1.", "2.", "Step", "step", "①", "②"];

/// Reranks search results by combining the vector score with keyword
/// boosting: the vector score keeps 60% weight, the boosted score 40%.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reranker;

impl Reranker {
    /// Hybrid rerank: combine original and keyword-boosted rankings
    #[must_use]
    pub fn rerank(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        intent: QueryIntent,
    ) -> Vec<SearchResult> {
        let boosted = self.keyword_boost(query, results.clone(), intent);

        let mut combined: HashMap<String, f32> = HashMap::new();
        for r in &results {
            combined.insert(r.content_key(), r.score * 0.6);
        }
        for r in &boosted {
            *combined.entry(r.content_key()).or_insert(0.0) += r.score * 0.4;
        }

        let mut reranked: Vec<SearchResult> = results
            .into_iter()
            .map(|mut r| {
                if let Some(&score) = combined.get(&r.content_key()) {
                    r.score = score;
                }
                r
            })
            .collect();

        reranked.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        reranked
    }

    /// Apply keyword boosts to each result's score, clamped to 1.0
    fn keyword_boost(
        &self,
        query: &str,
        results: Vec<SearchResult>,
        intent: QueryIntent,
    ) -> Vec<SearchResult> {
        let query_lower = query.to_lowercase();
        let query_words: Vec<&str> = query_lower
            .split_whitespace()
            .filter(|w| w.chars().count() > 2)
            .collect();

        results
            .into_iter()
            .map(|mut r| {
                let content_lower = r.chunk.content.to_lowercase();
                let mut boost = 1.0f32;

                // Exact query match is the strongest content signal
                if content_lower.contains(&query_lower) {
                    boost *= 1.5;
                }

                if query_words.iter().any(|w| content_lower.contains(w)) {
                    boost *= 1.2;
                }

                if let Some(title) = &r.chunk.title {
                    let title_lower = title.to_lowercase();
                    if title_lower.contains(&query_lower)
                        || query_words.iter().any(|w| title_lower.contains(w))
                    {
                        boost *= 2.0;
                    }
                }

                // Procedural questions prefer chunks laid out as steps
                if intent == QueryIntent::HowTo
                    && STEP_MARKERS.iter().any(|m| r.chunk.content.contains(m))
                {
                    boost *= 1.3;
                }

                r.score = (r.score * boost).min(1.0);
                r
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::documents::Chunk;
    use crate::rag::SearchSource;

    fn result(content: &str, title: Option<&str>, score: f32) -> SearchResult {
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
    fn test_exact_match_outranks_higher_vector_score() {
        let reranker = Reranker;
        let results = vec![
            result("unrelated billing text", None, 0.72),
            result("annual fee waiver conditions apply here", None, 0.70),
        ];

        let reranked = reranker.rerank("annual fee waiver", results, QueryIntent::General);
        assert!(reranked[0].chunk.content.contains("annual fee waiver"));
    }

    #[test]
    fn test_title_match_boost() {
        let reranker = Reranker;
        let results = vec![
            result("some body text", Some("refund policy"), 0.6),
            result("some body text two", None, 0.6),
        ];

        let reranked = reranker.rerank("refund policy", results, QueryIntent::General);
        assert_eq!(reranked[0].chunk.title.as_deref(), Some("refund policy"));
        assert!(reranked[0].score > reranked[1].score);
    }

    #[test]
    fn test_step_marker_boost_only_for_how_to() {
        let reranker = Reranker;
        let stepped = vec![result("1. open the app 2. tap settings", None, 0.5)];

        let how_to = reranker.rerank("zzz", stepped.clone(), QueryIntent::HowTo);
        let general = reranker.rerank("zzz", stepped, QueryIntent::General);
        assert!(how_to[0].score > general[0].score);
    }

    #[test]
    fn test_scores_stay_clamped() {
        let reranker = Reranker;
        let results = vec![result("refund policy details", Some("refund policy"), 0.95)];
        let reranked = reranker.rerank("refund policy details", results, QueryIntent::General);
        assert!(reranked[0].score <= 1.0);
    }
}
