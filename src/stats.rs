//! In-process search statistics
//!
//! Tracks query volume, latency, and the most frequently asked
//! questions. Counters reset on restart.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::RwLock;

/// Snapshot of accumulated statistics
#[derive(Debug, Clone, Serialize)]
pub struct StatsSnapshot {
    pub total_queries: u64,
    pub cached_answers: u64,
    pub low_confidence_answers: u64,
    pub total_response_ms: u64,
    pub average_response_ms: f64,
    pub popular_questions: Vec<PopularQuestion>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PopularQuestion {
    pub question: String,
    pub count: u64,
}

#[derive(Debug, Default)]
struct StatsInner {
    total_queries: u64,
    cached_answers: u64,
    low_confidence_answers: u64,
    total_response_ms: u64,
    question_counts: HashMap<String, u64>,
}

/// Query statistics collector
#[derive(Debug, Clone, Default)]
pub struct SearchStats {
    inner: Arc<RwLock<StatsInner>>,
}

/// How many popular questions a snapshot carries
const TOP_QUESTIONS: usize = 10;

impl SearchStats {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one answered query
    pub async fn record_query(
        &self,
        question: &str,
        response_ms: u64,
        from_cache: bool,
        low_confidence: bool,
    ) {
        let mut inner = self.inner.write().await;
        inner.total_queries += 1;
        inner.total_response_ms += response_ms;
        if from_cache {
            inner.cached_answers += 1;
        }
        if low_confidence {
            inner.low_confidence_answers += 1;
        }

        let normalized = question.trim().to_lowercase();
        if !normalized.is_empty() {
            *inner.question_counts.entry(normalized).or_insert(0) += 1;
        }
    }

    /// Current counters plus the most asked questions
    pub async fn snapshot(&self) -> StatsSnapshot {
        let inner = self.inner.read().await;

        let mut questions: Vec<PopularQuestion> = inner
            .question_counts
            .iter()
            .map(|(question, &count)| PopularQuestion {
                question: question.clone(),
                count,
            })
            .collect();
        questions.sort_by(|a, b| b.count.cmp(&a.count).then(a.question.cmp(&b.question)));
        questions.truncate(TOP_QUESTIONS);

        let average_response_ms = if inner.total_queries == 0 {
            0.0
        } else {
            inner.total_response_ms as f64 / inner.total_queries as f64
        };

        StatsSnapshot {
            total_queries: inner.total_queries,
            cached_answers: inner.cached_answers,
            low_confidence_answers: inner.low_confidence_answers,
            total_response_ms: inner.total_response_ms,
            average_response_ms,
            popular_questions: questions,
        }
    }

    /// Reset all counters
    pub async fn reset(&self) {
        let mut inner = self.inner.write().await;
        *inner = StatsInner::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_record_and_snapshot() {
        let stats = SearchStats::new();
        stats.record_query("What is the fee?", 120, false, false).await;
        stats.record_query("what is the fee?", 40, true, false).await;
        stats.record_query("other question", 200, false, true).await;

        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.total_queries, 3);
        assert_eq!(snapshot.cached_answers, 1);
        assert_eq!(snapshot.low_confidence_answers, 1);
        assert!((snapshot.average_response_ms - 120.0).abs() < 1e-9);

        // Case-insensitive grouping makes "what is the fee?" the top question
        assert_eq!(snapshot.popular_questions[0].question, "what is the fee?");
        assert_eq!(snapshot.popular_questions[0].count, 2);
    }

    #[tokio::test]
    async fn test_reset() {
        let stats = SearchStats::new();
        stats.record_query("q", 10, false, false).await;
        stats.reset().await;
        let snapshot = stats.snapshot().await;
        assert_eq!(snapshot.total_queries, 0);
        assert!(snapshot.popular_questions.is_empty());
    }
}
