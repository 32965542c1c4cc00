//! In-memory answer cache with TTL
//!
//! Identical questions hit the LLM once per TTL window. Keys are derived
//! from the normalized question text plus the model name, so switching
//! models never serves an answer generated by a different one.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use std::time::Instant;

use sha2::Digest;
use sha2::Sha256;
use tokio::sync::RwLock;
use tracing::debug;
use tracing::info;

/// Cache entry with TTL support
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Cache hit/miss statistics
#[derive(Debug, Default, Clone, serde::Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub expired_cleanups: u64,
}

impl CacheStats {
    #[must_use]
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}

/// TTL cache for generated answers
pub struct QueryCache<T> {
    entries: Arc<RwLock<HashMap<String, CacheEntry<T>>>>,
    ttl: Duration,
    max_entries: usize,
    stats: Arc<RwLock<CacheStats>>,
}

impl<T: Clone + Send + Sync + 'static> QueryCache<T> {
    #[must_use]
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
            max_entries,
            stats: Arc::new(RwLock::new(CacheStats::default())),
        }
    }

    /// Cache key for a question and model pair
    ///
    /// The question is lowercased and whitespace-collapsed before hashing
    /// so trivial rephrasings share an entry.
    #[must_use]
    pub fn cache_key(question: &str, model: &str) -> String {
        let normalized = question
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        let mut hasher = Sha256::new();
        hasher.update(normalized.as_bytes());
        hasher.update(b"|");
        hasher.update(model.as_bytes());
        hex::encode(hasher.finalize())
    }

    /// Look up a cached answer
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut cache = self.entries.write().await;

        if let Some(entry) = cache.get(key) {
            if entry.is_expired() {
                cache.remove(key);
                self.increment_miss().await;
                debug!("Cache miss (expired) for key {}", &key[..8.min(key.len())]);
                return None;
            }

            self.increment_hit().await;
            debug!("Cache hit for key {}", &key[..8.min(key.len())]);
            return Some(entry.data.clone());
        }

        self.increment_miss().await;
        None
    }

    /// Store an answer
    pub async fn set(&self, key: String, value: T) {
        let mut cache = self.entries.write().await;

        if cache.len() >= self.max_entries {
            self.evict_oldest_entries(&mut cache).await;
        }

        cache.insert(key, CacheEntry::new(value, self.ttl));
    }

    /// Drop all cached answers
    pub async fn clear(&self) {
        let mut cache = self.entries.write().await;
        let count = cache.len();
        cache.clear();
        info!("Cleared {} cached answers", count);
    }

    /// Number of live entries
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Snapshot of hit/miss statistics
    pub async fn stats(&self) -> CacheStats {
        self.stats.read().await.clone()
    }

    /// Remove expired entries
    pub async fn cleanup_expired(&self) {
        let mut cache = self.entries.write().await;
        let mut removed = 0u64;

        cache.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });

        if removed > 0 {
            let mut stats = self.stats.write().await;
            stats.expired_cleanups += removed;
            debug!("Cleaned up {} expired cache entries", removed);
        }
    }

    /// Start background cleanup task
    pub fn start_cleanup_task(&self) {
        let cache = self.clone();

        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(300)); // Cleanup every 5 minutes

            loop {
                interval.tick().await;
                cache.cleanup_expired().await;
            }
        });
    }

    async fn increment_hit(&self) {
        let mut stats = self.stats.write().await;
        stats.hits += 1;
    }

    async fn increment_miss(&self) {
        let mut stats = self.stats.write().await;
        stats.misses += 1;
    }

    async fn evict_oldest_entries(&self, cache: &mut HashMap<String, CacheEntry<T>>) {
        // Remove the 10% of entries closest to expiry; with a uniform TTL
        // those are the oldest inserts
        let evict_count = (cache.len() / 10).max(1);
        let mut by_expiry: Vec<(String, Instant)> = cache
            .iter()
            .map(|(key, entry)| (key.clone(), entry.expires_at))
            .collect();
        by_expiry.sort_by_key(|(_, expires_at)| *expires_at);

        for (key, _) in by_expiry.into_iter().take(evict_count) {
            cache.remove(&key);
        }

        let mut stats = self.stats.write().await;
        stats.evictions += evict_count as u64;

        debug!("Evicted {} cache entries", evict_count);
    }
}

impl<T> Clone for QueryCache<T> {
    fn clone(&self) -> Self {
        Self {
            entries: self.entries.clone(),
            ttl: self.ttl,
            max_entries: self.max_entries,
            stats: self.stats.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_key_normalization() {
        let a = QueryCache::<String>::cache_key("  What IS   the fee? ", "llama3.2");
        let b = QueryCache::<String>::cache_key("what is the fee?", "llama3.2");
        assert_eq!(a, b);
    }

    #[test]
    fn test_cache_key_varies_by_model() {
        let a = QueryCache::<String>::cache_key("what is the fee?", "llama3.2");
        let b = QueryCache::<String>::cache_key("what is the fee?", "gpt-4");
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn test_get_set_and_stats() {
        let cache = QueryCache::new(Duration::from_secs(60), 100);
        let key = QueryCache::<String>::cache_key("q", "m");

        assert!(cache.get(&key).await.is_none());
        cache.set(key.clone(), "answer".to_string()).await;
        assert_eq!(cache.get(&key).await.as_deref(), Some("answer"));

        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert!((stats.hit_rate() - 0.5).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_expired_entry_is_miss() {
        let cache = QueryCache::new(Duration::from_millis(10), 100);
        cache.set("k".to_string(), 1u32).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert!(cache.get("k").await.is_none());
        assert_eq!(cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_eviction_when_full() {
        let cache = QueryCache::new(Duration::from_secs(60), 10);
        for i in 0..10 {
            cache.set(format!("k{i}"), i).await;
        }
        cache.set("overflow".to_string(), 99).await;

        assert!(cache.len().await <= 10);
        assert!(cache.stats().await.evictions >= 1);
    }

    #[tokio::test]
    async fn test_eviction_removes_oldest_entry_first() {
        let cache = QueryCache::new(Duration::from_secs(60), 10);
        cache.set("first".to_string(), 0).await;
        // Make the remaining inserts measurably later than the first
        tokio::time::sleep(Duration::from_millis(10)).await;
        for i in 1..10 {
            cache.set(format!("k{i}"), i).await;
        }

        cache.set("overflow".to_string(), 99).await;

        assert!(cache.get("first").await.is_none());
        assert!(cache.get("overflow").await.is_some());
        assert!(cache.get("k5").await.is_some());
    }
}
