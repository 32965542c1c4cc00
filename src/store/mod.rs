//! Postgres/pgvector chunk store
//!
//! Chunks from both chunking strategies live in one table, separated by a
//! `collection` column ("basic" and "delimiter"). Searches run per
//! collection; the retriever merges across them.

mod similarity;

pub use similarity::distance_to_similarity;

use pgvector::Vector;
use sqlx::PgPool;
use tracing::debug;
use tracing::info;

use crate::documents::Chunk;
use crate::documents::ChunkingStrategy;
use crate::errors::Result;

/// A chunk returned from the store with its similarity score
#[derive(Debug, Clone)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub similarity: f32,
}

/// Per-collection and total chunk counts
#[derive(Debug, Clone, Copy, serde::Serialize)]
pub struct ChunkCounts {
    pub basic: i64,
    pub delimiter: i64,
    pub total: i64,
}

/// Vector store over Postgres + pgvector
#[derive(Debug, Clone)]
pub struct VectorStore {
    pool: PgPool,
    dimension: usize,
}

impl VectorStore {
    #[must_use]
    pub const fn new(pool: PgPool, dimension: usize) -> Self {
        Self { pool, dimension }
    }

    /// Create a new store instance from configuration
    pub async fn from_config(config: &crate::config::AppConfig) -> Result<Self> {
        let pool_options = sqlx::postgres::PgPoolOptions::new()
            .max_connections(config.max_connections())
            .min_connections(config.min_connections())
            .acquire_timeout(std::time::Duration::from_secs(
                config.database.connection_timeout,
            ));

        let pool = pool_options.connect(config.database_url()).await?;

        tracing::info!(
            "Database pool configured: max_connections={}, min_connections={}",
            config.max_connections(),
            config.min_connections()
        );

        Ok(Self::new(pool, config.embedding_dimension()))
    }

    /// Get a reference to the database pool for raw queries
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Initialize the schema: extension, chunk table, indexes
    pub async fn init_schema(&self) -> Result<()> {
        sqlx::query("CREATE EXTENSION IF NOT EXISTS vector")
            .execute(&self.pool)
            .await?;

        sqlx::query(&format!(
            r"
            CREATE TABLE IF NOT EXISTS document_chunks (
                id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
                collection VARCHAR(32) NOT NULL,
                source VARCHAR(255) NOT NULL,
                title VARCHAR(255),
                chunk_index INTEGER NOT NULL,
                content TEXT NOT NULL,
                embedding VECTOR({}),
                created_at TIMESTAMP WITH TIME ZONE DEFAULT NOW()
            )
            ",
            self.dimension
        ))
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_chunks_collection ON document_chunks(collection)",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_chunks_source ON document_chunks(source)")
            .execute(&self.pool)
            .await?;

        info!("Chunk store schema initialized (dimension {})", self.dimension);
        Ok(())
    }

    /// Insert chunks with their embeddings into a collection
    ///
    /// `chunks` and `embeddings` must be the same length.
    pub async fn add_chunks(
        &self,
        chunks: &[Chunk],
        embeddings: Vec<Vec<f32>>,
        strategy: ChunkingStrategy,
    ) -> Result<usize> {
        if chunks.len() != embeddings.len() {
            return Err(crate::DocRagError::Embedding(format!(
                "Chunk/embedding count mismatch: {} vs {}",
                chunks.len(),
                embeddings.len()
            )));
        }

        let collection = strategy.collection();
        let mut inserted = 0;

        for (chunk, embedding) in chunks.iter().zip(embeddings) {
            sqlx::query(
                r"
                INSERT INTO document_chunks (collection, source, title, chunk_index, content, embedding)
                VALUES ($1, $2, $3, $4, $5, $6)
                ",
            )
            .bind(collection)
            .bind(&chunk.source)
            .bind(&chunk.title)
            .bind(chunk.chunk_index as i32)
            .bind(&chunk.content)
            .bind(Vector::from(embedding))
            .execute(&self.pool)
            .await?;
            inserted += 1;
        }

        info!("Indexed {} chunks into collection {}", inserted, collection);
        Ok(inserted)
    }

    /// Similarity search within one collection
    ///
    /// Returns chunks ordered by ascending cosine distance, with distances
    /// converted to the banded similarity scale.
    pub async fn search(
        &self,
        query_embedding: Vec<f32>,
        strategy: ChunkingStrategy,
        limit: usize,
    ) -> Result<Vec<ScoredChunk>> {
        #[derive(sqlx::FromRow)]
        struct RawResult {
            source: String,
            title: Option<String>,
            chunk_index: i32,
            content: String,
            distance: f64,
        }

        let raw_results = sqlx::query_as::<_, RawResult>(
            r"
            SELECT
                source,
                title,
                chunk_index,
                content,
                (embedding <=> $1::vector) as distance
            FROM document_chunks
            WHERE collection = $2 AND embedding IS NOT NULL
            ORDER BY embedding <=> $1::vector
            LIMIT $3
            ",
        )
        .bind(Vector::from(query_embedding))
        .bind(strategy.collection())
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        debug!(
            "Collection {} returned {} chunks",
            strategy.collection(),
            raw_results.len()
        );

        let results = raw_results
            .into_iter()
            .map(|r| ScoredChunk {
                chunk: Chunk {
                    content: r.content,
                    source: r.source,
                    title: r.title,
                    chunk_index: r.chunk_index as usize,
                },
                similarity: distance_to_similarity(r.distance as f32),
            })
            .collect();

        Ok(results)
    }

    /// Count chunks per collection
    pub async fn count_chunks(&self) -> Result<ChunkCounts> {
        let basic = self.count_collection(ChunkingStrategy::Basic).await?;
        let delimiter = self.count_collection(ChunkingStrategy::Delimiter).await?;
        Ok(ChunkCounts {
            basic,
            delimiter,
            total: basic + delimiter,
        })
    }

    async fn count_collection(&self, strategy: ChunkingStrategy) -> Result<i64> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM document_chunks WHERE collection = $1")
                .bind(strategy.collection())
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete all chunks from one collection
    pub async fn clear_collection(&self, strategy: ChunkingStrategy) -> Result<u64> {
        let result = sqlx::query("DELETE FROM document_chunks WHERE collection = $1")
            .bind(strategy.collection())
            .execute(&self.pool)
            .await?;
        info!(
            "Cleared {} chunks from collection {}",
            result.rows_affected(),
            strategy.collection()
        );
        Ok(result.rows_affected())
    }

    /// Delete all chunks
    pub async fn clear_all(&self) -> Result<u64> {
        let result = sqlx::query("DELETE FROM document_chunks")
            .execute(&self.pool)
            .await?;
        info!("Cleared {} chunks from the store", result.rows_affected());
        Ok(result.rows_affected())
    }
}
