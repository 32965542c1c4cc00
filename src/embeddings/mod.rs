//! Embeddings generation module
//!
//! This module provides functionality for generating text embeddings using
//! various providers:
//! - OpenAI (text-embedding-3-small, etc.)
//! - Ollama (local models such as bge-m3)
//!
//! # Examples
//!
//! ```rust,no_run
//! use docrag::embeddings::EmbeddingService;
//! use docrag::config::AppConfig;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = AppConfig::load()?;
//!     let service = EmbeddingService::new(&config)?;
//!
//!     let embedding = service.generate("Hello, world!").await?;
//!     println!("Generated embedding with {} dimensions", embedding.len());
//!
//!     Ok(())
//! }
//! ```

pub mod client;

pub use client::EmbeddingClient;
pub use client::EmbeddingProvider;

use std::sync::Arc;

use tracing::info;

use crate::errors::Result;

/// Maximum batch size for embedding generation
pub const MAX_BATCH_SIZE: usize = 100;

/// Configuration for embedding generation
#[derive(Debug, Clone)]
pub struct EmbeddingConfig {
    pub provider: EmbeddingProvider,
    pub model: String,
    pub dimension: usize,
    pub endpoint: String,
    pub api_key: Option<String>,
}

impl EmbeddingConfig {
    pub fn from_app_config(config: &crate::config::AppConfig) -> Self {
        let provider = EmbeddingProvider::parse(&config.embeddings.provider);
        Self {
            provider,
            model: config.embeddings.model.clone(),
            dimension: config.embeddings.dimension,
            endpoint: config.embeddings.endpoint.clone(),
            api_key: config.embeddings.api_key.clone(),
        }
    }
}

/// Service for generating embeddings with batching
pub struct EmbeddingService {
    client: Arc<EmbeddingClient>,
    config: EmbeddingConfig,
}

impl EmbeddingService {
    /// Create a new embedding service from application configuration
    pub fn new(config: &crate::config::AppConfig) -> Result<Self> {
        Self::from_config(EmbeddingConfig::from_app_config(config))
    }

    /// Create from custom config
    pub fn from_config(config: EmbeddingConfig) -> Result<Self> {
        let client = EmbeddingClient::new(
            config.provider,
            config.model.clone(),
            config.endpoint.clone(),
            config.api_key.clone(),
        )?;

        Ok(Self {
            client: Arc::new(client),
            config,
        })
    }

    /// Generate an embedding for a single text
    pub async fn generate(&self, text: &str) -> Result<Vec<f32>> {
        self.client.generate(text).await
    }

    /// Generate embeddings for a batch of texts
    ///
    /// Texts are processed in `MAX_BATCH_SIZE` groups to stay under
    /// provider request limits.
    pub async fn generate_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut embeddings = Vec::with_capacity(texts.len());

        for group in texts.chunks(MAX_BATCH_SIZE) {
            let refs: Vec<&str> = group.iter().map(String::as_str).collect();
            let batch = self.client.generate_batch(refs).await?;
            embeddings.extend(batch);
        }

        info!("Generated {} embeddings", embeddings.len());
        Ok(embeddings)
    }

    /// Expected embedding dimension
    #[must_use]
    pub fn dimension(&self) -> usize {
        self.config.dimension
    }

    /// Model name in use
    #[must_use]
    pub fn model(&self) -> &str {
        &self.config.model
    }
}
