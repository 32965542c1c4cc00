pub mod api;
pub mod cache;
pub mod config;
pub mod documents;
pub mod embeddings;
pub mod errors;
pub mod llm;
pub mod logging;
pub mod rag;
pub mod stats;
pub mod store;

pub use config::AppConfig;
pub use errors::*;
