//! Configuration for the RAG pipeline

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Main pipeline configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RagConfig {
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// Embedding service configuration
    #[serde(default)]
    pub embeddings: EmbeddingConfig,
    /// Rerank configuration
    #[serde(default)]
    pub rerank: RerankConfig,
    /// Index persistence configuration
    #[serde(default)]
    pub index: IndexConfig,
}

impl RagConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        toml::from_str(&content).map_err(|e| Error::Config(e.to_string()))
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Maximum tokens per chunk
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Chunks below this token count are merged with an adjacent peer
    #[serde(default = "default_min_chunk_tokens")]
    pub min_chunk_tokens: usize,
    /// Merge undersized adjacent chunks within the same block
    #[serde(default = "default_merge_peers")]
    pub merge_peers: bool,
}

fn default_max_tokens() -> usize {
    256
}
fn default_min_chunk_tokens() -> usize {
    32
}
fn default_merge_peers() -> bool {
    true
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_tokens: 256,
            min_chunk_tokens: 32,
            merge_peers: true,
        }
    }
}

/// Embedding service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Base URL of the embedding server
    #[serde(default = "default_embedding_url")]
    pub base_url: String,
    /// Embedding model name
    #[serde(default = "default_embedding_model")]
    pub model: String,
    /// Embedding dimensions (768 for nomic-embed-text, 384 for MiniLM)
    #[serde(default = "default_dimensions")]
    pub dimensions: usize,
    /// Request timeout in seconds
    #[serde(default = "default_embedding_timeout")]
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_embedding_url() -> String {
    "http://localhost:11434".to_string()
}
fn default_embedding_model() -> String {
    "nomic-embed-text".to_string()
}
fn default_dimensions() -> usize {
    768
}
fn default_embedding_timeout() -> u64 {
    120
}
fn default_max_retries() -> u32 {
    2
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            base_url: default_embedding_url(),
            model: default_embedding_model(),
            dimensions: default_dimensions(),
            timeout_secs: default_embedding_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Reranking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankConfig {
    /// Base URL of the rerank server
    #[serde(default = "default_rerank_url")]
    pub base_url: String,
    /// Cross-encoder model name
    #[serde(default = "default_rerank_model")]
    pub model: String,
    /// Candidate count fetched from the index before reranking
    #[serde(default = "default_candidates")]
    pub candidates: usize,
    /// Final context size after reranking
    #[serde(default = "default_top_n")]
    pub top_n: usize,
    /// Request timeout in seconds
    #[serde(default = "default_rerank_timeout")]
    pub timeout_secs: u64,
    /// Number of retries for failed requests
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

fn default_rerank_url() -> String {
    "http://localhost:8080".to_string()
}
fn default_rerank_model() -> String {
    "cross-encoder/ms-marco-MiniLM-L-6-v2".to_string()
}
fn default_candidates() -> usize {
    15
}
fn default_top_n() -> usize {
    5
}
fn default_rerank_timeout() -> u64 {
    30
}

impl Default for RerankConfig {
    fn default() -> Self {
        Self {
            base_url: default_rerank_url(),
            model: default_rerank_model(),
            candidates: default_candidates(),
            top_n: default_top_n(),
            timeout_secs: default_rerank_timeout(),
            max_retries: default_max_retries(),
        }
    }
}

/// Index persistence configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Directory the index is persisted under
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
}

fn default_storage_path() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("local-rag")
        .join("index")
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            storage_path: default_storage_path(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RagConfig::default();
        assert_eq!(config.chunking.max_tokens, 256);
        assert!(config.chunking.merge_peers);
        assert_eq!(config.rerank.top_n, 5);
        assert!(config.rerank.candidates >= config.rerank.top_n);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let parsed: RagConfig = toml::from_str(
            r#"
            [chunking]
            max_tokens = 128

            [embeddings]
            model = "all-minilm"
            dimensions = 384
            "#,
        )
        .unwrap();

        assert_eq!(parsed.chunking.max_tokens, 128);
        assert!(parsed.chunking.merge_peers);
        assert_eq!(parsed.embeddings.model, "all-minilm");
        assert_eq!(parsed.embeddings.dimensions, 384);
        assert_eq!(parsed.embeddings.base_url, "http://localhost:11434");
        assert_eq!(parsed.rerank.top_n, 5);
    }
}
