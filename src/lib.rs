//! local-rag: document-to-retrievable-chunk pipeline with reranked retrieval
//!
//! Ingests PDF, DOCX, PPTX, and Markdown files, chunks them under a token
//! budget, normalizes every chunk into a uniform metadata-rich retrieval
//! record, embeds and persists the records in a similarity index, and
//! selects query context in two stages: vector similarity, then
//! cross-encoder-style reranking. Embedding and scoring are injected
//! provider traits backed by external services; answer generation and any
//! CLI/HTTP surface belong to the caller.

pub mod config;
pub mod error;
pub mod index;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod types;

pub use config::RagConfig;
pub use error::{Error, Result};
pub use index::{IndexManager, IndexState, VectorIndex};
pub use ingestion::{normalize, DocumentPipeline, FileParser, IngestReport, TokenChunker};
pub use providers::{EmbeddingProvider, RelevanceScorer};
pub use retrieval::{RerankCandidate, Reranker};
pub use types::{RawChunk, RetrievalRecord};
