//! Provider abstractions for embedding and relevance scoring
//!
//! The pipeline never runs a model in-process; both concerns are
//! trait-based seams backed by external services, constructed once at
//! startup and passed in explicitly.

pub mod embedding;
pub mod http_scorer;
pub mod ollama;
pub mod scorer;
pub mod term_overlap;

pub use embedding::EmbeddingProvider;
pub use http_scorer::HttpScorer;
pub use ollama::{OllamaClient, OllamaEmbedder};
pub use scorer::RelevanceScorer;
pub use term_overlap::TermOverlapScorer;
