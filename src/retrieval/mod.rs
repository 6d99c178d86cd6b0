//! Two-stage retrieval: vector candidates, then reranked selection

mod rerank;

pub use rerank::{RerankCandidate, Reranker};
