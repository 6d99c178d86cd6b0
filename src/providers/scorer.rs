//! Relevance scorer trait for query/passage reranking

use async_trait::async_trait;

use crate::error::Result;

/// Trait for pairwise query/passage relevance scoring
///
/// Higher scores mean more relevant. Implementations:
/// - `HttpScorer`: remote cross-encoder rerank endpoint
/// - `TermOverlapScorer`: offline lexical fallback
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score one passage against the query
    async fn score(&self, query: &str, passage: &str) -> Result<f32>;

    /// Score a batch of passages against the query, in input order
    ///
    /// Default implementation calls `score` sequentially.
    async fn score_batch(&self, query: &str, passages: &[String]) -> Result<Vec<f32>> {
        let mut scores = Vec::with_capacity(passages.len());
        for passage in passages {
            scores.push(self.score(query, passage).await?);
        }
        Ok(scores)
    }

    /// Get scorer name for logging
    fn name(&self) -> &str;
}
