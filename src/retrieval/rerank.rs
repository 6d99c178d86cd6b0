//! Second-stage candidate selection by pairwise relevance

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::providers::RelevanceScorer;
use crate::types::RetrievalRecord;

/// A candidate paired with its relevance score for one query
#[derive(Debug, Clone)]
pub struct RerankCandidate {
    /// The scored record
    pub record: RetrievalRecord,
    /// Relevance score, higher is more relevant
    pub score: f32,
}

/// Reranks retrieval candidates with an injected scorer
///
/// The scorer is constructed once at startup and shared; repeated calls
/// reuse it without reinitialization.
pub struct Reranker {
    scorer: Arc<dyn RelevanceScorer>,
}

impl Reranker {
    /// Create a reranker over a shared scorer
    pub fn new(scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self { scorer }
    }

    /// Score, sort, and truncate candidates to the top `top_n`
    ///
    /// The sort is stable and descending: ties keep the candidates'
    /// original order. Fewer candidates than `top_n` returns all of
    /// them, still sorted.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<RetrievalRecord>,
        top_n: usize,
    ) -> Result<Vec<RetrievalRecord>> {
        Ok(self
            .rerank_scored(query, candidates, top_n)
            .await?
            .into_iter()
            .map(|candidate| candidate.record)
            .collect())
    }

    /// `rerank`, keeping the scores attached
    pub async fn rerank_scored(
        &self,
        query: &str,
        candidates: Vec<RetrievalRecord>,
        top_n: usize,
    ) -> Result<Vec<RerankCandidate>> {
        if candidates.is_empty() {
            return Ok(Vec::new());
        }

        let passages: Vec<String> = candidates.iter().map(|r| r.text.clone()).collect();
        let scores = self.scorer.score_batch(query, &passages).await?;

        if scores.len() != candidates.len() {
            return Err(Error::scoring(format!(
                "scorer '{}' returned {} scores for {} candidates",
                self.scorer.name(),
                scores.len(),
                candidates.len()
            )));
        }

        let mut scored: Vec<RerankCandidate> = candidates
            .into_iter()
            .zip(scores)
            .map(|(record, score)| RerankCandidate { record, score })
            .collect();

        scored.sort_by(|a, b| b.score.total_cmp(&a.score));
        scored.truncate(top_n);

        tracing::debug!(
            "Reranked to {} candidates with '{}'",
            scored.len(),
            self.scorer.name()
        );

        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use uuid::Uuid;

    /// Scores each passage by a fixed table keyed on its text.
    struct TableScorer {
        table: HashMap<String, f32>,
    }

    #[async_trait]
    impl RelevanceScorer for TableScorer {
        async fn score(&self, _query: &str, passage: &str) -> Result<f32> {
            Ok(*self.table.get(passage).unwrap_or(&0.0))
        }

        fn name(&self) -> &str {
            "table"
        }
    }

    fn record(text: &str) -> RetrievalRecord {
        let mut metadata = HashMap::new();
        metadata.insert("content_length".to_string(), json!(text.len()));
        RetrievalRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            metadata,
        }
    }

    fn reranker(scores: &[(&str, f32)]) -> Reranker {
        Reranker::new(Arc::new(TableScorer {
            table: scores
                .iter()
                .map(|(text, score)| (text.to_string(), *score))
                .collect(),
        }))
    }

    #[tokio::test]
    async fn test_stable_sort_preserves_tie_order() {
        let reranker = reranker(&[("A", 0.5), ("B", 0.9), ("C", 0.5)]);
        let candidates = vec![record("A"), record("B"), record("C")];

        let result = reranker.rerank("q", candidates, 3).await.unwrap();
        let texts: Vec<&str> = result.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["B", "A", "C"]);
    }

    #[tokio::test]
    async fn test_top_n_beyond_candidate_count_returns_all_sorted() {
        let reranker = reranker(&[("low", 0.1), ("high", 0.8)]);
        let result = reranker
            .rerank("q", vec![record("low"), record("high")], 10)
            .await
            .unwrap();

        assert_eq!(result.len(), 2);
        assert_eq!(result[0].text, "high");
    }

    #[tokio::test]
    async fn test_truncates_to_top_n() {
        let reranker = reranker(&[("a", 0.3), ("b", 0.2), ("c", 0.9)]);
        let result = reranker
            .rerank("q", vec![record("a"), record("b"), record("c")], 1)
            .await
            .unwrap();

        assert_eq!(result.len(), 1);
        assert_eq!(result[0].text, "c");
    }

    #[tokio::test]
    async fn test_empty_candidates() {
        let reranker = reranker(&[]);
        let result = reranker.rerank("q", Vec::new(), 5).await.unwrap();
        assert!(result.is_empty());
    }

    #[tokio::test]
    async fn test_scores_attached_in_rank_order() {
        let reranker = reranker(&[("a", 0.3), ("b", 0.7)]);
        let scored = reranker
            .rerank_scored("q", vec![record("a"), record("b")], 2)
            .await
            .unwrap();

        assert_eq!(scored[0].record.text, "b");
        assert!((scored[0].score - 0.7).abs() < f32::EPSILON);
        assert!(scored[0].score >= scored[1].score);
    }
}
