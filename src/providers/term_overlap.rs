//! Lexical fallback scorer

use async_trait::async_trait;
use unicode_segmentation::UnicodeSegmentation;

use crate::error::Result;

use super::scorer::RelevanceScorer;

/// Scores a passage by the fraction of query words it contains
///
/// Deterministic and offline; used when no cross-encoder service is
/// configured, and by tests.
#[derive(Debug, Default, Clone, Copy)]
pub struct TermOverlapScorer;

impl TermOverlapScorer {
    /// Create a new lexical scorer
    pub fn new() -> Self {
        Self
    }

    fn overlap(query: &str, passage: &str) -> f32 {
        let passage_lower = passage.to_lowercase();
        let query_lower = query.to_lowercase();
        let words: Vec<&str> = query_lower.unicode_words().collect();

        if words.is_empty() {
            return 0.0;
        }

        let hits = words
            .iter()
            .filter(|word| passage_lower.contains(*word))
            .count();

        hits as f32 / words.len() as f32
    }
}

#[async_trait]
impl RelevanceScorer for TermOverlapScorer {
    async fn score(&self, query: &str, passage: &str) -> Result<f32> {
        Ok(Self::overlap(query, passage))
    }

    fn name(&self) -> &str {
        "term-overlap"
    }
}
