//! HTTP cross-encoder scoring client
//!
//! Speaks the rerank wire shape served by text-embeddings-inference and
//! Jina-compatible endpoints: POST a query plus a document batch, get
//! back one relevance score per document.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::RerankConfig;
use crate::error::{Error, Result};

use super::scorer::RelevanceScorer;

/// Remote cross-encoder scorer
pub struct HttpScorer {
    client: Client,
    base_url: String,
    model: String,
}

#[derive(Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
}

#[derive(Deserialize)]
struct RerankResult {
    index: usize,
    relevance_score: f32,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResult>,
}

impl HttpScorer {
    /// Create a scorer against the configured rerank endpoint
    pub fn new(config: &RerankConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| Error::Config(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
        })
    }
}

#[async_trait]
impl RelevanceScorer for HttpScorer {
    async fn score(&self, query: &str, passage: &str) -> Result<f32> {
        let scores = self.score_batch(query, &[passage.to_string()]).await?;
        scores
            .first()
            .copied()
            .ok_or_else(|| Error::scoring("empty response for single passage"))
    }

    async fn score_batch(&self, query: &str, passages: &[String]) -> Result<Vec<f32>> {
        if passages.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/rerank", self.base_url);
        let request = RerankRequest {
            model: &self.model,
            query,
            documents: passages,
        };

        let response = self
            .client
            .post(&url)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::scoring(format!("request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(Error::scoring(format!("HTTP {}", response.status())));
        }

        let parsed: RerankResponse = response
            .json()
            .await
            .map_err(|e| Error::scoring(format!("malformed response: {}", e)))?;

        // Endpoints return results sorted by score; restore input order.
        let mut scores = vec![0.0f32; passages.len()];
        let mut seen = 0usize;
        for result in parsed.results {
            if result.index >= passages.len() {
                return Err(Error::scoring(format!(
                    "result index {} out of range for {} documents",
                    result.index,
                    passages.len()
                )));
            }
            scores[result.index] = result.relevance_score;
            seen += 1;
        }

        if seen != passages.len() {
            return Err(Error::scoring(format!(
                "expected {} scores, got {}",
                passages.len(),
                seen
            )));
        }

        Ok(scores)
    }

    fn name(&self) -> &str {
        "http-rerank"
    }
}
