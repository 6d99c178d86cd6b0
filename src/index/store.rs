//! Persistent similarity index over retrieval records

use serde::{Deserialize, Serialize};
use std::path::Path;
use uuid::Uuid;

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::RetrievalRecord;

/// File holding dimensions and embedding vectors
const VECTORS_FILE: &str = "vectors.json";
/// Side-table mapping index positions back to record payloads
const RECORDS_FILE: &str = "records.json";

/// A record paired with its embedding and backend position
///
/// Never mutated in place; an update is a remove plus an insert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    /// Position in the similarity backend
    pub position: usize,
    /// Embedding vector
    pub embedding: Vec<f32>,
    /// The indexed record
    pub record: RetrievalRecord,
}

/// Flat cosine-similarity index with JSON persistence
#[derive(Debug)]
pub struct VectorIndex {
    dimensions: usize,
    entries: Vec<IndexEntry>,
}

#[derive(Serialize, Deserialize)]
struct VectorsPayload {
    dimensions: usize,
    positions: Vec<usize>,
    embeddings: Vec<Vec<f32>>,
}

impl VectorIndex {
    /// Build an index by embedding every record
    ///
    /// Fails with [`Error::EmbeddingDimension`] if any embedding's length
    /// differs from the provider's declared dimensionality.
    pub async fn build(
        records: Vec<RetrievalRecord>,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Self> {
        let expected = provider.dimensions();
        let mut entries = Vec::with_capacity(records.len());

        tracing::info!(
            "Building index over {} records with '{}' embeddings",
            records.len(),
            provider.name()
        );

        for (position, record) in records.into_iter().enumerate() {
            let embedding = provider.embed(&record.text).await?;
            check_dimensions(expected, embedding.len())?;

            entries.push(IndexEntry {
                position,
                embedding,
                record,
            });
        }

        Ok(Self {
            dimensions: expected,
            entries,
        })
    }

    /// Create an empty index with the provider's dimensionality
    pub fn empty(dimensions: usize) -> Self {
        Self {
            dimensions,
            entries: Vec::new(),
        }
    }

    /// Persist the index under a directory
    pub fn save(&self, path: &Path) -> Result<()> {
        std::fs::create_dir_all(path)?;

        let vectors = VectorsPayload {
            dimensions: self.dimensions,
            positions: self.entries.iter().map(|e| e.position).collect(),
            embeddings: self.entries.iter().map(|e| e.embedding.clone()).collect(),
        };
        let records: Vec<&RetrievalRecord> = self.entries.iter().map(|e| &e.record).collect();

        std::fs::write(path.join(VECTORS_FILE), serde_json::to_vec(&vectors)?)?;
        std::fs::write(path.join(RECORDS_FILE), serde_json::to_vec(&records)?)?;

        tracing::info!("Persisted index ({} entries) to {}", self.len(), path.display());
        Ok(())
    }

    /// Load a previously persisted index
    pub fn load(path: &Path) -> Result<Self> {
        let vectors_path = path.join(VECTORS_FILE);
        let records_path = path.join(RECORDS_FILE);

        if !vectors_path.exists() || !records_path.exists() {
            return Err(Error::IndexNotFound(path.to_path_buf()));
        }

        let vectors: VectorsPayload = serde_json::from_slice(&std::fs::read(&vectors_path)?)
            .map_err(|e| Error::index_corrupt(path, e.to_string()))?;
        let records: Vec<RetrievalRecord> = serde_json::from_slice(&std::fs::read(&records_path)?)
            .map_err(|e| Error::index_corrupt(path, e.to_string()))?;

        if vectors.embeddings.len() != records.len() || vectors.positions.len() != records.len() {
            return Err(Error::index_corrupt(
                path,
                format!(
                    "vector count {} does not match record count {}",
                    vectors.embeddings.len(),
                    records.len()
                ),
            ));
        }

        if let Some(bad) = vectors
            .embeddings
            .iter()
            .find(|e| e.len() != vectors.dimensions)
        {
            return Err(Error::index_corrupt(
                path,
                format!(
                    "vector of width {} in an index of dimension {}",
                    bad.len(),
                    vectors.dimensions
                ),
            ));
        }

        let entries = vectors
            .positions
            .into_iter()
            .zip(vectors.embeddings)
            .zip(records)
            .map(|((position, embedding), record)| IndexEntry {
                position,
                embedding,
                record,
            })
            .collect();

        Ok(Self {
            dimensions: vectors.dimensions,
            entries,
        })
    }

    /// Embed the query text and return the k nearest records
    ///
    /// Nearest first, by cosine similarity. `k` is clamped to at least 1;
    /// an index with fewer entries returns all of them.
    pub async fn query(
        &self,
        query_text: &str,
        k: usize,
        provider: &dyn EmbeddingProvider,
    ) -> Result<Vec<RetrievalRecord>> {
        let embedding = provider.embed(query_text).await?;
        check_dimensions(self.dimensions, embedding.len())?;

        Ok(self
            .search_embedding(&embedding, k)
            .into_iter()
            .map(|(record, _)| record.clone())
            .collect())
    }

    /// Rank entries against a query embedding, nearest first, with scores
    pub fn search_embedding(&self, embedding: &[f32], k: usize) -> Vec<(&RetrievalRecord, f32)> {
        let k = k.max(1);

        let mut scored: Vec<(&RetrievalRecord, f32)> = self
            .entries
            .iter()
            .map(|entry| (&entry.record, cosine_similarity(embedding, &entry.embedding)))
            .collect();

        scored.sort_by(|a, b| b.1.total_cmp(&a.1));
        scored.truncate(k);
        scored
    }

    /// Embed and insert one record
    pub async fn insert(
        &mut self,
        record: RetrievalRecord,
        provider: &dyn EmbeddingProvider,
    ) -> Result<()> {
        let embedding = provider.embed(&record.text).await?;
        check_dimensions(self.dimensions, embedding.len())?;

        let position = self.entries.last().map_or(0, |e| e.position + 1);
        self.entries.push(IndexEntry {
            position,
            embedding,
            record,
        });
        Ok(())
    }

    /// Remove a record by id, returning whether it was present
    pub fn remove(&mut self, id: &Uuid) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.record.id != *id);
        self.entries.len() != before
    }

    /// Number of indexed records
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the index holds no records
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Embedding dimensionality
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }
}

fn check_dimensions(expected: usize, actual: usize) -> Result<()> {
    if expected != actual {
        return Err(Error::EmbeddingDimension { expected, actual });
    }
    Ok(())
}

/// Cosine similarity, 0.0 for zero-norm vectors
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;

    /// Embeds text as counts of a fixed keyword vocabulary. Deterministic
    /// and offline; cosine similarity then reflects keyword overlap.
    pub(crate) struct KeywordEmbedder {
        pub vocabulary: Vec<&'static str>,
    }

    impl KeywordEmbedder {
        pub fn new() -> Self {
            Self {
                vocabulary: vec!["zebra", "lion", "river", "mountain"],
            }
        }
    }

    #[async_trait]
    impl EmbeddingProvider for KeywordEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(self
                .vocabulary
                .iter()
                .map(|word| lower.matches(word).count() as f32)
                .collect())
        }

        fn dimensions(&self) -> usize {
            self.vocabulary.len()
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "keyword"
        }
    }

    /// Returns a wrong-width vector for any text containing "bad".
    struct FlakyEmbedder;

    #[async_trait]
    impl EmbeddingProvider for FlakyEmbedder {
        async fn embed(&self, text: &str) -> crate::error::Result<Vec<f32>> {
            if text.contains("bad") {
                Ok(vec![1.0, 2.0])
            } else {
                Ok(vec![1.0, 2.0, 3.0])
            }
        }

        fn dimensions(&self) -> usize {
            3
        }

        async fn health_check(&self) -> crate::error::Result<bool> {
            Ok(true)
        }

        fn name(&self) -> &str {
            "flaky"
        }
    }

    pub(crate) fn record(text: &str) -> RetrievalRecord {
        let mut metadata = HashMap::new();
        metadata.insert("content_length".to_string(), json!(text.len()));
        RetrievalRecord {
            id: Uuid::new_v4(),
            text: text.to_string(),
            metadata,
        }
    }

    #[tokio::test]
    async fn test_query_returns_nearest_first() {
        let embedder = KeywordEmbedder::new();
        let index = VectorIndex::build(
            vec![
                record("the lion slept near the river"),
                record("a zebra crossed the river"),
                record("mountain weather patterns"),
            ],
            &embedder,
        )
        .await
        .unwrap();

        let results = index.query("zebra", 2, &embedder).await.unwrap();
        assert_eq!(results.len(), 2);
        assert!(results[0].text.contains("zebra"));
    }

    #[tokio::test]
    async fn test_query_k_larger_than_index() {
        let embedder = KeywordEmbedder::new();
        let index = VectorIndex::build(vec![record("one zebra")], &embedder)
            .await
            .unwrap();

        let results = index.query("zebra", 3, &embedder).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_inconsistent_dimensions_fail_build() {
        let err = VectorIndex::build(vec![record("fine"), record("bad one")], &FlakyEmbedder)
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            Error::EmbeddingDimension {
                expected: 3,
                actual: 2
            }
        ));
    }

    #[tokio::test]
    async fn test_save_load_round_trip() {
        let embedder = KeywordEmbedder::new();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index");

        let index = VectorIndex::build(
            vec![record("zebra herd"), record("river delta")],
            &embedder,
        )
        .await
        .unwrap();
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 2);
        assert_eq!(loaded.dimensions(), embedder.dimensions());

        let results = loaded.query("zebra", 1, &embedder).await.unwrap();
        assert!(results[0].text.contains("zebra"));
    }

    #[test]
    fn test_load_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = VectorIndex::load(&dir.path().join("nothing")).unwrap_err();
        assert!(matches!(err, Error::IndexNotFound(_)));
    }

    #[test]
    fn test_load_corrupt_payload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index");
        std::fs::create_dir_all(&path).unwrap();
        std::fs::write(path.join(VECTORS_FILE), b"{ not json").unwrap();
        std::fs::write(path.join(RECORDS_FILE), b"[]").unwrap();

        let err = VectorIndex::load(&path).unwrap_err();
        assert!(matches!(err, Error::IndexCorrupt { .. }));
    }

    #[tokio::test]
    async fn test_remove_then_insert_models_update() {
        let embedder = KeywordEmbedder::new();
        let original = record("zebra v1");
        let id = original.id;

        let mut index = VectorIndex::build(vec![original], &embedder).await.unwrap();
        assert!(index.remove(&id));
        assert!(!index.remove(&id));

        index.insert(record("zebra v2"), &embedder).await.unwrap();
        assert_eq!(index.len(), 1);

        let results = index.query("zebra", 1, &embedder).await.unwrap();
        assert_eq!(results[0].text, "zebra v2");
    }
}
