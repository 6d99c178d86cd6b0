//! End-to-end pipeline tests: parse/chunk, normalize, index, query, rerank

use async_trait::async_trait;
use std::sync::Arc;

use local_rag::config::ChunkingConfig;
use local_rag::index::{IndexManager, VectorIndex};
use local_rag::ingestion::{DocBlock, DocumentPipeline, FileType, ParsedDocument, TokenChunker};
use local_rag::providers::TermOverlapScorer;
use local_rag::{normalize, EmbeddingProvider, Reranker, Result};

/// Embeds text as occurrence counts over a fixed vocabulary, so cosine
/// similarity reflects keyword overlap. Deterministic and offline.
struct KeywordEmbedder {
    vocabulary: Vec<&'static str>,
}

impl KeywordEmbedder {
    fn new() -> Self {
        Self {
            vocabulary: vec!["zebra", "lion", "river", "grass", "mountain"],
        }
    }
}

#[async_trait]
impl EmbeddingProvider for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
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

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    fn name(&self) -> &str {
        "keyword"
    }
}

/// A two-page document: lions and rivers on page 1, zebras on page 2.
fn two_page_document() -> ParsedDocument {
    let page_one = "Lions rest in the shade for most of the day.\n\
                    The river floods during the wet season.\n\
                    Cubs stay close to the pride.";
    let page_two = "Zebras graze on open grass plains.\n\
                    Each zebra carries a unique stripe pattern.";

    let blocks = vec![
        DocBlock {
            content: page_one.to_string(),
            page_number: Some(1),
            headings: Vec::new(),
            char_offset: 0,
        },
        DocBlock {
            content: page_two.to_string(),
            page_number: Some(2),
            headings: Vec::new(),
            char_offset: page_one.len(),
        },
    ];

    ParsedDocument {
        file_type: FileType::Pdf,
        source_filename: "savanna.pdf".to_string(),
        content: format!("{}\n{}", page_one, page_two),
        content_hash: String::new(),
        total_pages: Some(2),
        blocks,
        metadata: Default::default(),
    }
}

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

#[tokio::test]
async fn test_two_page_document_end_to_end() {
    init_logging();
    let parsed = two_page_document();

    // One chunk per paragraph: no peer merging.
    let chunker = TokenChunker::from_config(&ChunkingConfig {
        max_tokens: 256,
        min_chunk_tokens: 4,
        merge_peers: false,
    });

    let chunks = chunker.chunk_document(&parsed);
    assert_eq!(chunks.len(), 5);

    let records: Vec<_> = chunks.iter().map(normalize).collect();

    // Page metadata ascends across the document.
    let pages: Vec<u32> = records.iter().filter_map(|r| r.page_number()).collect();
    assert_eq!(pages.len(), 5);
    let mut sorted = pages.clone();
    sorted.sort();
    assert_eq!(pages, sorted);

    for record in &records {
        assert_eq!(record.source_filename(), Some("savanna.pdf"));
        assert_eq!(record.content_length(), record.text.len());
    }

    // Build, persist, reload, query: the answer lives on page 2.
    let embedder = KeywordEmbedder::new();
    let dir = tempfile::tempdir().unwrap();
    let manager = IndexManager::new(dir.path().join("index"));

    let index = manager
        .open_or_build(&embedder, || Ok(records))
        .await
        .unwrap();
    assert_eq!(index.len(), 5);

    let hits = index
        .query("Where do zebras graze?", 3, &embedder)
        .await
        .unwrap();
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].page_number(), Some(2));

    // Rerank the candidates; the grazing chunk outranks its peers.
    let reranker = Reranker::new(Arc::new(TermOverlapScorer::new()));
    let context = reranker
        .rerank("Where do zebras graze?", hits, 2)
        .await
        .unwrap();

    assert_eq!(context.len(), 2);
    assert!(context[0].text.contains("graze"));
    assert_eq!(context[0].page_number(), Some(2));
}

#[tokio::test]
async fn test_markdown_corpus_ingest_and_query() {
    init_logging();
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("animals.md"),
        "# Animals\n\nThe zebra population grew this year.\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("geology.md"),
        "# Geology\n\nThe mountain range formed millions of years ago.\n",
    )
    .unwrap();

    let report = DocumentPipeline::new().ingest(&[dir.path()]);
    assert!(report.is_complete());
    assert!(report.records.len() >= 2);

    let embedder = KeywordEmbedder::new();
    let index = VectorIndex::build(report.records, &embedder).await.unwrap();

    let hits = index.query("zebra", 1, &embedder).await.unwrap();
    assert_eq!(hits[0].source_filename(), Some("animals.md"));
    assert_eq!(hits[0].headings(), Some(vec!["Animals"]));
    assert_eq!(hits[0].page_number(), None);
}

#[tokio::test]
async fn test_degraded_query_on_empty_index() {
    let embedder = KeywordEmbedder::new();
    let index = VectorIndex::empty(embedder.dimensions());

    // A valid but empty result set, not an error.
    let hits = index.query("zebra", 3, &embedder).await.unwrap();
    assert!(hits.is_empty());
}
