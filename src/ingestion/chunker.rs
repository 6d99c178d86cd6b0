//! Token-budget chunking with provenance tracking

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;
use crate::types::{ChunkMeta, ChunkOrigin, DocItem, Provenance, RawChunk};

use super::parser::{DocBlock, ParsedDocument};

/// Chunker packing document elements under a per-chunk token budget
///
/// Each paragraph-level element becomes a chunk; elements over budget are
/// split at sentence bounds. With `merge_peers`, undersized adjacent
/// elements within a block are merged while the result stays under
/// budget, which keeps short paragraphs and headings from becoming
/// fragments. Word count stands in for model tokens.
pub struct TokenChunker {
    /// Maximum tokens per chunk
    max_tokens: usize,
    /// Chunks below this size are merge candidates
    min_tokens: usize,
    /// Merge undersized adjacent chunks
    merge_peers: bool,
}

impl TokenChunker {
    /// Create a chunker with the given budget and peer merging enabled
    pub fn new(max_tokens: usize) -> Self {
        Self {
            max_tokens: max_tokens.max(1),
            min_tokens: 32,
            merge_peers: true,
        }
    }

    /// Create a chunker from configuration
    pub fn from_config(config: &ChunkingConfig) -> Self {
        Self {
            max_tokens: config.max_tokens.max(1),
            min_tokens: config.min_chunk_tokens,
            merge_peers: config.merge_peers,
        }
    }

    /// Chunk a parsed document into raw chunks, in document order
    pub fn chunk_document(&self, parsed: &ParsedDocument) -> Vec<RawChunk> {
        let mut chunks = Vec::new();

        for block in &parsed.blocks {
            let mut pieces = self.split_block(block);
            if self.merge_peers {
                pieces = self.merge_small_peers(pieces);
            }

            for text in pieces {
                chunks.push(make_chunk(&parsed.source_filename, block, text));
            }
        }

        chunks
    }

    /// Split one block into paragraph elements, sentence-splitting any
    /// element over budget
    fn split_block(&self, block: &DocBlock) -> Vec<String> {
        let mut pieces = Vec::new();

        for element in block.content.lines() {
            let element = element.trim();
            if element.is_empty() {
                continue;
            }

            if token_count(element) <= self.max_tokens {
                pieces.push(element.to_string());
            } else {
                pieces.extend(self.split_oversized(element));
            }
        }

        pieces
    }

    /// Pack an oversized element's sentences up to the budget
    fn split_oversized(&self, element: &str) -> Vec<String> {
        let mut pieces = Vec::new();
        let mut current = String::new();
        let mut current_tokens = 0usize;

        for sentence in element.split_sentence_bounds() {
            let sentence_tokens = token_count(sentence);

            if current_tokens > 0 && current_tokens + sentence_tokens > self.max_tokens {
                pieces.push(current.trim().to_string());
                current = String::new();
                current_tokens = 0;
            }

            // A single sentence over budget still becomes one chunk; the
            // budget bounds packing, it does not split sentences.
            current.push_str(sentence);
            current_tokens += sentence_tokens;
        }

        if !current.trim().is_empty() {
            pieces.push(current.trim().to_string());
        }

        pieces
    }

    /// Merge undersized elements into their preceding peer while the
    /// result stays under budget
    fn merge_small_peers(&self, pieces: Vec<String>) -> Vec<String> {
        let mut merged: Vec<String> = Vec::new();

        for piece in pieces {
            let piece_tokens = token_count(&piece);

            if let Some(prev) = merged.last_mut() {
                let prev_tokens = token_count(prev);
                let undersized = piece_tokens < self.min_tokens || prev_tokens < self.min_tokens;

                if undersized && prev_tokens + piece_tokens <= self.max_tokens {
                    prev.push('\n');
                    prev.push_str(&piece);
                    continue;
                }
            }

            merged.push(piece);
        }

        merged
    }
}

/// Approximate token count of a text span
fn token_count(text: &str) -> usize {
    text.unicode_words().count()
}

/// Build a raw chunk carrying the block's provenance
fn make_chunk(filename: &str, block: &DocBlock, text: String) -> RawChunk {
    let doc_items = match block.page_number {
        Some(page_no) => vec![DocItem {
            prov: vec![Provenance {
                page_no: Some(page_no),
            }],
        }],
        None => Vec::new(),
    };

    let headings = if block.headings.is_empty() {
        None
    } else {
        Some(block.headings.clone())
    };

    RawChunk {
        text: Some(text),
        content: None,
        meta: Some(ChunkMeta {
            origin: Some(ChunkOrigin {
                filename: Some(filename.to_string()),
                mimetype: None,
            }),
            doc_items,
            headings,
        }),
    }
}
