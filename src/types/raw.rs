//! Raw parsed-document chunk as produced by a parser/chunker pair
//!
//! Every field below is optional. Different parsers fill in different
//! subsets, and normalization must cope with any of them missing, so the
//! type models the full provenance tree as a chain of `Option`s rather
//! than assuming a uniform shape.

use serde::{Deserialize, Serialize};

/// A chunk of parsed document content before normalization
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawChunk {
    /// Primary text field
    pub text: Option<String>,
    /// Generic content field some parsers emit instead of `text`
    pub content: Option<String>,
    /// Structured chunk metadata
    pub meta: Option<ChunkMeta>,
}

/// Structured metadata attached to a raw chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkMeta {
    /// Where the chunk's document came from
    pub origin: Option<ChunkOrigin>,
    /// Structural items the chunk was assembled from, in document order
    #[serde(default)]
    pub doc_items: Vec<DocItem>,
    /// Heading hierarchy active at the chunk's position
    pub headings: Option<Vec<String>>,
}

/// Document origin information
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChunkOrigin {
    /// Source filename
    pub filename: Option<String>,
    /// MIME type, when the parser knows it
    pub mimetype: Option<String>,
}

/// A structural item contributing to a chunk
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DocItem {
    /// Provenance entries for this item
    #[serde(default)]
    pub prov: Vec<Provenance>,
}

/// Provenance of a structural item within the source document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Provenance {
    /// Page number (1-indexed)
    pub page_no: Option<u32>,
}

impl RawChunk {
    /// Create a chunk carrying only text, with no metadata at all
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            content: None,
            meta: None,
        }
    }

    /// Create a chunk with full provenance
    pub fn with_provenance(
        text: impl Into<String>,
        filename: Option<String>,
        page_no: Option<u32>,
        headings: Option<Vec<String>>,
    ) -> Self {
        let origin = filename.map(|name| ChunkOrigin {
            filename: Some(name),
            mimetype: None,
        });

        let doc_items = match page_no {
            Some(_) => vec![DocItem {
                prov: vec![Provenance { page_no }],
            }],
            None => Vec::new(),
        };

        Self {
            text: Some(text.into()),
            content: None,
            meta: Some(ChunkMeta {
                origin,
                doc_items,
                headings,
            }),
        }
    }
}
