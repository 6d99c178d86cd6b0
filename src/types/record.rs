//! The canonical retrieval unit stored in and returned by the index

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

/// Sentinel stored in place of a metadata field the source chunk did not provide
pub const NOT_AVAILABLE: &str = "not available";

/// Placeholder text for chunks with missing or blank content
pub const EMPTY_TEXT_PLACEHOLDER: &str = "empty chunk";

/// Metadata key for the source filename
pub const META_SOURCE_FILENAME: &str = "source_filename";
/// Metadata key for the 1-indexed page number
pub const META_PAGE_NUMBER: &str = "page_number";
/// Metadata key for the heading hierarchy
pub const META_HEADINGS: &str = "headings";
/// Metadata key for the resolved text length
pub const META_CONTENT_LENGTH: &str = "content_length";

/// A normalized, immutable retrieval unit
///
/// Created exactly once per source chunk during ingestion. The id is
/// freshly generated rather than content-derived, so duplicate chunks
/// across re-ingestion runs never collide.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalRecord {
    /// Unique record ID
    pub id: Uuid,
    /// Chunk content, or [`EMPTY_TEXT_PLACEHOLDER`]
    pub text: String,
    /// Structured metadata; recognized keys hold either a real value or
    /// the [`NOT_AVAILABLE`] sentinel
    pub metadata: HashMap<String, serde_json::Value>,
}

impl RetrievalRecord {
    /// Source filename, if the chunk carried one
    pub fn source_filename(&self) -> Option<&str> {
        self.metadata
            .get(META_SOURCE_FILENAME)
            .and_then(|v| v.as_str())
            .filter(|s| *s != NOT_AVAILABLE)
    }

    /// Page number, if the chunk carried provenance
    pub fn page_number(&self) -> Option<u32> {
        self.metadata
            .get(META_PAGE_NUMBER)
            .and_then(|v| v.as_u64())
            .map(|p| p as u32)
    }

    /// Heading hierarchy, if the chunk carried one
    pub fn headings(&self) -> Option<Vec<&str>> {
        self.metadata
            .get(META_HEADINGS)
            .and_then(|v| v.as_array())
            .map(|items| items.iter().filter_map(|h| h.as_str()).collect())
    }

    /// Length of the resolved text (0 for placeholder text)
    pub fn content_length(&self) -> usize {
        self.metadata
            .get(META_CONTENT_LENGTH)
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize
    }

    /// Whether the text is the placeholder rather than real content
    pub fn is_placeholder(&self) -> bool {
        self.text == EMPTY_TEXT_PLACEHOLDER && self.content_length() == 0
    }
}
