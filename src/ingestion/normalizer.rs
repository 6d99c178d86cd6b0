//! Chunk normalization into uniform retrieval records
//!
//! Parsers disagree about which fields a chunk carries, so every lookup
//! here falls back to a sentinel instead of failing. A broken link in one
//! provenance chain never blocks extraction of the other fields.

use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

use crate::types::record::{
    META_CONTENT_LENGTH, META_HEADINGS, META_PAGE_NUMBER, META_SOURCE_FILENAME,
};
use crate::types::{RawChunk, RetrievalRecord, EMPTY_TEXT_PLACEHOLDER, NOT_AVAILABLE};

/// Convert a raw chunk into a retrieval record
///
/// Total and pure: never fails, performs no I/O. Each call generates a
/// fresh record id, so identical chunks ingested twice stay distinct.
pub fn normalize(chunk: &RawChunk) -> RetrievalRecord {
    let resolved = chunk
        .text
        .as_deref()
        .filter(|t| !t.trim().is_empty())
        .or_else(|| chunk.content.as_deref().filter(|t| !t.trim().is_empty()));

    let (text, content_length) = match resolved {
        Some(t) => (t.to_string(), t.len()),
        None => (EMPTY_TEXT_PLACEHOLDER.to_string(), 0),
    };

    let filename = chunk
        .meta
        .as_ref()
        .and_then(|m| m.origin.as_ref())
        .and_then(|o| o.filename.as_deref());

    let page_number = chunk
        .meta
        .as_ref()
        .and_then(|m| m.doc_items.first())
        .and_then(|item| item.prov.first())
        .and_then(|prov| prov.page_no);

    let headings = chunk
        .meta
        .as_ref()
        .and_then(|m| m.headings.as_ref())
        .filter(|h| !h.is_empty());

    let mut metadata = HashMap::new();
    metadata.insert(
        META_SOURCE_FILENAME.to_string(),
        filename.map_or_else(|| json!(NOT_AVAILABLE), |f| json!(f)),
    );
    metadata.insert(
        META_PAGE_NUMBER.to_string(),
        page_number.map_or_else(|| json!(NOT_AVAILABLE), |p| json!(p)),
    );
    metadata.insert(
        META_HEADINGS.to_string(),
        headings.map_or_else(|| json!(NOT_AVAILABLE), |h| json!(h)),
    );
    metadata.insert(META_CONTENT_LENGTH.to_string(), json!(content_length));

    RetrievalRecord {
        id: Uuid::new_v4(),
        text,
        metadata,
    }
}
