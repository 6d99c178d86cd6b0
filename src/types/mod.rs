//! Core data types for the ingestion and retrieval pipeline

pub mod raw;
pub mod record;

pub use raw::{ChunkMeta, ChunkOrigin, DocItem, Provenance, RawChunk};
pub use record::{RetrievalRecord, EMPTY_TEXT_PLACEHOLDER, NOT_AVAILABLE};
