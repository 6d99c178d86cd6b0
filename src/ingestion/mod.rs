//! Document ingestion: multi-format parsing, chunking, normalization

mod chunker;
mod normalizer;
mod parser;
mod pipeline;

pub use chunker::TokenChunker;
pub use normalizer::normalize;
pub use parser::{DocBlock, FileParser, FileType, ParsedDocument};
pub use pipeline::{DocumentPipeline, IngestFailure, IngestReport};
