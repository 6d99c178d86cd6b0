//! Document ingestion pipeline: parse, chunk, normalize

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::config::ChunkingConfig;
use crate::error::{Error, Result};
use crate::types::RetrievalRecord;

use super::chunker::TokenChunker;
use super::normalizer::normalize;
use super::parser::{FileParser, FileType};

/// A single file's ingestion failure
#[derive(Debug)]
pub struct IngestFailure {
    /// Path of the file that failed
    pub path: PathBuf,
    /// What went wrong
    pub error: Error,
}

/// Outcome of a batch ingestion run
///
/// Records from files that parsed successfully, in input order, plus one
/// failure entry per file that did not. A failed file never aborts its
/// siblings.
#[derive(Debug)]
pub struct IngestReport {
    /// Normalized records, ordered within and across documents
    pub records: Vec<RetrievalRecord>,
    /// Per-file failures, in input order
    pub failures: Vec<IngestFailure>,
    /// Number of input files that produced records
    pub files_ingested: usize,
    /// When the batch run started
    pub started_at: chrono::DateTime<chrono::Utc>,
}

impl IngestReport {
    fn new() -> Self {
        Self {
            records: Vec::new(),
            failures: Vec::new(),
            files_ingested: 0,
            started_at: chrono::Utc::now(),
        }
    }

    /// True when every input file was ingested
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// One-line summary of the batch, for operator logs
    pub fn summary(&self) -> String {
        format!(
            "{} chunks from {} files ({} failed)",
            self.records.len(),
            self.files_ingested,
            self.failures.len()
        )
    }
}

/// Drives parsing and chunking over input files, normalizing every chunk
pub struct DocumentPipeline {
    chunker: TokenChunker,
}

impl DocumentPipeline {
    /// Create a pipeline with default chunking
    pub fn new() -> Self {
        Self::with_config(&ChunkingConfig::default())
    }

    /// Create a pipeline with the given chunking configuration
    pub fn with_config(config: &ChunkingConfig) -> Self {
        Self {
            chunker: TokenChunker::from_config(config),
        }
    }

    /// Ingest a batch of paths (files or directories)
    ///
    /// Directories expand to their supported files in sorted order.
    /// Per-file failures are collected into the report instead of
    /// aborting the batch.
    pub fn ingest<P: AsRef<Path>>(&self, paths: &[P]) -> IngestReport {
        let mut report = IngestReport::new();

        for path in paths {
            let path = path.as_ref();

            if path.is_dir() {
                for file in supported_files_in(path) {
                    self.ingest_into(&file, &mut report);
                }
            } else {
                self.ingest_into(path, &mut report);
            }
        }

        tracing::info!("Ingested {}", report.summary());
        report
    }

    /// Ingest a single file, failing on any error
    pub fn ingest_file(&self, path: &Path) -> Result<Vec<RetrievalRecord>> {
        let parsed = FileParser::parse_path(path)?;
        let chunks = self.chunker.chunk_document(&parsed);

        tracing::debug!(
            "Split '{}' into {} chunks",
            parsed.source_filename,
            chunks.len()
        );

        Ok(chunks.iter().map(normalize).collect())
    }

    fn ingest_into(&self, path: &Path, report: &mut IngestReport) {
        match self.ingest_file(path) {
            Ok(records) => {
                report.records.extend(records);
                report.files_ingested += 1;
            }
            Err(error) => {
                tracing::warn!("Skipping '{}': {}", path.display(), error);
                report.failures.push(IngestFailure {
                    path: path.to_path_buf(),
                    error,
                });
            }
        }
    }
}

impl Default for DocumentPipeline {
    fn default() -> Self {
        Self::new()
    }
}

/// Supported files under a directory, in sorted order
fn supported_files_in(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| {
            path.extension()
                .and_then(|ext| ext.to_str())
                .map(FileType::from_extension)
                .is_some_and(|ft| ft.is_supported())
        })
        .collect();

    files.sort();
    files
}
