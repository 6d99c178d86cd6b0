//! Error types for the RAG pipeline

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for RAG operations
pub type Result<T> = std::result::Result<T, Error>;

/// RAG pipeline errors
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Input file extension is not in the supported set
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// External parser failed or returned malformed output
    #[error("Failed to parse '{file}': {reason}")]
    ParseFailure { file: String, reason: String },

    /// Embedding function returned an inconsistent vector size
    #[error("Embedding dimension mismatch: expected {expected}, got {actual}")]
    EmbeddingDimension { expected: usize, actual: usize },

    /// No persisted index at the given path
    #[error("No index found at {}", .0.display())]
    IndexNotFound(PathBuf),

    /// Persisted index could not be deserialized
    #[error("Index at {} is corrupt: {reason}", .path.display())]
    IndexCorrupt { path: PathBuf, reason: String },

    /// Embedding provider error
    #[error("Embedding generation failed: {0}")]
    Embedding(String),

    /// Relevance scorer error
    #[error("Relevance scoring failed: {0}")]
    Scoring(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create a parse failure error
    pub fn parse_failure(file: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::ParseFailure {
            file: file.into(),
            reason: reason.into(),
        }
    }

    /// Create a corrupt index error
    pub fn index_corrupt(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::IndexCorrupt {
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create an embedding error
    pub fn embedding(message: impl Into<String>) -> Self {
        Self::Embedding(message.into())
    }

    /// Create a scoring error
    pub fn scoring(message: impl Into<String>) -> Self {
        Self::Scoring(message.into())
    }

    /// True for errors that abort a single file but not a whole batch
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            Self::UnsupportedFormat(_) | Self::ParseFailure { .. } | Self::Io(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_recoverable_classification() {
        assert!(Error::UnsupportedFormat("csv".to_string()).is_per_file());
        assert!(Error::parse_failure("a.pdf", "broken xref").is_per_file());

        assert!(!Error::EmbeddingDimension {
            expected: 768,
            actual: 384
        }
        .is_per_file());
        assert!(!Error::IndexNotFound(PathBuf::from("/tmp/index")).is_per_file());
        assert!(!Error::index_corrupt("/tmp/index", "truncated").is_per_file());
    }

    #[test]
    fn test_messages_name_the_subject() {
        let err = Error::parse_failure("deck.pptx", "bad zip");
        assert_eq!(err.to_string(), "Failed to parse 'deck.pptx': bad zip");

        let err = Error::EmbeddingDimension {
            expected: 768,
            actual: 384,
        };
        assert_eq!(
            err.to_string(),
            "Embedding dimension mismatch: expected 768, got 384"
        );
    }
}
