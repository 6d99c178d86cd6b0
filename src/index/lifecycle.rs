//! Index lifecycle: explicit build-or-load state machine
//!
//! The persisted path is probed once at startup. There is no automatic
//! invalidation: a stale index is only replaced by `reset()` (or deleting
//! the path out of band) followed by a rebuild.

use parking_lot::RwLock;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::providers::EmbeddingProvider;
use crate::types::RetrievalRecord;

use super::store::VectorIndex;

/// Lifecycle state of a persisted index
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexState {
    /// Nothing persisted at the path
    Absent,
    /// Build in progress
    Building,
    /// Loaded or built and persisted
    Ready,
    /// Persisted data failed to deserialize
    Corrupt,
}

/// Owns the build-or-load decision for one persisted index path
pub struct IndexManager {
    path: PathBuf,
    state: RwLock<IndexState>,
}

impl IndexManager {
    /// Create a manager for a persisted index path
    ///
    /// The machine starts `Absent`; `open_or_build` probes the path and
    /// moves to `Ready`, `Building`, or `Corrupt`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            state: RwLock::new(IndexState::Absent),
        }
    }

    /// Current lifecycle state
    pub fn state(&self) -> IndexState {
        *self.state.read()
    }

    /// Path the index persists under
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the persisted index if present, otherwise build from the
    /// records the closure produces and persist the result
    ///
    /// The closure runs only on the build path, so callers do not pay
    /// for ingestion when a persisted index exists.
    pub async fn open_or_build<F>(
        &self,
        provider: &dyn EmbeddingProvider,
        records_fn: F,
    ) -> Result<VectorIndex>
    where
        F: FnOnce() -> Result<Vec<RetrievalRecord>>,
    {
        if self.path.exists() {
            tracing::info!("Loading persisted index from {}", self.path.display());

            match VectorIndex::load(&self.path) {
                Ok(index) => {
                    *self.state.write() = IndexState::Ready;
                    Ok(index)
                }
                Err(err @ Error::IndexCorrupt { .. }) => {
                    *self.state.write() = IndexState::Corrupt;
                    Err(err)
                }
                Err(err) => Err(err),
            }
        } else {
            *self.state.write() = IndexState::Building;

            let records = records_fn()?;
            let index = VectorIndex::build(records, provider).await?;
            index.save(&self.path)?;

            *self.state.write() = IndexState::Ready;
            Ok(index)
        }
    }

    /// Delete the persisted index and return to `Absent`
    ///
    /// This is the recovery path for a corrupt index: reset, then
    /// rebuild via `open_or_build`.
    pub fn reset(&self) -> Result<()> {
        if self.path.exists() {
            std::fs::remove_dir_all(&self.path)?;
        }
        *self.state.write() = IndexState::Absent;
        Ok(())
    }
}
