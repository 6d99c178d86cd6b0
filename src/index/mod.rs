//! Persistent similarity index and its lifecycle

mod lifecycle;
mod store;

pub use lifecycle::{IndexManager, IndexState};
pub use store::{IndexEntry, VectorIndex};
