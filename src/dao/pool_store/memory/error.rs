//! Error types shared by the in-memory storage implementation.

use std::path::PathBuf;

use thiserror::Error;
use uuid::Uuid;

use crate::dao::storage::StorageError;

/// Convenient result alias returning [`MemoryStoreError`] failures.
pub type MemoryResult<T> = Result<T, MemoryStoreError>;

/// Failures raised by the in-memory store and its seed loader.
#[derive(Debug, Error)]
pub enum MemoryStoreError {
    /// A record points to another record that does not exist.
    #[error("{kind} `{id}` referenced by {referenced_by} does not exist")]
    MissingReference {
        kind: &'static str,
        id: Uuid,
        referenced_by: String,
    },
    /// The seed file could not be read.
    #[error("failed to read seed file `{path}`")]
    SeedRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The seed file is not valid JSON for the expected layout.
    #[error("failed to parse seed file `{path}`")]
    SeedParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    /// A timestamp inside the seed is not RFC 3339.
    #[error("invalid RFC 3339 timestamp `{value}` in seed")]
    InvalidTimestamp {
        value: String,
        #[source]
        source: time::error::Parse,
    },
}

impl From<MemoryStoreError> for StorageError {
    fn from(err: MemoryStoreError) -> Self {
        StorageError::unavailable(err.to_string(), err)
    }
}
