//! Durable keyed collection of document records.
//!
//! One namespaced key holds the whole serialized collection in insertion
//! order; every mutation is a read-modify-write over that snapshot. The
//! trait itself does not coordinate concurrent writers — mutations are
//! expected to flow through [`StoreWriter`], which serializes them on a
//! single owned task.

pub mod json_file;
pub mod memory;
pub mod writer;

pub use json_file::JsonFileStore;
pub use memory::MemoryStore;
pub use writer::StoreWriter;

use async_trait::async_trait;
use thiserror::Error;

use crate::types::{DocumentPatch, DocumentRecord, InvalidRecord};

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StorageError>;

/// Errors that can occur against the storage medium.
#[derive(Debug, Error)]
pub enum StorageError {
    /// `save` rejects duplicates so a record id stays unique in the store
    /// for its whole lifetime.
    #[error("duplicate document id: {id}")]
    DuplicateId { id: String },

    /// The id did not match any stored record.
    #[error("document not found: {id}")]
    NotFound { id: String },

    /// The record (or a patched result) violates a model invariant.
    #[error("invalid record: {0}")]
    InvalidRecord(#[from] InvalidRecord),

    /// The storage medium is unavailable.
    #[error("storage I/O failed: {message}")]
    Io { message: String },

    /// The collection could not be (de)serialized.
    #[error("serialization failed: {message}")]
    Serde { message: String },

    /// Invalid store specification.
    #[error("invalid store spec '{spec}': {reason}")]
    InvalidSpec { spec: String, reason: String },

    /// The writer task is gone; no further mutations are possible.
    #[error("store writer is closed")]
    Closed,
}

impl StorageError {
    pub fn is_duplicate_id(&self) -> bool {
        matches!(self, Self::DuplicateId { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<std::io::Error> for StorageError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for StorageError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serde {
            message: err.to_string(),
        }
    }
}

/// Parsed store location from CLI/config.
///
/// ```text
/// file:///var/lib/attest
/// memory://
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreSpec {
    /// On-disk store rooted at the given directory.
    File { dir: std::path::PathBuf },
    /// Ephemeral in-memory store (testing, dry runs).
    Memory,
}

impl StoreSpec {
    /// Parse a store URL. Only the `file` and `memory` schemes exist; the
    /// backend port is where remote media would plug in.
    pub fn parse(spec: &str) -> StoreResult<Self> {
        if let Some(rest) = spec.strip_prefix("memory://") {
            if !rest.is_empty() {
                return Err(StorageError::InvalidSpec {
                    spec: spec.to_string(),
                    reason: "memory stores take no path".to_string(),
                });
            }
            return Ok(Self::Memory);
        }
        if let Some(path) = spec.strip_prefix("file://") {
            if path.is_empty() {
                return Err(StorageError::InvalidSpec {
                    spec: spec.to_string(),
                    reason: "file stores need a directory path".to_string(),
                });
            }
            return Ok(Self::File { dir: path.into() });
        }
        Err(StorageError::InvalidSpec {
            spec: spec.to_string(),
            reason: "expected a file:// or memory:// scheme".to_string(),
        })
    }

    pub fn is_memory(&self) -> bool {
        matches!(self, Self::Memory)
    }
}

/// The document store contract.
///
/// All operations are async; implementations suspend at their I/O
/// boundaries and never block the caller's thread.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// The full collection, in insertion order. Order is significant for
    /// display and must survive reloads.
    async fn load_all(&self) -> StoreResult<Vec<DocumentRecord>>;

    /// Append a new record.
    ///
    /// # Errors
    ///
    /// - `StorageError::DuplicateId` if the id already exists
    /// - `StorageError::InvalidRecord` if the record fails validation
    async fn save(&self, record: &DocumentRecord) -> StoreResult<()>;

    /// Merge `patch` into the record matched by `id`.
    ///
    /// # Errors
    ///
    /// - `StorageError::NotFound` if the id is absent
    /// - `StorageError::InvalidRecord` if the merged record fails validation
    async fn update(&self, id: &str, patch: &DocumentPatch) -> StoreResult<()>;

    /// Remove the record. Idempotent: removing an absent id is a no-op.
    async fn delete(&self, id: &str) -> StoreResult<()>;

    /// Empty the entire collection. Irreversible.
    async fn clear(&self) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_file_spec() {
        let spec = StoreSpec::parse("file:///var/lib/attest").unwrap();
        assert_eq!(
            spec,
            StoreSpec::File {
                dir: "/var/lib/attest".into()
            }
        );
        assert!(!spec.is_memory());
    }

    #[test]
    fn test_parse_memory_spec() {
        assert!(StoreSpec::parse("memory://").unwrap().is_memory());
    }

    #[test]
    fn test_parse_rejects_unknown_scheme() {
        let err = StoreSpec::parse("s3://bucket/x").unwrap_err();
        assert!(matches!(err, StorageError::InvalidSpec { .. }));
    }

    #[test]
    fn test_parse_rejects_empty_file_path() {
        let err = StoreSpec::parse("file://").unwrap_err();
        assert!(matches!(err, StorageError::InvalidSpec { .. }));
    }

    #[test]
    fn test_parse_rejects_memory_with_path() {
        let err = StoreSpec::parse("memory://nope").unwrap_err();
        assert!(matches!(err, StorageError::InvalidSpec { .. }));
    }
}
