//! JSON-file store: the whole collection under one namespaced key.
//!
//! The medium is a single `<namespace>.json` file holding the serialized
//! array. Reads of a missing file yield an empty collection; writes go
//! through a temp file and rename so a crash mid-write cannot truncate the
//! collection.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs;
use tracing::debug;

use super::{DocumentStore, StorageError, StoreResult};
use crate::types::{DocumentPatch, DocumentRecord};

/// Namespace used when none is given.
pub const DEFAULT_NAMESPACE: &str = "documents";

/// File-backed [`DocumentStore`].
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
    namespace: String,
}

impl JsonFileStore {
    /// Store rooted at `dir`, under the default namespace.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self::with_namespace(dir, DEFAULT_NAMESPACE)
    }

    /// Store rooted at `dir` with an explicit namespace, for callers that
    /// keep several collections side by side.
    pub fn with_namespace(dir: impl Into<PathBuf>, namespace: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            namespace: namespace.into(),
        }
    }

    /// Path of the collection file.
    pub fn key_path(&self) -> PathBuf {
        self.dir.join(format!("{}.json", self.namespace))
    }

    async fn read_collection(&self) -> StoreResult<Vec<DocumentRecord>> {
        match fs::read(self.key_path()).await {
            Ok(bytes) => Ok(serde_json::from_slice(&bytes)?),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_collection(&self, records: &[DocumentRecord]) -> StoreResult<()> {
        fs::create_dir_all(&self.dir).await?;
        let json = serde_json::to_vec_pretty(records)?;
        write_atomic(&self.key_path(), &json).await
    }
}

/// Write `content` to `path` via a temp file and rename.
pub(crate) async fn write_atomic(path: &Path, content: &[u8]) -> StoreResult<()> {
    let temp_path = path.with_extension("tmp");
    fs::write(&temp_path, content).await?;
    fs::rename(&temp_path, path).await?;
    Ok(())
}

#[async_trait]
impl DocumentStore for JsonFileStore {
    async fn load_all(&self) -> StoreResult<Vec<DocumentRecord>> {
        self.read_collection().await
    }

    async fn save(&self, record: &DocumentRecord) -> StoreResult<()> {
        record.validate()?;
        let mut records = self.read_collection().await?;
        if records.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateId {
                id: record.id.clone(),
            });
        }
        records.push(record.clone());
        self.write_collection(&records).await?;
        debug!(id = %record.id, count = records.len(), "document saved");
        Ok(())
    }

    async fn update(&self, id: &str, patch: &DocumentPatch) -> StoreResult<()> {
        let mut records = self.read_collection().await?;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;
        patch.apply(record);
        record.validate()?;
        self.write_collection(&records).await
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        let mut records = self.read_collection().await?;
        let before = records.len();
        records.retain(|r| r.id != id);
        if records.len() == before {
            // Already absent; delete is idempotent.
            return Ok(());
        }
        self.write_collection(&records).await
    }

    async fn clear(&self) -> StoreResult<()> {
        match fs::remove_file(self.key_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
