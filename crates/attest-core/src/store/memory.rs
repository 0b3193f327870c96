//! In-memory store for tests and ephemeral runs.
//!
//! Same contract as the file store, same validation, no medium.

use std::sync::Mutex;

use async_trait::async_trait;

use super::{DocumentStore, StorageError, StoreResult};
use crate::types::{DocumentPatch, DocumentRecord};

/// Ephemeral [`DocumentStore`] holding the collection in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<DocumentRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populated store, handy for test fixtures.
    pub fn with_records(records: Vec<DocumentRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn load_all(&self) -> StoreResult<Vec<DocumentRecord>> {
        Ok(self.records.lock().unwrap().clone())
    }

    async fn save(&self, record: &DocumentRecord) -> StoreResult<()> {
        record.validate()?;
        let mut records = self.records.lock().unwrap();
        if records.iter().any(|r| r.id == record.id) {
            return Err(StorageError::DuplicateId {
                id: record.id.clone(),
            });
        }
        records.push(record.clone());
        Ok(())
    }

    async fn update(&self, id: &str, patch: &DocumentPatch) -> StoreResult<()> {
        let mut records = self.records.lock().unwrap();
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| StorageError::NotFound { id: id.to_string() })?;
        let mut merged = record.clone();
        patch.apply(&mut merged);
        merged.validate()?;
        *record = merged;
        Ok(())
    }

    async fn delete(&self, id: &str) -> StoreResult<()> {
        self.records.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn clear(&self) -> StoreResult<()> {
        self.records.lock().unwrap().clear();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DocumentStatus;

    fn record(id: &str) -> DocumentRecord {
        DocumentRecord::new(
            id,
            "Paper",
            "Ada",
            1_700_000_000_000,
            "sha256:abc",
            DocumentStatus::Pending,
            "/tmp/paper.pdf",
            2048,
        )
    }

    #[tokio::test]
    async fn test_save_load_delete() {
        let store = MemoryStore::new();
        store.save(&record("a")).await.unwrap();
        store.save(&record("b")).await.unwrap();

        assert_eq!(store.load_all().await.unwrap().len(), 2);
        store.delete("a").await.unwrap();
        let left = store.load_all().await.unwrap();
        assert_eq!(left.len(), 1);
        assert_eq!(left[0].id, "b");
    }

    #[tokio::test]
    async fn test_duplicate_id_rejected() {
        let store = MemoryStore::new();
        store.save(&record("a")).await.unwrap();
        assert!(store.save(&record("a")).await.unwrap_err().is_duplicate_id());
    }

    #[tokio::test]
    async fn test_failed_update_leaves_record_untouched() {
        let store = MemoryStore::new();
        store.save(&record("a")).await.unwrap();

        // Invalid transition: verified without proof. The stored record
        // must not be half-patched afterwards.
        let err = store
            .update("a", &DocumentPatch::status(DocumentStatus::Verified))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::InvalidRecord(_)));
        assert_eq!(
            store.load_all().await.unwrap()[0].status,
            DocumentStatus::Pending
        );
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .update("ghost", &DocumentPatch::default())
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }
}
