//! Single-writer mutation queue.
//!
//! Whole-collection read-modify-write makes concurrent mutators race: the
//! last writer's snapshot wins and an earlier concurrent write is silently
//! lost. All mutations therefore flow through one owned task; callers hold
//! a cheap cloneable handle and their operations are applied in arrival
//! order. The task exits once every handle has been dropped.

use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use super::{DocumentStore, StorageError, StoreResult};
use crate::types::{DocumentPatch, DocumentRecord};

const QUEUE_DEPTH: usize = 32;

enum Command {
    LoadAll {
        reply: oneshot::Sender<StoreResult<Vec<DocumentRecord>>>,
    },
    Save {
        record: DocumentRecord,
        reply: oneshot::Sender<StoreResult<()>>,
    },
    Update {
        id: String,
        patch: DocumentPatch,
        reply: oneshot::Sender<StoreResult<()>>,
    },
    Delete {
        id: String,
        reply: oneshot::Sender<StoreResult<()>>,
    },
    Clear {
        reply: oneshot::Sender<StoreResult<()>>,
    },
}

/// Handle to the store's single writer task.
#[derive(Clone)]
pub struct StoreWriter {
    tx: mpsc::Sender<Command>,
}

impl StoreWriter {
    /// Spawn the writer task over `store` and return a handle to it.
    pub fn spawn(store: impl DocumentStore + 'static) -> Self {
        let (tx, mut rx) = mpsc::channel::<Command>(QUEUE_DEPTH);
        tokio::spawn(async move {
            while let Some(command) = rx.recv().await {
                match command {
                    Command::LoadAll { reply } => {
                        let _ = reply.send(store.load_all().await);
                    }
                    Command::Save { record, reply } => {
                        let _ = reply.send(store.save(&record).await);
                    }
                    Command::Update { id, patch, reply } => {
                        let _ = reply.send(store.update(&id, &patch).await);
                    }
                    Command::Delete { id, reply } => {
                        let _ = reply.send(store.delete(&id).await);
                    }
                    Command::Clear { reply } => {
                        let _ = reply.send(store.clear().await);
                    }
                }
            }
            debug!("store writer stopped");
        });
        Self { tx }
    }

    async fn send(&self, command: Command, done: oneshot::Receiver<StoreResult<()>>) -> StoreResult<()> {
        self.tx
            .send(command)
            .await
            .map_err(|_| StorageError::Closed)?;
        done.await.map_err(|_| StorageError::Closed)?
    }

    /// See [`DocumentStore::load_all`].
    pub async fn load_all(&self) -> StoreResult<Vec<DocumentRecord>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Command::LoadAll { reply })
            .await
            .map_err(|_| StorageError::Closed)?;
        rx.await.map_err(|_| StorageError::Closed)?
    }

    /// See [`DocumentStore::save`].
    pub async fn save(&self, record: DocumentRecord) -> StoreResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Save { record, reply }, rx).await
    }

    /// See [`DocumentStore::update`].
    pub async fn update(&self, id: &str, patch: DocumentPatch) -> StoreResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(
            Command::Update {
                id: id.to_string(),
                patch,
                reply,
            },
            rx,
        )
        .await
    }

    /// See [`DocumentStore::delete`].
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(
            Command::Delete {
                id: id.to_string(),
                reply,
            },
            rx,
        )
        .await
    }

    /// See [`DocumentStore::clear`].
    pub async fn clear(&self) -> StoreResult<()> {
        let (reply, rx) = oneshot::channel();
        self.send(Command::Clear { reply }, rx).await
    }
}
