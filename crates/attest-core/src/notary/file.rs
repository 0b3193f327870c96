//! File-backed notarization ledger.
//!
//! Same contract as [`InMemoryNotary`](super::InMemoryNotary), persisted
//! under a directory so notarizations survive process restarts:
//!
//! ```text
//! <dir>/ledger.json   # entries: fingerprint -> {metadata, proof}
//! <dir>/ledger.key    # hex-encoded ed25519 seed, created on first connect
//! ```
//!
//! `connect` loads (or creates) both files; every mutation rewrites the
//! ledger file atomically.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::Utc;
use ed25519_dalek::SigningKey;
use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info};

use super::backend::{BackendError, NotarizeMetadata, NotaryBackend};
use super::ledger::{merkle_root, new_notarization_id, new_witness_id, sign_detached};
use crate::digest;
use crate::store::json_file::write_atomic;
use crate::types::{Proof, Witness};

const LEDGER_FILE: &str = "ledger.json";
const KEY_FILE: &str = "ledger.key";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PersistedEntry {
    fingerprint: String,
    metadata: NotarizeMetadata,
    proof: Proof,
}

struct LedgerState {
    signing_key: SigningKey,
    entries: Vec<PersistedEntry>,
}

/// Durable [`NotaryBackend`] rooted at a directory.
pub struct FileLedgerNotary {
    dir: PathBuf,
    state: Mutex<Option<LedgerState>>,
}

impl FileLedgerNotary {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            state: Mutex::new(None),
        }
    }

    fn ledger_path(&self) -> PathBuf {
        self.dir.join(LEDGER_FILE)
    }

    fn key_path(&self) -> PathBuf {
        self.dir.join(KEY_FILE)
    }

    async fn load_state(&self) -> Result<LedgerState, BackendError> {
        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| medium_error(&self.dir, e))?;

        let signing_key = self.load_or_create_key().await?;
        let entries = match fs::read(self.ledger_path()).await {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| BackendError::Unreachable {
                message: format!("corrupt ledger file: {e}"),
            })?,
            Err(e) if e.kind() == ErrorKind::NotFound => Vec::new(),
            Err(e) => return Err(medium_error(&self.ledger_path(), e)),
        };

        info!(dir = %self.dir.display(), entries = entries.len(), "ledger loaded");
        Ok(LedgerState {
            signing_key,
            entries,
        })
    }

    async fn load_or_create_key(&self) -> Result<SigningKey, BackendError> {
        match fs::read_to_string(self.key_path()).await {
            Ok(encoded) => {
                let bytes = hex::decode(encoded.trim()).map_err(|e| BackendError::Unreachable {
                    message: format!("corrupt ledger key: {e}"),
                })?;
                let seed: [u8; 32] = bytes.try_into().map_err(|_| BackendError::Unreachable {
                    message: "corrupt ledger key: wrong length".to_string(),
                })?;
                Ok(SigningKey::from_bytes(&seed))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                let key = SigningKey::generate(&mut rand::thread_rng());
                let encoded = hex::encode(key.to_bytes());
                write_atomic(&self.key_path(), encoded.as_bytes())
                    .await
                    .map_err(|e| BackendError::Unreachable {
                        message: e.to_string(),
                    })?;
                debug!(path = %self.key_path().display(), "ledger key created");
                Ok(key)
            }
            Err(e) => Err(medium_error(&self.key_path(), e)),
        }
    }

    async fn persist(&self, entries: &[PersistedEntry]) -> Result<(), BackendError> {
        let json =
            serde_json::to_vec_pretty(entries).map_err(|e| BackendError::Unreachable {
                message: format!("ledger serialization failed: {e}"),
            })?;
        write_atomic(&self.ledger_path(), &json)
            .await
            .map_err(|e| BackendError::Unreachable {
                message: e.to_string(),
            })
    }
}

fn medium_error(path: &Path, err: std::io::Error) -> BackendError {
    BackendError::Unreachable {
        message: format!("{}: {err}", path.display()),
    }
}

fn not_loaded() -> BackendError {
    BackendError::Unreachable {
        message: "ledger not loaded; connect first".to_string(),
    }
}

#[async_trait]
impl NotaryBackend for FileLedgerNotary {
    async fn connect(&self) -> Result<(), BackendError> {
        let mut guard = self.state.lock().await;
        if guard.is_some() {
            return Ok(());
        }
        *guard = Some(self.load_state().await?);
        Ok(())
    }

    async fn notarize(
        &self,
        fingerprint: &str,
        metadata: &NotarizeMetadata,
    ) -> Result<Proof, BackendError> {
        if !digest::is_fingerprint(fingerprint) {
            return Err(BackendError::Rejected {
                reason: format!("malformed fingerprint: {fingerprint}"),
            });
        }

        let mut guard = self.state.lock().await;
        let state = guard.as_mut().ok_or_else(not_loaded)?;

        if let Some(entry) = state.entries.iter().find(|e| e.fingerprint == fingerprint) {
            return Ok(entry.proof.clone());
        }

        let notarization_id = new_notarization_id();
        let proof = Proof {
            signature: sign_detached(&state.signing_key, fingerprint.as_bytes()),
            merkle_root: merkle_root(fingerprint, &notarization_id),
            notarization_id,
            timestamp: Utc::now().timestamp_millis(),
            witnesses: Vec::new(),
        };
        state.entries.push(PersistedEntry {
            fingerprint: fingerprint.to_string(),
            metadata: metadata.clone(),
            proof: proof.clone(),
        });
        self.persist(&state.entries).await?;
        Ok(proof)
    }

    async fn lookup(&self, fingerprint: &str) -> Result<Option<Proof>, BackendError> {
        let guard = self.state.lock().await;
        let state = guard.as_ref().ok_or_else(not_loaded)?;
        Ok(state
            .entries
            .iter()
            .find(|e| e.fingerprint == fingerprint)
            .map(|e| e.proof.clone()))
    }

    async fn request_witnesses(&self, notarization_id: &str) -> Result<(), BackendError> {
        let mut guard = self.state.lock().await;
        let state = guard.as_mut().ok_or_else(not_loaded)?;

        let key = state.signing_key.clone();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| e.proof.notarization_id == notarization_id)
            .ok_or_else(|| BackendError::UnknownNotarization {
                notarization_id: notarization_id.to_string(),
            })?;

        let witness_id = new_witness_id();
        let attestation = format!("{notarization_id}:{witness_id}");
        entry.proof.witnesses.push(Witness {
            signature: sign_detached(&key, attestation.as_bytes()),
            id: witness_id,
            timestamp: Utc::now().timestamp_millis(),
        });
        self.persist(&state.entries).await
    }

    async fn sign(&self, payload: &str) -> Result<String, BackendError> {
        let guard = self.state.lock().await;
        let state = guard.as_ref().ok_or_else(not_loaded)?;
        Ok(sign_detached(&state.signing_key, payload.as_bytes()))
    }
}
