//! In-memory notarization ledger.
//!
//! Reference [`NotaryBackend`] for tests and local development. Entries
//! are signed with an ed25519 key held by the ledger and anchored under a
//! SHA-256 aggregation root, so fingerprint checks behave exactly like a
//! remote backend's would: an exact content match verifies, anything else
//! does not.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;
use ed25519_dalek::SigningKey;

use super::backend::{BackendError, NotarizeMetadata, NotaryBackend};
use super::ledger::{merkle_root, new_notarization_id, new_witness_id, sign_detached};
use crate::digest;
use crate::types::{Proof, Witness};

struct LedgerEntry {
    metadata: NotarizeMetadata,
    proof: Proof,
}

/// Process-local [`NotaryBackend`] keyed by exact fingerprint.
pub struct InMemoryNotary {
    signing_key: SigningKey,
    ledger: Mutex<HashMap<String, LedgerEntry>>,
}

impl InMemoryNotary {
    /// Ledger with a freshly generated identity key.
    pub fn new() -> Self {
        Self::with_key(SigningKey::generate(&mut rand::thread_rng()))
    }

    /// Ledger with a fixed identity key, for deterministic fixtures.
    pub fn with_key(signing_key: SigningKey) -> Self {
        Self {
            signing_key,
            ledger: Mutex::new(HashMap::new()),
        }
    }

    /// Number of notarized fingerprints.
    pub fn len(&self) -> usize {
        self.ledger.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Metadata recorded for a fingerprint, if notarized.
    pub fn metadata(&self, fingerprint: &str) -> Option<NotarizeMetadata> {
        self.ledger
            .lock()
            .unwrap()
            .get(fingerprint)
            .map(|entry| entry.metadata.clone())
    }

    fn sign_payload(&self, payload: &[u8]) -> String {
        sign_detached(&self.signing_key, payload)
    }
}

impl Default for InMemoryNotary {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotaryBackend for InMemoryNotary {
    async fn connect(&self) -> Result<(), BackendError> {
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

        let mut ledger = self.ledger.lock().unwrap();
        // Identical content is already on the ledger; hand back its proof.
        if let Some(entry) = ledger.get(fingerprint) {
            return Ok(entry.proof.clone());
        }

        let notarization_id = new_notarization_id();
        let proof = Proof {
            signature: self.sign_payload(fingerprint.as_bytes()),
            merkle_root: merkle_root(fingerprint, &notarization_id),
            notarization_id,
            timestamp: Utc::now().timestamp_millis(),
            witnesses: Vec::new(),
        };
        ledger.insert(
            fingerprint.to_string(),
            LedgerEntry {
                metadata: metadata.clone(),
                proof: proof.clone(),
            },
        );
        Ok(proof)
    }

    async fn lookup(&self, fingerprint: &str) -> Result<Option<Proof>, BackendError> {
        Ok(self
            .ledger
            .lock()
            .unwrap()
            .get(fingerprint)
            .map(|entry| entry.proof.clone()))
    }

    async fn request_witnesses(&self, notarization_id: &str) -> Result<(), BackendError> {
        let mut ledger = self.ledger.lock().unwrap();
        let entry = ledger
            .values_mut()
            .find(|entry| entry.proof.notarization_id == notarization_id)
            .ok_or_else(|| BackendError::UnknownNotarization {
                notarization_id: notarization_id.to_string(),
            })?;

        let witness_id = new_witness_id();
        let attestation = format!("{notarization_id}:{witness_id}");
        entry.proof.witnesses.push(Witness {
            signature: self.sign_payload(attestation.as_bytes()),
            id: witness_id,
            timestamp: Utc::now().timestamp_millis(),
        });
        Ok(())
    }

    async fn sign(&self, payload: &str) -> Result<String, BackendError> {
        Ok(self.sign_payload(payload.as_bytes()))
    }
}
