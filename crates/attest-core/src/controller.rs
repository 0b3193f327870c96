//! Verification state controller.
//!
//! [`DocumentController`] orchestrates a notarize or verify request
//! end-to-end: it drives the proof service, maps the result onto a small
//! per-request state machine, and keeps the live document collection
//! cached in memory so consuming UI reads never re-hit storage. It is
//! constructed with its services injected; nothing here is global.

use std::sync::Mutex;

use tracing::{debug, info};
use uuid::Uuid;

use crate::digest;
use crate::notary::{NotarizationError, NotarizeMetadata, NotaryService};
use crate::store::{StoreResult, StoreWriter};
use crate::types::{
    DocumentPatch, DocumentRecord, DocumentStatus, Proof, VerificationOutcome,
};

/// What a successfully completed request produced.
#[derive(Debug, Clone)]
pub enum TrackedOutcome {
    Notarized(Proof),
    Verified(VerificationOutcome),
}

/// Per-request state machine: `Idle -> Running -> {Succeeded, Failed}`.
///
/// A terminal state stays until the caller acknowledges it; the
/// controller never auto-retries.
#[derive(Debug, Clone, Default)]
pub enum RequestPhase {
    #[default]
    Idle,
    Running,
    Succeeded(TrackedOutcome),
    Failed(String),
}

impl RequestPhase {
    pub fn is_idle(&self) -> bool {
        matches!(self, Self::Idle)
    }

    pub fn is_running(&self) -> bool {
        matches!(self, Self::Running)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Succeeded(_) | Self::Failed(_))
    }

    /// The stored failure reason, for UI display.
    pub fn failure(&self) -> Option<&str> {
        match self {
            Self::Failed(reason) => Some(reason),
            _ => None,
        }
    }
}

/// UI-facing orchestrator over the proof service and the document store.
pub struct DocumentController {
    notary: NotaryService,
    store: StoreWriter,
    cache: Mutex<Vec<DocumentRecord>>,
    phase: Mutex<RequestPhase>,
}

impl DocumentController {
    /// Wire the controller to its services and load the collection.
    pub async fn new(notary: NotaryService, store: StoreWriter) -> StoreResult<Self> {
        let cache = store.load_all().await?;
        info!(count = cache.len(), "document collection loaded");
        Ok(Self {
            notary,
            store,
            cache: Mutex::new(cache),
            phase: Mutex::new(RequestPhase::Idle),
        })
    }

    /// The injected proof service, for operations that bypass tracking
    /// (witness solicitation, payload signing).
    pub fn notary(&self) -> &NotaryService {
        &self.notary
    }

    /// Current request phase.
    pub fn phase(&self) -> RequestPhase {
        self.phase.lock().unwrap().clone()
    }

    /// Acknowledge a terminal phase and return to idle.
    pub fn acknowledge(&self) {
        *self.phase.lock().unwrap() = RequestPhase::Idle;
    }

    fn set_phase(&self, phase: RequestPhase) {
        *self.phase.lock().unwrap() = phase;
    }

    /// Notarize `file_path`, tracking the request on the state machine.
    ///
    /// On failure the reason is stored for UI display **and** the error is
    /// re-raised, so a caller that ignores the machine still observes it.
    pub async fn notarize_and_track(
        &self,
        file_path: &str,
        metadata: &NotarizeMetadata,
    ) -> Result<Proof, NotarizationError> {
        self.set_phase(RequestPhase::Running);
        match self.notary.notarize(file_path, metadata).await {
            Ok(proof) => {
                self.set_phase(RequestPhase::Succeeded(TrackedOutcome::Notarized(
                    proof.clone(),
                )));
                Ok(proof)
            }
            Err(err) => {
                self.set_phase(RequestPhase::Failed(err.to_string()));
                Err(err)
            }
        }
    }

    /// Verify `file_path`, tracking the request on the state machine.
    ///
    /// Always yields an outcome. An `error`-status outcome moves the
    /// machine to `Failed`; a verdict (verified or unverified) is a
    /// completed request and moves it to `Succeeded`.
    pub async fn verify_and_track(&self, file_path: &str) -> VerificationOutcome {
        self.set_phase(RequestPhase::Running);
        let mut outcome = self.notary.verify(file_path).await;

        if outcome.is_valid && outcome.document.is_none() {
            // Attach the persisted record matching the confirmed fingerprint.
            if let Ok(fingerprint) = digest::fingerprint_file(file_path).await {
                let cache = self.cache.lock().unwrap();
                outcome.document = cache.iter().find(|r| r.hash == fingerprint).cloned();
            }
        }

        match outcome.status {
            DocumentStatus::Error => {
                self.set_phase(RequestPhase::Failed(outcome.message.clone()));
            }
            _ => {
                self.set_phase(RequestPhase::Succeeded(TrackedOutcome::Verified(
                    outcome.clone(),
                )));
            }
        }
        outcome
    }

    /// Persist a record the user chose to keep.
    pub async fn persist(&self, record: DocumentRecord) -> StoreResult<()> {
        self.store.save(record.clone()).await?;
        self.cache.lock().unwrap().push(record);
        Ok(())
    }

    /// Delete by id. Idempotent, like the store operation beneath it.
    pub async fn remove(&self, id: &str) -> StoreResult<()> {
        self.store.delete(id).await?;
        self.cache.lock().unwrap().retain(|r| r.id != id);
        debug!(id, "document removed");
        Ok(())
    }

    /// Merge fields into the record matched by `id`.
    pub async fn amend(&self, id: &str, patch: DocumentPatch) -> StoreResult<()> {
        self.store.update(id, patch.clone()).await?;
        let mut cache = self.cache.lock().unwrap();
        if let Some(record) = cache.iter_mut().find(|r| r.id == id) {
            patch.apply(record);
        }
        Ok(())
    }

    /// Empty the collection. Irreversible.
    pub async fn clear(&self) -> StoreResult<()> {
        self.store.clear().await?;
        self.cache.lock().unwrap().clear();
        Ok(())
    }

    /// Cached read; does not hit the store.
    pub fn lookup(&self, id: &str) -> Option<DocumentRecord> {
        self.cache.lock().unwrap().iter().find(|r| r.id == id).cloned()
    }

    /// Snapshot of the live collection, in insertion order.
    pub fn documents(&self) -> Vec<DocumentRecord> {
        self.cache.lock().unwrap().clone()
    }

    /// Reload the cache from the store.
    pub async fn refresh(&self) -> StoreResult<()> {
        let records = self.store.load_all().await?;
        *self.cache.lock().unwrap() = records;
        Ok(())
    }
}

/// Build a persistable verified record from a successful notarization.
///
/// The record's own timestamp is the proof issuer's; its hash is the
/// content fingerprint (recomputed here, not the merkle root); witnesses
/// mirrors the proof's witness list.
pub async fn record_from_proof(
    file_path: &str,
    metadata: &NotarizeMetadata,
    proof: &Proof,
) -> std::io::Result<DocumentRecord> {
    let hash = digest::fingerprint_file(file_path).await?;
    let file_size = tokio::fs::metadata(file_path).await?.len();

    let mut record = DocumentRecord::new(
        format!("doc_{}", Uuid::now_v7().simple()),
        metadata.title.clone(),
        metadata.author.clone(),
        proof.timestamp,
        hash,
        DocumentStatus::Verified,
        file_path,
        file_size,
    )
    .with_witnesses(proof.witnesses.len() as u32)
    .with_proof(proof.clone());
    record.institution = metadata.institution.clone();
    Ok(record)
}
