//! Proof service: notarize and verify documents against a notarization
//! backend.
//!
//! [`NotaryService`] owns the backend port and enforces the service
//! contract: notarization either returns a complete [`Proof`] or a typed
//! error, and verification is **total** — `verify` always resolves to a
//! [`VerificationOutcome`] and never propagates a hashing or transport
//! fault to the caller.

pub mod backend;
pub mod file;
mod ledger;
pub mod memory;

pub use backend::{BackendError, NotarizeMetadata, NotaryBackend};
pub use file::FileLedgerNotary;
pub use memory::InMemoryNotary;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::digest;
use crate::types::{DocumentStatus, Proof, VerificationOutcome};

/// Initialization failure. Non-fatal to app startup; later operations
/// report [`NotarizationError::NotInitialized`] until a retry succeeds.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("notary backend unavailable: {message}")]
    Backend { message: String },
}

/// Notarization (and witness/signing) failures, surfaced to the caller.
#[derive(Debug, Error)]
pub enum NotarizationError {
    #[error("notary service is not initialized")]
    NotInitialized,

    #[error("invalid metadata: {reason}")]
    InvalidMetadata { reason: String },

    #[error("failed to fingerprint {path}: {message}")]
    Fingerprint { path: String, message: String },

    #[error("notarization rejected: {reason}")]
    Rejected { reason: String },

    #[error("notary backend unreachable: {message}")]
    Unreachable { message: String },

    #[error("unknown notarization: {notarization_id}")]
    UnknownNotarization { notarization_id: String },
}

impl NotarizationError {
    /// Transient errors worth retrying as-is.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }

    fn from_backend(err: BackendError) -> Self {
        match err {
            BackendError::Unreachable { message } => Self::Unreachable { message },
            BackendError::Rejected { reason } => Self::Rejected { reason },
            BackendError::UnknownNotarization { notarization_id } => {
                Self::UnknownNotarization { notarization_id }
            }
        }
    }
}

/// Verification failure. Never escapes the service: every variant is
/// absorbed into an `error`-status [`VerificationOutcome`].
#[derive(Debug, Error)]
enum VerificationError {
    #[error("notary service is not initialized")]
    NotInitialized,

    #[error("failed to fingerprint {path}: {message}")]
    Fingerprint { path: String, message: String },

    #[error(transparent)]
    Backend(#[from] BackendError),
}

/// Message shown for a confirmed exact-fingerprint match.
pub const MSG_VERIFIED: &str = "Document is authentic and unmodified";
/// Message shown when no notarization matches.
pub const MSG_UNVERIFIED: &str = "No verification record found";
/// Message shown when verification could not complete.
pub const MSG_ERROR: &str = "Verification failed";

/// The proof service. Construct one per backend and inject it where
/// needed; it carries no global state.
pub struct NotaryService {
    backend: Arc<dyn NotaryBackend>,
    initialized: AtomicBool,
}

impl NotaryService {
    pub fn new(backend: Arc<dyn NotaryBackend>) -> Self {
        Self {
            backend,
            initialized: AtomicBool::new(false),
        }
    }

    /// Establish backend connectivity.
    ///
    /// Idempotent: the first successful call flips the service into the
    /// initialized state; later calls return `Ok` without touching the
    /// backend again, so it is safe to call on every app launch.
    pub async fn initialize(&self) -> Result<(), InitError> {
        if self.initialized.load(Ordering::Acquire) {
            return Ok(());
        }
        self.backend
            .connect()
            .await
            .map_err(|e| InitError::Backend {
                message: e.to_string(),
            })?;
        self.initialized.store(true, Ordering::Release);
        info!("notary backend initialized");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Fingerprint the file at `file_path` and register it with the
    /// backend. Does not touch any stored record; the caller constructs
    /// and persists one from the returned proof.
    pub async fn notarize(
        &self,
        file_path: &str,
        metadata: &NotarizeMetadata,
    ) -> Result<Proof, NotarizationError> {
        if !self.is_initialized() {
            return Err(NotarizationError::NotInitialized);
        }
        if metadata.title.trim().is_empty() {
            return Err(NotarizationError::InvalidMetadata {
                reason: "title must not be empty".to_string(),
            });
        }
        if metadata.author.trim().is_empty() {
            return Err(NotarizationError::InvalidMetadata {
                reason: "author must not be empty".to_string(),
            });
        }

        let fingerprint = digest::fingerprint_file(file_path).await.map_err(|e| {
            NotarizationError::Fingerprint {
                path: file_path.to_string(),
                message: e.to_string(),
            }
        })?;
        debug!(%fingerprint, "submitting notarization");

        let proof = self
            .backend
            .notarize(&fingerprint, metadata)
            .await
            .map_err(NotarizationError::from_backend)?;
        info!(notarization_id = %proof.notarization_id, "document notarized");
        Ok(proof)
    }

    /// Check whether a matching notarization exists for the file at
    /// `file_path`.
    ///
    /// Total over its input domain: a nonexistent path, an unreadable
    /// file, or an unreachable backend all resolve to an `error`-status
    /// outcome rather than an error.
    pub async fn verify(&self, file_path: &str) -> VerificationOutcome {
        match self.verify_inner(file_path).await {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(path = file_path, error = %err, "verification failed");
                VerificationOutcome {
                    is_valid: false,
                    status: DocumentStatus::Error,
                    message: MSG_ERROR.to_string(),
                    document: None,
                }
            }
        }
    }

    async fn verify_inner(
        &self,
        file_path: &str,
    ) -> Result<VerificationOutcome, VerificationError> {
        if !self.is_initialized() {
            return Err(VerificationError::NotInitialized);
        }
        let fingerprint = digest::fingerprint_file(file_path).await.map_err(|e| {
            VerificationError::Fingerprint {
                path: file_path.to_string(),
                message: e.to_string(),
            }
        })?;

        let outcome = match self.backend.lookup(&fingerprint).await? {
            Some(_proof) => VerificationOutcome {
                is_valid: true,
                status: DocumentStatus::Verified,
                message: MSG_VERIFIED.to_string(),
                document: None,
            },
            None => VerificationOutcome {
                is_valid: false,
                status: DocumentStatus::Unverified,
                message: MSG_UNVERIFIED.to_string(),
                document: None,
            },
        };
        debug!(%fingerprint, status = %outcome.status, "verification completed");
        Ok(outcome)
    }

    /// Solicit additional confirmations for an existing notarization.
    /// The confirmations themselves arrive asynchronously on the ledger;
    /// only a failure to start the request is reported here.
    pub async fn request_witnesses(
        &self,
        notarization_id: &str,
    ) -> Result<(), NotarizationError> {
        if !self.is_initialized() {
            return Err(NotarizationError::NotInitialized);
        }
        self.backend
            .request_witnesses(notarization_id)
            .await
            .map_err(NotarizationError::from_backend)
    }

    /// Sign an arbitrary payload with the backend identity key.
    pub async fn sign(&self, payload: &str) -> Result<String, NotarizationError> {
        if !self.is_initialized() {
            return Err(NotarizationError::NotInitialized);
        }
        self.backend
            .sign(payload)
            .await
            .map_err(NotarizationError::from_backend)
    }
}
