//! Notarization backend port.
//!
//! Everything the core relies on from a notarization backend is this
//! trait. Implementations are constructed explicitly and injected into
//! [`NotaryService`](super::NotaryService); there is no process-wide
//! singleton. The in-memory and file ledgers in this crate satisfy the
//! port for local use; a remote client satisfies it for production.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::Proof;

/// Metadata submitted alongside a fingerprint at notarization time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotarizeMetadata {
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
}

impl NotarizeMetadata {
    pub fn new(title: impl Into<String>, author: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            author: author.into(),
            institution: None,
        }
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }
}

/// Errors a backend can report.
#[derive(Debug, Error)]
pub enum BackendError {
    /// The backend (or its medium) could not be reached.
    #[error("backend unreachable: {message}")]
    Unreachable { message: String },

    /// The backend refused the submission.
    #[error("notarization rejected: {reason}")]
    Rejected { reason: String },

    /// No notarization with that id exists on the ledger.
    #[error("unknown notarization: {notarization_id}")]
    UnknownNotarization { notarization_id: String },
}

impl BackendError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, Self::Unreachable { .. })
    }
}

/// The notarization backend contract.
#[async_trait]
pub trait NotaryBackend: Send + Sync {
    /// Establish connectivity/configuration. Called once by
    /// [`NotaryService::initialize`](super::NotaryService::initialize);
    /// implementations may assume it completes before other operations.
    async fn connect(&self) -> Result<(), BackendError>;

    /// Register `fingerprint` with `metadata`; returns the full proof
    /// bundle. Must either return a complete proof or fail — never a
    /// partial one.
    async fn notarize(
        &self,
        fingerprint: &str,
        metadata: &NotarizeMetadata,
    ) -> Result<Proof, BackendError>;

    /// Exact-fingerprint lookup. `None` when nothing matches; near-misses
    /// do not count.
    async fn lookup(&self, fingerprint: &str) -> Result<Option<Proof>, BackendError>;

    /// Solicit additional confirmations for an existing notarization.
    /// Fire-and-forget from the caller's perspective, but failure to start
    /// the request is reported.
    async fn request_witnesses(&self, notarization_id: &str) -> Result<(), BackendError>;

    /// Sign an arbitrary payload with the backend identity key.
    async fn sign(&self, payload: &str) -> Result<String, BackendError>;
}
