//! attest-core: document registry and verification-state management.
//!
//! Four parts, leaf-first:
//!
//! - [`types`] / [`format`] — the canonical record model and its display
//!   helpers
//! - [`notary`] — the proof service and the backend port it drives
//! - [`store`] — the durable keyed collection, mutated through a
//!   single-writer queue
//! - [`controller`] — the UI-facing orchestrator and its request state
//!   machine

pub mod controller;
pub mod digest;
pub mod format;
pub mod notary;
pub mod store;
pub mod types;

// Convenience re-exports
pub use controller::{record_from_proof, DocumentController, RequestPhase, TrackedOutcome};
pub use notary::{
    BackendError, FileLedgerNotary, InMemoryNotary, InitError, NotarizationError, NotaryBackend,
    NotarizeMetadata, NotaryService,
};
pub use store::{
    DocumentStore, JsonFileStore, MemoryStore, StorageError, StoreResult, StoreSpec, StoreWriter,
};
pub use types::{
    DocumentPatch, DocumentRecord, DocumentStatus, InvalidRecord, Proof, StatusPresentation,
    VerificationOutcome, Witness,
};
