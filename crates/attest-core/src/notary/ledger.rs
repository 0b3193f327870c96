//! Shared primitives for the local ledger backends.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use ed25519_dalek::{Signer, SigningKey};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Detached ed25519 signature over `payload`, base64-encoded.
pub(crate) fn sign_detached(key: &SigningKey, payload: &[u8]) -> String {
    BASE64.encode(key.sign(payload).to_bytes())
}

/// Aggregation root anchoring a single notarization:
/// `sha256(fingerprint || notarization_id)`.
pub(crate) fn merkle_root(fingerprint: &str, notarization_id: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(fingerprint.as_bytes());
    hasher.update(notarization_id.as_bytes());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}

pub(crate) fn new_notarization_id() -> String {
    format!("ntr_{}", Uuid::now_v7().simple())
}

pub(crate) fn new_witness_id() -> String {
    format!("wtn_{}", Uuid::now_v7().simple())
}
