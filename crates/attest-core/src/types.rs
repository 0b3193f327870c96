//! Document registry types.
//!
//! [`DocumentRecord`] is the persisted unit; [`Proof`] is the evidence
//! bundle returned by a successful notarization. The wire format is JSON
//! with camelCase keys and integer millisecond timestamps, matching the
//! data already stored by deployed app installs. Absent optional fields are
//! omitted from the serialized form, so an absent `witnesses` ("not
//! applicable") stays distinct from an explicit `0`.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Verification state of a document. No other values are permitted; the
/// status drives both storage semantics and UI affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// An exact fingerprint match was confirmed by the notarization backend.
    Verified,
    /// No notarization record matches the fingerprint.
    Unverified,
    /// A notarization or verification request is still in flight.
    Pending,
    /// The last attempt failed before producing a verdict.
    Error,
}

impl DocumentStatus {
    /// Stable lowercase name, identical to the serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Unverified => "unverified",
            Self::Pending => "pending",
            Self::Error => "error",
        }
    }

    /// Presentation attributes for this status.
    ///
    /// This is the single source of truth for how a status renders; every
    /// consuming surface (list rows, badges, result screens) reads from
    /// here instead of carrying its own mapping.
    pub fn presentation(&self) -> StatusPresentation {
        match self {
            Self::Verified => StatusPresentation {
                label: "Verified",
                icon: "✓",
                tone: "success",
            },
            Self::Unverified => StatusPresentation {
                label: "Unverified",
                icon: "⚠",
                tone: "error",
            },
            Self::Pending => StatusPresentation {
                label: "Pending",
                icon: "⟳",
                tone: "warning",
            },
            Self::Error => StatusPresentation {
                label: "Error",
                icon: "✕",
                tone: "error",
            },
        }
    }
}

impl std::fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a [`DocumentStatus`] renders: badge label, glyph, and color tone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusPresentation {
    pub label: &'static str,
    pub icon: &'static str,
    /// Semantic color key (`success`, `warning`, `error`); themes resolve
    /// it to concrete colors.
    pub tone: &'static str,
}

/// An independent party that attested to a notarization event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Witness {
    /// Unique witness identifier.
    pub id: String,
    /// Signature over the notarization, opaque to this crate.
    pub signature: String,
    /// When the attestation was made, ms since epoch.
    pub timestamp: i64,
}

/// Evidence bundle returned by a successful notarization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Proof {
    /// Ledger-assigned unique identifier.
    pub notarization_id: String,
    /// Signature over the document fingerprint.
    pub signature: String,
    /// Issuer-assigned timestamp, ms since epoch. May differ from the
    /// record's own timestamp when set independently.
    pub timestamp: i64,
    /// Confirmations collected so far, in attestation order.
    pub witnesses: Vec<Witness>,
    /// Root hash of the aggregation structure the proof is anchored in.
    pub merkle_root: String,
}

/// The persisted unit: one verifiable document and its proof metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRecord {
    /// Opaque unique id, generated at creation, immutable. Primary key in
    /// the store.
    pub id: String,
    pub title: String,
    pub author: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    /// When this document was notarized or verified, ms since epoch.
    /// Immutable after creation; this is not a "last modified" field.
    pub timestamp: i64,
    /// Content fingerprint of the underlying file
    /// (`"sha256:" + lowercase hex`).
    pub hash: String,
    pub status: DocumentStatus,
    /// Count of independent confirmations. Absent means "not applicable";
    /// `Some(0)` means "applicable, none yet".
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witnesses: Option<u32>,
    /// URI/path of the underlying file blob. The record does not own the
    /// file's lifecycle.
    pub file_path: String,
    /// Size of the underlying file in bytes.
    pub file_size: u64,
    /// Page count, set only when the file was paginated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    /// Notarization proof; present only for notarized/verified records.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl DocumentRecord {
    /// Create a record with the required fields; optional fields are set
    /// via the `with_*` builders.
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        timestamp: i64,
        hash: impl Into<String>,
        status: DocumentStatus,
        file_path: impl Into<String>,
        file_size: u64,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            author: author.into(),
            institution: None,
            timestamp,
            hash: hash.into(),
            status,
            witnesses: None,
            file_path: file_path.into(),
            file_size,
            page_count: None,
            proof: None,
        }
    }

    pub fn with_institution(mut self, institution: impl Into<String>) -> Self {
        self.institution = Some(institution.into());
        self
    }

    pub fn with_witnesses(mut self, witnesses: u32) -> Self {
        self.witnesses = Some(witnesses);
        self
    }

    pub fn with_page_count(mut self, page_count: u32) -> Self {
        self.page_count = Some(page_count);
        self
    }

    pub fn with_proof(mut self, proof: Proof) -> Self {
        self.proof = Some(proof);
        self
    }

    /// Check the record invariants.
    ///
    /// A `verified` status is a trust signal shown to end users, so a
    /// verified record must carry its proof and a non-empty fingerprint,
    /// and a witness count (when present) must agree with the proof's
    /// witness list.
    pub fn validate(&self) -> Result<(), InvalidRecord> {
        if self.id.trim().is_empty() {
            return Err(InvalidRecord::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(InvalidRecord::EmptyField { field: "title" });
        }
        if self.author.trim().is_empty() {
            return Err(InvalidRecord::EmptyField { field: "author" });
        }
        if self.status == DocumentStatus::Verified {
            if self.proof.is_none() {
                return Err(InvalidRecord::VerifiedWithoutProof);
            }
            if self.hash.trim().is_empty() {
                return Err(InvalidRecord::VerifiedWithoutHash);
            }
        }
        if let (Some(count), Some(proof)) = (self.witnesses, &self.proof) {
            let proof_count = proof.witnesses.len() as u32;
            if count != proof_count {
                return Err(InvalidRecord::WitnessMismatch { count, proof_count });
            }
        }
        Ok(())
    }
}

/// Record invariant violations, rejected at the storage boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidRecord {
    #[error("record id must not be empty")]
    EmptyId,

    #[error("{field} must be a non-empty display string")]
    EmptyField { field: &'static str },

    #[error("verified record is missing its proof")]
    VerifiedWithoutProof,

    #[error("verified record has an empty hash")]
    VerifiedWithoutHash,

    #[error("witness count {count} does not match proof witnesses {proof_count}")]
    WitnessMismatch { count: u32, proof_count: u32 },
}

/// Transient result of a verification request.
///
/// `status` is constrained to `verified | unverified | error`; the service
/// never reports `pending` through this type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationOutcome {
    pub is_valid: bool,
    pub status: DocumentStatus,
    /// Human-readable summary, safe to display as-is.
    pub message: String,
    /// The persisted record matching the confirmed fingerprint, when one
    /// is known to the caller.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub document: Option<DocumentRecord>,
}

/// Partial-field merge applied by `update`.
///
/// `None` leaves the stored field untouched; fields that are immutable
/// after creation (`id`, `timestamp`, `hash`, `file_path`, `file_size`)
/// are deliberately not patchable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub institution: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<DocumentStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub witnesses: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page_count: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub proof: Option<Proof>,
}

impl DocumentPatch {
    /// Patch that only moves the status (the common `pending -> verified`
    /// transition).
    pub fn status(status: DocumentStatus) -> Self {
        Self {
            status: Some(status),
            ..Self::default()
        }
    }

    /// Merge this patch over `record`, field by field.
    pub fn apply(&self, record: &mut DocumentRecord) {
        if let Some(title) = &self.title {
            record.title = title.clone();
        }
        if let Some(author) = &self.author {
            record.author = author.clone();
        }
        if let Some(institution) = &self.institution {
            record.institution = Some(institution.clone());
        }
        if let Some(status) = self.status {
            record.status = status;
        }
        if let Some(witnesses) = self.witnesses {
            record.witnesses = Some(witnesses);
        }
        if let Some(page_count) = self.page_count {
            record.page_count = Some(page_count);
        }
        if let Some(proof) = &self.proof {
            record.proof = Some(proof.clone());
        }
    }

    /// True when the patch would not change anything.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proof_with_witnesses(n: usize) -> Proof {
        Proof {
            notarization_id: "ntr_test".to_string(),
            signature: "sig".to_string(),
            timestamp: 1_700_000_000_000,
            witnesses: (0..n)
                .map(|i| Witness {
                    id: format!("wtn_{i}"),
                    signature: format!("wsig_{i}"),
                    timestamp: 1_700_000_000_000,
                })
                .collect(),
            merkle_root: "sha256:root".to_string(),
        }
    }

    fn verified_record() -> DocumentRecord {
        DocumentRecord::new(
            "doc_1",
            "Thesis",
            "Ada",
            1_700_000_000_000,
            "sha256:abc",
            DocumentStatus::Verified,
            "/tmp/thesis.pdf",
            1024,
        )
        .with_proof(proof_with_witnesses(0))
    }

    // === Serde shape ===

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&DocumentStatus::Verified).unwrap(),
            "\"verified\""
        );
        assert_eq!(
            serde_json::from_str::<DocumentStatus>("\"pending\"").unwrap(),
            DocumentStatus::Pending
        );
    }

    #[test]
    fn test_absent_witnesses_is_omitted_from_json() {
        let record = verified_record();
        let json = serde_json::to_string(&record).unwrap();
        assert!(!json.contains("\"witnesses\":"), "json: {json}");
    }

    #[test]
    fn test_zero_witnesses_is_kept_in_json() {
        let record = verified_record().with_witnesses(0);
        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"witnesses\":0"), "json: {json}");
    }

    #[test]
    fn test_record_roundtrip_preserves_absent_vs_zero() {
        let absent = verified_record();
        let zero = verified_record().with_witnesses(0);

        let absent2: DocumentRecord =
            serde_json::from_str(&serde_json::to_string(&absent).unwrap()).unwrap();
        let zero2: DocumentRecord =
            serde_json::from_str(&serde_json::to_string(&zero).unwrap()).unwrap();

        assert_eq!(absent2.witnesses, None);
        assert_eq!(zero2.witnesses, Some(0));
    }

    #[test]
    fn test_wire_keys_are_camel_case() {
        let json = serde_json::to_string(&verified_record().with_page_count(12)).unwrap();
        assert!(json.contains("\"filePath\""));
        assert!(json.contains("\"fileSize\""));
        assert!(json.contains("\"pageCount\""));
        assert!(json.contains("\"notarizationId\""));
        assert!(json.contains("\"merkleRoot\""));
    }

    // === Invariants ===

    #[test]
    fn test_validate_accepts_well_formed_record() {
        verified_record().validate().unwrap();
    }

    #[test]
    fn test_validate_rejects_empty_display_fields() {
        let mut record = verified_record();
        record.title = "  ".to_string();
        assert_eq!(
            record.validate(),
            Err(InvalidRecord::EmptyField { field: "title" })
        );

        let mut record = verified_record();
        record.author = String::new();
        assert_eq!(
            record.validate(),
            Err(InvalidRecord::EmptyField { field: "author" })
        );
    }

    #[test]
    fn test_validate_rejects_verified_without_proof() {
        let mut record = verified_record();
        record.proof = None;
        assert_eq!(record.validate(), Err(InvalidRecord::VerifiedWithoutProof));
    }

    #[test]
    fn test_validate_rejects_verified_without_hash() {
        let mut record = verified_record();
        record.hash = String::new();
        assert_eq!(record.validate(), Err(InvalidRecord::VerifiedWithoutHash));
    }

    #[test]
    fn test_validate_rejects_witness_count_mismatch() {
        let record = verified_record()
            .with_proof(proof_with_witnesses(2))
            .with_witnesses(3);
        assert_eq!(
            record.validate(),
            Err(InvalidRecord::WitnessMismatch {
                count: 3,
                proof_count: 2
            })
        );
    }

    #[test]
    fn test_validate_allows_unverified_without_proof() {
        let mut record = verified_record();
        record.status = DocumentStatus::Pending;
        record.proof = None;
        record.validate().unwrap();
    }

    // === Patch semantics ===

    #[test]
    fn test_patch_merges_only_set_fields() {
        let mut record = verified_record();
        record.status = DocumentStatus::Pending;
        record.proof = None;

        let patch = DocumentPatch {
            status: Some(DocumentStatus::Verified),
            witnesses: Some(2),
            proof: Some(proof_with_witnesses(2)),
            ..DocumentPatch::default()
        };
        patch.apply(&mut record);

        assert_eq!(record.status, DocumentStatus::Verified);
        assert_eq!(record.witnesses, Some(2));
        assert!(record.proof.is_some());
        // Untouched fields survive the merge.
        assert_eq!(record.title, "Thesis");
        assert_eq!(record.author, "Ada");
    }

    #[test]
    fn test_empty_patch_is_detectable() {
        assert!(DocumentPatch::default().is_empty());
        assert!(!DocumentPatch::status(DocumentStatus::Error).is_empty());
    }

    // === Presentation table ===

    #[test]
    fn test_presentation_covers_every_status() {
        for status in [
            DocumentStatus::Verified,
            DocumentStatus::Unverified,
            DocumentStatus::Pending,
            DocumentStatus::Error,
        ] {
            let p = status.presentation();
            assert!(!p.label.is_empty());
            assert!(!p.icon.is_empty());
            assert!(matches!(p.tone, "success" | "warning" | "error"));
        }
    }

    #[test]
    fn test_display_matches_serialized_form() {
        assert_eq!(DocumentStatus::Unverified.to_string(), "unverified");
    }
}
