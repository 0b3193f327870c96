//! End-to-end flows over the real file-backed stack.
//!
//! Wires a FileLedgerNotary and a JsonFileStore the way the app does, then
//! exercises the notarize -> persist -> verify lifecycle, the storage
//! invariants, and the single-writer concurrency guarantee.

use std::io::Write as _;
use std::sync::Arc;

use attest_core::{
    record_from_proof, DocumentController, DocumentPatch, DocumentStatus, FileLedgerNotary,
    JsonFileStore, NotarizeMetadata, NotaryService, StoreWriter,
};

struct Harness {
    controller: DocumentController,
    _dir: tempfile::TempDir,
}

async fn harness() -> Harness {
    let dir = tempfile::tempdir().unwrap();
    let notary = NotaryService::new(Arc::new(FileLedgerNotary::new(dir.path())));
    notary.initialize().await.unwrap();
    let writer = StoreWriter::spawn(JsonFileStore::new(dir.path()));
    let controller = DocumentController::new(notary, writer).await.unwrap();
    Harness {
        controller,
        _dir: dir,
    }
}

fn temp_document(content: &[u8]) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content).unwrap();
    file.flush().unwrap();
    file
}

fn metadata() -> NotarizeMetadata {
    NotarizeMetadata::new("Paper", "Ada")
}

// Scenario A: notarize, build a record, persist, reload.
#[tokio::test]
async fn test_notarize_persist_reload() {
    let h = harness().await;
    let file = temp_document(b"a.pdf body");
    let path = file.path().to_str().unwrap();

    let proof = h
        .controller
        .notarize_and_track(path, &metadata())
        .await
        .unwrap();
    assert!(!proof.notarization_id.is_empty());
    assert!(!proof.signature.is_empty());
    assert!(!proof.merkle_root.is_empty());

    let record = record_from_proof(path, &metadata(), &proof).await.unwrap();
    h.controller.persist(record).await.unwrap();

    h.controller.refresh().await.unwrap();
    let documents = h.controller.documents();
    assert_eq!(documents.len(), 1);
    assert_eq!(documents[0].status, DocumentStatus::Verified);
    assert!(documents[0].proof.is_some());
}

// Scenario B: verifying a file with no matching notarization.
#[tokio::test]
async fn test_verify_unknown_file_is_unverified() {
    let h = harness().await;
    let file = temp_document(b"unknown.pdf body");

    let outcome = h
        .controller
        .verify_and_track(file.path().to_str().unwrap())
        .await;
    assert!(!outcome.is_valid);
    assert_eq!(outcome.status, DocumentStatus::Unverified);
}

// Scenario C: updating a nonexistent id leaves the collection unchanged.
#[tokio::test]
async fn test_update_nonexistent_id_changes_nothing() {
    let h = harness().await;
    let file = temp_document(b"persisted body");
    let path = file.path().to_str().unwrap();

    let proof = h
        .controller
        .notarize_and_track(path, &metadata())
        .await
        .unwrap();
    let record = record_from_proof(path, &metadata(), &proof).await.unwrap();
    h.controller.persist(record).await.unwrap();
    let before = h.controller.documents();

    let err = h
        .controller
        .amend(
            "nonexistent-id",
            DocumentPatch {
                title: Some("X".to_string()),
                ..DocumentPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(err.is_not_found());

    h.controller.refresh().await.unwrap();
    assert_eq!(h.controller.documents(), before);
}

// Scenario D: concurrent saves issued without awaiting each other both
// survive the single-writer queue.
#[tokio::test]
async fn test_concurrent_saves_both_survive() {
    let h = harness().await;
    let file_a = temp_document(b"first document");
    let file_b = temp_document(b"second document");
    let path_a = file_a.path().to_str().unwrap();
    let path_b = file_b.path().to_str().unwrap();

    let proof_a = h
        .controller
        .notarize_and_track(path_a, &metadata())
        .await
        .unwrap();
    let proof_b = h
        .controller
        .notarize_and_track(path_b, &metadata())
        .await
        .unwrap();
    let record_a = record_from_proof(path_a, &metadata(), &proof_a).await.unwrap();
    let record_b = record_from_proof(path_b, &metadata(), &proof_b).await.unwrap();

    let (saved_a, saved_b) = tokio::join!(
        h.controller.persist(record_a.clone()),
        h.controller.persist(record_b.clone()),
    );
    saved_a.unwrap();
    saved_b.unwrap();

    h.controller.refresh().await.unwrap();
    let ids: Vec<String> = h.controller.documents().into_iter().map(|r| r.id).collect();
    assert!(ids.contains(&record_a.id));
    assert!(ids.contains(&record_b.id));
}

// The full user journey: notarize, persist, verify the same file, catch a
// tampered copy, then delete.
#[tokio::test]
async fn test_full_lifecycle() {
    let h = harness().await;
    let file = temp_document(b"final thesis v1");
    let path = file.path().to_str().unwrap();

    let proof = h
        .controller
        .notarize_and_track(path, &metadata())
        .await
        .unwrap();
    let record = record_from_proof(path, &metadata(), &proof).await.unwrap();
    let id = record.id.clone();
    h.controller.persist(record).await.unwrap();

    // The original verifies, and the outcome points back at our record.
    let outcome = h.controller.verify_and_track(path).await;
    assert!(outcome.is_valid);
    assert_eq!(outcome.document.unwrap().id, id);

    // A tampered copy does not.
    let tampered = temp_document(b"final thesis v1 (edited)");
    let outcome = h
        .controller
        .verify_and_track(tampered.path().to_str().unwrap())
        .await;
    assert!(!outcome.is_valid);
    assert_eq!(outcome.status, DocumentStatus::Unverified);

    h.controller.remove(&id).await.unwrap();
    h.controller.refresh().await.unwrap();
    assert!(h.controller.documents().is_empty());
}

// Witness solicitation lands on the ledger and shows up on re-notarize.
#[tokio::test]
async fn test_witness_flow() {
    let h = harness().await;
    let file = temp_document(b"witnessed thesis");
    let path = file.path().to_str().unwrap();

    let proof = h
        .controller
        .notarize_and_track(path, &metadata())
        .await
        .unwrap();
    assert!(proof.witnesses.is_empty());

    h.controller
        .notary()
        .request_witnesses(&proof.notarization_id)
        .await
        .unwrap();

    // Identical content resolves to the same ledger entry, now witnessed.
    let current = h
        .controller
        .notarize_and_track(path, &metadata())
        .await
        .unwrap();
    assert_eq!(current.notarization_id, proof.notarization_id);
    assert_eq!(current.witnesses.len(), 1);
}
