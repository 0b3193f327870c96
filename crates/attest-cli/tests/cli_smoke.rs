//! Smoke tests for the `attest` binary over a temp file store.

use assert_cmd::Command;
use predicates::prelude::*;

fn attest(store: &str) -> Command {
    let mut cmd = Command::cargo_bin("attest").unwrap();
    cmd.arg("--store").arg(store);
    cmd
}

fn file_store(dir: &tempfile::TempDir) -> String {
    format!("file://{}", dir.path().display())
}

#[test]
fn test_list_starts_empty() {
    let dir = tempfile::tempdir().unwrap();
    attest(&file_store(&dir))
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no documents"));
}

#[test]
fn test_notarize_verify_rm_roundtrip() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    let doc = dir.path().join("thesis.pdf");
    std::fs::write(&doc, b"thesis contents").unwrap();

    attest(&store)
        .arg("notarize")
        .arg(&doc)
        .args(["--author", "Ada", "--institution", "MIT"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Notarized thesis.pdf"));

    attest(&store)
        .arg("verify")
        .arg(&doc)
        .assert()
        .success()
        .stdout(predicate::str::contains("authentic and unmodified"));

    // A tampered copy is unverified, with its own exit code.
    let tampered = dir.path().join("tampered.pdf");
    std::fs::write(&tampered, b"thesis contents (edited)").unwrap();
    attest(&store)
        .arg("verify")
        .arg(&tampered)
        .assert()
        .code(3)
        .stdout(predicate::str::contains("No verification record found"));

    // Pull the id out of the JSON listing, then delete it.
    let output = attest(&store).args(["list", "--json"]).output().unwrap();
    let documents: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    let id = documents[0]["id"].as_str().unwrap().to_string();

    attest(&store)
        .arg("show")
        .arg(&id)
        .assert()
        .success()
        .stdout(predicate::str::contains("Verified"));

    attest(&store).arg("rm").arg(&id).assert().success();
    attest(&store)
        .arg("list")
        .assert()
        .success()
        .stdout(predicate::str::contains("no documents"));
}

#[test]
fn test_verify_missing_file_reports_an_error_outcome() {
    let dir = tempfile::tempdir().unwrap();
    attest(&file_store(&dir))
        .arg("verify")
        .arg("/no/such/file.pdf")
        .assert()
        .code(1)
        .stdout(predicate::str::contains("Verification failed"));
}

#[test]
fn test_show_unknown_id_exits_not_found() {
    let dir = tempfile::tempdir().unwrap();
    attest(&file_store(&dir))
        .arg("show")
        .arg("doc_missing")
        .assert()
        .code(2)
        .stderr(predicate::str::contains("not found"));
}

#[test]
fn test_clear_requires_confirmation() {
    let dir = tempfile::tempdir().unwrap();
    let store = file_store(&dir);

    attest(&store)
        .arg("clear")
        .assert()
        .code(1)
        .stderr(predicate::str::contains("--yes"));
    attest(&store).args(["clear", "--yes"]).assert().success();
}
