//! # CLI Tests
//!
//! Runs the `autotag` binary end to end: argument validation, configuration
//! errors and a full tagging pass against a mock vision endpoint.

use assert_cmd::prelude::*;
use autotag::constants::{NS_DC, NS_PHOTOSHOP};
use autotag::providers::metadata::{MetadataFile, MetadataStore};
use autotag::MetadataFields;
use autotag_test_utils::write_test_image;
use autotag_xmp::XmpStore;
use predicates::prelude::*;
use serde_json::json;
use std::process::Command;
use tempfile::tempdir;
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// A command with a clean environment and working directory, so no stray
/// `autotag.yml`, `.env` or `AUTOTAG_*` variable leaks into the test.
fn autotag_cmd(dir: &std::path::Path) -> Command {
    let mut cmd = Command::cargo_bin("autotag").unwrap();
    cmd.current_dir(dir)
        .env_remove("AUTOTAG_API_KEY")
        .env_remove("AUTOTAG_API_URL")
        .env("RUST_LOG", "info");
    cmd
}

#[test]
fn test_rejects_confidence_out_of_range() {
    // Arrange
    let dir = tempdir().unwrap();

    // Act & Assert
    autotag_cmd(dir.path())
        .args(["--key", "k", "--caption-confidence-level", "1.5", "photo.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}

#[test]
fn test_accepts_camel_case_alias() {
    let dir = tempdir().unwrap();

    autotag_cmd(dir.path())
        .args(["--key", "k", "--tagConfidenceLevel", "-0.2", "photo.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}

#[test]
fn test_rejects_resize_width_at_limit() {
    let dir = tempdir().unwrap();

    autotag_cmd(dir.path())
        .args(["--key", "k", "--resize-width", "10000", "photo.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("must be less than 10000"));
}

#[test]
fn test_rejects_unknown_reconciliation_mode() {
    let dir = tempdir().unwrap();

    autotag_cmd(dir.path())
        .args(["--key", "k", "--reconciliation-mode", "replace-all", "photo.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("replace-all"));
}

#[test]
fn test_requires_input_files() {
    let dir = tempdir().unwrap();

    autotag_cmd(dir.path())
        .args(["--key", "k"])
        .assert()
        .failure();
}

#[test]
fn test_missing_api_key() {
    let dir = tempdir().unwrap();

    autotag_cmd(dir.path())
        .arg("photo.jpg")
        .assert()
        .failure()
        .stderr(predicate::str::contains("API key is required"));
}

#[test]
fn test_invalid_threshold_in_config_file() {
    // Arrange
    let dir = tempdir().unwrap();
    std::fs::write(dir.path().join("autotag.yml"), "tag_threshold: 2.0\n").unwrap();

    // Act & Assert
    autotag_cmd(dir.path())
        .args(["--key", "k", "photo.jpg"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("outside [0, 1]"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_missing_input_file_is_reported() {
    // Arrange
    let dir = tempdir().unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    // Act & Assert
    autotag_cmd(dir.path())
        .args(["--key", "k", "--api-url", &server.uri(), "missing.jpg"])
        .assert()
        .failure()
        .stdout(predicate::str::contains("Tagged 0 of 1 files."))
        .stderr(predicate::str::contains("1 of 1 files failed"));
}

#[tokio::test(flavor = "multi_thread")]
async fn test_tags_image_end_to_end() {
    // --- Arrange ---
    let dir = tempdir().unwrap();
    let image = write_test_image(dir.path(), "photo.jpg", 1200, 900).unwrap();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/vision/v1.0/analyze"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "categories": [
                { "name": "animal_cat", "score": 0.93 },
                { "name": "indoor_", "score": 0.4 }
            ],
            "tags": [
                { "name": "cat", "confidence": 0.99 },
                { "name": "blurry", "confidence": 0.05 }
            ],
            "description": {
                "captions": [{ "text": "a cat sitting on a mat", "confidence": 0.91 }]
            }
        })))
        .expect(1)
        .mount(&server)
        .await;

    // --- Act ---
    autotag_cmd(dir.path())
        .args([
            "--key",
            "test-key",
            "--api-url",
            &format!("{}/vision/v1.0/analyze", server.uri()),
            "--reconciliation-mode",
            "replace-top",
        ])
        .arg(&image)
        .assert()
        .success()
        .stdout(predicate::str::contains("Tagged 1 of 1 files."));

    // --- Assert ---
    let store = XmpStore::new(MetadataFields::default()).unwrap();
    let mut file = store.open(&image).unwrap();
    let doc = file.read().unwrap();
    file.close();

    assert_eq!(doc.text(NS_DC, "description"), Some("a cat sitting on a mat"));
    assert_eq!(
        doc.array_items(NS_PHOTOSHOP, "SupplementalCategories"),
        ["animal_cat"]
    );
    assert_eq!(doc.array_items(NS_DC, "subject"), ["cat"]);
}
