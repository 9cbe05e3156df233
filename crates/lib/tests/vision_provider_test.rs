//! # Vision Provider Tests
//!
//! Exercises the Azure provider against a mock HTTP server.

use anyhow::Result;
use autotag::providers::vision::{azure::AzureVisionProvider, VisionProvider};
use autotag::TagError;
use serde_json::json;
use std::sync::Once;
use wiremock::matchers::{body_bytes, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

static INIT: Once = Once::new();

/// Initializes tracing for tests.
pub fn setup_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt::init();
    });
}

fn analyze_response() -> serde_json::Value {
    json!({
        "categories": [{ "name": "animal_cat", "score": 0.93 }],
        "tags": [
            { "name": "cat", "confidence": 0.99 },
            { "name": "indoor", "confidence": 0.87 }
        ],
        "description": {
            "tags": ["cat", "sitting"],
            "captions": [{ "text": "a cat sitting on a mat", "confidence": 0.91 }]
        },
        "requestId": "0d6a5f1c-0000-0000-0000-000000000000",
        "metadata": { "width": 800, "height": 600, "format": "Jpeg" }
    })
}

#[tokio::test]
async fn test_analyze_success() -> Result<()> {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    let payload = b"fake-jpeg-bytes".to_vec();

    Mock::given(method("POST"))
        .and(path("/vision/v1.0/analyze"))
        .and(query_param("visualFeatures", "Categories,Tags,Description"))
        .and(header("Ocp-Apim-Subscription-Key", "test-key"))
        .and(header("Content-Type", "application/octet-stream"))
        .and(body_bytes(payload.clone()))
        .respond_with(ResponseTemplate::new(200).set_body_json(analyze_response()))
        .expect(1)
        .mount(&server)
        .await;

    let provider = AzureVisionProvider::new(
        format!("{}/vision/v1.0/analyze", server.uri()),
        "test-key".to_string(),
    )?;

    // --- 2. Act ---
    let result = provider.analyze(&payload).await?;

    // --- 3. Assert ---
    let caption = result.primary_caption()?;
    assert_eq!(caption.text, "a cat sitting on a mat");
    assert!((caption.confidence - 0.91).abs() < f64::EPSILON);
    assert_eq!(result.categories()?[0].name, "animal_cat");
    let tag_names: Vec<&str> = result.tags()?.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(tag_names, vec!["cat", "indoor"]);

    Ok(())
}

#[tokio::test]
async fn test_analyze_error_status() -> Result<()> {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(401).set_body_string(r#"{"code":"Unspecified","message":"Access denied due to invalid subscription key."}"#),
        )
        .mount(&server)
        .await;

    let provider = AzureVisionProvider::new(server.uri(), "wrong-key".to_string())?;

    // --- 2. Act ---
    let err = provider.analyze(b"bytes").await.unwrap_err();

    // --- 3. Assert ---
    match err {
        TagError::VisionApi { status, body } => {
            assert_eq!(status, 401);
            assert!(body.contains("invalid subscription key"));
        }
        other => panic!("expected VisionApi, got {other:?}"),
    }

    Ok(())
}

#[tokio::test]
async fn test_analyze_undecodable_body() -> Result<()> {
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let provider = AzureVisionProvider::new(server.uri(), "key".to_string())?;
    let err = provider.analyze(b"bytes").await.unwrap_err();

    assert!(matches!(err, TagError::VisionDeserialization(_)), "got {err:?}");
    Ok(())
}

#[tokio::test]
async fn test_analyze_missing_sections_decode_as_absent() -> Result<()> {
    // A response without captions decodes fine; the reconciler reports it later.
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": { "captions": [] },
            "tags": []
        })))
        .mount(&server)
        .await;

    let provider = AzureVisionProvider::new(server.uri(), "key".to_string())?;
    let result = provider.analyze(b"bytes").await?;

    assert!(matches!(result.primary_caption(), Err(TagError::MalformedResult(_))));
    assert!(matches!(result.categories(), Err(TagError::MalformedResult(_))));
    assert!(result.tags()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_analyze_entry_without_confidence_is_malformed() -> Result<()> {
    // --- 1. Arrange ---
    setup_tracing();
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "description": { "captions": [{ "text": "a cat" }] },
            "categories": [{ "name": "animal_cat", "score": 0.93 }],
            "tags": [{ "confidence": 0.99 }]
        })))
        .mount(&server)
        .await;

    let provider = AzureVisionProvider::new(server.uri(), "key".to_string())?;

    // --- 2. Act ---
    let err = provider.analyze(b"bytes").await.unwrap_err();

    // --- 3. Assert ---
    match err {
        TagError::MalformedResult(message) => assert!(message.contains("missing field")),
        other => panic!("expected MalformedResult, got {other:?}"),
    }
    Ok(())
}

#[test]
fn test_empty_api_key_is_rejected() {
    let result = AzureVisionProvider::new("http://localhost".to_string(), "  ".to_string());
    assert!(matches!(result, Err(TagError::MissingApiKey)));
}
