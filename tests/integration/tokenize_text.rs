//! Text tokenize endpoint integration tests
//!
//! Tests for `POST /tokenize-text`.

use axum::{body::Bytes, http::StatusCode};
use serde_json::{json, Value};

use tally::EncoderRegistry;

use crate::common::{constants, test_server};

fn tokens_of(json: &Value) -> Vec<u64> {
    json["tokens"]
        .as_array()
        .expect("tokens should be an array")
        .iter()
        .map(|t| t.as_u64().expect("token ids are integers"))
        .collect()
}

#[tokio::test]
async fn test_tokenize_text_returns_count_and_tokens() {
    let server = test_server();

    let response = server
        .post("/tokenize-text")
        .json(&json!({"text": "hello world", "model": constants::TEST_MODEL}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();

    assert_eq!(json["model"], constants::TEST_MODEL);
    let token_count = json["token_count"].as_u64().unwrap();
    assert!(token_count > 0);
    assert_eq!(tokens_of(&json).len() as u64, token_count);
}

#[tokio::test]
async fn test_tokenize_text_matches_tokenizer() {
    let server = test_server();
    let text = "The quick brown fox jumps over the lazy dog.";

    let response = server
        .post("/tokenize-text")
        .json(&json!({"text": text, "model": constants::TEST_MODEL}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();

    let expected: Vec<u64> = EncoderRegistry::new()
        .encode(constants::TEST_MODEL, text)
        .unwrap()
        .into_iter()
        .map(u64::from)
        .collect();
    assert_eq!(tokens_of(&json), expected);
}

#[tokio::test]
async fn test_tokenize_text_is_deterministic() {
    let server = test_server();
    let body = json!({"text": "Determinism matters.", "model": "gpt-4"});

    let first: Value = server.post("/tokenize-text").json(&body).await.json();
    let second: Value = server.post("/tokenize-text").json(&body).await.json();

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_tokenize_empty_text() {
    let server = test_server();

    let response = server
        .post("/tokenize-text")
        .json(&json!({"text": "", "model": constants::TEST_MODEL}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();

    assert_eq!(json["token_count"], 0);
    assert_eq!(json["tokens"], json!([]));
}

#[tokio::test]
async fn test_model_defaults_to_gpt_4o() {
    let server = test_server();

    let response = server
        .post("/tokenize-text")
        .json(&json!({"text": "hello"}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert_eq!(json["model"], "gpt-4o");

    let explicit: Value = server
        .post("/tokenize-text")
        .json(&json!({"text": "hello", "model": "gpt-4o"}))
        .await
        .json();
    assert_eq!(json["tokens"], explicit["tokens"]);
}

#[tokio::test]
async fn test_unknown_model_falls_back() {
    let server = test_server();
    let text = "fallback encoding";

    let response = server
        .post("/tokenize-text")
        .json(&json!({"text": text, "model": constants::UNKNOWN_MODEL}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();

    // The caller's model name is echoed back unchanged
    assert_eq!(json["model"], constants::UNKNOWN_MODEL);

    // Tokens match cl100k_base, which gpt-4 uses
    let gpt4: Value = server
        .post("/tokenize-text")
        .json(&json!({"text": text, "model": "gpt-4"}))
        .await
        .json();
    assert_eq!(json["tokens"], gpt4["tokens"]);
}

#[tokio::test]
async fn test_newer_models_use_o200k_vocabulary() {
    let server = test_server();
    let text = "Newer model families share the gpt-4o vocabulary.";

    let gpt4o: Value = server
        .post("/tokenize-text")
        .json(&json!({"text": text, "model": "gpt-4o"}))
        .await
        .json();

    for model in ["o3-mini", "gpt-4.1", "chatgpt-4o-latest"] {
        let response = server
            .post("/tokenize-text")
            .json(&json!({"text": text, "model": model}))
            .await;

        response.assert_status_ok();
        let json: Value = response.json();
        assert_eq!(json["model"], model);
        assert_eq!(json["tokens"], gpt4o["tokens"], "{model}");
    }
}

#[tokio::test]
async fn test_special_token_text_is_counted() {
    let server = test_server();

    let response = server
        .post("/tokenize-text")
        .json(&json!({"text": "<|endoftext|>", "model": constants::TEST_MODEL}))
        .await;

    response.assert_status_ok();
    let json: Value = response.json();
    assert!(json["token_count"].as_u64().unwrap() > 1);
}

#[tokio::test]
async fn test_missing_text_is_rejected() {
    let server = test_server();

    let response = server
        .post("/tokenize-text")
        .json(&json!({"model": constants::TEST_MODEL}))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_malformed_json_is_rejected() {
    let server = test_server();

    let response = server
        .post("/tokenize-text")
        .bytes(Bytes::from_static(b"{\"text\": "))
        .content_type("application/json")
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
    let json: Value = response.json();
    assert_eq!(json["error"]["code"], "INVALID_JSON");
}

#[tokio::test]
async fn test_tokenize_text_accepts_post_only() {
    let server = test_server();

    let response = server.get("/tokenize-text").await;
    response.assert_status(StatusCode::METHOD_NOT_ALLOWED);
}
