// Unit tests for the Anthropic driver

use std::time::Duration;

use llmbench_core::{BenchError, CompletionDriver, CompletionRequest, Invoker, Provider};
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::{AnthropicDriver, ANTHROPIC_VERSION};

fn driver(server: &MockServer, key: Option<&str>) -> AnthropicDriver {
    AnthropicDriver::new(
        key.map(str::to_string),
        "claude-3-7-sonnet-latest",
        Duration::from_secs(5),
    )
    .unwrap()
    .with_api_url(format!("{}/v1/messages", server.uri()))
}

fn request(prompt: &str, max_tokens: u32) -> CompletionRequest {
    CompletionRequest {
        prompt: prompt.to_string(),
        max_tokens,
    }
}

#[test]
fn test_debug_redacts_key() {
    let driver =
        AnthropicDriver::new(Some("sk-secret".into()), "m", Duration::from_secs(1)).unwrap();
    let debug = format!("{:?}", driver);
    assert!(debug.contains("AnthropicDriver"));
    assert!(debug.contains("[REDACTED]"));
    assert!(!debug.contains("sk-secret"));
}

#[test]
fn test_driver_identity() {
    let driver = AnthropicDriver::new(None, "claude-x", Duration::from_secs(1)).unwrap();
    assert_eq!(driver.provider(), Provider::Anthropic);
    assert_eq!(driver.model(), "claude-x");
    assert_eq!(driver.api_url(), crate::DEFAULT_API_URL);
}

#[tokio::test]
async fn test_complete_sends_messages_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/messages"))
        .and(header("x-api-key", "test-key"))
        .and(header("anthropic-version", ANTHROPIC_VERSION))
        .and(body_json(json!({
            "model": "claude-3-7-sonnet-latest",
            "max_tokens": 20,
            "messages": [{"role": "user", "content": "What is 2+2?"}]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "msg_01",
            "type": "message",
            "role": "assistant",
            "content": [{"type": "text", "text": "4"}],
            "usage": {"input_tokens": 16, "output_tokens": 5}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let completion = driver(&server, Some("test-key"))
        .complete(&request("What is 2+2?", 20))
        .await
        .unwrap();

    assert_eq!(completion.text, "4");
    assert_eq!(completion.input_tokens, Some(16));
    assert_eq!(completion.output_tokens, Some(5));
}

#[tokio::test]
async fn test_complete_tolerates_missing_usage() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "text", "text": "done"},
                {"type": "tool_use", "id": "t1", "name": "calc", "input": {}}
            ]
        })))
        .mount(&server)
        .await;

    let completion = driver(&server, Some("k"))
        .complete(&request("p", 10))
        .await
        .unwrap();

    assert_eq!(completion.text, "done");
    assert!(completion.input_tokens.is_none());
    assert!(completion.output_tokens.is_none());
}

#[tokio::test]
async fn test_leading_non_text_block_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "content": [
                {"type": "thinking", "thinking": "hmm", "signature": "x"},
                {"type": "text", "text": "done"}
            ],
            "usage": {"input_tokens": 3, "output_tokens": 4}
        })))
        .mount(&server)
        .await;

    let err = driver(&server, Some("k"))
        .complete(&request("p", 10))
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Decode(_)));
    assert!(err.to_string().contains("content[0]"));
}

#[tokio::test]
async fn test_empty_content_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"content": []})))
        .mount(&server)
        .await;

    let err = driver(&server, Some("k"))
        .complete(&request("p", 10))
        .await
        .unwrap_err();

    assert!(matches!(err, BenchError::Decode(_)));
}

#[tokio::test]
async fn test_error_status_is_provider_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({
            "type": "error",
            "error": {"type": "authentication_error", "message": "invalid x-api-key"}
        })))
        .mount(&server)
        .await;

    let err = driver(&server, Some("bad"))
        .complete(&request("p", 10))
        .await
        .unwrap_err();

    let message = err.to_string();
    assert!(message.contains("401"));
    assert!(message.contains("invalid x-api-key"));
}

#[tokio::test]
async fn test_malformed_body_is_decode_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let err = driver(&server, Some("k"))
        .complete(&request("p", 10))
        .await
        .unwrap_err();

    assert!(err.to_string().starts_with("Decode error"));
}

#[tokio::test]
async fn test_missing_key_fails_without_request() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = driver(&server, None)
        .complete(&request("p", 10))
        .await
        .unwrap_err();

    assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
}

#[tokio::test]
async fn test_timeout_becomes_failed_record() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"content": [{"type": "text", "text": "late"}]}))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&server)
        .await;

    let driver = AnthropicDriver::new(Some("k".into()), "m", Duration::from_millis(50))
        .unwrap()
        .with_api_url(format!("{}/v1/messages", server.uri()));

    let record = Invoker::new(driver).invoke("p", None).await;

    assert!(!record.success);
    assert!(record.latency > 0.0);
    assert!(record.error.unwrap().starts_with("HTTP error"));
}
