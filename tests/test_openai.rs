//! Integration tests for the OpenAI-compatible client
//!
//! Tests behavioral contracts against a wiremock server standing in for a
//! local chat completions server (llama.cpp, vLLM, LM Studio):
//! - Request shape and bearer authentication
//! - Response parsing and token usage
//! - Error scenarios (missing model, server errors, empty choices, timeouts)
//! - Health check

use route_agent::llm::client::{CompletionRequest, LlmError, ModelClient, ModelOptions};
use route_agent::llm::providers::openai::{OpenAiCompatibleClient, OpenAiConfig};
use std::time::Duration;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_config(base_url: &str, api_key: Option<&str>) -> OpenAiConfig {
    OpenAiConfig {
        api_key: api_key.map(str::to_string),
        base_url: base_url.to_string(),
        timeout: Duration::from_secs(5),
    }
}

fn test_request(max_wait: Duration) -> CompletionRequest {
    CompletionRequest::new("Hello", ModelOptions::new("qwen2.5", max_wait))
}

fn chat_response(content: serde_json::Value) -> serde_json::Value {
    serde_json::json!({
        "id": "chatcmpl-123",
        "object": "chat.completion",
        "created": 1677652288,
        "model": "qwen2.5",
        "choices": [
            {
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop"
            }
        ],
        "usage": { "prompt_tokens": 10, "completion_tokens": 15, "total_tokens": 25 }
    })
}

#[tokio::test]
async fn test_openai_client_returns_completion_with_valid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .and(header("Authorization", "Bearer test-api-key"))
        .and(body_partial_json(serde_json::json!({
            "model": "qwen2.5",
            "messages": [{ "role": "user", "content": "Hello" }],
            "stream": false
        })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(serde_json::json!(
                "Hello! How can I assist you today?"
            ))),
        )
        .expect(1)
        .mount(&mock_server)
        .await;

    let client =
        OpenAiCompatibleClient::new(test_config(&mock_server.uri(), Some("test-api-key"))).unwrap();
    let response = client
        .complete(test_request(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(response.text, "Hello! How can I assist you today?");
    assert_eq!(response.model, "qwen2.5");
    assert_eq!(response.usage.total(), 25);
}

#[tokio::test]
async fn test_openai_client_works_without_api_key() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(serde_json::json!("Hi"))),
        )
        .mount(&mock_server)
        .await;

    let client = OpenAiCompatibleClient::new(test_config(&mock_server.uri(), None)).unwrap();
    let response = client
        .complete(test_request(Duration::from_secs(5)))
        .await
        .unwrap();

    assert_eq!(response.text, "Hi");

    let requests = mock_server.received_requests().await.unwrap();
    assert!(requests[0].headers.get("authorization").is_none());
}

#[tokio::test]
async fn test_openai_client_unknown_model_is_model_not_found() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(404).set_body_json(serde_json::json!({
            "error": { "message": "The model `qwen2.5` does not exist", "type": "invalid_request_error" }
        })))
        .mount(&mock_server)
        .await;

    let client = OpenAiCompatibleClient::new(test_config(&mock_server.uri(), None)).unwrap();
    let error = client
        .complete(test_request(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert_eq!(error, LlmError::ModelNotFound("qwen2.5".to_string()));
}

#[tokio::test]
async fn test_openai_client_server_error_is_transient_api_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(503).set_body_string("loading model"))
        .mount(&mock_server)
        .await;

    let client = OpenAiCompatibleClient::new(test_config(&mock_server.uri(), None)).unwrap();
    let error = client
        .complete(test_request(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert_eq!(
        error,
        LlmError::Api {
            status: 503,
            message: "loading model".to_string()
        }
    );
    assert!(error.is_transient());
}

#[tokio::test]
async fn test_openai_client_null_content_is_empty_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(chat_response(serde_json::Value::Null)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenAiCompatibleClient::new(test_config(&mock_server.uri(), None)).unwrap();
    let error = client
        .complete(test_request(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert_eq!(error, LlmError::EmptyResponse);
}

#[tokio::test]
async fn test_openai_client_no_choices_is_invalid_response() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "id": "chatcmpl-123",
            "model": "qwen2.5",
            "choices": []
        })))
        .mount(&mock_server)
        .await;

    let client = OpenAiCompatibleClient::new(test_config(&mock_server.uri(), None)).unwrap();
    let error = client
        .complete(test_request(Duration::from_secs(5)))
        .await
        .unwrap_err();

    assert!(matches!(error, LlmError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_openai_client_times_out_on_slow_server() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/chat/completions"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(chat_response(serde_json::json!("late")))
                .set_delay(Duration::from_millis(500)),
        )
        .mount(&mock_server)
        .await;

    let client = OpenAiCompatibleClient::new(test_config(&mock_server.uri(), None)).unwrap();
    let error = client
        .complete(test_request(Duration::from_millis(100)))
        .await
        .unwrap_err();

    assert_eq!(error, LlmError::Timeout(Duration::from_millis(100)));
}

#[tokio::test]
async fn test_openai_client_health_check_lists_models() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("Authorization", "Bearer test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "object": "list",
            "data": [{ "id": "qwen2.5", "object": "model" }]
        })))
        .mount(&mock_server)
        .await;

    let client =
        OpenAiCompatibleClient::new(test_config(&mock_server.uri(), Some("test-api-key"))).unwrap();

    assert!(client.health_check().await.is_ok());
    assert_eq!(client.name(), "openai");
}
