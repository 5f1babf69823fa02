//! Integration tests for the Gemini reply provider against a wiremock
//! `generateContent` endpoint

use std::collections::HashMap;
use std::time::Duration;
use ticket_triage::llm::provider::{
    CompletionRequest, FinishReason, LlmError, LlmProvider, Message, MessageRole,
};
use ticket_triage::llm::providers::gemini::{GeminiConfig, GeminiProvider};
use wiremock::matchers::{body_json, body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const GENERATE_PATH: &str = "/models/gemma-3-27b-it:generateContent";

fn provider_for(server: &MockServer) -> GeminiProvider {
    GeminiProvider::new(GeminiConfig {
        api_key: "test-api-key".to_string(),
        base_url: server.uri(),
        timeout: Duration::from_secs(5),
    })
    .unwrap()
}

fn request(messages: Vec<Message>, temperature: Option<f32>, max_tokens: Option<u32>) -> CompletionRequest {
    CompletionRequest {
        messages,
        model: "gemma-3-27b-it".to_string(),
        max_tokens,
        temperature,
        metadata: HashMap::new(),
    }
}

fn candidate(text: &str, finish_reason: &str) -> serde_json::Value {
    serde_json::json!({
        "candidates": [{
            "content": {"role": "model", "parts": [{"text": text}]},
            "finishReason": finish_reason
        }],
        "usageMetadata": {
            "promptTokenCount": 90,
            "candidatesTokenCount": 60,
            "totalTokenCount": 150
        },
        "modelVersion": "gemma-3-27b-it-001"
    })
}

#[tokio::test]
async fn test_gemini_completion_success() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(header("x-goog-api-key", "test-api-key"))
        .and(body_partial_json(serde_json::json!({
            "generationConfig": {"maxOutputTokens": 400}
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("Dear Rajesh,", "STOP")))
        .expect(1)
        .mount(&server)
        .await;

    let response = provider_for(&server)
        .complete(request(
            vec![Message::user("Draft a reply")],
            Some(0.7),
            Some(400),
        ))
        .await
        .unwrap();

    assert_eq!(response.content.as_deref(), Some("Dear Rajesh,"));
    assert_eq!(response.model, "gemma-3-27b-it-001");
    assert_eq!(response.usage.prompt_tokens, 90);
    assert_eq!(response.usage.completion_tokens, 60);
    assert_eq!(response.usage.total_tokens, 150);
    assert!(matches!(response.finish_reason, FinishReason::Stop));
}

#[tokio::test]
async fn test_gemini_folds_system_prompt_into_user_turn() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .and(body_json(serde_json::json!({
            "contents": [{
                "role": "user",
                "parts": [{"text": "You are Gracie\n\nDraft a reply"}]
            }]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(candidate("ok", "STOP")))
        .expect(1)
        .mount(&server)
        .await;

    let messages = vec![
        Message {
            role: MessageRole::System,
            content: "You are Gracie".to_string(),
        },
        Message::user("Draft a reply"),
    ];
    provider_for(&server)
        .complete(request(messages, None, None))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_gemini_missing_model_version_uses_requested_model() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{
                "content": {"parts": [{"text": "Dear "}, {"text": "customer"}]},
                "finishReason": "MAX_TOKENS"
            }]
        })))
        .mount(&server)
        .await;

    let response = provider_for(&server)
        .complete(request(vec![Message::user("hi")], None, Some(2)))
        .await
        .unwrap();

    assert_eq!(response.model, "gemma-3-27b-it");
    assert_eq!(response.content.as_deref(), Some("Dear customer"));
    assert_eq!(response.usage.total_tokens, 0);
    assert!(matches!(response.finish_reason, FinishReason::Length));
}

#[tokio::test]
async fn test_gemini_safety_block_is_content_filter() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "candidates": [{"finishReason": "SAFETY"}]
        })))
        .mount(&server)
        .await;

    let response = provider_for(&server)
        .complete(request(vec![Message::user("hi")], None, None))
        .await
        .unwrap();

    assert!(response.content.is_none());
    assert!(matches!(response.finish_reason, FinishReason::ContentFilter));
}

#[tokio::test]
async fn test_gemini_no_candidates_is_invalid_response() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({})))
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .complete(request(vec![Message::user("hi")], None, None))
        .await;
    assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
}

#[tokio::test]
async fn test_gemini_forbidden_is_authentication_failure() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(403).set_body_string("API key not valid"))
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .complete(request(vec![Message::user("hi")], None, None))
        .await;
    assert!(matches!(result, Err(LlmError::AuthenticationFailed(_))));
}

#[tokio::test]
async fn test_gemini_server_error_is_not_retried() {
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path(GENERATE_PATH))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal"))
        .expect(1)
        .mount(&server)
        .await;

    let result = provider_for(&server)
        .complete(request(vec![Message::user("hi")], None, None))
        .await;
    assert!(matches!(result, Err(LlmError::ApiError(_))));
}

#[tokio::test]
async fn test_gemini_health_check_lists_models() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .and(header("x-goog-api-key", "test-api-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"models": []})))
        .expect(1)
        .mount(&server)
        .await;

    assert!(provider_for(&server).health_check().await.is_ok());
}
