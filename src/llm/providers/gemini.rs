//! Google Generative Language (Gemini / Gemma) provider implementation
//!
//! Default backend for reply drafting. Talks to the `generateContent` REST
//! endpoint; the API key travels in the `x-goog-api-key` header.

use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, Message,
    MessageRole, TokenUsage,
};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, warn};

/// Gemini provider configuration
#[derive(Debug, Clone)]
pub struct GeminiConfig {
    pub api_key: String,
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            base_url: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout: Duration::from_secs(60),
        }
    }
}

/// Gemini provider implementation
pub struct GeminiProvider {
    config: GeminiConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider
    pub fn new(config: GeminiConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::NotConfigured(
                "Gemini API key is required".to_string(),
            ));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Gemma models reject `systemInstruction`, so system text is folded
    /// into the first user turn instead.
    fn convert_messages(messages: &[Message]) -> Vec<GeminiContent> {
        let mut pending_system: Vec<&str> = Vec::new();
        let mut contents = Vec::new();

        for message in messages {
            match message.role {
                MessageRole::System => pending_system.push(&message.content),
                MessageRole::User | MessageRole::Assistant => {
                    let mut text = String::new();
                    if message.role == MessageRole::User && !pending_system.is_empty() {
                        text.push_str(&pending_system.join("\n\n"));
                        text.push_str("\n\n");
                        pending_system.clear();
                    }
                    text.push_str(&message.content);
                    contents.push(GeminiContent {
                        role: if message.role == MessageRole::User {
                            "user".to_string()
                        } else {
                            "model".to_string()
                        },
                        parts: vec![GeminiPart { text }],
                    });
                }
            }
        }

        contents
    }

    fn convert_finish_reason(reason: Option<&str>) -> FinishReason {
        match reason {
            Some("STOP") => FinishReason::Stop,
            Some("MAX_TOKENS") => FinishReason::Length,
            Some("SAFETY") | Some("RECITATION") | Some("PROHIBITED_CONTENT") => {
                FinishReason::ContentFilter
            }
            _ => FinishReason::Error,
        }
    }

    fn parse_response(
        response: GeminiResponse,
        requested_model: &str,
        metadata: HashMap<String, String>,
    ) -> Result<CompletionResponse, LlmError> {
        let Some(candidate) = response.candidates.into_iter().next() else {
            return Err(LlmError::InvalidResponse(
                "No candidates returned from Gemini".to_string(),
            ));
        };

        let text = candidate
            .content
            .map(|c| {
                c.parts
                    .into_iter()
                    .map(|p| p.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        let usage = response
            .usage_metadata
            .map(|u| TokenUsage {
                prompt_tokens: u.prompt_token_count,
                completion_tokens: u.candidates_token_count,
                total_tokens: u.total_token_count,
            })
            .unwrap_or_default();

        Ok(CompletionResponse {
            content: if text.is_empty() { None } else { Some(text) },
            model: response
                .model_version
                .unwrap_or_else(|| requested_model.to_string()),
            usage,
            finish_reason: Self::convert_finish_reason(candidate.finish_reason.as_deref()),
            metadata,
        })
    }
}

#[async_trait]
impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = GeminiRequest {
            contents: Self::convert_messages(&request.messages),
            generation_config: if request.temperature.is_some() || request.max_tokens.is_some() {
                Some(GenerationConfig {
                    temperature: request.temperature,
                    max_output_tokens: request.max_tokens,
                })
            } else {
                None
            },
        };

        debug!(model = %request.model, "Gemini generateContent request");

        let response = self
            .client
            .post(format!(
                "{}/models/{}:generateContent",
                self.config.base_url, request.model
            ))
            .header("x-goog-api-key", &self.config.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(LlmError::AuthenticationFailed(format!(
                "Gemini rejected the API key: {status}"
            )));
        }
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Gemini API error: {} - {}", status, error_text);
            return Err(LlmError::ApiError(format!(
                "Gemini API error: {status} - {error_text}"
            )));
        }

        let gemini_response: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        Self::parse_response(gemini_response, &request.model, request.metadata)
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        let response = self
            .client
            .get(format!("{}/models", self.config.base_url))
            .header("x-goog-api-key", &self.config.api_key)
            .send()
            .await
            .map_err(|e| LlmError::NetworkError(e.to_string()))?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(LlmError::AuthenticationFailed(
                "Gemini API authentication failed".to_string(),
            ))
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    generation_config: Option<GenerationConfig>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_output_tokens: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
    usage_metadata: Option<GeminiUsage>,
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiCandidate {
    content: Option<GeminiContent>,
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiUsage {
    #[serde(default)]
    prompt_token_count: u32,
    #[serde(default)]
    candidates_token_count: u32,
    #[serde(default)]
    total_token_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gemini_config_default() {
        let config = GeminiConfig::default();
        assert_eq!(
            config.base_url,
            "https://generativelanguage.googleapis.com/v1beta"
        );
        assert!(config.api_key.is_empty());
    }

    #[test]
    fn test_gemini_provider_requires_api_key() {
        let result = GeminiProvider::new(GeminiConfig::default());
        assert!(matches!(result, Err(LlmError::NotConfigured(_))));
    }

    #[test]
    fn test_system_text_folded_into_first_user_turn() {
        let messages = vec![
            Message {
                role: MessageRole::System,
                content: "Be brief.".to_string(),
            },
            Message::user("Hello"),
        ];

        let contents = GeminiProvider::convert_messages(&messages);
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].role, "user");
        assert_eq!(contents[0].parts[0].text, "Be brief.\n\nHello");
    }

    #[test]
    fn test_request_uses_camel_case_generation_config() {
        let body = GeminiRequest {
            contents: GeminiProvider::convert_messages(&[Message::user("Hi")]),
            generation_config: Some(GenerationConfig {
                temperature: None,
                max_output_tokens: Some(256),
            }),
        };

        let json = serde_json::to_string(&body).unwrap();
        assert!(json.contains("\"generationConfig\""));
        assert!(json.contains("\"maxOutputTokens\":256"));
        assert!(!json.contains("temperature"));
    }

    #[test]
    fn test_parse_response_joins_parts() {
        let raw = serde_json::json!({
            "candidates": [{
                "content": {"role": "model", "parts": [{"text": "Dear "}, {"text": "Rajesh"}]},
                "finishReason": "STOP"
            }],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 3, "totalTokenCount": 15}
        });
        let response: GeminiResponse = serde_json::from_value(raw).unwrap();

        let parsed =
            GeminiProvider::parse_response(response, "gemma-3-27b-it", HashMap::new()).unwrap();
        assert_eq!(parsed.content.as_deref(), Some("Dear Rajesh"));
        assert_eq!(parsed.model, "gemma-3-27b-it");
        assert_eq!(parsed.usage.total_tokens, 15);
        assert!(matches!(parsed.finish_reason, FinishReason::Stop));
    }

    #[test]
    fn test_parse_response_without_candidates_is_error() {
        let response: GeminiResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).unwrap();
        let result = GeminiProvider::parse_response(response, "m", HashMap::new());
        assert!(matches!(result, Err(LlmError::InvalidResponse(_))));
    }
}
