//! Sequence-classifier inference client
//!
//! The fine-tuned model runs behind an HTTP inference endpoint. The client
//! posts the ticket text and receives raw logits, one per encoder class.

use super::ClassifierError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, warn};

/// Default token budget; longer inputs are truncated by the server
pub const DEFAULT_MAX_LENGTH: usize = 128;

/// Model backend that turns text into class logits
#[async_trait]
pub trait TextClassifier: Send + Sync {
    fn name(&self) -> &str;

    async fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError>;

    async fn health_check(&self) -> Result<(), ClassifierError>;
}

/// HTTP classifier configuration
#[derive(Debug, Clone)]
pub struct HttpClassifierConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub max_length: usize,
}

impl Default for HttpClassifierConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080/predict".to_string(),
            api_key: None,
            timeout: Duration::from_secs(5),
            max_length: DEFAULT_MAX_LENGTH,
        }
    }
}

pub struct HttpClassifier {
    config: HttpClassifierConfig,
    client: Client,
}

impl HttpClassifier {
    pub fn new(config: HttpClassifierConfig) -> Result<Self, ClassifierError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn authorize(&self, builder: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => builder.bearer_auth(key),
            None => builder,
        }
    }
}

#[async_trait]
impl TextClassifier for HttpClassifier {
    fn name(&self) -> &str {
        "http"
    }

    async fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        let body = InferenceRequest {
            inputs: text,
            truncation: true,
            max_length: self.config.max_length,
        };

        let response = self
            .authorize(self.client.post(&self.config.url))
            .json(&body)
            .send()
            .await
            .map_err(|e| ClassifierError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            warn!("Classifier endpoint returned {}: {}", status, error_text);
            return Err(ClassifierError::Service(format!(
                "classifier returned {status}: {error_text}"
            )));
        }

        let parsed: InferenceResponse = response
            .json()
            .await
            .map_err(|e| ClassifierError::InvalidResponse(e.to_string()))?;

        debug!(classes = parsed.logits.len(), "Classifier logits received");
        Ok(parsed.logits)
    }

    async fn health_check(&self) -> Result<(), ClassifierError> {
        self.logits("health check").await.map(|_| ())
    }
}

#[derive(Debug, Serialize)]
struct InferenceRequest<'a> {
    inputs: &'a str,
    truncation: bool,
    max_length: usize,
}

#[derive(Debug, Deserialize)]
struct InferenceResponse {
    logits: Vec<f32>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpClassifierConfig::default();
        assert_eq!(config.max_length, 128);
        assert!(config.api_key.is_none());
    }

    #[test]
    fn test_inference_request_shape() {
        let body = InferenceRequest {
            inputs: "printer on fire",
            truncation: true,
            max_length: 128,
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"inputs": "printer on fire", "truncation": true, "max_length": 128})
        );
    }
}
