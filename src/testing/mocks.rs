//! Mock implementations for testing
//!
//! In-process stand-ins for the classifier endpoint and the LLM provider so
//! the pipeline and API can be exercised without network access.

use crate::classifier::{ClassifierError, TextClassifier};
use crate::llm::provider::{
    CompletionRequest, CompletionResponse, FinishReason, LlmError, LlmProvider, TokenUsage,
};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Mock LLM provider that cycles through canned replies and records requests
#[derive(Debug, Default)]
pub struct MockLlmProvider {
    pub responses: Vec<String>,
    pub current_response: Arc<Mutex<usize>>,
    pub received: Arc<Mutex<Vec<CompletionRequest>>>,
    pub should_fail: bool,
}

impl MockLlmProvider {
    pub fn new(responses: Vec<String>) -> Self {
        Self {
            responses,
            ..Default::default()
        }
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn single_response(response: impl Into<String>) -> Self {
        Self::new(vec![response.into()])
    }

    /// Every request passed to `complete`, in call order
    pub async fn requests(&self) -> Vec<CompletionRequest> {
        self.received.lock().await.clone()
    }
}

#[async_trait]
impl LlmProvider for MockLlmProvider {
    fn name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        self.received.lock().await.push(request);

        if self.should_fail {
            return Err(LlmError::RequestFailed("Mock LLM failure".to_string()));
        }

        let mut current = self.current_response.lock().await;
        let content = if self.responses.is_empty() {
            "Mock reply".to_string()
        } else {
            self.responses[*current % self.responses.len()].clone()
        };
        *current += 1;

        Ok(CompletionResponse {
            content: Some(content),
            model: "mock-model".to_string(),
            usage: TokenUsage {
                prompt_tokens: 10,
                completion_tokens: 5,
                total_tokens: 15,
            },
            finish_reason: FinishReason::Stop,
            metadata: HashMap::new(),
        })
    }

    async fn health_check(&self) -> Result<(), LlmError> {
        if self.should_fail {
            Err(LlmError::RequestFailed(
                "Mock health check failure".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}

/// Mock classifier returning fixed logits
#[derive(Debug, Default)]
pub struct MockClassifier {
    pub logits: Vec<f32>,
    pub should_fail: bool,
    calls: AtomicUsize,
    inputs: Mutex<Vec<String>>,
}

impl MockClassifier {
    pub fn with_logits(logits: Vec<f32>) -> Self {
        Self {
            logits,
            ..Default::default()
        }
    }

    /// Logits whose argmax is `index`; at least ten classes wide
    pub fn predicting(index: usize) -> Self {
        let width = (index + 1).max(10);
        let mut logits = vec![-1.0; width];
        logits[index] = 4.0;
        Self::with_logits(logits)
    }

    pub fn with_failure() -> Self {
        Self {
            should_fail: true,
            ..Default::default()
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub async fn inputs(&self) -> Vec<String> {
        self.inputs.lock().await.clone()
    }
}

#[async_trait]
impl TextClassifier for MockClassifier {
    fn name(&self) -> &str {
        "mock"
    }

    async fn logits(&self, text: &str) -> Result<Vec<f32>, ClassifierError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inputs.lock().await.push(text.to_string());

        if self.should_fail {
            return Err(ClassifierError::Network(
                "Mock classifier unreachable".to_string(),
            ));
        }
        Ok(self.logits.clone())
    }

    async fn health_check(&self) -> Result<(), ClassifierError> {
        if self.should_fail {
            Err(ClassifierError::Network(
                "Mock classifier unreachable".to_string(),
            ))
        } else {
            Ok(())
        }
    }
}
