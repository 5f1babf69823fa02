//! Sends the rendered prompt to the configured LLM provider.

use super::prompt::{build_prompt, BotPersona, PromptContext};
use crate::llm::provider::{CompletionRequest, LlmError, LlmProvider, Message};
use std::collections::HashMap;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, Instrument};

#[derive(Debug, Clone, Error)]
pub enum ReplyError {
    #[error(transparent)]
    Llm(#[from] LlmError),
    #[error("Model returned an empty reply")]
    EmptyReply,
}

/// Model parameters for reply generation
#[derive(Debug, Clone)]
pub struct ReplySettings {
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl Default for ReplySettings {
    fn default() -> Self {
        Self {
            model: "gemma-3-27b-it".to_string(),
            temperature: None,
            max_tokens: None,
        }
    }
}

#[derive(Clone)]
pub struct ReplyGenerator {
    provider: Arc<dyn LlmProvider>,
    settings: ReplySettings,
    persona: BotPersona,
}

impl ReplyGenerator {
    pub fn new(provider: Arc<dyn LlmProvider>, settings: ReplySettings, persona: BotPersona) -> Self {
        Self {
            provider,
            settings,
            persona,
        }
    }

    pub fn provider(&self) -> &Arc<dyn LlmProvider> {
        &self.provider
    }

    fn request_for(&self, ctx: &PromptContext<'_>) -> CompletionRequest {
        let mut metadata = HashMap::new();
        metadata.insert("ticket_number".to_string(), ctx.ticket_number.to_string());

        CompletionRequest {
            messages: vec![Message::user(build_prompt(&self.persona, ctx))],
            model: self.settings.model.clone(),
            max_tokens: self.settings.max_tokens,
            temperature: self.settings.temperature,
            metadata,
        }
    }

    /// Draft the acknowledgement; surrounding whitespace is trimmed
    pub async fn generate_reply(&self, ctx: &PromptContext<'_>) -> Result<String, ReplyError> {
        let response = self
            .provider
            .complete(self.request_for(ctx))
            .instrument(crate::upstream_span!(service = "llm", backend = self.provider.name()))
            .await?;

        debug!(
            provider = self.provider.name(),
            model = %response.model,
            tokens = response.usage.total_tokens,
            "Reply drafted"
        );

        let reply = response.content.unwrap_or_default().trim().to_string();
        if reply.is_empty() {
            return Err(ReplyError::EmptyReply);
        }
        Ok(reply)
    }
}
