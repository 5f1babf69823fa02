//! Builds the service graph from configuration
//!
//! Factory logic lives here so handlers and the pipeline only ever see trait
//! objects.

use crate::api::AppState;
use crate::classifier::{HttpClassifier, TextClassifier, TicketClassifier};
use crate::config::TriageConfig;
use crate::error::{TriageError, TriageResult};
use crate::health::{
    ClassifierHealthCheck, DatabaseHealthCheck, HealthCheckManager, LlmProviderHealthCheck,
};
use crate::llm::provider::LlmProvider;
use crate::llm::providers::{
    AnthropicConfig, AnthropicProvider, GeminiConfig, GeminiProvider, OpenAiConfig,
    OpenAiProvider,
};
use crate::pipeline::TriagePipeline;
use crate::reply::ReplyGenerator;
use crate::store::Store;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

pub struct LlmProviderFactory;

impl LlmProviderFactory {
    pub fn create_provider(config: &TriageConfig) -> TriageResult<Arc<dyn LlmProvider>> {
        let llm = &config.llm;
        let api_key = config.get_llm_api_key()?;
        let timeout = Duration::from_secs(llm.timeout_secs);
        let llm_err = |e: crate::llm::provider::LlmError| {
            TriageError::internal_error(format!("Failed to build {} provider: {e}", llm.provider))
        };

        let provider: Arc<dyn LlmProvider> = match llm.provider.as_str() {
            "gemini" => {
                let defaults = GeminiConfig::default();
                Arc::new(
                    GeminiProvider::new(GeminiConfig {
                        api_key,
                        base_url: llm.base_url.clone().unwrap_or(defaults.base_url),
                        timeout,
                    })
                    .map_err(llm_err)?,
                )
            }
            "openai" => {
                let defaults = OpenAiConfig::default();
                Arc::new(
                    OpenAiProvider::new(OpenAiConfig {
                        api_key,
                        base_url: llm.base_url.clone().unwrap_or(defaults.base_url),
                        timeout,
                    })
                    .map_err(llm_err)?,
                )
            }
            "anthropic" => {
                let defaults = AnthropicConfig::default();
                Arc::new(
                    AnthropicProvider::new(AnthropicConfig {
                        api_key,
                        base_url: llm.base_url.clone().unwrap_or(defaults.base_url),
                        timeout,
                        ..defaults
                    })
                    .map_err(llm_err)?,
                )
            }
            other => {
                return Err(TriageError::internal_error(format!(
                    "Unsupported LLM provider: {other}"
                )))
            }
        };

        info!(provider = provider.name(), model = %llm.model, "LLM provider ready");
        Ok(provider)
    }
}

pub struct ClassifierFactory;

impl ClassifierFactory {
    pub fn create_model(config: &TriageConfig) -> TriageResult<Arc<dyn TextClassifier>> {
        let model = HttpClassifier::new(config.classifier_client_config()?)?;
        info!(url = %config.classifier.url, "Classifier endpoint configured");
        Ok(Arc::new(model))
    }
}

/// Everything the server needs, built from one config
pub struct Services {
    pub pipeline: TriagePipeline,
    pub health: HealthCheckManager,
}

impl Services {
    pub fn from_config(config: &TriageConfig) -> TriageResult<Self> {
        let store = Store::open(&config.database.path)?;
        let model = ClassifierFactory::create_model(config)?;
        let provider = LlmProviderFactory::create_provider(config)?;
        Self::assemble(config, store, model, provider)
    }

    /// Wire pre-built backends; used directly by tests
    pub fn assemble(
        config: &TriageConfig,
        store: Store,
        model: Arc<dyn TextClassifier>,
        provider: Arc<dyn LlmProvider>,
    ) -> TriageResult<Self> {
        let classifier = TicketClassifier::new(model.clone(), config.label_encoder()?);
        let replies = ReplyGenerator::new(provider.clone(), config.reply_settings(), config.persona());

        let health = HealthCheckManager::new()
            .with_check(DatabaseHealthCheck::new(store.clone()))
            .with_check(ClassifierHealthCheck::new(model))
            .with_check(LlmProviderHealthCheck::new(provider));

        Ok(Self {
            pipeline: TriagePipeline::new(classifier, replies, store),
            health,
        })
    }

    pub fn into_state(self) -> AppState {
        AppState::new(self.pipeline, self.health)
    }
}
