//! Service configuration
//!
//! Loaded from a TOML file. Secrets are never stored in the file itself;
//! each `*_env` field names the environment variable that holds them and is
//! resolved when the client is built.

use crate::classifier::{ClassifierError, HttpClassifierConfig, LabelEncoder, DEFAULT_QUEUE_LABELS};
use crate::reply::{BotPersona, ReplySettings};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Providers the reply generator can be built with
pub const SUPPORTED_PROVIDERS: &[&str] = &["gemini", "openai", "anthropic"];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TriageConfig {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub database: DatabaseSection,
    pub classifier: ClassifierSection,
    pub llm: LlmSection,
    #[serde(default)]
    pub bot: BotSection,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ServerSection {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DatabaseSection {
    /// SQLite file path, or ":memory:"
    #[serde(default = "default_db_path")]
    pub path: String,
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> String {
    "tickets.db".to_string()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassifierSection {
    /// Inference endpoint serving the fine-tuned model
    pub url: String,
    /// Environment variable containing a bearer token, if the endpoint needs one
    pub api_key_env: Option<String>,
    #[serde(default = "default_classifier_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default = "default_max_length")]
    pub max_length: usize,
    /// Class names the model was trained with
    #[serde(default = "default_labels")]
    pub labels: Vec<String>,
}

fn default_classifier_timeout_ms() -> u64 {
    5000
}

fn default_max_length() -> usize {
    crate::classifier::model::DEFAULT_MAX_LENGTH
}

fn default_labels() -> Vec<String> {
    DEFAULT_QUEUE_LABELS.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct LlmSection {
    #[serde(default = "default_provider")]
    pub provider: String,
    #[serde(default = "default_model")]
    pub model: String,
    pub api_key_env: String,
    /// Override for the provider's API root (proxies, tests)
    pub base_url: Option<String>,
    #[serde(default = "default_llm_timeout_secs")]
    pub timeout_secs: u64,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

fn default_provider() -> String {
    "gemini".to_string()
}

fn default_model() -> String {
    "gemma-3-27b-it".to_string()
}

fn default_llm_timeout_secs() -> u64 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BotSection {
    #[serde(default = "default_bot_name")]
    pub name: String,
    #[serde(default = "default_company")]
    pub company: String,
}

impl Default for BotSection {
    fn default() -> Self {
        Self {
            name: default_bot_name(),
            company: default_company(),
        }
    }
}

fn default_bot_name() -> String {
    "Shanyan AI Bot".to_string()
}

fn default_company() -> String {
    "Shanyan AI".to_string()
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

impl TriageConfig {
    /// Load and validate configuration from a TOML file
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: TriageConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "server.port must be non-zero".to_string(),
            ));
        }

        if self.database.path.trim().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "database.path must not be empty".to_string(),
            ));
        }

        url::Url::parse(&self.classifier.url).map_err(|e| {
            ConfigError::InvalidConfig(format!(
                "classifier.url '{}' is not a valid URL: {e}",
                self.classifier.url
            ))
        })?;

        if self.classifier.labels.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "classifier.labels must list at least one queue".to_string(),
            ));
        }

        if !SUPPORTED_PROVIDERS.contains(&self.llm.provider.as_str()) {
            return Err(ConfigError::InvalidConfig(format!(
                "Unsupported LLM provider '{}' (expected one of {})",
                self.llm.provider,
                SUPPORTED_PROVIDERS.join(", ")
            )));
        }

        if let Some(temperature) = self.llm.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(ConfigError::InvalidConfig(format!(
                    "llm.temperature {temperature} outside 0.0..=2.0"
                )));
            }
        }

        Ok(())
    }

    fn get_env_var_required(env_var_name: &str) -> Result<String, ConfigError> {
        std::env::var(env_var_name)
            .map_err(|_| ConfigError::EnvVarNotFound(env_var_name.to_string()))
    }

    /// LLM API key from the configured environment variable
    pub fn get_llm_api_key(&self) -> Result<String, ConfigError> {
        Self::get_env_var_required(&self.llm.api_key_env)
    }

    /// Classifier bearer token; absent when no variable is configured
    pub fn get_classifier_api_key(&self) -> Result<Option<String>, ConfigError> {
        self.classifier
            .api_key_env
            .as_deref()
            .map(Self::get_env_var_required)
            .transpose()
    }

    pub fn classifier_client_config(&self) -> Result<HttpClassifierConfig, ConfigError> {
        Ok(HttpClassifierConfig {
            url: self.classifier.url.clone(),
            api_key: self.get_classifier_api_key()?,
            timeout: Duration::from_millis(self.classifier.timeout_ms),
            max_length: self.classifier.max_length,
        })
    }

    pub fn label_encoder(&self) -> Result<LabelEncoder, ClassifierError> {
        LabelEncoder::fit(self.classifier.labels.iter().cloned())
    }

    pub fn reply_settings(&self) -> ReplySettings {
        ReplySettings {
            model: self.llm.model.clone(),
            temperature: self.llm.temperature,
            max_tokens: self.llm.max_tokens,
        }
    }

    pub fn persona(&self) -> BotPersona {
        BotPersona {
            name: self.bot.name.clone(),
            company: self.bot.company.clone(),
        }
    }

    /// Create a test configuration for unit testing
    #[cfg(test)]
    pub fn test_config() -> Self {
        let toml_content = r#"
[database]
path = ":memory:"

[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "GEMINI_API_KEY"
"#;
        Self::from_toml(toml_content).expect("Test config should parse")
    }
}
