//! Configuration loading and validation tests
//!
//! Covers file loading, defaults, validation failures and secret resolution
//! through environment variables.

use std::io::Write;
use std::time::Duration;
use tempfile::NamedTempFile;
use ticket_triage::config::{ConfigError, TriageConfig};

fn write_config(content: &str) -> NamedTempFile {
    let mut temp_file = NamedTempFile::new().unwrap();
    write!(temp_file, "{content}").unwrap();
    temp_file
}

#[test]
fn test_config_loads_from_file() {
    let file = write_config(
        r#"
[server]
port = 8100

[database]
path = "data/tickets.db"

[classifier]
url = "http://localhost:9000/predict"

[llm]
provider = "anthropic"
model = "claude-3-5-haiku-20241022"
api_key_env = "ANTHROPIC_API_KEY"
"#,
    );

    let config = TriageConfig::load_from_file(file.path()).unwrap();

    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8100);
    assert_eq!(config.database.path, "data/tickets.db");
    assert_eq!(config.llm.provider, "anthropic");
    assert_eq!(config.llm.model, "claude-3-5-haiku-20241022");
    assert_eq!(config.llm.timeout_secs, 60);
    assert!(config.llm.base_url.is_none());
}

#[test]
fn test_missing_file_is_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let result = TriageConfig::load_from_file(&dir.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::FileRead(_))));
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let file = write_config("[classifier\nurl = ");
    let result = TriageConfig::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_wrong_type_is_parse_error() {
    let file = write_config(
        r#"
[server]
port = "eight thousand"

[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "KEY"
"#,
    );
    let result = TriageConfig::load_from_file(file.path());
    assert!(matches!(result, Err(ConfigError::TomlParse(_))));
}

#[test]
fn test_temperature_out_of_range_rejected() {
    let result = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "KEY"
temperature = 3.5
"#,
    );
    match result {
        Err(ConfigError::InvalidConfig(msg)) => assert!(msg.contains("temperature")),
        other => panic!("expected InvalidConfig, got {other:?}"),
    }
}

#[test]
fn test_empty_database_path_rejected() {
    let result = TriageConfig::from_toml(
        r#"
[database]
path = "  "

[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "KEY"
"#,
    );
    assert!(matches!(result, Err(ConfigError::InvalidConfig(_))));
}

#[test]
fn test_llm_api_key_resolved_from_environment() {
    let config = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "TRIAGE_TEST_LLM_KEY_PRESENT"
"#,
    )
    .unwrap();

    std::env::set_var("TRIAGE_TEST_LLM_KEY_PRESENT", "sk-test");
    assert_eq!(config.get_llm_api_key().unwrap(), "sk-test");
}

#[test]
fn test_missing_llm_api_key_is_reported_by_name() {
    let config = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "TRIAGE_TEST_LLM_KEY_NEVER_SET"
"#,
    )
    .unwrap();

    match config.get_llm_api_key() {
        Err(ConfigError::EnvVarNotFound(name)) => {
            assert_eq!(name, "TRIAGE_TEST_LLM_KEY_NEVER_SET")
        }
        other => panic!("expected EnvVarNotFound, got {other:?}"),
    }
}

#[test]
fn test_classifier_client_config() {
    std::env::set_var("TRIAGE_TEST_CLASSIFIER_TOKEN", "hf_token");
    let config = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://classifier.internal/predict"
api_key_env = "TRIAGE_TEST_CLASSIFIER_TOKEN"
timeout_ms = 750
max_length = 64

[llm]
api_key_env = "KEY"
"#,
    )
    .unwrap();

    let client = config.classifier_client_config().unwrap();
    assert_eq!(client.url, "http://classifier.internal/predict");
    assert_eq!(client.api_key.as_deref(), Some("hf_token"));
    assert_eq!(client.timeout, Duration::from_millis(750));
    assert_eq!(client.max_length, 64);
}

#[test]
fn test_classifier_without_token_env() {
    let config = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "KEY"
"#,
    )
    .unwrap();

    assert!(config.classifier_client_config().unwrap().api_key.is_none());
}

#[test]
fn test_reply_settings_follow_llm_section() {
    let config = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://localhost:9000/predict"

[llm]
model = "gemini-2.0-flash"
api_key_env = "KEY"
temperature = 0.2
max_tokens = 350

[bot]
name = "Gracie"
"#,
    )
    .unwrap();

    let settings = config.reply_settings();
    assert_eq!(settings.model, "gemini-2.0-flash");
    assert_eq!(settings.temperature, Some(0.2));
    assert_eq!(settings.max_tokens, Some(350));

    let persona = config.persona();
    assert_eq!(persona.name, "Gracie");
    assert_eq!(persona.company, "Shanyan AI");
}

#[test]
fn test_config_round_trips_through_toml_serialization() {
    let config = TriageConfig::from_toml(
        r#"
[classifier]
url = "http://localhost:9000/predict"

[llm]
api_key_env = "KEY"
"#,
    )
    .unwrap();

    let rendered = toml::to_string(&config).unwrap();
    assert_eq!(TriageConfig::from_toml(&rendered).unwrap(), config);
}
