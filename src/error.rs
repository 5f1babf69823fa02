//! Error types for the triage service
//!
//! Maps internal failures onto the HTTP statuses the API exposes: 401 for
//! bad credentials, 403 for an unknown role, 422 for a malformed request
//! body, 500 for everything else.

use crate::classifier::ClassifierError;
use crate::reply::ReplyError;
use crate::store::StoreError;
use serde::Serialize;
use thiserror::Error;
use warp::http::StatusCode;

/// Main error type for triage operations
#[derive(Debug, Error)]
pub enum TriageError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Invalid role")]
    InvalidRole,

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("Classification failed: {0}")]
    Classification(#[from] ClassifierError),

    #[error("Reply generation failed: {0}")]
    Reply(#[from] ReplyError),

    #[error("Storage error: {0}")]
    Storage(#[from] StoreError),

    #[error("Configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),

    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// JSON error body, `{"detail": "..."}`
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ErrorBody {
    pub detail: String,
}

impl TriageError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            TriageError::InvalidCredentials => StatusCode::UNAUTHORIZED,
            TriageError::InvalidRole => StatusCode::FORBIDDEN,
            TriageError::InvalidInput { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            TriageError::Classification(_)
            | TriageError::Reply(_)
            | TriageError::Storage(_)
            | TriageError::Config(_)
            | TriageError::Internal { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn to_error_body(&self) -> ErrorBody {
        ErrorBody {
            detail: sanitize_error_message(&self.to_string()),
        }
    }

    pub fn invalid_input<S: Into<String>>(message: S) -> Self {
        Self::InvalidInput {
            message: message.into(),
        }
    }

    pub fn internal_error<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }
}

/// Redact secrets and local paths from messages that leave the process
pub fn sanitize_error_message(message: &str) -> String {
    use once_cell::sync::Lazy;
    use regex::Regex;

    static SECRET: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"(?i)(password|token|key|secret)[=:]\s*\S+").expect("valid secret regex")
    });
    static SENSITIVE_PATH: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"/[a-zA-Z0-9._/-]+/(secrets?|\.ssh|\.aws|\.config)/[a-zA-Z0-9._/-]+")
            .expect("valid path regex")
    });

    let mut sanitized = SECRET.replace_all(message, "${1}=***").to_string();
    sanitized = SENSITIVE_PATH
        .replace_all(&sanitized, "/***REDACTED***/")
        .to_string();

    // Keep the whole message within 500 bytes
    const MAX_LEN: usize = 500;
    const SUFFIX: &str = "...[truncated]";
    if sanitized.len() > MAX_LEN {
        let mut cut = MAX_LEN - SUFFIX.len();
        while !sanitized.is_char_boundary(cut) {
            cut -= 1;
        }
        sanitized = format!("{}{}", &sanitized[..cut], SUFFIX);
    }

    sanitized
}

/// Result type for triage operations
pub type TriageResult<T> = Result<T, TriageError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::provider::LlmError;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            TriageError::InvalidCredentials.status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(TriageError::InvalidRole.status_code(), StatusCode::FORBIDDEN);
        assert_eq!(
            TriageError::invalid_input("missing field").status_code(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
        assert_eq!(
            TriageError::from(ClassifierError::EmptyLogits).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            TriageError::from(ReplyError::EmptyReply).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_error_body_detail_matches_display() {
        assert_eq!(
            TriageError::InvalidCredentials.to_error_body().detail,
            "Invalid credentials"
        );
        assert_eq!(TriageError::InvalidRole.to_error_body().detail, "Invalid role");
    }

    #[test]
    fn test_error_body_is_sanitized() {
        let error = TriageError::from(ReplyError::Llm(LlmError::ApiError(
            "upstream said key=AIzaSyExample123".to_string(),
        )));
        let body = error.to_error_body();
        assert!(!body.detail.contains("AIzaSyExample123"));
        assert!(body.detail.contains("key=***"));
    }

    #[test]
    fn test_sanitize_multiple_secrets() {
        let sanitized =
            sanitize_error_message("Auth failed: password=pass1 api_key=key123 token=tok456");
        assert!(!sanitized.contains("pass1"));
        assert!(!sanitized.contains("key123"));
        assert!(!sanitized.contains("tok456"));
        assert!(sanitized.contains("password=***"));
    }

    #[test]
    fn test_sanitize_paths() {
        let sanitized = sanitize_error_message("Failed to read /home/user/.aws/credentials");
        assert!(sanitized.contains("/***REDACTED***/"));
        assert!(!sanitized.contains(".aws/credentials"));
    }

    #[test]
    fn test_long_message_truncation() {
        let sanitized = sanitize_error_message(&"x".repeat(600));
        assert!(sanitized.len() <= 500);
        assert!(sanitized.ends_with("...[truncated]"));

        let exact = sanitize_error_message(&"x".repeat(500));
        assert_eq!(exact.len(), 500);
    }

    #[test]
    fn test_truncation_respects_char_boundaries() {
        let sanitized = sanitize_error_message(&"é".repeat(400));
        assert!(sanitized.len() <= 500);
        assert!(sanitized.ends_with("...[truncated]"));
    }
}
