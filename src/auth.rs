//! Username/password login against the users table
//!
//! Passwords are compared as stored. The returned token is an opaque
//! `token_{id}_{role}` string that no endpoint verifies.

use crate::error::{TriageError, TriageResult};
use crate::observability::metrics::metrics;
use crate::store::{Store, User};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub username: String,
    pub full_name: String,
    pub role: String,
    pub token: String,
}

impl From<User> for LoginResponse {
    fn from(user: User) -> Self {
        Self {
            token: session_token(&user),
            user_id: user.id,
            username: user.username,
            full_name: user.full_name,
            role: user.role.as_str().to_string(),
        }
    }
}

pub fn session_token(user: &User) -> String {
    format!("token_{}_{}", user.id, user.role)
}

pub async fn login(store: &Store, request: LoginRequest) -> TriageResult<LoginResponse> {
    let LoginRequest { username, password } = request;
    let lookup = username.clone();
    let user = store
        .run(move |store| store.find_user_by_username(&lookup))
        .await?;

    match user {
        Some(user) if user.password == password => {
            metrics().login_succeeded();
            info!(user_id = user.id, role = %user.role, "Login succeeded");
            Ok(user.into())
        }
        _ => {
            metrics().login_rejected();
            warn!(username = %username, "Login rejected");
            Err(TriageError::InvalidCredentials)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn seeded_store() -> Store {
        let store = Store::open_in_memory().unwrap();
        store.seed_default_users().unwrap();
        store
    }

    fn creds(username: &str, password: &str) -> LoginRequest {
        LoginRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[tokio::test]
    async fn test_login_success() {
        let store = seeded_store().await;

        let response = login(&store, creds("tech1", "tech123")).await.unwrap();
        assert_eq!(response.username, "tech1");
        assert_eq!(response.full_name, "Priya Sharma");
        assert_eq!(response.role, "technical_support");
        assert_eq!(
            response.token,
            format!("token_{}_technical_support", response.user_id)
        );
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let store = seeded_store().await;
        let result = login(&store, creds("admin", "wrong")).await;
        assert!(matches!(result, Err(TriageError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_unknown_user_rejected() {
        let store = seeded_store().await;
        let result = login(&store, creds("nobody", "admin123")).await;
        assert!(matches!(result, Err(TriageError::InvalidCredentials)));
    }

    #[tokio::test]
    async fn test_password_comparison_is_exact() {
        let store = seeded_store().await;
        assert!(login(&store, creds("admin", "ADMIN123")).await.is_err());
        assert!(login(&store, creds("admin", "admin123 ")).await.is_err());
    }
}
