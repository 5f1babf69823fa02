//! Component health checks
//!
//! Each dependency of the triage pipeline (database, classifier endpoint,
//! LLM provider) gets a check; the manager aggregates them for `/health`.

use crate::classifier::TextClassifier;
use crate::llm::provider::LlmProvider;
use crate::store::Store;
use async_trait::async_trait;
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

#[derive(Debug, Clone, Serialize)]
pub struct HealthCheckResult {
    pub component: String,
    pub healthy: bool,
    pub message: Option<String>,
    pub response_time_ms: Option<u64>,
}

impl HealthCheckResult {
    fn from_outcome<E: std::fmt::Display>(
        component: &str,
        started: Instant,
        outcome: Result<String, E>,
    ) -> Self {
        let response_time_ms = started.elapsed().as_millis() as u64;
        match outcome {
            Ok(message) => {
                debug!(component, response_time_ms, "Health check passed");
                Self {
                    component: component.to_string(),
                    healthy: true,
                    message: Some(message),
                    response_time_ms: Some(response_time_ms),
                }
            }
            Err(e) => {
                warn!(component, response_time_ms, error = %e, "Health check failed");
                Self {
                    component: component.to_string(),
                    healthy: false,
                    message: Some(e.to_string()),
                    response_time_ms: Some(response_time_ms),
                }
            }
        }
    }
}

#[async_trait]
pub trait HealthCheck: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;

    fn component_name(&self) -> &str;
}

pub struct DatabaseHealthCheck {
    store: Store,
}

impl DatabaseHealthCheck {
    pub fn new(store: Store) -> Self {
        Self { store }
    }
}

#[async_trait]
impl HealthCheck for DatabaseHealthCheck {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self
            .store
            .run(|store| store.ping())
            .await
            .map(|_| "Database reachable".to_string());
        HealthCheckResult::from_outcome(self.component_name(), started, outcome)
    }

    fn component_name(&self) -> &str {
        "database"
    }
}

pub struct ClassifierHealthCheck {
    classifier: Arc<dyn TextClassifier>,
}

impl ClassifierHealthCheck {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self { classifier }
    }
}

#[async_trait]
impl HealthCheck for ClassifierHealthCheck {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self
            .classifier
            .health_check()
            .await
            .map(|_| format!("{} classifier healthy", self.classifier.name()));
        HealthCheckResult::from_outcome(self.component_name(), started, outcome)
    }

    fn component_name(&self) -> &str {
        "classifier"
    }
}

pub struct LlmProviderHealthCheck {
    llm_provider: Arc<dyn LlmProvider>,
}

impl LlmProviderHealthCheck {
    pub fn new(llm_provider: Arc<dyn LlmProvider>) -> Self {
        Self { llm_provider }
    }
}

#[async_trait]
impl HealthCheck for LlmProviderHealthCheck {
    async fn health_check(&self) -> HealthCheckResult {
        let started = Instant::now();
        let outcome = self
            .llm_provider
            .health_check()
            .await
            .map(|_| format!("{} provider healthy", self.llm_provider.name()));
        HealthCheckResult::from_outcome(self.component_name(), started, outcome)
    }

    fn component_name(&self) -> &str {
        "llm_provider"
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub status: &'static str,
    pub components: Vec<HealthCheckResult>,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

#[derive(Default)]
pub struct HealthCheckManager {
    health_checks: Vec<Box<dyn HealthCheck>>,
}

impl HealthCheckManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_health_check(&mut self, health_check: Box<dyn HealthCheck>) {
        self.health_checks.push(health_check);
    }

    pub fn with_check(mut self, health_check: impl HealthCheck + 'static) -> Self {
        self.add_health_check(Box::new(health_check));
        self
    }

    pub async fn run_health_checks(&self) -> Vec<HealthCheckResult> {
        let mut results = Vec::with_capacity(self.health_checks.len());
        for check in &self.health_checks {
            results.push(check.health_check().await);
        }
        results
    }

    /// Healthy only when every component is; no checks counts as healthy
    pub async fn report(&self) -> HealthReport {
        let components = self.run_health_checks().await;
        let healthy = components.iter().all(|r| r.healthy);
        debug!(
            healthy,
            components = components.len(),
            "Aggregated health report"
        );
        HealthReport {
            status: if healthy { "healthy" } else { "unhealthy" },
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::mocks::{MockClassifier, MockLlmProvider};

    #[tokio::test]
    async fn test_database_check_healthy() {
        let store = Store::open_in_memory().unwrap();
        let result = DatabaseHealthCheck::new(store).health_check().await;

        assert!(result.healthy);
        assert_eq!(result.component, "database");
        assert!(result.response_time_ms.is_some());
    }

    #[tokio::test]
    async fn test_llm_check_reports_failure() {
        let check = LlmProviderHealthCheck::new(Arc::new(MockLlmProvider::with_failure()));
        let result = check.health_check().await;

        assert!(!result.healthy);
        assert!(result.message.unwrap().contains("Mock health check failure"));
    }

    #[tokio::test]
    async fn test_manager_requires_all_healthy() {
        let manager = HealthCheckManager::new()
            .with_check(DatabaseHealthCheck::new(Store::open_in_memory().unwrap()))
            .with_check(ClassifierHealthCheck::new(Arc::new(
                MockClassifier::with_failure(),
            )));

        let report = manager.report().await;
        assert!(!report.is_healthy());
        assert_eq!(report.components.len(), 2);
        assert!(report.components[0].healthy);
        assert!(!report.components[1].healthy);
    }

    #[tokio::test]
    async fn test_empty_manager_is_healthy() {
        let report = HealthCheckManager::new().report().await;
        assert!(report.is_healthy());
        assert!(report.components.is_empty());
    }

    #[tokio::test]
    async fn test_all_healthy() {
        let manager = HealthCheckManager::new()
            .with_check(ClassifierHealthCheck::new(Arc::new(
                MockClassifier::predicting(0),
            )))
            .with_check(LlmProviderHealthCheck::new(Arc::new(
                MockLlmProvider::single_response("ok"),
            )));

        let report = manager.report().await;
        assert!(report.is_healthy());
        assert_eq!(report.status, "healthy");
    }
}
