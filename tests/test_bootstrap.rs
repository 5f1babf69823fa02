//! Full service graph built from configuration, with the classifier and
//! Gemini endpoints served by one wiremock instance

use serde_json::{json, Value};
use ticket_triage::api::routes;
use ticket_triage::app::Services;
use ticket_triage::config::TriageConfig;
use ticket_triage::AppState;
use warp::http::StatusCode;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const KEY_ENV: &str = "TRIAGE_BOOTSTRAP_TEST_GEMINI_KEY";

async fn upstreams() -> MockServer {
    let server = MockServer::start().await;

    // Billing and Payments
    Mock::given(method("POST"))
        .and(path("/predict"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "logits": [5.0, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1, 0.1]
        })))
        .mount(&server)
        .await;

    Mock::given(method("POST"))
        .and(path("/models/gemma-3-27b-it:generateContent"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "candidates": [{
                "content": {"parts": [{"text": "Dear Priya, our billing team will review the charge."}]},
                "finishReason": "STOP"
            }]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/models"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"models": []})))
        .mount(&server)
        .await;

    server
}

fn state_for(server: &MockServer) -> AppState {
    std::env::set_var(KEY_ENV, "test-gemini-key");
    let config = TriageConfig::from_toml(&format!(
        r#"
[database]
path = ":memory:"

[classifier]
url = "{uri}/predict"

[llm]
api_key_env = "{KEY_ENV}"
base_url = "{uri}"
"#,
        uri = server.uri()
    ))
    .unwrap();

    Services::from_config(&config).unwrap().into_state()
}

async fn call(state: &AppState, verb: &str, target: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut request = warp::test::request().method(verb).path(target);
    if let Some(body) = body {
        request = request.header("content-type", "application/json").json(&body);
    }
    let response = request.reply(&routes(state.clone())).await;
    let parsed = serde_json::from_slice(response.body()).unwrap_or(Value::Null);
    (response.status(), parsed)
}

#[tokio::test]
async fn test_configured_services_process_a_ticket() {
    let server = upstreams().await;
    let state = state_for(&server);

    let (status, _) = call(&state, "POST", "/api/init-users", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &state,
        "POST",
        "/api/predict",
        Some(json!({
            "description": "I was charged twice for my subscription",
            "client_id": 2,
            "client_name": "Priya"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["queue"], "Billing and Payments");
    assert_eq!(body["assigned_department"], "accounting");
    assert_eq!(
        body["auto_reply"],
        "Dear Priya, our billing team will review the charge."
    );

    let (_, tickets) = call(&state, "GET", "/api/tickets/accounting/4", None).await;
    assert_eq!(tickets.as_array().unwrap().len(), 1);
    assert_eq!(tickets[0]["client_name"], "Priya");
}

#[tokio::test]
async fn test_configured_services_report_healthy() {
    let server = upstreams().await;
    let state = state_for(&server);

    let (status, body) = call(&state, "GET", "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
}
