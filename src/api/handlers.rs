use super::rejection::error_response;
use super::types::{
    InitUsersResponse, LivenessResponse, LoginRequest, MessageResponse, ReadinessResponse,
    TicketListItem, TicketRequest, WELCOME_MESSAGE,
};
use super::AppState;
use crate::auth;
use crate::error::{TriageError, TriageResult};
use crate::observability::metrics::metrics;
use crate::store::TicketScope;
use serde::Serialize;
use std::convert::Infallible;
use std::time::{SystemTime, UNIX_EPOCH};
use tracing::info;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

fn json_result<T: Serialize>(result: TriageResult<T>) -> Response {
    match result {
        Ok(body) => warp::reply::json(&body).into_response(),
        Err(e) => error_response(&e),
    }
}

fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

pub async fn login(request: LoginRequest, state: AppState) -> Result<Response, Infallible> {
    Ok(json_result(
        auth::login(state.pipeline.store(), request).await,
    ))
}

pub async fn predict(request: TicketRequest, state: AppState) -> Result<Response, Infallible> {
    Ok(json_result(state.pipeline.process(request).await))
}

pub async fn list_tickets(
    role: String,
    user_id: String,
    state: AppState,
) -> Result<Response, Infallible> {
    let result = async {
        let user_id: i64 = user_id.parse().map_err(|_| {
            TriageError::invalid_input(format!("user_id must be an integer, got '{user_id}'"))
        })?;
        let scope = TicketScope::for_role(&role, user_id).ok_or(TriageError::InvalidRole)?;
        let tickets = state
            .pipeline
            .store()
            .run(move |store| store.list_tickets(scope))
            .await?;
        Ok::<_, TriageError>(
            tickets
                .into_iter()
                .map(TicketListItem::from)
                .collect::<Vec<_>>(),
        )
    }
    .await;

    Ok(json_result(result))
}

pub async fn init_users(state: AppState) -> Result<Response, Infallible> {
    let result = state
        .pipeline
        .store()
        .run(|store| store.seed_default_users())
        .await
        .map(|report| {
            info!(created = ?report.created, "Default users initialized");
            InitUsersResponse::from(report)
        })
        .map_err(TriageError::from);

    Ok(json_result(result))
}

pub async fn root() -> Result<Response, Infallible> {
    Ok(warp::reply::json(&MessageResponse {
        message: WELCOME_MESSAGE.to_string(),
    })
    .into_response())
}

pub async fn health(state: AppState) -> Result<Response, Infallible> {
    let report = state.health.report().await;
    let status = if report.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    Ok(warp::reply::with_status(warp::reply::json(&report), status).into_response())
}

pub async fn ready(state: AppState) -> Result<Response, Infallible> {
    let ready = state
        .pipeline
        .store()
        .run(|store| store.ping())
        .await
        .is_ok();
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    let body = ReadinessResponse {
        ready,
        timestamp: current_timestamp(),
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status).into_response())
}

pub async fn live() -> Result<Response, Infallible> {
    Ok(warp::reply::json(&LivenessResponse {
        alive: true,
        timestamp: current_timestamp(),
    })
    .into_response())
}

pub async fn metrics_snapshot() -> Result<Response, Infallible> {
    Ok(warp::reply::json(&metrics().get_metrics()).into_response())
}
