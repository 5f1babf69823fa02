//! HTTP surface
//!
//! Application routes live under `/api`; `/health`, `/ready`, `/live` and
//! `/metrics` serve operators. CORS is allow-all (see [`cors`]) and errors
//! are returned as `{"detail": "..."}`.

pub mod cors;
pub mod handlers;
pub mod rejection;
pub mod types;

use crate::error::{TriageError, TriageResult};
use crate::health::HealthCheckManager;
use crate::pipeline::TriagePipeline;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::info;
use warp::{Filter, Rejection, Reply};

const MAX_BODY_BYTES: u64 = 64 * 1024;

#[derive(Clone)]
pub struct AppState {
    pub pipeline: TriagePipeline,
    pub health: Arc<HealthCheckManager>,
}

impl AppState {
    pub fn new(pipeline: TriagePipeline, health: HealthCheckManager) -> Self {
        Self {
            pipeline,
            health: Arc::new(health),
        }
    }
}

fn with_state(state: AppState) -> impl Filter<Extract = (AppState,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

fn json_body<T: serde::de::DeserializeOwned + Send>(
) -> impl Filter<Extract = (T,), Error = Rejection> + Clone {
    warp::body::content_length_limit(MAX_BODY_BYTES).and(warp::body::json())
}

pub fn api_routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let login = warp::path!("login")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::login);

    let predict = warp::path!("predict")
        .and(warp::post())
        .and(json_body())
        .and(with_state(state.clone()))
        .and_then(handlers::predict);

    let tickets = warp::path!("tickets" / String / String)
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::list_tickets);

    let init_users = warp::path!("init-users")
        .and(warp::post())
        .and(with_state(state))
        .and_then(handlers::init_users);

    warp::path("api").and(login.or(predict).or(tickets).or(init_users))
}

pub fn operational_routes(
    state: AppState,
) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let health = warp::path!("health")
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(handlers::health);

    let ready = warp::path!("ready")
        .and(warp::get())
        .and(with_state(state))
        .and_then(handlers::ready);

    let live = warp::path!("live").and(warp::get()).and_then(handlers::live);

    let metrics = warp::path!("metrics")
        .and(warp::get())
        .and_then(handlers::metrics_snapshot);

    let root = warp::path::end().and(warp::get()).and_then(handlers::root);

    health.or(ready).or(live).or(metrics).or(root)
}

/// Full application filter: routes, error mapping, CORS, request tracing
pub fn routes(state: AppState) -> impl Filter<Extract = (impl Reply,), Error = Rejection> + Clone {
    let app = api_routes(state.clone())
        .or(operational_routes(state))
        .recover(rejection::handle_rejection);

    cors::preflight()
        .or(warp::header::optional::<String>("origin")
            .and(app)
            .map(|origin: Option<String>, reply| cors::with_cors_headers(origin, reply)))
        .with(warp::trace::request())
}

pub struct ApiServer {
    state: AppState,
    addr: SocketAddr,
}

impl ApiServer {
    pub fn new(state: AppState, addr: SocketAddr) -> Self {
        Self { state, addr }
    }

    /// Bind the listener. The returned future serves until `shutdown`
    /// resolves, then drains in-flight requests.
    pub fn bind<F>(
        self,
        shutdown: F,
    ) -> TriageResult<(SocketAddr, impl Future<Output = ()> + Send + 'static)>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = self.addr;
        let (bound, server) = warp::serve(routes(self.state))
            .try_bind_with_graceful_shutdown(addr, shutdown)
            .map_err(|e| TriageError::internal_error(format!("Failed to bind {addr}: {e}")))?;

        info!("Ticket triage API listening on {}", bound);
        Ok((bound, server))
    }

    pub async fn run_until<F>(self, shutdown: F) -> TriageResult<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let (_, server) = self.bind(shutdown)?;
        server.await;
        info!("Ticket triage API stopped");
        Ok(())
    }
}
