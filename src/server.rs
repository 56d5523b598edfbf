//! HTTP host for the skill
//!
//! `POST /` takes an event document and answers with the response envelope,
//! the voice platform's HTTPS endpoint contract. Alongside it sit the usual
//! operational endpoints for container orchestration.

use crate::error::{ErrorBody, ErrorCode};
use crate::observability::metrics::metrics;
use crate::skill::Skill;
use chrono::Utc;
use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{info, info_span};
use uuid::Uuid;
use warp::http::StatusCode;
use warp::{Filter, Rejection, Reply};

/// Largest event document accepted, in bytes
const MAX_EVENT_BYTES: u64 = 64 * 1024;

/// Shared state behind every route
pub struct ServerState {
    skill: Skill,
    skill_id: String,
    started_at: i64,
}

impl ServerState {
    pub fn new<S: Into<String>>(skill: Skill, skill_id: S) -> Self {
        Self {
            skill,
            skill_id: skill_id.into(),
            started_at: Utc::now().timestamp(),
        }
    }
}

/// All routes served by the skill host
pub fn routes(
    state: Arc<ServerState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone + Send + Sync + 'static {
    // POST / - skill invocation
    let invoke_route = warp::path::end()
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_EVENT_BYTES))
        .and(warp::body::json())
        .and(with_state(state.clone()))
        .and_then(invoke_handler);

    // GET /health - overall status
    let health_route = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .and_then(health_handler);

    // GET /metrics - invocation statistics
    let metrics_route = warp::path("metrics")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| warp::reply::json(&metrics().get_metrics()));

    // GET /ready and GET /live - orchestration probes
    let ready_route = warp::path("ready")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&ProbeResponse {
                ok: true,
                timestamp: Utc::now().timestamp(),
            })
        });
    let live_route = warp::path("live")
        .and(warp::path::end())
        .and(warp::get())
        .map(|| {
            warp::reply::json(&ProbeResponse {
                ok: true,
                timestamp: Utc::now().timestamp(),
            })
        });

    // GET / - endpoint listing
    let root_route = warp::path::end().and(warp::get()).map(|| {
        let mut endpoints = HashMap::new();
        endpoints.insert("POST /", "Handle a skill event");
        endpoints.insert("GET /health", "Overall health status");
        endpoints.insert("GET /metrics", "Invocation metrics");
        endpoints.insert("GET /ready", "Readiness probe");
        endpoints.insert("GET /live", "Liveness probe");
        warp::reply::json(&ApiDocumentationResponse { endpoints })
    });

    invoke_route
        .or(health_route)
        .or(metrics_route)
        .or(ready_route)
        .or(live_route)
        .or(root_route)
        .recover(handle_rejection)
}

/// Serve until `shutdown` resolves
pub async fn serve<F>(
    state: Arc<ServerState>,
    addr: SocketAddr,
    shutdown: F,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (bound, server) =
        warp::serve(routes(state)).try_bind_with_graceful_shutdown(addr, shutdown)?;

    info!("Skill endpoint listening on {}", bound);
    server.await;
    info!("Skill endpoint stopped");

    Ok(())
}

fn with_state(
    state: Arc<ServerState>,
) -> impl Filter<Extract = (Arc<ServerState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

async fn invoke_handler(
    event: Value,
    state: Arc<ServerState>,
) -> Result<warp::reply::WithStatus<warp::reply::Json>, Infallible> {
    let invocation_id = Uuid::new_v4();
    let span = info_span!("http_invocation", %invocation_id);
    let _enter = span.enter();

    let reply = match state.skill.handle_json(event) {
        Ok(Some(envelope)) => {
            warp::reply::with_status(warp::reply::json(&envelope), StatusCode::OK)
        }
        Ok(None) => warp::reply::with_status(warp::reply::json(&Value::Null), StatusCode::OK),
        Err(e) => {
            let status = StatusCode::from_u16(e.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            warp::reply::with_status(warp::reply::json(&e.to_error_body()), status)
        }
    };

    Ok(reply)
}

async fn health_handler(state: Arc<ServerState>) -> Result<warp::reply::Json, Infallible> {
    let now = Utc::now().timestamp();
    let snapshot = metrics().get_metrics();

    Ok(warp::reply::json(&HealthStatus {
        status: "healthy".to_string(),
        skill_id: state.skill_id.clone(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        application_id_gate: state.skill.expected_application_id().is_some(),
        invocations: snapshot.invocations.total,
        uptime_seconds: (now - state.started_at).max(0) as u64,
        timestamp: now,
    }))
}

async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, code, message) = if rejection.is_not_found() {
        (
            StatusCode::NOT_FOUND,
            ErrorCode::InternalError,
            "Not found".to_string(),
        )
    } else if let Some(e) = rejection.find::<warp::filters::body::BodyDeserializeError>() {
        (
            StatusCode::BAD_REQUEST,
            ErrorCode::MalformedEvent,
            format!("Malformed event: {e}"),
        )
    } else if rejection.find::<warp::reject::PayloadTooLarge>().is_some() {
        (
            StatusCode::PAYLOAD_TOO_LARGE,
            ErrorCode::MalformedEvent,
            "Malformed event: payload too large".to_string(),
        )
    } else if rejection.find::<warp::reject::MethodNotAllowed>().is_some() {
        (
            StatusCode::METHOD_NOT_ALLOWED,
            ErrorCode::InternalError,
            "Method not allowed".to_string(),
        )
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::InternalError,
            "Unhandled rejection".to_string(),
        )
    };

    let body = ErrorBody {
        code,
        error: message,
        timestamp: Utc::now().timestamp(),
    };
    Ok(warp::reply::with_status(warp::reply::json(&body), status))
}

#[derive(Debug, Serialize)]
struct HealthStatus {
    status: String,
    skill_id: String,
    version: String,
    application_id_gate: bool,
    invocations: u64,
    uptime_seconds: u64,
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct ProbeResponse {
    ok: bool,
    timestamp: i64,
}

#[derive(Debug, Serialize)]
struct ApiDocumentationResponse {
    endpoints: HashMap<&'static str, &'static str>,
}
