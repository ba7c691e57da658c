//! Operational HTTP endpoints.
//!
//! - `/metrics` : exposition text from the registry
//! - `/healthz` : liveness
//! - `/readyz`  : readiness (503 when draining)
//! - `/status`  : probe status as JSON

use std::collections::BTreeMap;
use std::time::Instant;

use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app_state::AppState;
use crate::sampler::ProbeStatus;

pub const CONTENT_TYPE_TEXT: &str = "text/plain; version=0.0.4; charset=utf-8";

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let resp = (StatusCode::OK, "ok");
    state.metrics().observe_request("/healthz", started.elapsed());
    resp
}

pub async fn readyz(State(state): State<AppState>) -> impl IntoResponse {
    let started = Instant::now();
    let resp = if state.is_draining() {
        (StatusCode::SERVICE_UNAVAILABLE, "draining")
    } else {
        (StatusCode::OK, "ready")
    };
    state.metrics().observe_request("/readyz", started.elapsed());
    resp
}

/// Render on a blocking thread: collectors may read files while refreshing.
pub async fn metrics(State(state): State<AppState>) -> Response {
    let started = Instant::now();
    let registry = state.registry();
    let rendered = tokio::task::spawn_blocking(move || registry.bridge()).await;
    state.metrics().observe_request("/metrics", started.elapsed());

    match rendered {
        Ok(Ok(body)) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, CONTENT_TYPE_TEXT)],
            body,
        )
            .into_response(),
        Ok(Err(e)) => {
            tracing::error!(code = e.code().as_str(), error = %e, "render failed");
            (StatusCode::INTERNAL_SERVER_ERROR, e.code().as_str()).into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "render task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL").into_response()
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub draining: bool,
    pub probes: BTreeMap<String, ProbeStatus>,
}

pub async fn status(State(state): State<AppState>) -> Json<StatusReport> {
    let started = Instant::now();
    let probes = state
        .status()
        .iter()
        .map(|e| (e.key().to_string(), e.value().clone()))
        .collect();
    let report = StatusReport {
        draining: state.is_draining(),
        probes,
    };
    state.metrics().observe_request("/status", started.elapsed());
    Json(report)
}
