//! Health check and metrics endpoints

use axum::{Extension, Json, extract::State, response::IntoResponse};
use metrics_exporter_prometheus::PrometheusHandle;
use serde::Serialize;

use crate::state::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    ai_configured: bool,
    active_sessions: usize,
}

/// GET /health - Report liveness, whether an API key is set, and how many
/// sessions are held in memory
pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    let ai_configured = state.completer.is_configured();
    if !ai_configured {
        tracing::debug!("Health check: AI client has no API key");
    }
    Json(HealthResponse {
        status: "healthy",
        ai_configured,
        active_sessions: state.sessions.len().await,
    })
}

/// GET /metrics - Render collected metrics in Prometheus text format
pub async fn metrics(Extension(handle): Extension<PrometheusHandle>) -> impl IntoResponse {
    handle.render()
}
