//! Health check endpoint

use axum::{Json, extract::State};
use serde::Serialize;

use crate::AppState;

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    status: &'static str,
    upstream: &'static str,
    ai: &'static str,
}

fn configured(yes: bool) -> &'static str {
    if yes { "configured" } else { "unconfigured" }
}

/// GET /health - report which outbound integrations are configured
pub async fn check(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        upstream: configured(state.upstream.is_some()),
        ai: configured(state.ai_configured),
    })
}
