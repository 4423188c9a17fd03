//! Health endpoint: process liveness plus a time-boxed database probe.

use std::sync::Arc;

use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use missive_core::{HealthReport, HealthStatus};
use utoipa::OpenApi;

use crate::state::AppState;

#[derive(OpenApi)]
#[openapi(paths(get_health), components(schemas(HealthReport, HealthStatus)))]
pub struct HealthApi;

/// Register health-check routes.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/health", get(get_health))
}

/// Aggregate health report.
///
/// Always answers 200; `status` is `DOWN` when the database probe fails or
/// exceeds its budget, with the reason in `dbError`.
#[utoipa::path(
    get,
    path = "/health",
    tag = "health",
    responses(
        (status = 200, description = "Health report", body = HealthReport)
    )
)]
pub async fn get_health(State(state): State<Arc<AppState>>) -> Json<HealthReport> {
    Json(state.health.report().await)
}

// ── Tests ──────────────────────────────────────────────────────────────────────
