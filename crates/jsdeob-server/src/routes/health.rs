//! `GET /api/health` (supplemented by SPEC_FULL §10's ambient-stack
//! expansion; not in the distilled API surface but standard on every
//! axum service in the pack, e.g. `quarto-hub::server::health`).

use axum::extract::State;
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use crate::state::AppState;

#[derive(Serialize)]
struct HealthResponse {
    success: bool,
    status: &'static str,
    #[serde(rename = "uptimeSecs")]
    uptime_secs: u64,
    #[serde(rename = "workerPoolSize")]
    worker_pool_size: usize,
}

pub async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthResponse {
        success: true,
        status: "ok",
        uptime_secs: state.uptime_secs(),
        worker_pool_size: state.engine().pool_size(),
    })
}
