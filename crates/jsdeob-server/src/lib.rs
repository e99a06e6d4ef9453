//! External API Surface (§4.6, §6): the axum HTTP server binding AST
//! Services, the Transform Runtime, the Pipeline Driver, and Library &
//! Storage together behind one JSON API.
//!
//! Router/error-handling shape grounded on `quarto-hub::server`'s axum
//! layout (`otter-web` itself is an unimplemented stub with no server
//! code of its own).

pub mod error;
pub mod routes;
pub mod state;

use std::net::SocketAddr;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Json};
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use tower_http::trace::TraceLayer;

use jsdeob_pipeline::PipelineEngine;
use jsdeob_store::Library;

pub use state::{AppState, ServerConfig};

#[derive(Serialize)]
struct NotFoundResponse {
    success: bool,
    error: &'static str,
}

async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, Json(NotFoundResponse { success: false, error: "no such route" }))
}

/// Assembles the full router over `state`, per §6's endpoint list plus the
/// supplemented health/reload/scripts-family routes (SPEC_FULL §10.3).
pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/health", get(routes::health::health))
        .route("/api/transform/parse", post(routes::transform::parse_source))
        .route("/api/transform/generate", post(routes::transform::generate_source))
        .route("/api/transform/format", post(routes::transform::format_source))
        .route("/api/transform/analyze-scope", post(routes::transform::analyze_scope_handler))
        .route("/api/transform/run", post(routes::transform::run_transform_handler))
        .route("/api/transform/run-chain", post(routes::transform::run_chain))
        .route("/api/transform/builtins", get(routes::transform::builtins))
        .route("/api/transform/builtin-source/{id}", get(routes::transform::builtin_source))
        .route("/api/plugins", get(routes::plugins::list).post(routes::plugins::create))
        .route("/api/plugins/validate", post(routes::plugins::validate))
        .route("/api/plugins/import", post(routes::plugins::import))
        .route("/api/plugins/reload", post(routes::plugins::reload))
        .route(
            "/api/plugins/{id}",
            get(routes::plugins::get).put(routes::plugins::update).delete(routes::plugins::delete),
        )
        .route("/api/plugins/{id}/export", get(routes::plugins::export))
        .route("/api/scripts", get(routes::scripts::list).post(routes::scripts::create))
        .route("/api/scripts/import", post(routes::scripts::import))
        .route(
            "/api/scripts/{id}",
            get(routes::scripts::get).put(routes::scripts::update).delete(routes::scripts::delete),
        )
        .route("/api/scripts/{id}/export", get(routes::scripts::export))
        .route("/api/projects", get(routes::projects::list).post(routes::projects::create))
        .route("/api/projects/import", post(routes::projects::import))
        .route(
            "/api/projects/{id}",
            get(routes::projects::get).put(routes::projects::update).delete(routes::projects::delete),
        )
        .route("/api/projects/{id}/duplicate", post(routes::projects::duplicate))
        .route("/api/projects/{id}/export", get(routes::projects::export))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Builds the `Library` and `PipelineEngine` from `config` and serves the
/// router until the process is terminated.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let library = Library::open(&config.base_dir)?;
    let engine = PipelineEngine::builder()
        .pool_size(config.worker_pool_size)
        .policy(config.runtime_policy())
        .build();
    let state = AppState::new(library, engine, config.runtime_policy());
    let router = build_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "jsdeob-server listening");
    axum::serve(listener, router).await?;
    Ok(())
}
