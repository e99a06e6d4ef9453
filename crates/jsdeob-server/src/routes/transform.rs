//! `/api/transform/*` (§6, §4.1, §4.2, §4.4): AST services, ad-hoc single
//! transform runs, and full recipe runs.

use std::time::Instant;

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use jsdeob_ast::json::{json_to_program, program_to_json};
use jsdeob_ast::model::Recipe;
use jsdeob_ast::services::{format, generate_program, parse};
use jsdeob_ast::{analyze_scope, ScopeInfo};
use jsdeob_runtime::{run_transform, TransformInput};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Deserialize)]
pub struct ParseBody {
    pub code: String,
}

#[derive(Serialize)]
struct ParseResponse {
    success: bool,
    ast: Value,
}

pub async fn parse_source(Json(body): Json<ParseBody>) -> ApiResult<impl IntoResponse> {
    let ast = parse(&body.code)?;
    let ast_json = program_to_json(&ast.program)?;
    Ok(Json(ParseResponse { success: true, ast: ast_json }))
}

#[derive(Deserialize)]
pub struct GenerateBody {
    pub ast: Value,
}

#[derive(Serialize)]
struct CodeResponse {
    success: bool,
    code: String,
}

pub async fn generate_source(Json(body): Json<GenerateBody>) -> ApiResult<impl IntoResponse> {
    let program = json_to_program(body.ast)?;
    let code = generate_program(&program)?;
    Ok(Json(CodeResponse { success: true, code }))
}

pub async fn format_source(Json(body): Json<ParseBody>) -> ApiResult<impl IntoResponse> {
    let code = format(&body.code)?;
    Ok(Json(CodeResponse { success: true, code }))
}

#[derive(Serialize)]
struct AnalyzeScopeResponse {
    success: bool,
    scopes: Vec<ScopeInfo>,
}

pub async fn analyze_scope_handler(Json(body): Json<ParseBody>) -> ApiResult<impl IntoResponse> {
    let scopes = analyze_scope(&body.code)?;
    Ok(Json(AnalyzeScopeResponse { success: true, scopes }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunBody {
    pub code: String,
    pub transform: String,
    #[serde(default)]
    pub config: Value,
}

#[derive(Serialize)]
struct RunResponse {
    success: bool,
    code: Option<String>,
    stats: Value,
    logs: Vec<jsdeob_ast::model::LogEntry>,
    duration: u64,
}

/// Runs a single ad-hoc transform against `code`, outside of any saved
/// recipe — the workbench's "try this transform" action (§4.2).
pub async fn run_transform_handler(State(state): State<AppState>, Json(body): Json<RunBody>) -> ApiResult<impl IntoResponse> {
    let start = Instant::now();
    let outcome = run_transform(
        TransformInput::Source(&body.code),
        &body.transform,
        &body.config,
        false,
        state.runtime_policy(),
    )?;
    let duration = start.elapsed().as_millis() as u64;
    Ok(Json(RunResponse { success: true, code: outcome.code, stats: outcome.stats, logs: outcome.logs, duration }))
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunChainBody {
    pub code: String,
    pub recipe: Recipe,
    #[serde(default)]
    pub step_mode: Option<usize>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RunChainResponse {
    success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    final_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    current_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    failed_at: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    total_steps: Option<usize>,
    results: Vec<jsdeob_ast::model::StepResult>,
}

/// Batch or step-mode recipe run (§4.4). Batch mode runs the whole flattened
/// recipe on the offload worker pool; step mode runs a single step inline,
/// since it is cheap and the driver already materializes its code.
pub async fn run_chain(State(state): State<AppState>, Json(body): Json<RunChainBody>) -> ApiResult<impl IntoResponse> {
    match body.step_mode {
        None => {
            let report = state.engine().run(body.code, body.recipe).await?;
            if report.success {
                Ok(Json(RunChainResponse {
                    success: true,
                    final_code: report.final_code,
                    current_code: None,
                    failed_at: None,
                    error: None,
                    total_steps: None,
                    results: report.results,
                }))
            } else {
                let current_code = report.results.last().and_then(|r| r.code.clone());
                Ok(Json(RunChainResponse {
                    success: false,
                    final_code: None,
                    current_code,
                    failed_at: report.failed_at,
                    error: report.error,
                    total_steps: None,
                    results: report.results,
                }))
            }
        }
        Some(step_index) => {
            let driver = jsdeob_pipeline::PipelineDriver::new(state.runtime_policy().clone());
            let outcome = tokio::task::spawn_blocking(move || driver.run_step(&body.code, &body.recipe, step_index))
                .await
                .map_err(|e| ApiError::internal(e.to_string()))??;
            Ok(Json(RunChainResponse {
                success: true,
                final_code: None,
                current_code: Some(outcome.current_code),
                failed_at: None,
                error: None,
                total_steps: Some(outcome.total_steps),
                results: vec![outcome.step_result],
            }))
        }
    }
}

#[derive(Serialize)]
struct BuiltinsResponse {
    success: bool,
    transforms: Vec<jsdeob_ast::model::TransformMeta>,
}

/// `GET /api/transform/builtins` (§6): the catalogue, filtering out any
/// internal `__`-prefixed entries (there are none today, but the filter is
/// part of the documented contract).
pub async fn builtins(State(state): State<AppState>) -> impl IntoResponse {
    let transforms = state
        .library()
        .catalog
        .builtins()
        .into_iter()
        .filter(|t| !t.id.starts_with("__"))
        .collect();
    Json(BuiltinsResponse { success: true, transforms })
}

#[derive(Serialize)]
struct BuiltinSourceResponse {
    success: bool,
    id: String,
    name: String,
    source: String,
}

pub async fn builtin_source(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let source = state
        .library()
        .catalog
        .builtin_source(&id)
        .ok_or_else(|| ApiError::not_found(format!("no built-in source for `{id}`")))?;
    let name = state
        .library()
        .catalog
        .builtins()
        .into_iter()
        .find(|t| t.id == id)
        .map(|t| t.name)
        .unwrap_or_else(|| id.clone());
    Ok(Json(BuiltinSourceResponse { success: true, id, name, source: source.to_string() }))
}
