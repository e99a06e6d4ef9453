//! `/api/scripts/*` (§6, §4.5): same shape as plugins, minus folder
//! promotion and categories (scripts have no folder concept).

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use jsdeob_ast::model::PluginBlob;
use jsdeob_store::{PluginPortable, ScriptInput};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
struct ScriptsListResponse {
    success: bool,
    scripts: Vec<PluginBlob>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let scripts = state.library().scripts.list()?;
    Ok(Json(ScriptsListResponse { success: true, scripts }))
}

#[derive(Serialize)]
struct ScriptResponse {
    success: bool,
    script: PluginBlob,
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let script = state.library().scripts.get(&id)?;
    Ok(Json(ScriptResponse { success: true, script }))
}

pub async fn create(State(state): State<AppState>, Json(input): Json<ScriptInput>) -> ApiResult<impl IntoResponse> {
    let script = state.library().scripts.create(input)?;
    Ok(Json(ScriptResponse { success: true, script }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ScriptInput>,
) -> ApiResult<impl IntoResponse> {
    let script = state.library().scripts.update(&id, input)?;
    Ok(Json(ScriptResponse { success: true, script }))
}

#[derive(Serialize)]
struct SuccessOnly {
    success: bool,
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    state.library().scripts.delete(&id)?;
    Ok(Json(SuccessOnly { success: true }))
}

#[derive(Serialize)]
struct PortableResponse {
    success: bool,
    #[serde(flatten)]
    portable: PluginPortable,
}

pub async fn import(State(state): State<AppState>, Json(portable): Json<PluginPortable>) -> ApiResult<impl IntoResponse> {
    let script = state.library().scripts.import(portable)?;
    Ok(Json(ScriptResponse { success: true, script }))
}

pub async fn export(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let portable = state.library().scripts.export(&id)?;
    Ok(Json(PortableResponse { success: true, portable }))
}
