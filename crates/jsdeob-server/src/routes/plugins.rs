//! `/api/plugins/*` (§6, §4.5): saved plugin CRUD plus import/export/reload.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::{Deserialize, Serialize};

use jsdeob_ast::model::PluginBlob;
use jsdeob_store::{PluginInput, PluginPortable};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
struct PluginsListResponse {
    success: bool,
    plugins: Vec<PluginBlob>,
    categories: Vec<jsdeob_store::CategorySummary>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let plugins = state.library().plugins.list()?;
    let categories = state.library().catalog.categories();
    Ok(Json(PluginsListResponse { success: true, plugins, categories }))
}

#[derive(Serialize)]
struct PluginResponse {
    success: bool,
    plugin: PluginBlob,
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let plugin = state.library().plugins.get(&id)?;
    Ok(Json(PluginResponse { success: true, plugin }))
}

pub async fn create(State(state): State<AppState>, Json(input): Json<PluginInput>) -> ApiResult<impl IntoResponse> {
    let plugin = state.library().plugins.create(input, &state.library().catalog)?;
    Ok(Json(PluginResponse { success: true, plugin }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<PluginInput>,
) -> ApiResult<impl IntoResponse> {
    let plugin = state.library().plugins.update(&id, input)?;
    Ok(Json(PluginResponse { success: true, plugin }))
}

#[derive(Serialize)]
struct SuccessOnly {
    success: bool,
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    state.library().plugins.delete(&id)?;
    Ok(Json(SuccessOnly { success: true }))
}

#[derive(Deserialize)]
pub struct ValidateBody {
    pub code: String,
}

#[derive(Serialize)]
struct ValidateResponse {
    success: bool,
    valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

pub async fn validate(Json(body): Json<ValidateBody>) -> impl IntoResponse {
    match jsdeob_store::PluginStore::validate(&body.code) {
        Ok(()) => Json(ValidateResponse { success: true, valid: true, error: None }),
        Err(e) => Json(ValidateResponse { success: true, valid: false, error: Some(e.to_string()) }),
    }
}

#[derive(Serialize)]
struct PortableResponse {
    success: bool,
    #[serde(flatten)]
    portable: PluginPortable,
}

pub async fn import(State(state): State<AppState>, Json(portable): Json<PluginPortable>) -> ApiResult<impl IntoResponse> {
    let plugin = state.library().plugins.import(portable)?;
    Ok(Json(PluginResponse { success: true, plugin }))
}

pub async fn export(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let portable = state.library().plugins.export(&id)?;
    Ok(Json(PortableResponse { success: true, portable }))
}

pub async fn reload(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    state.library().catalog.reload()?;
    Ok(Json(SuccessOnly { success: true }))
}
