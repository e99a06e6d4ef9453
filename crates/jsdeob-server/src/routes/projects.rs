//! `/api/projects/*` (§6, §4.5): project CRUD plus duplicate/import/export.

use axum::extract::{Path, State};
use axum::response::IntoResponse;
use axum::Json;
use serde::Serialize;

use jsdeob_ast::model::Project;
use jsdeob_store::{ProjectInput, ProjectPortable};

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
struct ProjectsListResponse {
    success: bool,
    projects: Vec<Project>,
}

pub async fn list(State(state): State<AppState>) -> ApiResult<impl IntoResponse> {
    let projects = state.library().projects.list()?;
    Ok(Json(ProjectsListResponse { success: true, projects }))
}

#[derive(Serialize)]
struct ProjectResponse {
    success: bool,
    project: Project,
}

pub async fn get(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let project = state.library().projects.get(&id)?;
    Ok(Json(ProjectResponse { success: true, project }))
}

pub async fn create(State(state): State<AppState>, Json(input): Json<ProjectInput>) -> ApiResult<impl IntoResponse> {
    let project = state.library().projects.create(input)?;
    Ok(Json(ProjectResponse { success: true, project }))
}

pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ProjectInput>,
) -> ApiResult<impl IntoResponse> {
    let project = state.library().projects.update(&id, input)?;
    Ok(Json(ProjectResponse { success: true, project }))
}

#[derive(Serialize)]
struct SuccessOnly {
    success: bool,
}

pub async fn delete(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    state.library().projects.delete(&id)?;
    Ok(Json(SuccessOnly { success: true }))
}

pub async fn duplicate(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let project = state.library().projects.duplicate(&id)?;
    Ok(Json(ProjectResponse { success: true, project }))
}

#[derive(Serialize)]
struct PortableResponse {
    success: bool,
    #[serde(flatten)]
    portable: ProjectPortable,
}

pub async fn export(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<impl IntoResponse> {
    let portable = state.library().projects.export(&id)?;
    Ok(Json(PortableResponse { success: true, portable }))
}

pub async fn import(State(state): State<AppState>, Json(portable): Json<ProjectPortable>) -> ApiResult<impl IntoResponse> {
    let project = state.library().projects.import(portable)?;
    Ok(Json(ProjectResponse { success: true, project }))
}
