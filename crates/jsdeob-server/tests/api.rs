//! HTTP contract tests (SPEC_FULL §10.5): drive the router directly through
//! `tower::ServiceExt::oneshot` rather than binding a real socket, the
//! standard pattern for testing an axum service in-process.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use jsdeob_pipeline::PipelineEngine;
use jsdeob_runtime::RuntimePolicy;
use jsdeob_server::{build_router, AppState};
use jsdeob_store::Library;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

fn harness() -> (TempDir, axum::Router) {
    let dir = TempDir::new().unwrap();
    let library = Library::open(dir.path()).unwrap();
    let engine = PipelineEngine::builder().pool_size(1).build();
    let state = AppState::new(library, engine, RuntimePolicy::default());
    (dir, build_router(state))
}

async fn post_json(router: &axum::Router, path: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(path)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&body).unwrap()))
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

async fn get_json(router: &axum::Router, path: &str) -> (StatusCode, Value) {
    let request = Request::builder().method("GET").uri(path).body(Body::empty()).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value: Value = serde_json::from_slice(&bytes).unwrap();
    (status, value)
}

#[tokio::test]
async fn health_reports_ok() {
    let (_dir, router) = harness();
    let (status, body) = get_json(&router, "/api/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn parse_then_generate_round_trips() {
    let (_dir, router) = harness();
    let (status, body) = post_json(&router, "/api/transform/parse", json!({"code": "var x = 1;"})).await;
    assert_eq!(status, StatusCode::OK);
    let ast = body["ast"].clone();

    let (status, body) = post_json(&router, "/api/transform/generate", json!({"ast": ast})).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["code"].as_str().unwrap().contains("var x"));
}

#[tokio::test]
async fn parse_error_is_a_400_with_error_field() {
    let (_dir, router) = harness();
    let (status, body) = post_json(&router, "/api/transform/parse", json!({"code": "var x = ;;;"})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn run_chain_executes_a_builtin_recipe() {
    let (_dir, router) = harness();
    let recipe = json!([{
        "id": "constantFolding",
        "type": "builtin",
        "config": {},
        "enabled": true,
        "iterations": 1
    }]);
    let (status, body) = post_json(
        &router,
        "/api/transform/run-chain",
        json!({"code": "var x = 1 + 2 + 3;", "recipe": recipe}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    assert!(body["finalCode"].as_str().unwrap().contains('6'));
}

#[tokio::test]
async fn builtins_catalog_lists_constant_folding() {
    let (_dir, router) = harness();
    let (status, body) = get_json(&router, "/api/transform/builtins").await;
    assert_eq!(status, StatusCode::OK);
    let ids: Vec<&str> = body["transforms"].as_array().unwrap().iter().map(|t| t["id"].as_str().unwrap()).collect();
    assert!(ids.contains(&"constantFolding"));
}

#[tokio::test]
async fn plugin_crud_round_trips() {
    let (_dir, router) = harness();
    let (status, body) = post_json(
        &router,
        "/api/plugins",
        json!({"name": "My Plugin", "description": "d", "code": "function run(){}", "config": {}}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = body["plugin"]["id"].as_str().unwrap().to_string();

    let (status, _body) = get_json(&router, &format!("/api/plugins/{id}")).await;
    assert_eq!(status, StatusCode::OK);

    let request = Request::builder()
        .method("DELETE")
        .uri(format!("/api/plugins/{id}"))
        .body(Body::empty())
        .unwrap();
    let response = router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let (status, _body) = get_json(&router, &format!("/api/plugins/{id}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn project_not_found_is_a_404() {
    let (_dir, router) = harness();
    let (status, body) = get_json(&router, "/api/projects/does-not-exist").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["success"], false);
}
