// HTTP surface tests: router + handlers with a scripted generator.

mod common;

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::util::ServiceExt;

use common::{memory_store, ScriptedGenerator};
use scribe::api::http::build_router;
use scribe::state::AppState;
use scribe::workflow::EngineOptions;

const OUTLINE: &str = "第一章\n第二章\n第三章\n第四章\n第五章\n第六章";

fn app(generator: ScriptedGenerator, store: scribe::store::SqliteSessionStore) -> axum::Router {
    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(generator),
        EngineOptions::default(),
        ["X".to_string()],
    ));
    build_router(state, "*", Duration::from_secs(30))
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn health_is_ok() {
    let app = app(ScriptedGenerator::replies(&[]), memory_store().await);
    let response = app
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn turn_rejects_malformed_body() {
    let app = app(ScriptedGenerator::replies(&[]), memory_store().await);
    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/turn")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not:json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn turn_rejects_empty_message() {
    let app = app(ScriptedGenerator::replies(&[]), memory_store().await);
    let response = app
        .oneshot(post_json("/turn", json!({"message": "   ", "code": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn turn_rejects_unknown_code_without_creating_state() {
    let store = memory_store().await;
    let app = app(ScriptedGenerator::replies(&[OUTLINE]), store);
    let response = app
        .oneshot(post_json("/turn", json!({"message": "hello", "code": "intruder"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "AUTH_ERROR");
}

#[tokio::test]
async fn first_turn_returns_outline_and_state() {
    let app = app(ScriptedGenerator::replies(&[OUTLINE]), memory_store().await);
    let response = app
        .oneshot(post_json("/turn", json!({"message": "write about bees", "code": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = read_json(response).await;
    assert!(body["reply"].as_str().unwrap().contains("第一章"));
    assert_eq!(body["state"]["status"], "AwaitingOutlineApproval");
    assert!(body["state"].get("current_chapter_index").is_none());
    assert!(body.get("chapters").is_none());
}

#[tokio::test]
async fn upstream_failure_is_a_bad_gateway_and_retryable() {
    let store = memory_store().await;
    let generator = ScriptedGenerator::new(vec![Err(500), Ok(OUTLINE.to_string())]);
    let state = Arc::new(AppState::new(
        Arc::new(store),
        Arc::new(generator),
        EngineOptions::default(),
        ["X".to_string()],
    ));
    let app = build_router(state, "*", Duration::from_secs(30));

    let response = app
        .clone()
        .oneshot(post_json("/turn", json!({"message": "write about bees", "code": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = read_json(response).await;
    assert_eq!(body["error_code"], "UPSTREAM_ERROR");
    assert_eq!(body["upstream_status"], 500);

    // the session was not mutated, so the same turn simply runs again
    let response = app
        .oneshot(post_json("/turn", json!({"message": "write about bees", "code": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["state"]["status"], "AwaitingOutlineApproval");
}

#[tokio::test]
async fn completed_workflow_reports_chapters_over_http() {
    let generator = ScriptedGenerator::replies(&[OUTLINE, "一", "二", "三"]);
    let app = app(generator, memory_store().await);

    for message in ["需求", "C", "C", "C"] {
        let response = app
            .clone()
            .oneshot(post_json("/turn", json!({"message": message, "code": "X"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app
        .oneshot(post_json("/turn", json!({"message": "C", "code": "X"})))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["state"]["status"], "Completed");
    let chapters = body["chapters"].as_array().unwrap();
    assert_eq!(chapters.len(), 3);
    assert_eq!(chapters[1]["index"], 1);
}

#[tokio::test]
async fn reset_clears_the_session() {
    let generator = ScriptedGenerator::replies(&[OUTLINE, "新大纲"]);
    let app = app(generator, memory_store().await);

    let response = app
        .clone()
        .oneshot(post_json("/turn", json!({"message": "需求", "code": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app
        .clone()
        .oneshot(post_json("/reset", json!({"code": "X"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["ok"], true);

    // the next turn starts the workflow from scratch
    let response = app
        .oneshot(post_json("/turn", json!({"message": "新的需求", "code": "X"})))
        .await
        .unwrap();
    let body = read_json(response).await;
    assert_eq!(body["state"]["status"], "AwaitingOutlineApproval");
    assert!(body["reply"].as_str().unwrap().contains("新大纲"));
}

#[tokio::test]
async fn reset_requires_a_valid_code() {
    let app = app(ScriptedGenerator::replies(&[]), memory_store().await);
    let response = app
        .oneshot(post_json("/reset", json!({"code": "intruder"})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
