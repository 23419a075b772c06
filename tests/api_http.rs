// tests/api_http.rs
//
// HTTP-level tests for the public API Router without opening sockets.
// We exercise the router directly via tower::ServiceExt::oneshot.
//
// Covered:
// - GET /health
// - GET /api/items
// - POST /api/recommend  (payload shape + assistant-source header)
// - POST /api/feedback   (mutation + unknown-id handling)

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Request, StatusCode},
    Router,
};
use serde_json::{json, Value as Json};
use tower::ServiceExt as _; // for `oneshot`

use fashion_stylist::api::{self, AppState};
use fashion_stylist::assistant::{AssistantChain, BackendOutcome, MockBackend};
use fashion_stylist::config::StylistConfig;
use fashion_stylist::score::BreakpointTable;

const BODY_LIMIT: usize = 1024 * 1024; // 1MB, safe for tests

const CATALOG: &str = r#"[
    {"id": "navy-blazer", "weather": "mild", "style": "semi-formal", "formality": 6, "color": "navy"},
    {"id": "denim-jacket", "weather": "cool", "style": "casual", "formality": 2, "color": "blue"}
]"#;

fn unique_tmp_dir() -> PathBuf {
    let mut dir = std::env::temp_dir();
    let nanos = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    dir.push(format!("api_http_test_{nanos}"));
    fs::create_dir_all(&dir).unwrap();
    dir
}

/// Build the same Router the binary uses, but against temp files and a
/// scripted assistant chain (no network, no subprocess).
fn test_router(dir: &std::path::Path, remote: BackendOutcome, local: BackendOutcome) -> Router {
    let catalog_path = dir.join("fashion_db.json");
    fs::write(&catalog_path, CATALOG).unwrap();

    let config = StylistConfig {
        catalog_path: catalog_path.to_string_lossy().into_owned(),
        preferences_path: dir.join("memory.json").to_string_lossy().into_owned(),
        ..StylistConfig::default()
    };

    let chain = AssistantChain::new(
        Arc::new(MockBackend { fixed: remote }),
        Arc::new(MockBackend { fixed: local }),
    );
    let state = AppState::new(config, BreakpointTable::default_seed(), chain);
    api::router(state)
}

fn replying(text: &str) -> BackendOutcome {
    BackendOutcome::Reply(text.to_string())
}

async fn read_json(resp: axum::response::Response) -> Json {
    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    serde_json::from_slice(&bytes).expect("parse json")
}

#[tokio::test]
async fn api_health_returns_200_and_ok_body() {
    let dir = unique_tmp_dir();
    let app = test_router(&dir, replying("x"), replying("y"));

    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .expect("build GET /health");

    let resp = app.oneshot(req).await.expect("oneshot /health");
    assert_eq!(resp.status(), StatusCode::OK, "health should be 200");

    let bytes = body::to_bytes(resp.into_body(), BODY_LIMIT)
        .await
        .expect("read body")
        .to_vec();
    let text = String::from_utf8(bytes).expect("utf8");
    assert_eq!(text.trim(), "OK", "health body should be 'OK'");
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn api_items_returns_the_catalog() {
    let dir = unique_tmp_dir();
    let app = test_router(&dir, replying("x"), replying("y"));

    let req = Request::builder()
        .method("GET")
        .uri("/api/items")
        .body(Body::empty())
        .expect("build GET /api/items");

    let resp = app.oneshot(req).await.expect("oneshot /api/items");
    assert!(resp.status().is_success());

    let v = read_json(resp).await;
    let arr = v.as_array().expect("items response must be an array");
    assert_eq!(arr.len(), 2, "catalog length should match the file");
    assert_eq!(arr[0]["id"], json!("navy-blazer"));
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn api_recommend_returns_full_payload_and_source_header() {
    let dir = unique_tmp_dir();
    let app = test_router(
        &dir,
        replying(r#"{"outfit": "Navy Blazer", "reason": "matches the occasion"}"#),
        replying("unused"),
    );

    let payload = json!({
        "temperature": 20,
        "formality": 5,
        "mood": 6,
        "occasion": "networking dinner"
    });
    let req = Request::builder()
        .method("POST")
        .uri("/api/recommend")
        .header("content-type", "application/json")
        .body(Body::from(payload.to_string()))
        .expect("build POST /api/recommend");

    let resp = app.oneshot(req).await.expect("oneshot /api/recommend");
    assert!(
        resp.status().is_success(),
        "POST /api/recommend should be 2xx, got {}",
        resp.status()
    );

    let source = resp
        .headers()
        .get("x-assistant-source")
        .and_then(|h| h.to_str().ok())
        .unwrap_or("");
    assert_eq!(source, "remote");

    let v = read_json(resp).await;

    // Contract checks for UI consumers
    assert_eq!(v["status"], json!("success"));
    assert_eq!(v["assistant_source"], json!("remote"));
    assert_eq!(v["context"]["occasion"], json!("networking dinner"));
    for map in ["fuzzy_scores", "similarity_scores", "combined_scores"] {
        let scores = v[map]
            .as_object()
            .unwrap_or_else(|| panic!("missing {map}"));
        assert_eq!(scores.len(), 2, "{map} must cover the whole catalog");
        assert!(scores.contains_key("navy-blazer") && scores.contains_key("denim-jacket"));
    }
    assert!(v["recommendation"]
        .as_str()
        .expect("recommendation text")
        .contains("Navy Blazer"));
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn api_recommend_keeps_scores_when_both_backends_fail() {
    let dir = unique_tmp_dir();
    let app = test_router(
        &dir,
        BackendOutcome::Unavailable,
        BackendOutcome::Unavailable,
    );

    let req = Request::builder()
        .method("POST")
        .uri("/api/recommend")
        .header("content-type", "application/json")
        .body(Body::from(json!({"temperature": 20}).to_string()))
        .expect("build POST /api/recommend");

    let resp = app.oneshot(req).await.expect("oneshot /api/recommend");
    assert!(
        resp.status().is_success(),
        "assistant failure must not fail the request"
    );

    let v = read_json(resp).await;
    assert_eq!(v["status"], json!("success"));
    assert_eq!(v["assistant_source"], json!("failed"));
    assert_eq!(
        v["combined_scores"].as_object().expect("scores").len(),
        2,
        "scores computed before the assistant failure must survive"
    );
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn api_feedback_updates_preferences() {
    let dir = unique_tmp_dir();
    let app = test_router(&dir, replying("x"), replying("y"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/feedback")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"item_id": "navy-blazer", "feedback": "like"}).to_string(),
        ))
        .expect("build POST /api/feedback");

    let resp = app.clone().oneshot(req).await.expect("oneshot feedback");
    assert!(resp.status().is_success());
    let v = read_json(resp).await;
    assert_eq!(v["status"], json!("success"));
    let affinity = v["preferences"]["preferred_colors"]["navy"]
        .as_f64()
        .expect("navy affinity");
    assert!((affinity - 0.6).abs() < 1e-9, "0.5 baseline + 0.1 like");

    // The mutation is visible on the debug endpoint (persisted, not cached).
    let req = Request::builder()
        .method("GET")
        .uri("/debug/preferences")
        .body(Body::empty())
        .unwrap();
    let resp = app.oneshot(req).await.expect("oneshot debug prefs");
    let v = read_json(resp).await;
    assert!((v["preferred_colors"]["navy"].as_f64().unwrap() - 0.6).abs() < 1e-9);
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn api_feedback_unknown_item_is_404_with_error_status() {
    let dir = unique_tmp_dir();
    let app = test_router(&dir, replying("x"), replying("y"));

    let req = Request::builder()
        .method("POST")
        .uri("/api/feedback")
        .header("content-type", "application/json")
        .body(Body::from(
            json!({"item_id": "ghost", "feedback": "like"}).to_string(),
        ))
        .unwrap();

    let resp = app.oneshot(req).await.expect("oneshot feedback");
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    let v = read_json(resp).await;
    assert_eq!(v["status"], json!("error"));
    assert!(v["error"].as_str().unwrap().contains("ghost"));
    let _ = fs::remove_dir_all(&dir);
}

#[tokio::test]
async fn api_recommend_missing_catalog_is_an_error_payload() {
    let dir = unique_tmp_dir();
    let app = test_router(&dir, replying("x"), replying("y"));
    fs::remove_file(dir.join("fashion_db.json")).unwrap();

    let req = Request::builder()
        .method("POST")
        .uri("/api/recommend")
        .header("content-type", "application/json")
        .body(Body::from(json!({"temperature": 20}).to_string()))
        .unwrap();

    let resp = app.oneshot(req).await.expect("oneshot /api/recommend");
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let v = read_json(resp).await;
    assert_eq!(v["status"], json!("error"));
    let _ = fs::remove_dir_all(&dir);
}
