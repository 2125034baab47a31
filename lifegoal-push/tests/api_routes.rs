//! Route tests driven through `tower::ServiceExt::oneshot`, no sockets.

use std::net::SocketAddr;
use std::path::PathBuf;

use axum::body::Body;
use http::{Request, StatusCode};
use lifegoal_push::{AppState, HmacTokenVerifier, PushConfig, build_router};
use serde_json::{Value, json};
use tower::ServiceExt;

const SECRET: &str = "test-secret";

fn config(dev_routes: bool, vapid: Option<&str>, file: PathBuf) -> PushConfig {
    PushConfig {
        addr: "127.0.0.1:0".parse::<SocketAddr>().unwrap(),
        secret: SECRET.to_string(),
        vapid_public_key: vapid.map(str::to_string),
        dev_routes,
        subscriptions_file: file,
    }
}

fn state(dev_routes: bool, vapid: Option<&str>, file: PathBuf) -> AppState {
    AppState::from_config(config(dev_routes, vapid, file))
}

fn subscription_body() -> Value {
    json!({
        "endpoint": "https://push.example.com/send/abc",
        "keys": { "p256dh": "BNcRd", "auth": "tBHI" }
    })
}

fn post_json(uri: &str, token: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json");
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn read_json(resp: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(resp.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

// ============================================================================
// Public routes
// ============================================================================

#[tokio::test]
async fn health_reports_ok_and_version() {
    let router = build_router(state(false, None, PathBuf::from("unused.jsonl")));
    let req = Request::builder()
        .method("GET")
        .uri("/health")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let json = read_json(resp).await;
    assert_eq!(json["status"], "ok");
    assert!(!json["version"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn subscribe_requires_a_bearer_token() {
    let router = build_router(state(false, None, PathBuf::from("unused.jsonl")));
    let resp = router
        .oneshot(post_json("/subscribe", None, &subscription_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let json = read_json(resp).await;
    assert!(json["error"].as_str().unwrap().contains("token"));
}

#[tokio::test]
async fn subscribe_rejects_forged_tokens() {
    let router = build_router(state(false, None, PathBuf::from("unused.jsonl")));
    let forged = HmacTokenVerifier::new("other-secret").sign("user-1");
    let resp = router
        .oneshot(post_json("/subscribe", Some(&forged), &subscription_body()))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn subscribe_upserts_per_user_and_endpoint() {
    let app_state = state(false, None, PathBuf::from("unused.jsonl"));
    let store = app_state.subscriptions.clone();
    let router = build_router(app_state);
    let token = HmacTokenVerifier::new(SECRET).sign("user-1");

    let first = router
        .clone()
        .oneshot(post_json("/subscribe", Some(&token), &subscription_body()))
        .await
        .unwrap();
    assert_eq!(first.status(), StatusCode::OK);
    assert_eq!(read_json(first).await, json!({ "ok": true, "created": true }));

    let second = router
        .oneshot(post_json("/subscribe", Some(&token), &subscription_body()))
        .await
        .unwrap();
    assert_eq!(read_json(second).await, json!({ "ok": true, "created": false }));

    assert_eq!(store.count().await.unwrap(), 1);
    let rows = store.for_user("user-1").await.unwrap();
    assert_eq!(rows[0].endpoint, "https://push.example.com/send/abc");
}

#[tokio::test]
async fn subscribe_rejects_invalid_bodies() {
    let router = build_router(state(false, None, PathBuf::from("unused.jsonl")));
    let token = HmacTokenVerifier::new(SECRET).sign("user-1");

    let missing_keys = json!({ "endpoint": "https://push.example.com/x" });
    let resp = router
        .clone()
        .oneshot(post_json("/subscribe", Some(&token), &missing_keys))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let blank_endpoint = json!({ "endpoint": " ", "keys": { "p256dh": "a", "auth": "b" } });
    let resp = router
        .oneshot(post_json("/subscribe", Some(&token), &blank_endpoint))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_route_is_a_stub() {
    let router = build_router(state(false, None, PathBuf::from("unused.jsonl")));
    let resp = router
        .oneshot(post_json("/test", None, &json!({})))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, json!({ "ok": true, "sent": 0 }));
}

// ============================================================================
// Development routes
// ============================================================================

#[tokio::test]
async fn dev_routes_are_absent_unless_enabled() {
    let router = build_router(state(false, Some("BPub"), PathBuf::from("unused.jsonl")));
    let req = Request::builder()
        .method("GET")
        .uri("/api/vapid-public-key")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn vapid_key_is_served_or_reported_missing() {
    let router = build_router(state(true, Some("BPub"), PathBuf::from("unused.jsonl")));
    let req = Request::builder()
        .method("GET")
        .uri("/api/vapid-public-key")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(read_json(resp).await, json!({ "publicKey": "BPub" }));

    let router = build_router(state(true, None, PathBuf::from("unused.jsonl")));
    let req = Request::builder()
        .method("GET")
        .uri("/api/vapid-public-key")
        .body(Body::empty())
        .unwrap();
    let resp = router.oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn save_subscription_appends_lines() {
    let tmp = tempfile::tempdir().unwrap();
    let file = tmp.path().join("subs.jsonl");
    let router = build_router(state(true, None, file.clone()));

    for _ in 0..2 {
        let resp = router
            .clone()
            .oneshot(post_json("/api/save-subscription", None, &subscription_body()))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }

    let contents = std::fs::read_to_string(&file).unwrap();
    let lines: Vec<&str> = contents.lines().collect();
    assert_eq!(lines.len(), 2);
    let first: Value = serde_json::from_str(lines[0]).unwrap();
    assert_eq!(first, subscription_body());

    let resp = router
        .oneshot(post_json("/api/save-subscription", None, &json!(["not", "an", "object"])))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}
