//! Integration Tests for API Endpoints
//!
//! Tests full request/response cycle for the cache admin endpoints.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use forge_cache::{
    api::create_router,
    cache::{CacheManager, CacheStore, ManualClock},
    AppState,
};
use serde_json::{json, Value};
use tower::ServiceExt;

const SECRET: &str = "cron-secret-for-tests";
const T0: u64 = 1_700_000_000_000;

// == Helper Functions ==

fn create_test_state() -> (AppState, ManualClock) {
    let clock = ManualClock::new(T0);
    let cache = CacheManager::new(CacheStore::new(Arc::new(clock.clone())));
    (AppState::new(cache, Some(SECRET)), clock)
}

fn bearer() -> String {
    format!("Bearer {}", SECRET)
}

async fn body_to_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn post_cleanup(app: &Router, auth: Option<&str>) -> axum::response::Response {
    let mut request = Request::builder().method("POST").uri("/api/cache/cleanup");
    if let Some(value) = auth {
        request = request.header("authorization", value);
    }

    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

// == Cleanup Endpoint Tests ==

#[tokio::test]
async fn test_cleanup_endpoint_success() {
    let (state, clock) = create_test_state();
    state.cache.set("a", json!({"x": 1}), 1).await.unwrap();
    state.cache.set("b", json!({"x": 2}), 100).await.unwrap();
    for _ in 0..3 {
        state.cache.get("b").await.unwrap();
    }
    clock.advance_secs(2);
    let app = create_router(state.clone());

    let response = post_cleanup(&app, Some(bearer().as_str())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["message"], "Cache cleanup completed");
    assert_eq!(json["stats"]["totalEntries"], 1);
    assert_eq!(json["stats"]["expiredRemoved"], 1);
    assert_eq!(json["stats"]["totalHits"], 3);
    // {"x":2} is 7 bytes of JSON
    assert_eq!(json["stats"]["approximateSizeBytes"], 7);

    assert_eq!(state.cache.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_cleanup_endpoint_empty_cache() {
    let (state, _) = create_test_state();
    let app = create_router(state);

    let response = post_cleanup(&app, Some(bearer().as_str())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stats"]["totalEntries"], 0);
    assert_eq!(json["stats"]["expiredRemoved"], 0);
}

#[tokio::test]
async fn test_cleanup_endpoint_second_call_removes_nothing() {
    let (state, clock) = create_test_state();
    state.cache.set("a", json!(1), 1).await.unwrap();
    clock.advance_secs(2);
    let app = create_router(state);
    let auth = bearer();

    let first = body_to_json(post_cleanup(&app, Some(auth.as_str())).await.into_body()).await;
    let second = body_to_json(post_cleanup(&app, Some(auth.as_str())).await.into_body()).await;

    assert_eq!(first["stats"]["expiredRemoved"], 1);
    assert_eq!(second["stats"]["expiredRemoved"], 0);
}

#[tokio::test]
async fn test_cleanup_endpoint_missing_credential() {
    let (state, clock) = create_test_state();
    state.cache.set("a", json!(1), 1).await.unwrap();
    clock.advance_secs(2);
    let before = state.cache.stats().await.unwrap();
    let app = create_router(state.clone());

    let response = post_cleanup(&app, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["error"], "Unauthorized");

    // No cleanup happened
    assert_eq!(state.cache.stats().await.unwrap(), before);
    assert_eq!(state.cache.size().await.unwrap(), 1);
}

#[tokio::test]
async fn test_cleanup_endpoint_wrong_credential() {
    let (state, _) = create_test_state();
    let app = create_router(state);

    let response = post_cleanup(&app, Some("Bearer not-the-secret")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cleanup_endpoint_without_configured_secret() {
    let (state, _) = create_test_state();
    let state = AppState::new(state.cache, None);
    let app = create_router(state);

    let response = post_cleanup(&app, Some("Bearer ")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_cleanup_endpoint_storage_unavailable() {
    let (state, _) = create_test_state();
    state.cache.shutdown().await.unwrap();
    let app = create_router(state);

    let response = post_cleanup(&app, Some(bearer().as_str())).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let json = body_to_json(response.into_body()).await;
    assert!(json.get("error").is_some());
    assert!(json.get("stats").is_none(), "no partial stats on failure");
    assert!(!json["error"].as_str().unwrap().contains("shut down"));
}

// == Stats Endpoint Tests ==

#[tokio::test]
async fn test_stats_endpoint_does_not_clean() {
    let (state, clock) = create_test_state();
    state.cache.set("a", json!(1), 1).await.unwrap();
    state.cache.set("b", json!(2), 100).await.unwrap();
    clock.advance_secs(2);
    let app = create_router(state.clone());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cache/stats")
                .header("authorization", bearer())
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["stats"]["totalEntries"], 1);
    assert!(json.get("hitRate").is_some());

    // Expired entry is still physically present
    assert_eq!(state.cache.size().await.unwrap(), 2);
}

// == Health Endpoint Tests ==

#[tokio::test]
async fn test_health_endpoint() {
    let (state, _) = create_test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_to_json(response.into_body()).await;
    assert_eq!(json["status"], "healthy");
    assert!(json.get("timestamp").is_some());
}

// == Not Found Tests ==

#[tokio::test]
async fn test_unknown_route() {
    let (state, _) = create_test_state();
    let app = create_router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/cache/unknown")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
