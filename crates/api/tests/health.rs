//! Integration tests for the health check endpoint and general HTTP behaviour.

mod common;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use common::{body_json, TestApp};
use tower::ServiceExt;

async fn get_unauthenticated(app: &TestApp, uri: &str) -> axum::http::Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.router().oneshot(request).await.unwrap()
}

#[tokio::test]
async fn health_check_returns_ok_with_json() {
    let app = TestApp::new().await;
    let response = get_unauthenticated(&app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["store_healthy"], true);
    assert_eq!(json["ws_connections"], 0);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let app = TestApp::new().await;
    let response = get_unauthenticated(&app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let app = TestApp::new().await;
    let response = get_unauthenticated(&app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("response should carry x-request-id");
    assert!(!request_id.to_str().unwrap().is_empty());
}

#[tokio::test]
async fn cors_preflight_allows_the_api_key_header() {
    let app = TestApp::new().await;
    let request = Request::builder()
        .method(Method::OPTIONS)
        .uri("/api/v1/automation/idle-projects")
        .header("origin", "http://localhost:5173")
        .header("access-control-request-method", "GET")
        .header("access-control-request-headers", "x-api-key")
        .body(Body::empty())
        .unwrap();
    let response = app.router().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let allowed = response
        .headers()
        .get("access-control-allow-headers")
        .unwrap()
        .to_str()
        .unwrap()
        .to_lowercase();
    assert!(allowed.contains("x-api-key"));
}
