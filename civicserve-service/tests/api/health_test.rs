use std::sync::Arc;

use axum::http::StatusCode;
use serde_json::json;

use super::{basic_state, call, create_request, test_router, WATER_STAFF};

#[tokio::test]
async fn health_and_ready_report() {
    let (_state, router) = test_router();

    let (status, body) = call(&router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");

    let (status, body) = call(&router, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ready");
    assert_eq!(body["store_ok"], true);
}

#[tokio::test]
async fn ready_and_metrics_honor_api_token() {
    let mut state = basic_state();
    state.api_token = Some("secret".to_string());
    let router = civicserve_service::api::build_router(Arc::new(state));

    let (status, _body) = call(&router, "GET", "/ready", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _body) = call(&router, "GET", "/metrics", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // /health stays open for liveness probes.
    let (status, _body) = call(&router, "GET", "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn metrics_count_operations() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;
    let (status, _body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let response = super::raw_call(&router, "GET", "/metrics", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let text = String::from_utf8(bytes.to_vec()).unwrap();
    assert!(text.contains("civicserve_operations_total"));
    assert!(text.contains("operation=\"transition\""));
}
