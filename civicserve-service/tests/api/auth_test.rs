use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::{basic_state, call, test_router, Identity, OWNER};

#[tokio::test]
async fn api_requires_identity_headers() {
    let (_state, router) = test_router();

    let (status, body) = call(&router, "GET", "/api/requests", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "unauthenticated");

    let bad_role = Identity { user_id: "user-1", role: "overlord", department: None };
    let (status, _body) = call(&router, "GET", "/api/requests", Some(bad_role), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn api_token_enforced_when_configured() {
    let mut state = basic_state();
    state.api_token = Some("secret-token".to_string());
    let router = civicserve_service::api::build_router(Arc::new(state));

    let (status, _body) = call(&router, "GET", "/api/requests", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // With the bearer token the same call reaches the handler.
    let mut request = Request::builder()
        .method("GET")
        .uri("/api/requests")
        .header("authorization", "Bearer secret-token")
        .header("x-user-id", "user-1")
        .header("x-user-role", "citizen")
        .body(Body::empty())
        .expect("request");
    let client: SocketAddr = "127.0.0.1:40001".parse().expect("addr");
    request.extensions_mut().insert(ConnectInfo(client));
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn legacy_role_names_accepted() {
    let (_state, router) = test_router();
    let legacy = Identity { user_id: "user-1", role: "user", department: None };
    let (status, _body) = call(&router, "GET", "/api/requests", Some(legacy), None).await;
    assert_eq!(status, StatusCode::OK);

    let legacy_admin = Identity { user_id: "staff-water", role: "admin", department: Some("water") };
    let (status, _body) = call(&router, "GET", "/api/requests", Some(legacy_admin), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn correlation_id_echoed() {
    let (_state, router) = test_router();
    let mut request = Request::builder()
        .method("GET")
        .uri("/health")
        .header("x-request-id", "corr-123")
        .body(Body::empty())
        .expect("request");
    let client: SocketAddr = "127.0.0.1:40002".parse().expect("addr");
    request.extensions_mut().insert(ConnectInfo(client));
    let response = router.clone().oneshot(request).await.expect("response");
    assert_eq!(response.headers().get("x-request-id").unwrap(), "corr-123");
}
