use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::Body;
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;

use super::basic_state;

async fn get_requests(router: &axum::Router, client: SocketAddr) -> StatusCode {
    let mut request = Request::builder()
        .method("GET")
        .uri("/api/requests")
        .header("x-user-id", "user-1")
        .header("x-user-role", "citizen")
        .body(Body::empty())
        .expect("request");
    request.extensions_mut().insert(ConnectInfo(client));
    router.clone().oneshot(request).await.expect("response").status()
}

#[tokio::test]
async fn api_rate_limit_enforced_per_client() {
    let mut state = basic_state();
    state.rate_limit_rps = 1;
    state.rate_limit_burst = 0;
    let router = civicserve_service::api::build_router(Arc::new(state));

    let first: SocketAddr = "127.0.0.1:41001".parse().expect("addr");
    assert_eq!(get_requests(&router, first).await, StatusCode::OK);
    assert_eq!(get_requests(&router, first).await, StatusCode::TOO_MANY_REQUESTS);

    // A different client keeps its own budget.
    let second: SocketAddr = "127.0.0.2:41001".parse().expect("addr");
    assert_eq!(get_requests(&router, second).await, StatusCode::OK);
}

#[tokio::test]
async fn operational_endpoints_bypass_rate_limit() {
    let mut state = basic_state();
    state.rate_limit_rps = 1;
    state.rate_limit_burst = 0;
    let router = civicserve_service::api::build_router(Arc::new(state));

    let client: SocketAddr = "127.0.0.1:41002".parse().expect("addr");
    for _ in 0..3 {
        let mut request =
            Request::builder().method("GET").uri("/health").body(Body::empty()).expect("request");
        request.extensions_mut().insert(ConnectInfo(client));
        let response = router.clone().oneshot(request).await.expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }
}
