mod assignments_test;
mod auth_test;
mod health_test;
mod notifications_test;
mod rate_limit_test;
mod requests_test;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::extract::ConnectInfo;
use axum::http::{Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use civicserve_core::application::EngineContext;
use civicserve_core::domain::{Department, Profile, Role};
use civicserve_core::foundation::UserId;
use civicserve_core::infrastructure::broadcast::Broadcaster;
use civicserve_core::infrastructure::config::AppConfig;
use civicserve_core::infrastructure::directory::StaticDirectory;
use civicserve_core::infrastructure::mailer::LogMailer;
use civicserve_core::infrastructure::storage::MemoryStore;
use civicserve_service::api::{ApiState, RateLimiter};
use civicserve_service::service::metrics::Metrics;

/// Gateway-injected caller identity for one test request.
#[derive(Clone, Copy)]
pub struct Identity {
    pub user_id: &'static str,
    pub role: &'static str,
    pub department: Option<&'static str>,
}

pub const OWNER: Identity = Identity { user_id: "user-1", role: "citizen", department: None };
pub const OTHER_CITIZEN: Identity =
    Identity { user_id: "user-2", role: "citizen", department: None };
pub const WATER_STAFF: Identity =
    Identity { user_id: "staff-water", role: "staff", department: Some("water") };
pub const WATER_STAFF_2: Identity =
    Identity { user_id: "staff-water-2", role: "staff", department: Some("water") };
pub const LAW_STAFF: Identity =
    Identity { user_id: "staff-law", role: "staff", department: Some("law") };

fn profile(user_id: &str, role: Role, department: Option<Department>) -> Profile {
    Profile {
        user_id: UserId::from(user_id),
        full_name: format!("Person {user_id}"),
        email: Some(format!("{user_id}@example.test")),
        role,
        department,
    }
}

pub fn basic_state() -> ApiState {
    let engine = EngineContext {
        config: AppConfig::default(),
        store: Arc::new(MemoryStore::new()),
        broadcaster: Arc::new(Broadcaster::new(16)),
        directory: Arc::new(StaticDirectory::new(vec![
            profile("user-1", Role::Citizen, None),
            profile("user-2", Role::Citizen, None),
            profile("staff-water", Role::Staff, Some(Department::Water)),
            profile("staff-water-2", Role::Staff, Some(Department::Water)),
            profile("staff-law", Role::Staff, Some(Department::Law)),
        ])),
        mailer: Arc::new(LogMailer),
    };
    ApiState {
        engine,
        api_token: None,
        metrics: Arc::new(Metrics::new().expect("metrics")),
        rate_limiter: Arc::new(RateLimiter::new()),
        rate_limit_rps: 1_000,
        rate_limit_burst: 0,
        keepalive_secs: 20,
        body_limit_bytes: 256 * 1024,
    }
}

pub fn test_router() -> (Arc<ApiState>, Router) {
    let state = Arc::new(basic_state());
    let router = civicserve_service::api::build_router(state.clone());
    (state, router)
}

pub async fn call(
    router: &Router,
    method: &str,
    path: &str,
    identity: Option<Identity>,
    body: Option<serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let response = raw_call(router, method, path, identity, body).await;
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body bytes");
    let json = serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null);
    (status, json)
}

pub async fn raw_call(
    router: &Router,
    method: &str,
    path: &str,
    identity: Option<Identity>,
    body: Option<serde_json::Value>,
) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(path);
    if let Some(identity) = identity {
        builder = builder
            .header("x-user-id", identity.user_id)
            .header("x-user-role", identity.role);
        if let Some(department) = identity.department {
            builder = builder.header("x-department", department);
        }
    }
    let body = match body {
        Some(value) => {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_string(&value).expect("serialize body"))
        }
        None => Body::empty(),
    };
    let mut request = builder.body(body).expect("request");
    let client: SocketAddr = "127.0.0.1:40000".parse().expect("addr");
    request.extensions_mut().insert(ConnectInfo(client));
    router.clone().oneshot(request).await.expect("response")
}

/// Creates one water-department request owned by `user-1` and returns
/// its id.
pub async fn create_request(router: &Router) -> String {
    let (status, body) = call(
        router,
        "POST",
        "/api/requests",
        Some(OWNER),
        Some(serde_json::json!({
            "title": "Burst pipe",
            "description": "Water pooling at the corner for three days",
            "department": "water",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {body}");
    body["data"]["id"].as_str().expect("request id").to_string()
}
