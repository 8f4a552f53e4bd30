use axum::http::StatusCode;
use serde_json::json;

use super::{call, create_request, test_router, OWNER, WATER_STAFF, WATER_STAFF_2};

async fn allocate(router: &axum::Router, request_id: &str, assignee: &str) -> String {
    let (status, body) = call(
        router,
        "POST",
        &format!("/api/requests/{request_id}/allocate"),
        Some(WATER_STAFF),
        Some(json!({ "assigned_to": assignee })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["id"].as_str().expect("assignment id").to_string()
}

#[tokio::test]
async fn accept_then_complete() {
    let (_state, router) = test_router();
    let request_id = create_request(&router).await;
    let assignment_id = allocate(&router, &request_id, "staff-water-2").await;

    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/assignments/{assignment_id}/status"),
        Some(WATER_STAFF_2),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "accepted");

    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/assignments/{assignment_id}/status"),
        Some(WATER_STAFF_2),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "completed");
}

#[tokio::test]
async fn update_error_mapping() {
    let (_state, router) = test_router();
    let request_id = create_request(&router).await;
    let assignment_id = allocate(&router, &request_id, "staff-water-2").await;

    // Unknown status value: 400.
    let (status, _body) = call(
        &router,
        "PUT",
        &format!("/api/assignments/{assignment_id}/status"),
        Some(WATER_STAFF_2),
        Some(json!({ "status": "paused" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Only the assignee may act; the allocator cannot.
    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/assignments/{assignment_id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "unauthorized");

    // Pending cannot jump straight to completed.
    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/assignments/{assignment_id}/status"),
        Some(WATER_STAFF_2),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "invalid_transition");

    let (status, _body) = call(
        &router,
        "PUT",
        "/api/assignments/ghost/status",
        Some(WATER_STAFF_2),
        Some(json!({ "status": "accepted" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn reassignment_supersedes_and_listings_filter() {
    let (_state, router) = test_router();
    let request_id = create_request(&router).await;
    let first = allocate(&router, &request_id, "staff-water-2").await;
    allocate(&router, &request_id, "staff-water").await;

    let (status, body) = call(
        &router,
        "GET",
        &format!("/api/requests/{request_id}/assignments"),
        Some(WATER_STAFF),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let trail = body["data"].as_array().unwrap();
    assert_eq!(trail.len(), 2);
    let first_row = trail.iter().find(|a| a["id"] == first.as_str()).unwrap();
    assert_eq!(first_row["status"], "superseded");

    let (status, body) =
        call(&router, "GET", "/api/assignments?status=pending", Some(WATER_STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(&router, "GET", "/api/assignments", Some(WATER_STAFF_2), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"][0]["status"], "superseded");

    // Citizens hold no assignments.
    let (status, _body) = call(&router, "GET", "/api/assignments", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
