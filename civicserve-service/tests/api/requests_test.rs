use axum::http::StatusCode;
use serde_json::json;

use super::{call, create_request, test_router, LAW_STAFF, OTHER_CITIZEN, OWNER, WATER_STAFF};

#[tokio::test]
async fn create_validates_and_scopes() {
    let (_state, router) = test_router();

    let (status, body) = call(
        &router,
        "POST",
        "/api/requests",
        Some(OWNER),
        Some(json!({ "title": "  ", "description": "something", "department": "water" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");

    // Staff cannot raise requests.
    let (status, body) = call(
        &router,
        "POST",
        "/api/requests",
        Some(WATER_STAFF),
        Some(json!({ "title": "t", "description": "d", "department": "water" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "unauthorized");
}

#[tokio::test]
async fn happy_path_over_http() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;

    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "in_progress", "message": "Crew dispatched" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["old_status"], "raised");
    assert_eq!(body["new_status"], "in_progress");

    let (status, _body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/rate"),
        Some(OWNER),
        Some(json!({ "score": "excellent" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["rating"]["score"], "excellent");
    assert_eq!(body["data"]["history"].as_array().unwrap().len(), 3);

    let (status, body) =
        call(&router, "GET", &format!("/api/requests/{id}/history"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn status_error_mapping() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;

    // Unknown enum value: 400.
    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "vanished" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "validation");

    // Unreachable target: 409.
    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "invalid_transition");

    // Wrong department: 403.
    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(LAW_STAFF),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "unauthorized");

    // Unknown id: 404.
    let (status, body) = call(
        &router,
        "PUT",
        "/api/requests/ghost/status",
        Some(WATER_STAFF),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["code"], "not_found");
}

#[tokio::test]
async fn rate_and_reopen_endpoints() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;

    // Rating a non-terminal request: 400.
    let (status, _body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/rate"),
        Some(OWNER),
        Some(json!({ "score": "good" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    for target in ["in_progress", "completed"] {
        let (status, _body) = call(
            &router,
            "PUT",
            &format!("/api/requests/{id}/status"),
            Some(WATER_STAFF),
            Some(json!({ "status": target })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    // A stranger cannot rate.
    let (status, _body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/rate"),
        Some(OTHER_CITIZEN),
        Some(json!({ "score": "good" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    // open_again behaves as reopen.
    let (status, body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/rate"),
        Some(OWNER),
        Some(json!({ "score": "open_again", "comments": "leak came back" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["new_status"], "in_progress");
    assert!(body["data"]["rating"].is_null());
    assert_eq!(body["data"]["reopen"]["reason"], "leak came back");

    let (status, _body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "completed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Blank reopen reason: 400.
    let (status, _body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/reopen"),
        Some(OWNER),
        Some(json!({ "reason": "   " })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/reopen"),
        Some(OWNER),
        Some(json!({ "reason": "not fixed" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["new_status"], "in_progress");
    assert_eq!(body["data"]["reopen"]["reason"], "not fixed");
}

#[tokio::test]
async fn list_scoping_and_filter() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;
    create_request(&router).await;

    let (status, body) = call(&router, "GET", "/api/requests", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, body) = call(&router, "GET", "/api/requests", Some(OTHER_CITIZEN), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());

    let (status, _body) = call(
        &router,
        "PUT",
        &format!("/api/requests/{id}/status"),
        Some(WATER_STAFF),
        Some(json!({ "status": "in_progress" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) =
        call(&router, "GET", "/api/requests?status=in_progress", Some(WATER_STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _body) =
        call(&router, "GET", "/api/requests?status=bogus", Some(WATER_STAFF), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = call(&router, "GET", "/api/requests", Some(LAW_STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn allocation_and_request_alarm() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;

    let (status, body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/allocate"),
        Some(WATER_STAFF),
        Some(json!({ "assigned_to": "staff-water-2", "notes": "take this one" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "pending");
    assert_eq!(body["data"]["assigned_to"], "staff-water-2");

    let (status, body) =
        call(&router, "GET", &format!("/api/requests/{id}"), Some(WATER_STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["status"], "in_progress");
    assert_eq!(body["data"]["assigned_to"], "staff-water-2");

    let (status, body) = call(
        &router,
        "GET",
        &format!("/api/requests/{id}/assignments"),
        Some(WATER_STAFF),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/alarm"),
        Some(WATER_STAFF),
        Some(json!({ "message": "crew needs backup" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["staff_notified"], 2);
}

#[tokio::test]
async fn owner_alarm_without_message_uses_default_note() {
    let (_state, router) = test_router();
    let id = create_request(&router).await;

    let (status, body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/alarm"),
        Some(OWNER),
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["staff_notified"], 2);

    let (status, body) =
        call(&router, "GET", &format!("/api/requests/{id}"), Some(OWNER), None).await;
    assert_eq!(status, StatusCode::OK);
    let alarms = body["data"]["alarms"].as_array().unwrap();
    assert_eq!(alarms.len(), 1);
    assert_eq!(alarms[0]["message"], "User sent urgent alarm");
    assert_eq!(alarms[0]["raised_by"], "user-1");

    // A citizen who does not own the request still cannot escalate it.
    let (status, body) = call(
        &router,
        "POST",
        &format!("/api/requests/{id}/alarm"),
        Some(OTHER_CITIZEN),
        Some(json!({ "message": "hurry" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "unauthorized");
}
