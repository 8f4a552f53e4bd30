use std::time::Duration;

use axum::http::StatusCode;
use futures_util::StreamExt;
use serde_json::json;

use civicserve_core::domain::{Notification, NotificationKind};
use civicserve_core::foundation::UserId;

use super::{call, raw_call, test_router, LAW_STAFF, OWNER, WATER_STAFF};

#[tokio::test]
async fn stream_registers_and_receives_in_order() {
    let (state, router) = test_router();

    let response = raw_call(&router, "GET", "/api/notifications/stream", Some(OWNER), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(state.engine.broadcaster.connections_for(&UserId::from("user-1")), 1);

    let mut body = response.into_body().into_data_stream();
    for message in ["first", "second"] {
        state.engine.broadcaster.publish(
            &UserId::from("user-1"),
            &Notification::new("Update", message, NotificationKind::Status),
        );
    }

    let mut seen = String::new();
    while !seen.contains("second") {
        let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
            .await
            .expect("timed out waiting for sse event")
            .expect("stream ended early")
            .expect("body error");
        seen.push_str(&String::from_utf8_lossy(&chunk));
    }
    assert!(seen.contains("event: notification"));
    let first_at = seen.find("first").unwrap();
    let second_at = seen.find("second").unwrap();
    assert!(first_at < second_at);
    assert!(seen.contains("\"type\":\"status\""));

    // Dropping the stream removes the connection synchronously.
    drop(body);
    assert_eq!(state.engine.broadcaster.connections_for(&UserId::from("user-1")), 0);
}

#[tokio::test]
async fn stream_close_leaves_other_connections_live() {
    let (state, router) = test_router();
    let user = UserId::from("user-1");

    let first = raw_call(&router, "GET", "/api/notifications/stream", Some(OWNER), None).await;
    let second = raw_call(&router, "GET", "/api/notifications/stream", Some(OWNER), None).await;
    assert_eq!(state.engine.broadcaster.connections_for(&user), 2);

    drop(first);
    assert_eq!(state.engine.broadcaster.connections_for(&user), 1);

    let delivered = state
        .engine
        .broadcaster
        .publish(&user, &Notification::new("Update", "still here", NotificationKind::Status));
    assert_eq!(delivered, 1);

    let mut body = second.into_body().into_data_stream();
    let chunk = tokio::time::timeout(Duration::from_secs(2), body.next())
        .await
        .expect("timed out")
        .expect("stream ended")
        .expect("body error");
    assert!(String::from_utf8_lossy(&chunk).contains("still here"));
}

#[tokio::test]
async fn send_targets_one_user_or_broadcasts() {
    let (state, router) = test_router();
    let mut owner_live = state.engine.broadcaster.subscribe(UserId::from("user-1"));
    let mut staff_live = state.engine.broadcaster.subscribe(UserId::from("staff-water"));

    // Citizens may not send.
    let (status, _body) = call(
        &router,
        "POST",
        "/api/notifications/send",
        Some(OWNER),
        Some(json!({ "user_id": "user-2", "title": "t", "message": "m" })),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = call(
        &router,
        "POST",
        "/api/notifications/send",
        Some(WATER_STAFF),
        Some(json!({ "user_id": "user-1", "title": "Heads up", "message": "crew en route" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["delivered"], 1);
    let received = owner_live.recv().await.unwrap();
    assert_eq!(received.title, "Heads up");
    assert_eq!(received.kind, NotificationKind::Info);

    // Sending to an offline user is a successful no-op.
    let (status, body) = call(
        &router,
        "POST",
        "/api/notifications/send",
        Some(WATER_STAFF),
        Some(json!({ "user_id": "user-2", "title": "t", "message": "m" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["delivered"], 0);

    // No user_id broadcasts to everyone connected.
    let (status, body) = call(
        &router,
        "POST",
        "/api/notifications/send",
        Some(WATER_STAFF),
        Some(json!({ "title": "Maintenance", "message": "tonight", "type": "system" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["delivered"], 2);
    assert_eq!(staff_live.recv().await.unwrap().kind, NotificationKind::System);
}

#[tokio::test]
async fn alarm_fan_out_and_directory() {
    let (state, router) = test_router();
    let mut water_live = state.engine.broadcaster.subscribe(UserId::from("staff-water-2"));
    let _law_live = state.engine.broadcaster.subscribe(UserId::from("staff-law"));

    // A citizen's urgent signal reaches every staff member.
    let (status, body) = call(
        &router,
        "POST",
        "/api/alarms",
        Some(OWNER),
        Some(json!({ "title": "Flooded street", "message": "need urgent help" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["staff_notified"], 3);
    assert_eq!(body["data"]["connections_reached"], 2);
    let received = water_live.recv().await.unwrap();
    assert_eq!(received.kind, NotificationKind::Alarm);
    assert_eq!(received.title, "Flooded street");

    let (status, body) = call(
        &router,
        "POST",
        "/api/alarms",
        Some(WATER_STAFF),
        Some(json!({ "title": "Main break", "message": "shut valve 3", "department": "water" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["staff_notified"], 2);
    assert_eq!(body["data"]["connections_reached"], 1);

    let received = water_live.recv().await.unwrap();
    assert_eq!(received.kind, NotificationKind::Alarm);
    assert_eq!(received.title, "Main break");

    let (status, body) =
        call(&router, "GET", "/api/directory/staff?department=water", Some(LAW_STAFF), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    let (status, _body) = call(&router, "GET", "/api/directory/staff", Some(OWNER), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}
