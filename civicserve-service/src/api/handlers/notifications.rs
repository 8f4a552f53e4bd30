//! Live notification endpoints: the per-user SSE stream and the
//! staff-driven send/broadcast operation.

use std::convert::Infallible;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::response::sse::{Event, KeepAlive, Sse};
use axum::response::IntoResponse;
use axum::{Extension, Json};
use futures_util::stream::Stream;
use futures_util::StreamExt;
use log::{debug, warn};
use serde::Deserialize;
use tokio_stream::wrappers::ReceiverStream;

use civicserve_core::application::notify;
use civicserve_core::domain::{Actor, Notification, NotificationKind, Role};
use civicserve_core::foundation::{CivicError, UserId};
use civicserve_core::infrastructure::broadcast::SubscriptionGuard;

use super::observed;
use crate::api::error::ApiResult;
use crate::api::state::ApiState;
use crate::service::metrics::Metrics;

/// Holds the registry entry open for exactly the stream's lifetime and
/// settles the gauge when the client goes away.
struct StreamGuard {
    _subscription: SubscriptionGuard,
    metrics: Arc<Metrics>,
}

impl Drop for StreamGuard {
    fn drop(&mut self) {
        self.metrics.stream_closed();
    }
}

pub async fn handle_stream(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let subscription = state.engine.broadcaster.subscribe(actor.user_id.clone());
    debug!(
        "notification stream opened user_id={} connection_id={}",
        actor.user_id,
        subscription.connection_id()
    );
    state.metrics.stream_opened();
    let (subscription_guard, receiver) = subscription.into_parts();
    let guard = StreamGuard { _subscription: subscription_guard, metrics: state.metrics.clone() };

    // The notification serializes `kind` as `type`, matching the wire
    // contract `{title, message, type}`.
    let stream = ReceiverStream::new(receiver).map(move |notification| {
        let _ = &guard;
        let event = Event::default().event("notification");
        match event.json_data(&notification) {
            Ok(event) => Ok(event),
            Err(err) => {
                warn!("notification serialization failed error={}", err);
                Ok(Event::default().event("notification").data("{}"))
            }
        }
    });

    Sse::new(stream).keep_alive(
        KeepAlive::new()
            .interval(Duration::from_secs(state.keepalive_secs))
            .text("keep-alive"),
    )
}

#[derive(Debug, Deserialize)]
pub struct SendBody {
    #[serde(default)]
    pub user_id: Option<String>,
    pub title: String,
    pub message: String,
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// Staff-only direct send. Without a `user_id` the notification goes to
/// every connected user.
pub async fn handle_send(
    State(state): State<Arc<ApiState>>,
    Extension(actor): Extension<Actor>,
    Json(body): Json<SendBody>,
) -> ApiResult<impl IntoResponse> {
    let result = send(&state, &actor, body).await;
    let delivered = observed(&state.metrics, "send_notification", result)?;
    Ok(Json(serde_json::json!({ "data": { "delivered": delivered } })))
}

async fn send(state: &ApiState, actor: &Actor, body: SendBody) -> Result<usize, CivicError> {
    if actor.role != Role::Staff {
        return Err(CivicError::unauthorized("only staff can send notifications"));
    }
    if body.title.trim().is_empty() || body.message.trim().is_empty() {
        return Err(CivicError::validation("title and message are required"));
    }
    let kind = match body.kind.as_deref() {
        Some(value) => NotificationKind::from_str(value)?,
        None => NotificationKind::Info,
    };
    let notification = Notification::new(body.title.trim(), body.message.trim(), kind);
    let delivered = match body.user_id {
        Some(user_id) => {
            notify::send_to_user(&state.engine, &UserId::from(user_id), &notification).await
        }
        None => notify::send_to_all(&state.engine, &notification).await,
    };
    Ok(delivered)
}
