//! Alarm escalation: urgent signals fanned out to staff.
//!
//! Any authenticated user can escalate; a citizen's urgent signal is the
//! primary case. Escalation is best-effort by design. The delivery
//! summary reports how far an alarm reached; staff without live
//! connections rely on the mail mirror.

use log::{info, warn};

use serde::Serialize;

use crate::application::context::EngineContext;
use crate::application::lifecycle::authorize_staff_access;
use crate::application::notify;
use crate::domain::{
    validate_message, validate_required_message, Actor, AlarmNote, Department, Notification,
    NotificationKind,
};
use crate::foundation::{now_millis, CivicError, RequestId, Result};
use crate::infrastructure::storage::RequestChange;

/// Note text recorded when an alarm arrives without a message.
const DEFAULT_ALARM_MESSAGE: &str = "User sent urgent alarm";

/// How far an alarm reached: staff resolved from the directory and live
/// connections that accepted the event.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct AlarmDelivery {
    pub staff_notified: usize,
    pub connections_reached: usize,
}

/// Fans an alarm out to staff, optionally narrowed to one department.
/// Open to any authenticated caller; succeeds once validation passes,
/// whatever delivery achieves.
pub async fn raise_alarm(
    ctx: &EngineContext,
    actor: &Actor,
    title: &str,
    message: &str,
    department: Option<Department>,
) -> Result<AlarmDelivery> {
    validate_required_message("title", title, &ctx.config.limits)?;
    validate_required_message("message", message, &ctx.config.limits)?;

    let notification =
        Notification::new(title.trim(), message.trim(), NotificationKind::Alarm);
    let delivery = escalate(ctx, department, &notification).await?;
    info!(
        "alarm raised actor={} department={:?} staff_notified={} connections_reached={}",
        actor.user_id, department, delivery.staff_notified, delivery.connections_reached
    );
    Ok(delivery)
}

/// Pins an alarm note to a request and escalates to the request's
/// department. Allowed for the request owner and for staff with access;
/// the note does not touch status or history. A blank message falls back
/// to [`DEFAULT_ALARM_MESSAGE`].
pub async fn raise_request_alarm(
    ctx: &EngineContext,
    request_id: &RequestId,
    actor: &Actor,
    message: Option<&str>,
) -> Result<AlarmDelivery> {
    let request = ctx
        .store
        .request(request_id)?
        .ok_or_else(|| CivicError::request_not_found(request_id.as_str()))?;
    if request.citizen_id != actor.user_id {
        authorize_staff_access(&request, actor)?;
    }

    let message = match message.map(str::trim).filter(|m| !m.is_empty()) {
        Some(m) => {
            validate_message("message", m, &ctx.config.limits)?;
            m.to_string()
        }
        None => DEFAULT_ALARM_MESSAGE.to_string(),
    };

    let note = AlarmNote {
        message: message.clone(),
        raised_by: actor.user_id.clone(),
        raised_at: now_millis(),
    };
    let updated = ctx.store.commit_request_change(
        request_id,
        request.status,
        RequestChange { push_alarm: Some(note), ..Default::default() },
    )?;

    let notification = Notification::new(
        format!("Alarm: {}", updated.title),
        message,
        NotificationKind::Alarm,
    );
    let delivery = escalate(ctx, Some(updated.department), &notification).await?;
    info!(
        "request alarm raised request_id={} actor={} staff_notified={}",
        request_id, actor.user_id, delivery.staff_notified
    );
    Ok(delivery)
}

async fn escalate(
    ctx: &EngineContext,
    department: Option<Department>,
    notification: &Notification,
) -> Result<AlarmDelivery> {
    let staff = ctx.directory.staff(department)?;
    if staff.is_empty() {
        warn!("alarm found no staff to notify department={:?}", department);
    }
    let mut connections_reached = 0usize;
    for profile in &staff {
        connections_reached += notify::send_to_user(ctx, &profile.user_id, notification).await;
    }
    Ok(AlarmDelivery { staff_notified: staff.len(), connections_reached })
}
