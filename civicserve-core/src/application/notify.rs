//! Post-commit notification fan-out.
//!
//! Everything here is fire-and-forget. A failed queue, mail relay or
//! audit write is logged and swallowed; it never propagates into the
//! state change that triggered it.

use log::{debug, warn};

use crate::application::context::EngineContext;
use crate::domain::{Notification, NotificationKind, NotificationRecord, ServiceRequest};
use crate::foundation::UserId;

/// Tells the owner their request moved. Called after the transition has
/// committed; `message` is the history entry text.
pub(crate) async fn status_changed(ctx: &EngineContext, request: &ServiceRequest, message: &str) {
    let notification =
        Notification::new(request.title.clone(), message.to_string(), NotificationKind::Status);
    send_to_user(ctx, &request.citizen_id, &notification).await;
}

/// Tells a staff member they picked up new work.
pub(crate) async fn work_assigned(
    ctx: &EngineContext,
    assignee: &UserId,
    request: &ServiceRequest,
) {
    let notification = Notification::new(
        "New work assignment",
        format!("You have been assigned to request '{}'", request.title),
        NotificationKind::Info,
    );
    send_to_user(ctx, assignee, &notification).await;
}

/// Publishes to every live connection of one user, mirrors important
/// kinds over mail, and audits the publish. Returns how many connections
/// accepted the event.
pub async fn send_to_user(
    ctx: &EngineContext,
    user_id: &UserId,
    notification: &Notification,
) -> usize {
    audit(ctx, Some(user_id), notification);
    let delivered = ctx.broadcaster.publish(user_id, notification);
    debug!(
        "notification published user_id={} kind={} delivered={}",
        user_id, notification.kind, delivered
    );
    if notification.kind != NotificationKind::Info {
        mail_user(ctx, user_id, notification).await;
    }
    delivered
}

/// Publishes to every connected user. Returns total accepting connections.
pub async fn send_to_all(ctx: &EngineContext, notification: &Notification) -> usize {
    audit(ctx, None, notification);
    let delivered = ctx.broadcaster.broadcast(notification);
    debug!(
        "notification broadcast kind={} delivered={} users={}",
        notification.kind,
        delivered,
        ctx.broadcaster.user_count()
    );
    delivered
}

async fn mail_user(ctx: &EngineContext, user_id: &UserId, notification: &Notification) {
    let profile = match ctx.directory.profile(user_id) {
        Ok(Some(profile)) => profile,
        Ok(None) => {
            debug!("no directory profile for mail user_id={}", user_id);
            return;
        }
        Err(err) => {
            warn!("directory lookup failed user_id={} error={}", user_id, err);
            return;
        }
    };
    let Some(email) = profile.email else {
        return;
    };
    if let Err(err) = ctx
        .mailer
        .send(&email, &notification.title, notification.kind.as_str(), &notification.message)
        .await
    {
        warn!("mail delivery failed user_id={} error={}", user_id, err);
    }
}

fn audit(ctx: &EngineContext, user_id: Option<&UserId>, notification: &Notification) {
    if !ctx.config.notify.audit_log {
        return;
    }
    let record = NotificationRecord {
        user_id: user_id.cloned(),
        title: notification.title.clone(),
        message: notification.message.clone(),
        kind: notification.kind,
        created_at: notification.created_at,
    };
    if let Err(err) = ctx.store.record_notification(record) {
        warn!("notification audit write failed error={}", err);
    }
}
