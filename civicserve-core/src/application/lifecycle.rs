//! Request lifecycle operations: create, transition, rate, reopen and
//! reads.
//!
//! Checks run in a fixed order (existence, authorization, transition
//! validity, input validation) so callers see stable failure modes. Every
//! mutation goes through the store's conditional commit door; a writer
//! that lost a race gets `Conflict` and nothing is half-applied.

use log::info;

use crate::application::context::EngineContext;
use crate::application::notify;
use crate::domain::{
    ensure_owner_close, ensure_valid_transition, is_terminal, validate_message,
    validate_new_request, validate_required_message, Actor, NewRequest, Rating, RatingScore,
    ReopenNote, RequestStatus, Role, ServiceRequest, StatusEntry,
};
use crate::foundation::{now_millis, CivicError, RequestId, Result};
use crate::infrastructure::storage::{RequestChange, RequestFilter};

/// Result of a committed transition, echoing both endpoints of the move.
#[derive(Debug, Clone)]
pub struct TransitionOutcome {
    pub request: ServiceRequest,
    pub old_status: RequestStatus,
    pub new_status: RequestStatus,
}

/// Creates a request owned by the calling citizen. New requests start
/// `raised` with an empty history; the trail records changes, not birth.
pub async fn create_request(
    ctx: &EngineContext,
    actor: &Actor,
    input: NewRequest,
) -> Result<ServiceRequest> {
    if actor.role != Role::Citizen {
        return Err(CivicError::unauthorized("only citizens can raise requests"));
    }
    validate_new_request(&input, &ctx.config.limits)?;

    let now = now_millis();
    let request = ServiceRequest {
        id: RequestId::random(),
        citizen_id: actor.user_id.clone(),
        title: input.title.trim().to_string(),
        description: input.description.trim().to_string(),
        category: input.category,
        department: input.department,
        location: input.location,
        priority: input.priority.unwrap_or_default(),
        status: RequestStatus::Raised,
        assigned_to: None,
        history: Vec::new(),
        rating: None,
        reopen: None,
        alarms: Vec::new(),
        created_at: now,
        updated_at: now,
    };
    ctx.store.insert_request(request.clone())?;
    info!(
        "request created request_id={} citizen_id={} department={} priority={:?}",
        request.id, request.citizen_id, request.department, request.priority
    );
    Ok(request)
}

/// Moves a request to `new_status`.
///
/// Staff drive the forward graph for their department's requests (or
/// requests assigned to them); the owning citizen may only close. A
/// repeated non-terminal status is accepted and still appends a history
/// entry. `clarification_needed` requires a message telling the citizen
/// what is missing.
pub async fn transition_request(
    ctx: &EngineContext,
    id: &RequestId,
    actor: &Actor,
    new_status: RequestStatus,
    message: Option<String>,
) -> Result<TransitionOutcome> {
    let request = ctx
        .store
        .request(id)?
        .ok_or_else(|| CivicError::request_not_found(id.as_str()))?;
    let old_status = request.status;

    match actor.role {
        Role::Citizen => {
            if !request.is_owner(&actor.user_id) {
                return Err(CivicError::unauthorized("not the request owner"));
            }
            if new_status != RequestStatus::Closed {
                return Err(CivicError::unauthorized(
                    "citizens may only close their own requests",
                ));
            }
            ensure_owner_close(old_status)?;
        }
        Role::Staff => {
            authorize_staff_access(&request, actor)?;
            ensure_valid_transition(old_status, new_status)?;
        }
    }

    let message = message.map(|m| m.trim().to_string()).filter(|m| !m.is_empty());
    if new_status == RequestStatus::ClarificationNeeded && message.is_none() {
        return Err(CivicError::validation(
            "a message describing the needed clarification is required",
        ));
    }
    if let Some(m) = &message {
        validate_message("message", m, &ctx.config.limits)?;
    }
    let entry_message = message
        .unwrap_or_else(|| format!("Status updated from {old_status} to {new_status}"));

    let entry = StatusEntry {
        old_status,
        new_status,
        changed_by: actor.user_id.clone(),
        message: Some(entry_message.clone()),
        changed_at: now_millis(),
    };
    let updated = ctx.store.commit_request_change(
        id,
        old_status,
        RequestChange {
            new_status: Some(new_status),
            push_history: Some(entry),
            ..Default::default()
        },
    )?;
    info!(
        "request transition request_id={} old_status={} new_status={} actor={}",
        id, old_status, new_status, actor.user_id
    );

    notify::status_changed(ctx, &updated, &entry_message).await;
    Ok(TransitionOutcome { request: updated, old_status, new_status })
}

/// Records the owner's verdict on a terminal request. `open_again` is the
/// reopen path in disguise: the request returns to `in_progress` with any
/// comments carried over as the reopen reason.
pub async fn rate_request(
    ctx: &EngineContext,
    id: &RequestId,
    actor: &Actor,
    score: RatingScore,
    comments: Option<String>,
) -> Result<TransitionOutcome> {
    let request = ctx
        .store
        .request(id)?
        .ok_or_else(|| CivicError::request_not_found(id.as_str()))?;
    if !request.is_owner(&actor.user_id) {
        return Err(CivicError::unauthorized("only the request owner can rate it"));
    }
    if !is_terminal(request.status) {
        return Err(CivicError::validation(format!(
            "rating requires a completed or closed request, status is {}",
            request.status
        )));
    }
    let comments = comments.map(|c| c.trim().to_string()).filter(|c| !c.is_empty());
    if let Some(c) = &comments {
        validate_message("comments", c, &ctx.config.limits)?;
    }

    if score == RatingScore::OpenAgain {
        return reopen_from(ctx, request, actor, comments).await;
    }

    let old_status = request.status;
    let now = now_millis();
    let entry = StatusEntry {
        old_status,
        new_status: old_status,
        changed_by: actor.user_id.clone(),
        message: Some(format!("Rated {score}")),
        changed_at: now,
    };
    let rating = Rating {
        score,
        comments,
        rated_by: actor.user_id.clone(),
        rated_at: now,
    };
    let updated = ctx.store.commit_request_change(
        id,
        old_status,
        RequestChange {
            push_history: Some(entry),
            set_rating: Some(Some(rating)),
            ..Default::default()
        },
    )?;
    info!("request rated request_id={} score={} actor={}", id, score, actor.user_id);
    Ok(TransitionOutcome { request: updated, old_status, new_status: old_status })
}

/// Reopens a terminal request with an explicit reason. The only way back
/// into the active graph; the request lands in `in_progress`.
pub async fn reopen_request(
    ctx: &EngineContext,
    id: &RequestId,
    actor: &Actor,
    reason: String,
) -> Result<TransitionOutcome> {
    validate_required_message("reason", &reason, &ctx.config.limits)?;
    let request = ctx
        .store
        .request(id)?
        .ok_or_else(|| CivicError::request_not_found(id.as_str()))?;
    if !request.is_owner(&actor.user_id) {
        return Err(CivicError::unauthorized("only the request owner can reopen it"));
    }
    if !is_terminal(request.status) {
        return Err(CivicError::validation(format!(
            "only completed or closed requests can be reopened, status is {}",
            request.status
        )));
    }
    reopen_from(ctx, request, actor, Some(reason.trim().to_string())).await
}

async fn reopen_from(
    ctx: &EngineContext,
    request: ServiceRequest,
    actor: &Actor,
    reason: Option<String>,
) -> Result<TransitionOutcome> {
    let old_status = request.status;
    let now = now_millis();
    let entry_message = match &reason {
        Some(r) => format!("Request reopened by user. Reason: {r}"),
        None => "Request reopened by user".to_string(),
    };
    let entry = StatusEntry {
        old_status,
        new_status: RequestStatus::InProgress,
        changed_by: actor.user_id.clone(),
        message: Some(entry_message.clone()),
        changed_at: now,
    };
    let note = ReopenNote { reason, reopened_by: actor.user_id.clone(), reopened_at: now };
    let updated = ctx.store.commit_request_change(
        &request.id,
        old_status,
        RequestChange {
            new_status: Some(RequestStatus::InProgress),
            push_history: Some(entry),
            set_rating: Some(None),
            set_reopen: Some(note),
            ..Default::default()
        },
    )?;
    info!(
        "request reopened request_id={} old_status={} actor={}",
        request.id, old_status, actor.user_id
    );
    notify::status_changed(ctx, &updated, &entry_message).await;
    Ok(TransitionOutcome {
        request: updated,
        old_status,
        new_status: RequestStatus::InProgress,
    })
}

/// Fetches one request, visible to its owner and to staff working it.
pub async fn fetch_request(
    ctx: &EngineContext,
    id: &RequestId,
    actor: &Actor,
) -> Result<ServiceRequest> {
    let request = ctx
        .store
        .request(id)?
        .ok_or_else(|| CivicError::request_not_found(id.as_str()))?;
    match actor.role {
        Role::Citizen => {
            if !request.is_owner(&actor.user_id) {
                return Err(CivicError::unauthorized("not the request owner"));
            }
        }
        Role::Staff => authorize_staff_access(&request, actor)?,
    }
    Ok(request)
}

/// Full transition trail of one request, oldest first.
pub async fn fetch_history(
    ctx: &EngineContext,
    id: &RequestId,
    actor: &Actor,
) -> Result<Vec<StatusEntry>> {
    Ok(fetch_request(ctx, id, actor).await?.history)
}

/// Requests visible to the caller: citizens see their own, staff see
/// their department (all departments when the profile carries none).
pub async fn list_requests(
    ctx: &EngineContext,
    actor: &Actor,
    status: Option<RequestStatus>,
) -> Result<Vec<ServiceRequest>> {
    let filter = match actor.role {
        Role::Citizen => RequestFilter {
            citizen_id: Some(actor.user_id.clone()),
            status,
            ..Default::default()
        },
        Role::Staff => RequestFilter {
            department: actor.department,
            status,
            ..Default::default()
        },
    };
    ctx.store.list_requests(&filter)
}

/// Staff act on a request when it belongs to their department or is
/// assigned to them personally.
pub(crate) fn authorize_staff_access(request: &ServiceRequest, actor: &Actor) -> Result<()> {
    if actor.role != Role::Staff {
        return Err(CivicError::unauthorized("staff role required"));
    }
    let same_department = actor.department == Some(request.department);
    if same_department || request.is_assignee(&actor.user_id) {
        return Ok(());
    }
    Err(CivicError::unauthorized("request belongs to another department"))
}
