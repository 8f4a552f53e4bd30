//! Assignment ledger operations.
//!
//! Allocation works last-assignment-wins: recording new work supersedes
//! whatever was pending or accepted for the request, in the same atomic
//! commit that moves the request to `in_progress` and mirrors the
//! assignee onto it. Assignees drive their own entries through a small
//! accept/reject/complete machine.

use log::info;

use crate::application::context::EngineContext;
use crate::application::lifecycle::authorize_staff_access;
use crate::application::notify;
use crate::domain::{
    ensure_valid_assignment_transition, ensure_valid_transition, validate_message, Actor,
    Assignment, AssignmentStatus, RequestStatus, Role, StatusEntry,
};
use crate::foundation::{now_millis, AssignmentId, CivicError, RequestId, Result, UserId};
use crate::infrastructure::storage::RequestChange;

/// Delegates a request to one staff member.
///
/// The new entry starts `pending`; any prior active entry is superseded.
/// The request itself moves to `in_progress` (re-asserting it when
/// already there), so allocating a completed or closed request fails the
/// same way any invalid transition does.
pub async fn assign_work(
    ctx: &EngineContext,
    request_id: &RequestId,
    actor: &Actor,
    assignee: impl Into<UserId>,
    notes: Option<String>,
) -> Result<Assignment> {
    let assignee = assignee.into();
    if actor.role != Role::Staff {
        return Err(CivicError::unauthorized("only staff can allocate work"));
    }
    let request = ctx
        .store
        .request(request_id)?
        .ok_or_else(|| CivicError::request_not_found(request_id.as_str()))?;
    let old_status = request.status;
    authorize_staff_access(&request, actor)?;
    ensure_valid_transition(old_status, RequestStatus::InProgress)?;

    let assignee_profile = ctx
        .directory
        .profile(&assignee)?
        .ok_or_else(|| CivicError::validation(format!("unknown assignee: {assignee}")))?;
    if assignee_profile.role != Role::Staff {
        return Err(CivicError::validation(format!("assignee is not staff: {assignee}")));
    }
    let notes = notes.map(|n| n.trim().to_string()).filter(|n| !n.is_empty());
    if let Some(n) = &notes {
        validate_message("notes", n, &ctx.config.limits)?;
    }

    let now = now_millis();
    let assignment = Assignment {
        id: AssignmentId::random(),
        request_id: request_id.clone(),
        assigned_to: assignee.clone(),
        assigned_by: actor.user_id.clone(),
        status: AssignmentStatus::Pending,
        notes,
        created_at: now,
        updated_at: now,
    };
    let entry_message = format!("Request allocated to {}", assignee_profile.full_name);
    let entry = StatusEntry {
        old_status,
        new_status: RequestStatus::InProgress,
        changed_by: actor.user_id.clone(),
        message: Some(entry_message.clone()),
        changed_at: now,
    };
    let updated = ctx.store.commit_request_change(
        request_id,
        old_status,
        RequestChange {
            new_status: Some(RequestStatus::InProgress),
            push_history: Some(entry),
            set_assigned_to: Some(assignee.clone()),
            replace_assignment: Some(assignment.clone()),
            ..Default::default()
        },
    )?;
    info!(
        "work assigned request_id={} assignment_id={} assigned_to={} assigned_by={}",
        request_id, assignment.id, assignee, actor.user_id
    );

    notify::work_assigned(ctx, &assignee, &updated).await;
    notify::status_changed(ctx, &updated, &entry_message).await;
    Ok(assignment)
}

/// Assignee-driven update: accept or reject pending work, complete
/// accepted work. The conditional store update catches a concurrent
/// change between the read and the write.
pub async fn update_assignment(
    ctx: &EngineContext,
    assignment_id: &AssignmentId,
    actor: &Actor,
    new_status: AssignmentStatus,
) -> Result<Assignment> {
    if actor.role != Role::Staff {
        return Err(CivicError::unauthorized("only staff hold assignments"));
    }
    let assignment = ctx
        .store
        .assignment(assignment_id)?
        .ok_or_else(|| CivicError::assignment_not_found(assignment_id.as_str()))?;
    if assignment.assigned_to != actor.user_id {
        return Err(CivicError::unauthorized("assignment belongs to another staff member"));
    }
    ensure_valid_assignment_transition(assignment.status, new_status)?;

    let updated = ctx
        .store
        .update_assignment_status(
            assignment_id,
            &[assignment.status],
            new_status,
            Some(&actor.user_id),
        )?
        .ok_or_else(|| CivicError::Conflict {
            kind: "assignment",
            id: assignment_id.to_string(),
            details: "entry changed concurrently".to_string(),
        })?;
    info!(
        "assignment updated assignment_id={} request_id={} status={} actor={}",
        assignment_id, updated.request_id, new_status, actor.user_id
    );
    Ok(updated)
}

/// The caller's own assignments, optionally narrowed to one status.
pub async fn staff_assignments(
    ctx: &EngineContext,
    actor: &Actor,
    status: Option<AssignmentStatus>,
) -> Result<Vec<Assignment>> {
    if actor.role != Role::Staff {
        return Err(CivicError::unauthorized("only staff hold assignments"));
    }
    ctx.store.assignments_for_staff(&actor.user_id, status)
}

/// Full ledger trail of one request, for staff working it.
pub async fn request_assignments(
    ctx: &EngineContext,
    request_id: &RequestId,
    actor: &Actor,
) -> Result<Vec<Assignment>> {
    let request = ctx
        .store
        .request(request_id)?
        .ok_or_else(|| CivicError::request_not_found(request_id.as_str()))?;
    authorize_staff_access(&request, actor)?;
    ctx.store.assignments_for_request(request_id)
}
