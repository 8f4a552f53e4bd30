use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use log::debug;

use crate::domain::{
    Assignment, AssignmentStatus, NotificationRecord, RequestStatus, ServiceRequest,
};
use crate::foundation::{now_millis, AssignmentId, CivicError, RequestId, Result, UserId};
use crate::infrastructure::storage::traits::{RequestChange, RequestFilter, Store};
use crate::storage_err;

/// Oldest audit rows are discarded past this many entries.
const NOTIFICATION_AUDIT_CAP: usize = 10_000;

#[derive(Default)]
struct MemoryInner {
    requests: HashMap<RequestId, ServiceRequest>,
    assignments: HashMap<AssignmentId, Assignment>,
    notifications: Vec<NotificationRecord>,
}

/// In-memory [`Store`] backing single-node deployments and tests.
///
/// One mutex over all tables makes every mutation, including the
/// conditional commit door, atomic with respect to concurrent callers.
pub struct MemoryStore {
    inner: Arc<Mutex<MemoryInner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore { inner: Arc::new(Mutex::new(MemoryInner::default())) }
    }

    fn lock_inner(&self) -> Result<MutexGuard<'_, MemoryInner>> {
        self.inner.lock().map_err(|_| storage_err!("lock", "memory store mutex poisoned"))
    }

    /// Audit rows recorded so far, oldest first.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn notification_audit(&self) -> Vec<NotificationRecord> {
        self.inner.lock().map(|inner| inner.notifications.clone()).unwrap_or_default()
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl Store for MemoryStore {
    fn insert_request(&self, request: ServiceRequest) -> Result<()> {
        let mut inner = self.lock_inner()?;
        if inner.requests.contains_key(&request.id) {
            return Err(CivicError::Conflict {
                kind: "request",
                id: request.id.to_string(),
                details: "id already exists".to_string(),
            });
        }
        inner.requests.insert(request.id.clone(), request);
        Ok(())
    }

    fn request(&self, id: &RequestId) -> Result<Option<ServiceRequest>> {
        let inner = self.lock_inner()?;
        Ok(inner.requests.get(id).cloned())
    }

    fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<ServiceRequest>> {
        let inner = self.lock_inner()?;
        let mut matches: Vec<ServiceRequest> = inner
            .requests
            .values()
            .filter(|request| {
                filter.citizen_id.as_ref().is_none_or(|id| request.citizen_id == *id)
                    && filter.department.is_none_or(|dept| request.department == dept)
                    && filter.status.is_none_or(|status| request.status == status)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }

    fn commit_request_change(
        &self,
        id: &RequestId,
        expected_status: RequestStatus,
        change: RequestChange,
    ) -> Result<ServiceRequest> {
        let mut inner = self.lock_inner()?;
        let now = now_millis();
        let MemoryInner { requests, assignments, .. } = &mut *inner;

        let request = requests
            .get_mut(id)
            .ok_or_else(|| CivicError::request_not_found(id.as_str()))?;
        if request.status != expected_status {
            return Err(CivicError::Conflict {
                kind: "request",
                id: id.to_string(),
                details: format!(
                    "expected status {expected_status}, found {}",
                    request.status
                ),
            });
        }

        if let Some(status) = change.new_status {
            request.status = status;
        }
        if let Some(entry) = change.push_history {
            request.history.push(entry);
        }
        if let Some(rating) = change.set_rating {
            request.rating = rating;
        }
        if let Some(note) = change.set_reopen {
            request.reopen = Some(note);
        }
        if let Some(assignee) = change.set_assigned_to {
            request.assigned_to = Some(assignee);
        }
        if let Some(alarm) = change.push_alarm {
            request.alarms.push(alarm);
        }
        request.updated_at = now;
        let updated = request.clone();

        if let Some(assignment) = change.replace_assignment {
            let mut superseded = 0usize;
            for entry in assignments.values_mut() {
                if entry.request_id == *id && entry.status.is_active() {
                    entry.status = AssignmentStatus::Superseded;
                    entry.updated_at = now;
                    superseded += 1;
                }
            }
            if superseded > 0 {
                debug!(
                    "superseded prior assignments request_id={} count={}",
                    id, superseded
                );
            }
            assignments.insert(assignment.id.clone(), assignment);
        }

        Ok(updated)
    }

    fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>> {
        let inner = self.lock_inner()?;
        Ok(inner.assignments.get(id).cloned())
    }

    fn assignments_for_request(&self, request_id: &RequestId) -> Result<Vec<Assignment>> {
        let inner = self.lock_inner()?;
        let mut matches: Vec<Assignment> = inner
            .assignments
            .values()
            .filter(|entry| entry.request_id == *request_id)
            .cloned()
            .collect();
        matches.sort_by(|a, b| a.created_at.cmp(&b.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }

    fn assignments_for_staff(
        &self,
        staff_id: &UserId,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>> {
        let inner = self.lock_inner()?;
        let mut matches: Vec<Assignment> = inner
            .assignments
            .values()
            .filter(|entry| {
                entry.assigned_to == *staff_id && status.is_none_or(|s| entry.status == s)
            })
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.created_at.cmp(&a.created_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matches)
    }

    fn update_assignment_status(
        &self,
        id: &AssignmentId,
        expected: &[AssignmentStatus],
        new_status: AssignmentStatus,
        scoped_to: Option<&UserId>,
    ) -> Result<Option<Assignment>> {
        let mut inner = self.lock_inner()?;
        let entry = inner
            .assignments
            .get_mut(id)
            .ok_or_else(|| CivicError::assignment_not_found(id.as_str()))?;
        if !expected.contains(&entry.status) {
            return Ok(None);
        }
        if let Some(user) = scoped_to {
            if entry.assigned_to != *user {
                return Ok(None);
            }
        }
        entry.status = new_status;
        entry.updated_at = now_millis();
        Ok(Some(entry.clone()))
    }

    fn record_notification(&self, record: NotificationRecord) -> Result<()> {
        let mut inner = self.lock_inner()?;
        inner.notifications.push(record);
        if inner.notifications.len() > NOTIFICATION_AUDIT_CAP {
            let excess = inner.notifications.len() - NOTIFICATION_AUDIT_CAP;
            inner.notifications.drain(..excess);
        }
        Ok(())
    }
}
