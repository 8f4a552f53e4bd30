use crate::domain::{
    AlarmNote, Assignment, AssignmentStatus, Department, NotificationRecord, Rating, ReopenNote,
    RequestStatus, ServiceRequest, StatusEntry,
};
use crate::foundation::{AssignmentId, RequestId, Result, UserId};

/// Query filter for request listings. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct RequestFilter {
    pub citizen_id: Option<UserId>,
    pub department: Option<Department>,
    pub status: Option<RequestStatus>,
}

/// Field updates applied through [`Store::commit_request_change`].
///
/// `Default` changes nothing. The store applies every populated piece
/// under one lock, so readers never observe a half-applied mutation.
#[derive(Debug, Clone, Default)]
pub struct RequestChange {
    pub new_status: Option<RequestStatus>,
    pub push_history: Option<StatusEntry>,
    /// `Some(None)` clears an existing rating.
    pub set_rating: Option<Option<Rating>>,
    pub set_reopen: Option<ReopenNote>,
    pub set_assigned_to: Option<UserId>,
    pub push_alarm: Option<AlarmNote>,
    /// Supersedes every active assignment of the request and inserts this
    /// one, atomically with the rest of the change.
    pub replace_assignment: Option<Assignment>,
}

/// Storage backend for the request lifecycle and assignment ledger.
///
/// Implementations must serialize mutations per request: two concurrent
/// `commit_request_change` calls for the same id must observe each other.
pub trait Store: Send + Sync {
    /// Inserts a new request. Fails with `Conflict` when the id exists.
    fn insert_request(&self, request: ServiceRequest) -> Result<()>;

    fn request(&self, id: &RequestId) -> Result<Option<ServiceRequest>>;

    /// Matching requests, newest first.
    fn list_requests(&self, filter: &RequestFilter) -> Result<Vec<ServiceRequest>>;

    /// Single mutation door for requests.
    ///
    /// Atomically re-checks that the stored status still equals
    /// `expected_status` before applying `change`. A mismatch means a
    /// concurrent writer got there first and surfaces as `Conflict`;
    /// a missing id surfaces as `NotFound`. Returns the updated request.
    fn commit_request_change(
        &self,
        id: &RequestId,
        expected_status: RequestStatus,
        change: RequestChange,
    ) -> Result<ServiceRequest>;

    fn assignment(&self, id: &AssignmentId) -> Result<Option<Assignment>>;

    /// Full ledger trail for one request, oldest first.
    fn assignments_for_request(&self, request_id: &RequestId) -> Result<Vec<Assignment>>;

    /// Assignments held by one staff member, newest first, optionally
    /// narrowed to a single status.
    fn assignments_for_staff(
        &self,
        staff_id: &UserId,
        status: Option<AssignmentStatus>,
    ) -> Result<Vec<Assignment>>;

    /// Conditional assignment update. Applies `new_status` only when the
    /// stored status is one of `expected` and, when `scoped_to` is given,
    /// the entry is assigned to that user. Returns `Ok(None)` when the
    /// entry exists but the condition no longer holds, so callers can
    /// surface a precise conflict.
    fn update_assignment_status(
        &self,
        id: &AssignmentId,
        expected: &[AssignmentStatus],
        new_status: AssignmentStatus,
        scoped_to: Option<&UserId>,
    ) -> Result<Option<Assignment>>;

    /// Audit sink for published notifications. Best-effort; the default
    /// implementation drops the record.
    fn record_notification(&self, record: NotificationRecord) -> Result<()> {
        let _ = record;
        Ok(())
    }

    /// Backend liveness probe for the readiness endpoint.
    fn health_check(&self) -> Result<()> {
        Ok(())
    }
}
