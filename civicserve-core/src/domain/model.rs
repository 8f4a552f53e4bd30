use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::domain::assignment::AssignmentStatus;
use crate::domain::status::RequestStatus;
use crate::foundation::{now_millis, AssignmentId, CivicError, RequestId, Result, UserId};

/// Municipal department a request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Department {
    Electricity,
    Water,
    Agriculture,
    Law,
    Medical,
    Services,
}

impl Department {
    pub fn as_str(&self) -> &'static str {
        match self {
            Department::Electricity => "electricity",
            Department::Water => "water",
            Department::Agriculture => "agriculture",
            Department::Law => "law",
            Department::Medical => "medical",
            Department::Services => "services",
        }
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Department {
    type Err = CivicError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "electricity" => Ok(Department::Electricity),
            "water" => Ok(Department::Water),
            "agriculture" => Ok(Department::Agriculture),
            "law" => Ok(Department::Law),
            "medical" => Ok(Department::Medical),
            "services" => Ok(Department::Services),
            other => Err(CivicError::validation(format!("unknown department: {other}"))),
        }
    }
}

/// Urgency hint attached by the citizen at create time. Informational
/// only; the lifecycle does not branch on it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
    Critical,
}

impl FromStr for Priority {
    type Err = CivicError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            "critical" => Ok(Priority::Critical),
            other => Err(CivicError::validation(format!("unknown priority: {other}"))),
        }
    }
}

/// Citizen verdict on a terminal request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RatingScore {
    Excellent,
    Good,
    OpenAgain,
}

impl RatingScore {
    pub fn as_str(&self) -> &'static str {
        match self {
            RatingScore::Excellent => "excellent",
            RatingScore::Good => "good",
            RatingScore::OpenAgain => "open_again",
        }
    }
}

impl fmt::Display for RatingScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RatingScore {
    type Err = CivicError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "excellent" => Ok(RatingScore::Excellent),
            "good" => Ok(RatingScore::Good),
            "open_again" => Ok(RatingScore::OpenAgain),
            other => Err(CivicError::validation(format!("unknown rating score: {other}"))),
        }
    }
}

/// Caller role as vouched for by the fronting gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Raises and owns requests. Wire alias `user` accepted for older
    /// gateway deployments.
    #[serde(alias = "user")]
    Citizen,
    /// Works requests on behalf of a department. Wire alias `admin`.
    #[serde(alias = "admin")]
    Staff,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Citizen => "citizen",
            Role::Staff => "staff",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Authenticated caller identity, resolved by the HTTP layer from
/// gateway-injected headers and threaded through every operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub user_id: UserId,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
}

impl Actor {
    pub fn citizen(user_id: impl Into<UserId>) -> Self {
        Actor { user_id: user_id.into(), role: Role::Citizen, department: None }
    }

    pub fn staff(user_id: impl Into<UserId>, department: Department) -> Self {
        Actor { user_id: user_id.into(), role: Role::Staff, department: Some(department) }
    }
}

/// One entry in a request's transition trail. Appended for every status
/// change, every accepted repeat and every rating; never rewritten.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEntry {
    pub old_status: RequestStatus,
    pub new_status: RequestStatus,
    pub changed_by: UserId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub changed_at: u64,
}

/// Citizen verdict attached to a terminal request. Cleared when the
/// request is reopened.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rating {
    pub score: RatingScore,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub comments: Option<String>,
    pub rated_by: UserId,
    pub rated_at: u64,
}

/// Record of the most recent reopen. The reason is absent only when the
/// reopen came through a rating without comments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReopenNote {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub reopened_by: UserId,
    pub reopened_at: u64,
}

/// Escalation note pinned to a request; does not touch status or history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlarmNote {
    pub message: String,
    pub raised_by: UserId,
    pub raised_at: u64,
}

/// A citizen-raised service request and its full lifecycle trail.
///
/// Invariant: `status` always equals the `new_status` of the last history
/// entry, or `Raised` while the history is still empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceRequest {
    pub id: RequestId,
    pub citizen_id: UserId,
    pub title: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub department: Department,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub priority: Priority,
    pub status: RequestStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assigned_to: Option<UserId>,
    #[serde(default)]
    pub history: Vec<StatusEntry>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<Rating>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reopen: Option<ReopenNote>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub alarms: Vec<AlarmNote>,
    pub created_at: u64,
    pub updated_at: u64,
}

impl ServiceRequest {
    pub fn is_owner(&self, user_id: &UserId) -> bool {
        self.citizen_id == *user_id
    }

    pub fn is_assignee(&self, user_id: &UserId) -> bool {
        self.assigned_to.as_ref() == Some(user_id)
    }
}

/// Input for creating a request; validated before anything is stored.
#[derive(Debug, Clone, Deserialize)]
pub struct NewRequest {
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub department: Department,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub priority: Option<Priority>,
}

/// Work delegated to one staff member for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Assignment {
    pub id: AssignmentId,
    pub request_id: RequestId,
    pub assigned_to: UserId,
    pub assigned_by: UserId,
    pub status: AssignmentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub created_at: u64,
    pub updated_at: u64,
}

/// Kind of a live notification, serialized as `type` on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    Info,
    Status,
    Alarm,
    System,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Info => "info",
            NotificationKind::Status => "status",
            NotificationKind::Alarm => "alarm",
            NotificationKind::System => "system",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = CivicError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "info" => Ok(NotificationKind::Info),
            "status" => Ok(NotificationKind::Status),
            "alarm" => Ok(NotificationKind::Alarm),
            "system" => Ok(NotificationKind::System),
            other => Err(CivicError::validation(format!("unknown notification type: {other}"))),
        }
    }
}

/// Ephemeral push payload. Delivery is best-effort; a notification that
/// finds no live connection is gone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub title: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub created_at: u64,
}

impl Notification {
    pub fn new(title: impl Into<String>, message: impl Into<String>, kind: NotificationKind) -> Self {
        Notification {
            title: title.into(),
            message: message.into(),
            kind,
            created_at: now_millis(),
        }
    }
}

/// Audit row written when a notification is published.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationRecord {
    /// Target user, or `None` for a broadcast.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<UserId>,
    pub title: String,
    pub message: String,
    pub kind: NotificationKind,
    pub created_at: u64,
}

/// Directory profile for a known user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub user_id: UserId,
    pub full_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub role: Role,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub department: Option<Department>,
}
