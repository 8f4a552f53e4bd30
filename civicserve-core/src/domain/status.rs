use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::{CivicError, Result};

/// Lifecycle state of a service request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequestStatus {
    Raised,
    InProgress,
    ClarificationNeeded,
    Completed,
    Closed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Raised => "raised",
            RequestStatus::InProgress => "in_progress",
            RequestStatus::ClarificationNeeded => "clarification_needed",
            RequestStatus::Completed => "completed",
            RequestStatus::Closed => "closed",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = CivicError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "raised" => Ok(RequestStatus::Raised),
            "in_progress" => Ok(RequestStatus::InProgress),
            "clarification_needed" => Ok(RequestStatus::ClarificationNeeded),
            "completed" => Ok(RequestStatus::Completed),
            "closed" => Ok(RequestStatus::Closed),
            other => Err(CivicError::validation(format!("unknown status: {other}"))),
        }
    }
}

/// Staff-driven forward transitions. Owner-only moves (direct close and
/// reopen) are authorized separately and do not appear here.
const VALID_TRANSITIONS: &[(RequestStatus, RequestStatus)] = &[
    (RequestStatus::Raised, RequestStatus::InProgress),
    (RequestStatus::Raised, RequestStatus::ClarificationNeeded),
    (RequestStatus::InProgress, RequestStatus::ClarificationNeeded),
    (RequestStatus::InProgress, RequestStatus::Completed),
    (RequestStatus::ClarificationNeeded, RequestStatus::InProgress),
    (RequestStatus::ClarificationNeeded, RequestStatus::Completed),
    (RequestStatus::Completed, RequestStatus::Closed),
];

/// Whether a status ends the active life of a request. Terminal requests
/// only move again through an explicit reopen.
pub fn is_terminal(status: RequestStatus) -> bool {
    matches!(status, RequestStatus::Completed | RequestStatus::Closed)
}

/// Validates a staff-driven transition against the lifecycle graph.
///
/// Re-asserting the current non-terminal status is accepted; the engine
/// records it as a fresh history entry. Repeating a terminal status is
/// rejected.
pub fn ensure_valid_transition(from: RequestStatus, to: RequestStatus) -> Result<()> {
    if from == to {
        if is_terminal(from) {
            return Err(invalid_transition(from, to));
        }
        return Ok(());
    }
    if VALID_TRANSITIONS.contains(&(from, to)) {
        return Ok(());
    }
    Err(invalid_transition(from, to))
}

/// Validates an owner-driven close: legal from every state except an
/// already closed request.
pub fn ensure_owner_close(from: RequestStatus) -> Result<()> {
    if from == RequestStatus::Closed {
        return Err(invalid_transition(from, RequestStatus::Closed));
    }
    Ok(())
}

fn invalid_transition(from: RequestStatus, to: RequestStatus) -> CivicError {
    CivicError::InvalidTransition { from: from.to_string(), to: to.to_string() }
}
