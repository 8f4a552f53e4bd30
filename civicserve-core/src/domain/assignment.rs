use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::foundation::{CivicError, Result};

/// State of one ledger entry in the assignment ledger.
///
/// `Superseded` is never reached through [`ensure_valid_assignment_transition`];
/// it is applied by the ledger itself when a newer assignment replaces an
/// active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AssignmentStatus {
    Pending,
    Accepted,
    Rejected,
    Completed,
    Superseded,
}

impl AssignmentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssignmentStatus::Pending => "pending",
            AssignmentStatus::Accepted => "accepted",
            AssignmentStatus::Rejected => "rejected",
            AssignmentStatus::Completed => "completed",
            AssignmentStatus::Superseded => "superseded",
        }
    }

    /// Active entries block new work from being recorded as a parallel
    /// assignment; at most one per request exists at any time.
    pub fn is_active(&self) -> bool {
        matches!(self, AssignmentStatus::Pending | AssignmentStatus::Accepted)
    }
}

impl fmt::Display for AssignmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for AssignmentStatus {
    type Err = CivicError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "pending" => Ok(AssignmentStatus::Pending),
            "accepted" => Ok(AssignmentStatus::Accepted),
            "rejected" => Ok(AssignmentStatus::Rejected),
            "completed" => Ok(AssignmentStatus::Completed),
            "superseded" => Ok(AssignmentStatus::Superseded),
            other => Err(CivicError::validation(format!("unknown assignment status: {other}"))),
        }
    }
}

const VALID_ASSIGNMENT_TRANSITIONS: &[(AssignmentStatus, AssignmentStatus)] = &[
    (AssignmentStatus::Pending, AssignmentStatus::Accepted),
    (AssignmentStatus::Pending, AssignmentStatus::Rejected),
    (AssignmentStatus::Accepted, AssignmentStatus::Completed),
];

/// Validates an assignee-driven assignment update.
pub fn ensure_valid_assignment_transition(
    from: AssignmentStatus,
    to: AssignmentStatus,
) -> Result<()> {
    if VALID_ASSIGNMENT_TRANSITIONS.contains(&(from, to)) {
        return Ok(());
    }
    Err(CivicError::InvalidTransition { from: from.to_string(), to: to.to_string() })
}
