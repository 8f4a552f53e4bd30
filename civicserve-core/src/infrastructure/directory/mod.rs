//! Read-only access to user identities.
//!
//! Identity lives outside this service. Deployments back the trait with
//! their account system; [`StaticDirectory`] covers tests and small
//! installations seeded from configuration.

use crate::domain::{Department, Profile, Role};
use crate::foundation::{Result, UserId};

pub trait Directory: Send + Sync {
    fn profile(&self, user_id: &UserId) -> Result<Option<Profile>>;

    /// Staff profiles, optionally narrowed to one department.
    fn staff(&self, department: Option<Department>) -> Result<Vec<Profile>>;
}

pub struct StaticDirectory {
    profiles: Vec<Profile>,
}

impl StaticDirectory {
    pub fn new(profiles: Vec<Profile>) -> Self {
        StaticDirectory { profiles }
    }
}

impl Directory for StaticDirectory {
    fn profile(&self, user_id: &UserId) -> Result<Option<Profile>> {
        Ok(self.profiles.iter().find(|p| p.user_id == *user_id).cloned())
    }

    fn staff(&self, department: Option<Department>) -> Result<Vec<Profile>> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| p.role == Role::Staff)
            .filter(|p| department.is_none_or(|dept| p.department == Some(dept)))
            .cloned()
            .collect())
    }
}
