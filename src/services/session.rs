use serde::{Deserialize, Serialize};

use crate::models::{User, UserType};

/// The authenticated user's context, established by the identity reconciler
/// and passed explicitly to every operation that needs an actor. There is no
/// ambient "current user" anywhere in the crate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub user: User,
}

impl Session {
    pub fn new(user: User) -> Self {
        Self { user }
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }

    pub fn email(&self) -> &str {
        &self.user.email
    }

    pub fn team_id(&self) -> Option<&str> {
        self.user.team_id.as_deref()
    }

    pub fn is_trainer(&self) -> bool {
        self.user.user_type == UserType::Trainer
    }

    pub fn is_team_member(&self) -> bool {
        self.user.user_type == UserType::TeamMember
    }

    /// Local copies are non-authoritative; callers refresh after mutations
    /// that touch their own profile.
    pub fn with_user(self, user: User) -> Self {
        Self { user }
    }
}
