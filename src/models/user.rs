use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserType {
    Trainer,
    TeamMember,
    Individual,
}

impl std::fmt::Display for UserType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserType::Trainer => write!(f, "trainer"),
            UserType::TeamMember => write!(f, "team_member"),
            UserType::Individual => write!(f, "individual"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlayerStatus {
    Active,
    Injured,
}

impl Default for PlayerStatus {
    fn default() -> Self {
        PlayerStatus::Active
    }
}

impl std::fmt::Display for PlayerStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerStatus::Active => write!(f, "active"),
            PlayerStatus::Injured => write!(f, "injured"),
        }
    }
}

/// Profile document. `id` is the authentication identity id; the backing
/// invariant is exactly one profile per identity.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub email: String,
    pub name: String,
    pub user_type: UserType,
    pub team_id: Option<String>,
    pub position: Option<String>,
    pub number: Option<u8>,
    pub status: PlayerStatus,
    #[serde(default)]
    pub notification_prefs: HashMap<String, bool>,
    #[serde(default)]
    pub privacy_prefs: HashMap<String, bool>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    pub fn new(id: String, email: String, name: String, user_type: UserType) -> Self {
        let now = Utc::now();
        Self {
            id,
            email,
            name,
            user_type,
            team_id: None,
            position: None,
            number: None,
            status: PlayerStatus::Active,
            notification_prefs: HashMap::new(),
            privacy_prefs: HashMap::new(),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_trainer(&self) -> bool {
        self.user_type == UserType::Trainer
    }

    pub fn is_on_team(&self, team_id: &str) -> bool {
        self.team_id.as_deref() == Some(team_id)
    }
}

/// Closed set of profile mutations.
#[derive(Debug, Clone)]
pub enum UserPatch {
    SetStatus(PlayerStatus),
    JoinTeam {
        team_id: String,
        position: Option<String>,
        number: Option<u8>,
    },
    LeaveTeam,
    SetNotificationPref { key: String, enabled: bool },
    SetPrivacyPref { key: String, enabled: bool },
}

#[derive(Debug, Clone, Default)]
pub struct UserFilter {
    pub team_id: Option<String>,
    pub email: Option<String>,
}

impl UserFilter {
    pub fn by_team(team_id: &str) -> Self {
        UserFilter {
            team_id: Some(team_id.to_string()),
            ..Default::default()
        }
    }

    pub fn by_email(email: &str) -> Self {
        UserFilter {
            email: Some(email.to_string()),
            ..Default::default()
        }
    }
}

impl Entity for User {
    type Patch = UserPatch;
    type Filter = UserFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: UserPatch) {
        match patch {
            UserPatch::SetStatus(status) => self.status = status,
            UserPatch::JoinTeam {
                team_id,
                position,
                number,
            } => {
                self.team_id = Some(team_id);
                self.position = position;
                self.number = number;
            }
            UserPatch::LeaveTeam => {
                self.team_id = None;
                self.position = None;
                self.number = None;
            }
            UserPatch::SetNotificationPref { key, enabled } => {
                self.notification_prefs.insert(key, enabled);
            }
            UserPatch::SetPrivacyPref { key, enabled } => {
                self.privacy_prefs.insert(key, enabled);
            }
        }
        self.updated_at = Utc::now();
    }

    fn matches(&self, filter: &UserFilter) -> bool {
        if let Some(ref team_id) = filter.team_id {
            if self.team_id.as_deref() != Some(team_id.as_str()) {
                return false;
            }
        }
        if let Some(ref email) = filter.email {
            if !self.email.eq_ignore_ascii_case(email) {
                return false;
            }
        }
        true
    }
}
