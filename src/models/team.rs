use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Team {
    pub id: String,
    pub name: String,
    /// Exactly one owning trainer per team.
    pub trainer_id: String,
    pub allow_player_injury_reporting: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Team {
    pub fn new(name: String, trainer_id: String, allow_player_injury_reporting: bool) -> Self {
        let now = Utc::now();
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            trainer_id,
            allow_player_injury_reporting,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_owned_by(&self, user_id: &str) -> bool {
        self.trainer_id == user_id
    }
}

#[derive(Debug, Clone)]
pub enum TeamPatch {
    SetInjuryReporting(bool),
    Rename(String),
}

#[derive(Debug, Clone, Default)]
pub struct TeamFilter {
    pub trainer_id: Option<String>,
}

impl Entity for Team {
    type Patch = TeamPatch;
    type Filter = TeamFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: TeamPatch) {
        match patch {
            TeamPatch::SetInjuryReporting(allowed) => {
                self.allow_player_injury_reporting = allowed;
            }
            TeamPatch::Rename(name) => self.name = name,
        }
        self.updated_at = Utc::now();
    }

    fn matches(&self, filter: &TeamFilter) -> bool {
        match filter.trainer_id {
            Some(ref trainer_id) => self.trainer_id == *trainer_id,
            None => true,
        }
    }
}
