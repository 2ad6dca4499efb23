use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Normal,
    High,
}

impl Default for Priority {
    fn default() -> Self {
        Priority::Normal
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Announcement {
    pub id: String,
    pub team_id: String,
    pub title: String,
    pub message: String,
    #[serde(default)]
    pub priority: Priority,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub read_by: HashSet<String>,
}

impl Announcement {
    pub fn new(
        team_id: String,
        title: String,
        message: String,
        priority: Priority,
        created_by: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id,
            title,
            message,
            priority,
            created_by,
            created_at: Utc::now(),
            read_by: HashSet::new(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum AnnouncementPatch {
    MarkRead(String),
}

#[derive(Debug, Clone, Default)]
pub struct AnnouncementFilter {
    pub team_id: Option<String>,
}

impl AnnouncementFilter {
    pub fn by_team(team_id: &str) -> Self {
        AnnouncementFilter {
            team_id: Some(team_id.to_string()),
        }
    }
}

impl Entity for Announcement {
    type Patch = AnnouncementPatch;
    type Filter = AnnouncementFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: AnnouncementPatch) {
        match patch {
            AnnouncementPatch::MarkRead(user_id) => {
                self.read_by.insert(user_id);
            }
        }
    }

    fn matches(&self, filter: &AnnouncementFilter) -> bool {
        match filter.team_id {
            Some(ref team_id) => self.team_id == *team_id,
            None => true,
        }
    }
}
