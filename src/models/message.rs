use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageKind {
    Message,
    Announcement,
    Event,
}

impl Default for MessageKind {
    fn default() -> Self {
        MessageKind::Message
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub team_id: String,
    pub text: String,
    /// Sender.
    pub user_id: String,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub read_by: HashSet<String>,
    #[serde(default)]
    pub edited: bool,
    #[serde(default)]
    pub kind: MessageKind,
}

impl Message {
    pub fn new(team_id: String, text: String, user_id: String, kind: MessageKind) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id,
            text,
            user_id,
            timestamp: Utc::now(),
            read_by: HashSet::new(),
            edited: false,
            kind,
        }
    }
}

#[derive(Debug, Clone)]
pub enum MessagePatch {
    EditText(String),
    MarkRead(String),
}

#[derive(Debug, Clone, Default)]
pub struct MessageFilter {
    pub team_id: Option<String>,
}

impl MessageFilter {
    pub fn by_team(team_id: &str) -> Self {
        MessageFilter {
            team_id: Some(team_id.to_string()),
        }
    }
}

impl Entity for Message {
    type Patch = MessagePatch;
    type Filter = MessageFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: MessagePatch) {
        match patch {
            MessagePatch::EditText(text) => {
                self.text = text;
                self.edited = true;
            }
            MessagePatch::MarkRead(user_id) => {
                self.read_by.insert(user_id);
            }
        }
    }

    fn matches(&self, filter: &MessageFilter) -> bool {
        match filter.team_id {
            Some(ref team_id) => self.team_id == *team_id,
            None => true,
        }
    }
}
