use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::store::Entity;

/// Pending roster invitation, keyed by (team, email). Consumed when the
/// invited email registers or signs in; nothing outlives the join.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Invite {
    pub id: String,
    pub team_id: String,
    pub email: String,
    pub position: String,
    pub number: u8,
    pub invited_by: String,
    pub created_at: DateTime<Utc>,
}

impl Invite {
    pub fn new(
        team_id: String,
        email: String,
        position: String,
        number: u8,
        invited_by: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            team_id,
            email: email.to_lowercase(),
            position,
            number,
            invited_by,
            created_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum InvitePatch {
    /// Re-inviting the same email overwrites the pending attributes.
    ReplaceAttributes { position: String, number: u8 },
}

#[derive(Debug, Clone, Default)]
pub struct InviteFilter {
    pub team_id: Option<String>,
    pub email: Option<String>,
}

impl InviteFilter {
    pub fn by_email(email: &str) -> Self {
        InviteFilter {
            team_id: None,
            email: Some(email.to_lowercase()),
        }
    }

    pub fn by_team_and_email(team_id: &str, email: &str) -> Self {
        InviteFilter {
            team_id: Some(team_id.to_string()),
            email: Some(email.to_lowercase()),
        }
    }
}

impl Entity for Invite {
    type Patch = InvitePatch;
    type Filter = InviteFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: InvitePatch) {
        match patch {
            InvitePatch::ReplaceAttributes { position, number } => {
                self.position = position;
                self.number = number;
            }
        }
    }

    fn matches(&self, filter: &InviteFilter) -> bool {
        if let Some(ref team_id) = filter.team_id {
            if self.team_id != *team_id {
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

/// QR join payload: a UTF-8 JSON object `{"teamId": ..., "teamName": ...}`.
/// Any other shape is rejected before anything is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JoinCode {
    pub team_id: String,
    pub team_name: String,
}

impl JoinCode {
    pub fn encode(&self) -> String {
        // Two required string fields; serialization cannot fail.
        serde_json::to_string(self).unwrap_or_default()
    }

    pub fn decode(code: &str) -> Result<Self, AppError> {
        let decoded: JoinCode = serde_json::from_str(code)
            .map_err(|e| AppError::InvalidCode(format!("malformed payload: {}", e)))?;
        if decoded.team_id.is_empty() {
            return Err(AppError::InvalidCode("empty teamId".to_string()));
        }
        Ok(decoded)
    }
}
