//! Typed command inputs, one per mutation. Services validate these before
//! dispatching any document write.

use serde::{Deserialize, Serialize};

use super::stats::StatLine;
use super::user::{PlayerStatus, UserType};
use super::announcement::Priority;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub user_type: UserType,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTeam {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InviteMember {
    pub team_id: String,
    pub email: String,
    pub position: String,
    pub number: u8,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RemoveMember {
    pub team_id: String,
    pub user_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetPlayerStatus {
    pub team_id: String,
    pub user_id: String,
    pub new_status: PlayerStatus,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitMatchStats {
    pub match_id: String,
    pub player_id: String,
    pub stats: StatLine,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewMatchStats {
    pub stats_id: String,
    pub approve: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditMatchStats {
    pub stats_id: String,
    pub stats: StatLine,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostAnnouncement {
    pub team_id: String,
    pub title: String,
    pub message: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessage {
    pub team_id: String,
    pub text: String,
}
