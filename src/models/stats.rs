use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::store::Entity;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReviewStatus {
    Pending,
    Approved,
    Rejected,
}

impl std::fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewStatus::Pending => write!(f, "pending"),
            ReviewStatus::Approved => write!(f, "approved"),
            ReviewStatus::Rejected => write!(f, "rejected"),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatLine {
    pub goals: u32,
    pub assists: u32,
    pub yellow_cards: u32,
    pub red_cards: u32,
    pub minutes_played: u32,
}

/// Per-player, per-match statistics submission. Trainer submissions are
/// approved on creation; everyone else's start out pending review.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerMatchStats {
    pub id: String,
    pub match_id: String,
    pub player_id: String,
    pub stats: StatLine,
    pub review: ReviewStatus,
    pub submitted_by: String,
    pub submitted_at: DateTime<Utc>,
}

impl PlayerMatchStats {
    pub fn new(
        match_id: String,
        player_id: String,
        stats: StatLine,
        review: ReviewStatus,
        submitted_by: String,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            match_id,
            player_id,
            stats,
            review,
            submitted_by,
            submitted_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum StatsPatch {
    SetReview(ReviewStatus),
    ReplaceStats(StatLine),
}

#[derive(Debug, Clone, Default)]
pub struct StatsFilter {
    pub match_id: Option<String>,
    pub player_id: Option<String>,
}

impl StatsFilter {
    pub fn by_match(match_id: &str) -> Self {
        StatsFilter {
            match_id: Some(match_id.to_string()),
            player_id: None,
        }
    }
}

impl Entity for PlayerMatchStats {
    type Patch = StatsPatch;
    type Filter = StatsFilter;

    fn id(&self) -> &str {
        &self.id
    }

    fn apply(&mut self, patch: StatsPatch) {
        match patch {
            StatsPatch::SetReview(review) => self.review = review,
            StatsPatch::ReplaceStats(stats) => self.stats = stats,
        }
    }

    fn matches(&self, filter: &StatsFilter) -> bool {
        if let Some(ref match_id) = filter.match_id {
            if self.match_id != *match_id {
                return false;
            }
        }
        if let Some(ref player_id) = filter.player_id {
            if self.player_id != *player_id {
                return false;
            }
        }
        true
    }
}
