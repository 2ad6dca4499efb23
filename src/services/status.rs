use std::sync::Arc;

use crate::error::AppError;
use crate::models::commands::{EditMatchStats, ReviewMatchStats, SetPlayerStatus, SubmitMatchStats};
use crate::models::{PlayerMatchStats, ReviewStatus, StatsPatch, Team, User, UserPatch};
use crate::store::DocumentStore;

use super::session::Session;

/// May `actor` change `target`'s availability status on `team`?
///
/// The owning trainer may move any roster player both ways. A player may
/// self-report only when the team policy allows it. Nobody touches another
/// player's status.
pub fn may_set_player_status(actor: &User, target: &User, team: &Team) -> bool {
    if !target.is_on_team(&team.id) {
        return false;
    }
    if team.is_owned_by(&actor.id) {
        return true;
    }
    actor.id == target.id && team.allow_player_injury_reporting
}

/// May `actor` edit the stat line of `record`? The owning trainer always
/// may; everyone else only their own still-pending submission. An approved
/// record is immutable to non-trainers.
pub fn may_edit_stats(actor: &User, team: &Team, record: &PlayerMatchStats) -> bool {
    if team.is_owned_by(&actor.id) {
        return true;
    }
    record.submitted_by == actor.id && record.review == ReviewStatus::Pending
}

/// Only the owning trainer moves a submission through pending → approved or
/// rejected.
pub fn may_review_stats(actor: &User, team: &Team) -> bool {
    team.is_owned_by(&actor.id)
}

/// Enforces the status and approval rule tables at the point of mutation:
/// any call path that bypasses the UI still lands here.
#[derive(Clone)]
pub struct StatusService {
    store: Arc<dyn DocumentStore>,
}

impl StatusService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn set_player_status(
        &self,
        session: &Session,
        input: SetPlayerStatus,
    ) -> Result<User, AppError> {
        let team = self
            .store
            .teams()
            .get(&input.team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("team {}", input.team_id)))?;
        let target = self
            .store
            .users()
            .get(&input.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {}", input.user_id)))?;

        if !target.is_on_team(&team.id) {
            return Err(AppError::validation("userId", "not on this roster"));
        }
        if !may_set_player_status(&session.user, &target, &team) {
            return Err(AppError::not_authorized(
                "not allowed to change this player's status",
            ));
        }

        let updated = self
            .store
            .users()
            .update(&target.id, UserPatch::SetStatus(input.new_status))
            .await?;

        log::info!(
            "Status of {} set to {} by {}",
            target.id,
            input.new_status,
            session.user_id()
        );
        Ok(updated)
    }

    /// Creates a stats submission. Submissions by the owning trainer are
    /// approved immediately; everyone else's await review.
    pub async fn submit_match_stats(
        &self,
        session: &Session,
        input: SubmitMatchStats,
    ) -> Result<PlayerMatchStats, AppError> {
        if input.match_id.trim().is_empty() {
            return Err(AppError::validation("matchId", "must not be empty"));
        }

        let (_, team) = self.roster_context(&input.player_id).await?;
        let is_trainer = team.is_owned_by(session.user_id());
        if !is_trainer && !session.user.is_on_team(&team.id) {
            return Err(AppError::not_authorized(
                "only team members can submit match stats",
            ));
        }

        let review = if is_trainer {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Pending
        };
        let record = PlayerMatchStats::new(
            input.match_id,
            input.player_id,
            input.stats,
            review,
            session.user_id().to_string(),
        );
        self.store.match_stats().set(record.clone()).await?;

        log::info!(
            "Match stats {} submitted by {} ({})",
            record.id,
            session.user_id(),
            record.review
        );
        Ok(record)
    }

    pub async fn review_match_stats(
        &self,
        session: &Session,
        input: ReviewMatchStats,
    ) -> Result<PlayerMatchStats, AppError> {
        let record = self.stats_record(&input.stats_id).await?;
        let (_, team) = self.roster_context(&record.player_id).await?;

        if !may_review_stats(&session.user, &team) {
            return Err(AppError::not_authorized(
                "only the trainer can review submissions",
            ));
        }

        let review = if input.approve {
            ReviewStatus::Approved
        } else {
            ReviewStatus::Rejected
        };
        let updated = self
            .store
            .match_stats()
            .update(&record.id, StatsPatch::SetReview(review))
            .await?;

        log::info!("Match stats {} {}", record.id, review);
        Ok(updated)
    }

    pub async fn edit_match_stats(
        &self,
        session: &Session,
        input: EditMatchStats,
    ) -> Result<PlayerMatchStats, AppError> {
        let record = self.stats_record(&input.stats_id).await?;
        let (_, team) = self.roster_context(&record.player_id).await?;

        if !may_edit_stats(&session.user, &team, &record) {
            return Err(AppError::not_authorized(
                "this submission can no longer be edited",
            ));
        }

        let updated = self
            .store
            .match_stats()
            .update(&record.id, StatsPatch::ReplaceStats(input.stats))
            .await?;
        Ok(updated)
    }

    async fn stats_record(&self, stats_id: &str) -> Result<PlayerMatchStats, AppError> {
        self.store
            .match_stats()
            .get(stats_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("match stats {}", stats_id)))
    }

    /// The player and the team their roster reference points at.
    async fn roster_context(&self, player_id: &str) -> Result<(User, Team), AppError> {
        let player = self
            .store
            .users()
            .get(player_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {}", player_id)))?;
        let team_id = player
            .team_id
            .clone()
            .ok_or_else(|| AppError::validation("playerId", "player is not on a team"))?;
        let team = self
            .store
            .teams()
            .get(&team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("team {}", team_id)))?;
        Ok((player, team))
    }
}
