use std::sync::Arc;

use crate::config::Config;
use crate::error::AppError;
use crate::models::commands::{CreateTeam, InviteMember, RemoveMember};
use crate::models::{
    Invite, InviteFilter, InvitePatch, JoinCode, Team, TeamPatch, User, UserFilter, UserPatch,
    UserType,
};
use crate::store::DocumentStore;

use super::session::Session;
use super::validate_email;

/// Roster lifecycle: invite, join-by-code, join-by-invite, removal. Every
/// mutating operation re-checks trainer ownership against the stored team
/// document before touching anything.
#[derive(Clone)]
pub struct MembershipService {
    store: Arc<dyn DocumentStore>,
    config: Config,
}

impl MembershipService {
    pub fn new(store: Arc<dyn DocumentStore>, config: Config) -> Self {
        Self { store, config }
    }

    pub async fn create_team(&self, session: &Session, input: CreateTeam) -> Result<Team, AppError> {
        if !session.is_trainer() {
            return Err(AppError::not_authorized("only trainers can create teams"));
        }
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "must not be empty"));
        }

        let team = Team::new(
            input.name.trim().to_string(),
            session.user_id().to_string(),
            self.config.default_injury_reporting,
        );
        self.store.teams().set(team.clone()).await?;

        // The trainer belongs to their own roster.
        self.store
            .users()
            .update(
                session.user_id(),
                UserPatch::JoinTeam {
                    team_id: team.id.clone(),
                    position: None,
                    number: None,
                },
            )
            .await?;

        log::info!("Team {} created by trainer {}", team.id, session.user_id());
        Ok(team)
    }

    /// Records (or refreshes) a pending invitation keyed by (team, email).
    /// Re-inviting the same email overwrites prior pending attributes.
    pub async fn invite_member(
        &self,
        session: &Session,
        input: InviteMember,
    ) -> Result<Invite, AppError> {
        let team = self.owned_team(session, &input.team_id).await?;

        validate_email(&input.email)?;
        if input.position.trim().is_empty() {
            return Err(AppError::validation("position", "must not be empty"));
        }
        if !(1..=99).contains(&input.number) {
            return Err(AppError::validation("number", "must be between 1 and 99"));
        }

        let filter = InviteFilter::by_team_and_email(&team.id, &input.email);
        let pending = self.store.invites().query(filter).await?;

        let invite = match pending.into_iter().next() {
            Some(existing) => {
                self.store
                    .invites()
                    .update(
                        &existing.id,
                        InvitePatch::ReplaceAttributes {
                            position: input.position.trim().to_string(),
                            number: input.number,
                        },
                    )
                    .await?
            }
            None => {
                let invite = Invite::new(
                    team.id.clone(),
                    input.email,
                    input.position.trim().to_string(),
                    input.number,
                    session.user_id().to_string(),
                );
                self.store.invites().set(invite.clone()).await?;
                invite
            }
        };

        log::info!("Invite recorded for {} on team {}", invite.email, team.id);
        Ok(invite)
    }

    pub async fn pending_invite_for(&self, email: &str) -> Result<Option<Invite>, AppError> {
        let pending = self
            .store
            .invites()
            .query(InviteFilter::by_email(email))
            .await?;
        Ok(pending.into_iter().next())
    }

    /// Consumes a pending invitation for the user's email, applying its
    /// position/number and team reference to the profile. Invoked implicitly
    /// at sign-up and sign-in. Returns the updated profile when an invite
    /// was applied.
    pub async fn accept_invite(&self, user: &User) -> Result<Option<User>, AppError> {
        let Some(invite) = self.pending_invite_for(&user.email).await? else {
            return Ok(None);
        };

        // Stale invite for a deleted team: discard it instead of joining.
        if self.store.teams().get(&invite.team_id).await?.is_none() {
            log::warn!(
                "Discarding invite {} for missing team {}",
                invite.id,
                invite.team_id
            );
            self.store.invites().delete(&invite.id).await?;
            return Ok(None);
        }

        let updated = self
            .store
            .users()
            .update(
                &user.id,
                UserPatch::JoinTeam {
                    team_id: invite.team_id.clone(),
                    position: Some(invite.position.clone()),
                    number: Some(invite.number),
                },
            )
            .await?;
        self.store.invites().delete(&invite.id).await?;

        log::info!("User {} joined team {} via invite", user.id, invite.team_id);
        Ok(Some(updated))
    }

    /// First phase of a QR join: decode only, nothing is mutated. The caller
    /// shows the decoded team to the user and commits with [`confirm_join`];
    /// ambient QR codes must not join anyone silently.
    ///
    /// [`confirm_join`]: MembershipService::confirm_join
    pub fn decode_join_code(&self, code: &str) -> Result<JoinCode, AppError> {
        JoinCode::decode(code)
    }

    /// Second phase: the user confirmed, commit the join.
    pub async fn confirm_join(&self, session: &Session, code: &JoinCode) -> Result<User, AppError> {
        if self.store.teams().get(&code.team_id).await?.is_none() {
            return Err(AppError::not_found(format!("team {}", code.team_id)));
        }

        let updated = self
            .store
            .users()
            .update(
                session.user_id(),
                UserPatch::JoinTeam {
                    team_id: code.team_id.clone(),
                    position: None,
                    number: None,
                },
            )
            .await?;

        log::info!("User {} joined team {} by code", session.user_id(), code.team_id);
        Ok(updated)
    }

    /// Clears the member's team reference, position, and number. Trainer
    /// only, and only against players; staff and the trainer cannot be
    /// removed through this path.
    pub async fn remove_member(
        &self,
        session: &Session,
        input: RemoveMember,
    ) -> Result<(), AppError> {
        let team = self.owned_team(session, &input.team_id).await?;

        let target = self
            .store
            .users()
            .get(&input.user_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("user {}", input.user_id)))?;

        if target.user_type != UserType::TeamMember {
            return Err(AppError::not_authorized(
                "only players can be removed from the roster",
            ));
        }
        if !target.is_on_team(&team.id) {
            return Err(AppError::validation("userId", "not on this roster"));
        }

        self.store
            .users()
            .update(&target.id, UserPatch::LeaveTeam)
            .await?;

        log::info!("User {} removed from team {}", target.id, team.id);
        Ok(())
    }

    /// Deletes a team, cascade-clearing every member's team reference first.
    /// Clears are per-document writes; if one fails the team record is left
    /// intact and the whole operation can be re-run.
    pub async fn delete_team(&self, session: &Session, team_id: &str) -> Result<(), AppError> {
        let team = self.owned_team(session, team_id).await?;

        let members = self
            .store
            .users()
            .query(UserFilter::by_team(&team.id))
            .await?;
        for member in &members {
            self.store
                .users()
                .update(&member.id, UserPatch::LeaveTeam)
                .await?;
        }

        self.store.teams().delete(&team.id).await?;
        log::info!("Team {} deleted ({} members cleared)", team.id, members.len());
        Ok(())
    }

    /// The roster: users whose team reference points at this team.
    pub async fn get_team_members(&self, team_id: &str) -> Result<Vec<User>, AppError> {
        Ok(self
            .store
            .users()
            .query(UserFilter::by_team(team_id))
            .await?)
    }

    pub async fn set_injury_reporting_policy(
        &self,
        session: &Session,
        team_id: &str,
        allowed: bool,
    ) -> Result<Team, AppError> {
        let team = self.owned_team(session, team_id).await?;
        let updated = self
            .store
            .teams()
            .update(&team.id, TeamPatch::SetInjuryReporting(allowed))
            .await?;
        log::info!(
            "Team {} injury self-reporting set to {}",
            team.id,
            allowed
        );
        Ok(updated)
    }

    /// QR payload for joining this team. Trainer only.
    pub async fn join_code_for(&self, session: &Session, team_id: &str) -> Result<String, AppError> {
        let team = self.owned_team(session, team_id).await?;
        Ok(JoinCode {
            team_id: team.id,
            team_name: team.name,
        }
        .encode())
    }

    /// Loads the team and verifies the acting user is its owning trainer.
    async fn owned_team(&self, session: &Session, team_id: &str) -> Result<Team, AppError> {
        let team = self
            .store
            .teams()
            .get(team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("team {}", team_id)))?;
        if !team.is_owned_by(session.user_id()) {
            return Err(AppError::not_authorized(
                "only the owning trainer can manage this team",
            ));
        }
        Ok(team)
    }
}
