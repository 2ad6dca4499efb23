use std::sync::Arc;

use crate::config::Config;
use crate::error::{AppError, AuthError, StoreError};
use crate::models::User;
use crate::models::commands::RegisterUser;
use crate::store::{AuthProvider, DocumentStore, PushGateway};

use super::membership::MembershipService;
use super::session::Session;
use super::validate_email;

const MIN_PASSWORD_LEN: usize = 6;

/// Outcome of attempting to clean up an existing authentication identity
/// during registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OrphanCleanup {
    /// The identity was a genuine orphan (or already gone) and was removed.
    Cleaned,
    /// The credentials belong to someone else, or to a live account: the
    /// email is definitely in use.
    GenuinelyInUse,
    /// Ownership could not be verified; not necessarily in use.
    Indeterminate,
}

/// Keeps the 1:1 mapping between authentication identities and profile
/// documents, repairing violations as they are observed.
///
/// Identity lifecycle: `NoIdentity` → `IdentityWithoutProfile` (transient;
/// collapsed back to `NoIdentity` here, never user-visible) →
/// `IdentityWithProfile` (stable).
#[derive(Clone)]
pub struct IdentityService {
    auth: Arc<dyn AuthProvider>,
    store: Arc<dyn DocumentStore>,
    push: Arc<dyn PushGateway>,
    membership: MembershipService,
    config: Config,
}

impl IdentityService {
    pub fn new(
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        push: Arc<dyn PushGateway>,
        membership: MembershipService,
        config: Config,
    ) -> Self {
        Self {
            auth,
            store,
            push,
            membership,
            config,
        }
    }

    /// Called whenever the auth collaborator reports an established
    /// identity. An identity with no profile is an orphan: it is deleted and
    /// no session comes back. A profile also consumes any invitation pending
    /// for its email before the session is handed out.
    pub async fn on_identity_established(
        &self,
        identity_id: &str,
    ) -> Result<Option<Session>, AppError> {
        let Some(user) = self.store.users().get(identity_id).await? else {
            log::warn!("Orphaned identity {}, deleting", identity_id);
            if let Err(e) = self.auth.delete_identity(identity_id).await {
                // Repair is best-effort; the next sign-in retries it.
                log::error!("Failed to delete orphaned identity {}: {}", identity_id, e);
            }
            return Ok(None);
        };

        let user = match self.membership.accept_invite(&user).await? {
            Some(updated) => updated,
            None => user,
        };

        Ok(Some(Session::new(user)))
    }

    /// Authenticates and reconciles in one step.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Option<Session>, AppError> {
        let identity_id = self.auth.authenticate(email, password).await?;
        self.on_identity_established(&identity_id).await
    }

    /// Registers a new account: identity first, then the matching profile.
    /// The identity created here never outlives a failed profile write: the
    /// rollback deletes it before the error propagates.
    pub async fn register(&self, input: RegisterUser) -> Result<Session, AppError> {
        if input.name.trim().is_empty() {
            return Err(AppError::validation("name", "must not be empty"));
        }
        validate_email(&input.email)?;
        if input.password.len() < MIN_PASSWORD_LEN {
            return Err(AppError::validation(
                "password",
                format!("must be at least {} characters", MIN_PASSWORD_LEN),
            ));
        }

        let existing = self.auth.list_identities_for(&input.email).await?;
        if !existing.is_empty() {
            match self.cleanup_orphan(&input.email, &input.password).await {
                OrphanCleanup::Cleaned => {}
                OrphanCleanup::GenuinelyInUse => return Err(AppError::EmailInUse),
                OrphanCleanup::Indeterminate => {
                    if self.config.orphan_cleanup_strict {
                        log::warn!(
                            "Indeterminate orphan cleanup for {}, refusing registration",
                            input.email
                        );
                        return Err(AppError::EmailInUse);
                    }
                    log::warn!(
                        "Indeterminate orphan cleanup for {}, proceeding per policy",
                        input.email
                    );
                }
            }
        }

        let identity_id = self
            .auth
            .create_identity(&input.email, &input.password)
            .await?;

        match self.create_profile(&identity_id, &input).await {
            Ok(session) => Ok(session),
            Err(error) => {
                // Never leave an identity without a profile behind.
                if let Err(e) = self.auth.delete_identity(&identity_id).await {
                    log::error!(
                        "Rollback failed, identity {} may be orphaned: {}",
                        identity_id,
                        e
                    );
                }
                Err(error)
            }
        }
    }

    async fn create_profile(
        &self,
        identity_id: &str,
        input: &RegisterUser,
    ) -> Result<Session, AppError> {
        let mut user = User::new(
            identity_id.to_string(),
            input.email.to_lowercase(),
            input.name.trim().to_string(),
            input.user_type,
        );

        // Sign-up-time invitation: the attributes land on the profile before
        // it is ever written. An invite for a since-deleted team is dropped.
        let invite = match self.membership.pending_invite_for(&user.email).await? {
            Some(pending) => {
                if self.store.teams().get(&pending.team_id).await?.is_some() {
                    user.team_id = Some(pending.team_id.clone());
                    user.position = Some(pending.position.clone());
                    user.number = Some(pending.number);
                    Some(pending)
                } else {
                    log::warn!(
                        "Discarding invite {} for missing team {}",
                        pending.id,
                        pending.team_id
                    );
                    self.store.invites().delete(&pending.id).await?;
                    None
                }
            }
            None => None,
        };

        self.store
            .users()
            .set(user.clone())
            .await
            .map_err(|error| match error {
                StoreError::Unavailable(source) => AppError::ProfileCreationFailed(source),
                other => AppError::from(other),
            })?;

        if let Some(invite) = invite {
            self.store.invites().delete(&invite.id).await?;
        }

        log::info!("Registered {} as {}", user.email, user.user_type);
        Ok(Session::new(user))
    }

    /// Attempts to verify whether the existing identity for `email` is a
    /// genuine orphan and, if so, removes it. Never escalates: anything it
    /// cannot verify comes back [`OrphanCleanup::Indeterminate`].
    pub async fn cleanup_orphan(&self, email: &str, password: &str) -> OrphanCleanup {
        match self.auth.authenticate(email, password).await {
            Ok(identity_id) => {
                // Orphan means no profile; a live profile is a real account.
                match self.store.users().get(&identity_id).await {
                    Ok(Some(_)) => OrphanCleanup::GenuinelyInUse,
                    Ok(None) => match self.auth.delete_identity(&identity_id).await {
                        Ok(()) => {
                            log::info!("Deleted orphaned identity for {}", email);
                            OrphanCleanup::Cleaned
                        }
                        Err(e) => {
                            log::error!("Failed to delete orphan for {}: {}", email, e);
                            OrphanCleanup::Indeterminate
                        }
                    },
                    Err(e) => {
                        log::error!("Profile lookup failed during cleanup for {}: {}", email, e);
                        OrphanCleanup::Indeterminate
                    }
                }
            }
            Err(AuthError::WrongPassword) => OrphanCleanup::GenuinelyInUse,
            Err(AuthError::IdentityNotFound) => OrphanCleanup::Cleaned,
            Err(e) => {
                log::warn!("Could not verify identity for {}: {}", email, e);
                OrphanCleanup::Indeterminate
            }
        }
    }

    /// Persists a device push token for the signed-in user.
    pub async fn register_push_token(
        &self,
        session: &Session,
        token: &str,
    ) -> Result<(), AppError> {
        if token.trim().is_empty() {
            return Err(AppError::validation("token", "must not be empty"));
        }
        self.push.register_token(session.user_id(), token).await?;
        Ok(())
    }
}
