use std::sync::Arc;

use crate::error::AppError;
use crate::models::commands::{PostAnnouncement, PostMessage};
use crate::models::{
    Announcement, AnnouncementFilter, Message, MessageFilter, MessageKind, MessagePatch,
};
use crate::store::{DocumentStore, SnapshotEvent, Subscription};

use super::session::Session;

/// Team feed: announcements (trainer-authored) and chat messages
/// (sender-owned). Authorship rules are enforced here, not in the UI.
#[derive(Clone)]
pub struct FeedService {
    store: Arc<dyn DocumentStore>,
}

impl FeedService {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn post_announcement(
        &self,
        session: &Session,
        input: PostAnnouncement,
    ) -> Result<Announcement, AppError> {
        let team = self
            .store
            .teams()
            .get(&input.team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("team {}", input.team_id)))?;
        if !team.is_owned_by(session.user_id()) {
            return Err(AppError::not_authorized(
                "only the trainer can post announcements",
            ));
        }
        if input.title.trim().is_empty() {
            return Err(AppError::validation("title", "must not be empty"));
        }

        let announcement = Announcement::new(
            team.id,
            input.title.trim().to_string(),
            input.message,
            input.priority,
            session.user_id().to_string(),
        );
        self.store
            .announcements()
            .set(announcement.clone())
            .await?;
        Ok(announcement)
    }

    pub async fn delete_announcement(
        &self,
        session: &Session,
        announcement_id: &str,
    ) -> Result<(), AppError> {
        let announcement = self
            .store
            .announcements()
            .get(announcement_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("announcement {}", announcement_id)))?;
        let team = self
            .store
            .teams()
            .get(&announcement.team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("team {}", announcement.team_id)))?;
        if !team.is_owned_by(session.user_id()) {
            return Err(AppError::not_authorized(
                "only the trainer can delete announcements",
            ));
        }
        self.store.announcements().delete(announcement_id).await?;
        Ok(())
    }

    pub async fn post_message(
        &self,
        session: &Session,
        input: PostMessage,
    ) -> Result<Message, AppError> {
        let team = self
            .store
            .teams()
            .get(&input.team_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("team {}", input.team_id)))?;
        if !session.user.is_on_team(&team.id) && !team.is_owned_by(session.user_id()) {
            return Err(AppError::not_authorized(
                "only roster members can post to the team chat",
            ));
        }
        if input.text.trim().is_empty() {
            return Err(AppError::validation("text", "must not be empty"));
        }

        let message = Message::new(
            team.id,
            input.text,
            session.user_id().to_string(),
            MessageKind::Message,
        );
        self.store.messages().set(message.clone()).await?;
        Ok(message)
    }

    /// Sender only; marks the message as edited.
    pub async fn edit_message(
        &self,
        session: &Session,
        message_id: &str,
        text: &str,
    ) -> Result<Message, AppError> {
        let message = self.message(message_id).await?;
        if message.user_id != session.user_id() {
            return Err(AppError::not_authorized(
                "only the sender can edit a message",
            ));
        }
        if text.trim().is_empty() {
            return Err(AppError::validation("text", "must not be empty"));
        }
        Ok(self
            .store
            .messages()
            .update(message_id, MessagePatch::EditText(text.to_string()))
            .await?)
    }

    pub async fn delete_message(&self, session: &Session, message_id: &str) -> Result<(), AppError> {
        let message = self.message(message_id).await?;
        if message.user_id != session.user_id() {
            return Err(AppError::not_authorized(
                "only the sender can delete a message",
            ));
        }
        self.store.messages().delete(message_id).await?;
        Ok(())
    }

    /// Live announcement updates for a team. The snapshot events are
    /// authoritative over any local optimistic state; the handle unsubscribes
    /// on drop.
    pub fn subscribe_announcements(
        &self,
        team_id: &str,
    ) -> Subscription<SnapshotEvent<Announcement>> {
        self.store
            .announcements()
            .subscribe(AnnouncementFilter::by_team(team_id))
    }

    /// Live chat updates for a team.
    pub fn subscribe_messages(&self, team_id: &str) -> Subscription<SnapshotEvent<Message>> {
        self.store
            .messages()
            .subscribe(MessageFilter::by_team(team_id))
    }

    async fn message(&self, message_id: &str) -> Result<Message, AppError> {
        self.store
            .messages()
            .get(message_id)
            .await?
            .ok_or_else(|| AppError::not_found(format!("message {}", message_id)))
    }
}
