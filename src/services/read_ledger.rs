use std::sync::Arc;

use crate::error::{AppError, StoreError};
use crate::models::{AnnouncementPatch, MessagePatch, Readable};
use crate::store::DocumentStore;

/// Per-user read state for announcements and chat messages. Marking is
/// fire-and-forget relative to display: the patch is a set insert, so a
/// failed persist is simply re-marked on the next view.
#[derive(Clone)]
pub struct ReadLedger {
    store: Arc<dyn DocumentStore>,
}

impl ReadLedger {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    pub async fn mark_announcement_read(
        &self,
        announcement_id: &str,
        user_id: &str,
    ) -> Result<(), AppError> {
        let result = self
            .store
            .announcements()
            .update(
                announcement_id,
                AnnouncementPatch::MarkRead(user_id.to_string()),
            )
            .await;
        Self::absorb_missing(result.map(|_| ()), announcement_id)
    }

    pub async fn mark_message_read(&self, message_id: &str, user_id: &str) -> Result<(), AppError> {
        let result = self
            .store
            .messages()
            .update(message_id, MessagePatch::MarkRead(user_id.to_string()))
            .await;
        Self::absorb_missing(result.map(|_| ()), message_id)
    }

    pub fn is_unread<T: Readable>(&self, item: &T, user_id: &str) -> bool {
        !item.read_by().contains(user_id)
    }

    /// An item deleted while the mark was in flight is not an error; the
    /// subscription snapshot that removed it is authoritative.
    fn absorb_missing(result: Result<(), StoreError>, item_id: &str) -> Result<(), AppError> {
        match result {
            Ok(()) => Ok(()),
            Err(StoreError::NotFound(_)) => {
                log::debug!("Skipped read mark, item {} is gone", item_id);
                Ok(())
            }
            Err(other) => Err(other.into()),
        }
    }
}
