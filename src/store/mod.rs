//! Contracts for the external collaborators: the cloud document store, the
//! authentication service, and the push gateway. The crate ships in-memory
//! reference implementations in [`memory`]; a real backend plugs in behind
//! the same traits.

pub mod memory;

use std::pin::Pin;
use std::task::{Context, Poll};

use async_trait::async_trait;
use futures_util::Stream;
use tokio::sync::mpsc;

use crate::error::{AuthError, StoreError};
use crate::models::{Announcement, Invite, Message, PlayerMatchStats, Team, User};

pub use memory::{MemoryAuth, MemoryPush, MemoryStore};

/// A document with a typed patch and query filter. Patches are the closed
/// set of mutations the store accepts for the document; there are no loose
/// partial payloads.
pub trait Entity: Clone + Send + Sync + 'static {
    type Patch: Clone + Send + Sync + 'static;
    type Filter: Clone + Send + Sync + 'static;

    fn id(&self) -> &str;
    fn apply(&mut self, patch: Self::Patch);
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// Change notification delivered on a live subscription. The payload is a
/// full document snapshot and is authoritative over any local optimistic
/// state.
#[derive(Debug, Clone)]
pub enum SnapshotEvent<T> {
    Upserted(T),
    Removed(String),
}

/// Cancellable handle over a live subscription. Events arrive lazily as an
/// infinite stream; dropping the handle (or calling [`unsubscribe`]) detaches
/// it from the collection. Resubscribing replays the current snapshot first.
///
/// [`unsubscribe`]: Subscription::unsubscribe
pub struct Subscription<T> {
    rx: mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub(crate) fn new(rx: mpsc::UnboundedReceiver<T>) -> Self {
        Self { rx }
    }

    /// Next event, or `None` once the collection side is gone.
    pub async fn next_event(&mut self) -> Option<T> {
        self.rx.recv().await
    }

    pub fn unsubscribe(mut self) {
        self.rx.close();
    }
}

impl<T> Stream for Subscription<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.rx.poll_recv(cx)
    }
}

/// One collection of the document store. Single-document atomicity only;
/// concurrent writers resolve last-write-wins.
#[async_trait]
pub trait Collection<T: Entity>: Send + Sync {
    async fn get(&self, id: &str) -> Result<Option<T>, StoreError>;

    /// Create or replace the whole document.
    async fn set(&self, doc: T) -> Result<(), StoreError>;

    /// Apply a typed patch atomically, returning the updated document.
    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, StoreError>;

    async fn delete(&self, id: &str) -> Result<(), StoreError>;

    async fn query(&self, filter: T::Filter) -> Result<Vec<T>, StoreError>;

    /// Live updates for documents matching `filter`, starting with the
    /// current snapshot.
    fn subscribe(&self, filter: T::Filter) -> Subscription<SnapshotEvent<T>>;
}

/// The backing document database, one typed collection per document kind.
pub trait DocumentStore: Send + Sync {
    fn users(&self) -> &dyn Collection<User>;
    fn teams(&self) -> &dyn Collection<Team>;
    fn invites(&self) -> &dyn Collection<Invite>;
    fn announcements(&self) -> &dyn Collection<Announcement>;
    fn messages(&self) -> &dyn Collection<Message>;
    fn match_stats(&self) -> &dyn Collection<PlayerMatchStats>;
}

#[derive(Debug, Clone)]
pub enum IdentityEvent {
    Established(String),
    Cleared(String),
}

/// The authentication service. Identity ids are stable and become profile
/// document ids.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    async fn create_identity(&self, email: &str, password: &str) -> Result<String, AuthError>;

    async fn authenticate(&self, email: &str, password: &str) -> Result<String, AuthError>;

    async fn delete_identity(&self, identity_id: &str) -> Result<(), AuthError>;

    async fn list_identities_for(&self, email: &str) -> Result<Vec<String>, AuthError>;

    fn on_identity_change(&self) -> Subscription<IdentityEvent>;
}

/// Push-notification collaborator: persists a device token per user. The
/// transport itself is out of scope.
#[async_trait]
pub trait PushGateway: Send + Sync {
    async fn register_token(&self, user_id: &str, token: &str) -> Result<(), StoreError>;
}
