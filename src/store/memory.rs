//! In-memory reference implementations of the collaborator contracts. Used
//! by the test suite and by embedders running without a cloud backend. The
//! semantics mirror the real thing: per-document atomicity, last-write-wins,
//! subscriptions that replay the current snapshot before going live.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

use anyhow::anyhow;
use async_trait::async_trait;
use bcrypt::{hash, verify};
use tokio::sync::mpsc;

use crate::error::{AuthError, StoreError};
use crate::models::{Announcement, Invite, Message, PlayerMatchStats, Team, User};

use super::{
    AuthProvider, Collection, DocumentStore, Entity, IdentityEvent, PushGateway, SnapshotEvent,
    Subscription,
};

// Fixture hashing only; production credentials live in the real auth service.
const MEMORY_BCRYPT_COST: u32 = 4;

pub struct MemoryCollection<T: Entity> {
    docs: Mutex<HashMap<String, T>>,
    watchers: Mutex<Vec<(T::Filter, mpsc::UnboundedSender<SnapshotEvent<T>>)>>,
    fail_next_write: AtomicBool,
}

impl<T: Entity> Default for MemoryCollection<T> {
    fn default() -> Self {
        Self {
            docs: Mutex::new(HashMap::new()),
            watchers: Mutex::new(Vec::new()),
            fail_next_write: AtomicBool::new(false),
        }
    }
}

impl<T: Entity> MemoryCollection<T> {
    /// Make the next `set`/`update` fail with `StoreError::Unavailable`.
    /// Lets tests exercise rollback paths.
    pub fn fail_next_write(&self) {
        self.fail_next_write.store(true, Ordering::SeqCst);
    }

    fn take_injected_failure(&self) -> Option<StoreError> {
        if self.fail_next_write.swap(false, Ordering::SeqCst) {
            Some(StoreError::Unavailable(anyhow!("injected write failure")))
        } else {
            None
        }
    }

    fn publish(&self, source: &T, event: SnapshotEvent<T>) {
        let mut watchers = self.watchers.lock().unwrap();
        watchers.retain(|(filter, tx)| {
            if !source.matches(filter) {
                return !tx.is_closed();
            }
            tx.send(event.clone()).is_ok()
        });
    }
}

#[async_trait]
impl<T: Entity> Collection<T> for MemoryCollection<T> {
    async fn get(&self, id: &str) -> Result<Option<T>, StoreError> {
        Ok(self.docs.lock().unwrap().get(id).cloned())
    }

    async fn set(&self, doc: T) -> Result<(), StoreError> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        self.docs
            .lock()
            .unwrap()
            .insert(doc.id().to_string(), doc.clone());
        self.publish(&doc, SnapshotEvent::Upserted(doc.clone()));
        Ok(())
    }

    async fn update(&self, id: &str, patch: T::Patch) -> Result<T, StoreError> {
        if let Some(err) = self.take_injected_failure() {
            return Err(err);
        }
        let updated = {
            let mut docs = self.docs.lock().unwrap();
            let doc = docs
                .get_mut(id)
                .ok_or_else(|| StoreError::NotFound(id.to_string()))?;
            doc.apply(patch);
            doc.clone()
        };
        self.publish(&updated, SnapshotEvent::Upserted(updated.clone()));
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), StoreError> {
        let removed = self.docs.lock().unwrap().remove(id);
        if let Some(doc) = removed {
            self.publish(&doc, SnapshotEvent::Removed(id.to_string()));
        }
        Ok(())
    }

    async fn query(&self, filter: T::Filter) -> Result<Vec<T>, StoreError> {
        Ok(self
            .docs
            .lock()
            .unwrap()
            .values()
            .filter(|doc| doc.matches(&filter))
            .cloned()
            .collect())
    }

    fn subscribe(&self, filter: T::Filter) -> Subscription<SnapshotEvent<T>> {
        let (tx, rx) = mpsc::unbounded_channel();
        // Current snapshot first, then live events.
        for doc in self.docs.lock().unwrap().values() {
            if doc.matches(&filter) {
                let _ = tx.send(SnapshotEvent::Upserted(doc.clone()));
            }
        }
        self.watchers.lock().unwrap().push((filter, tx));
        Subscription::new(rx)
    }
}

#[derive(Default)]
pub struct MemoryStore {
    pub users: MemoryCollection<User>,
    pub teams: MemoryCollection<Team>,
    pub invites: MemoryCollection<Invite>,
    pub announcements: MemoryCollection<Announcement>,
    pub messages: MemoryCollection<Message>,
    pub match_stats: MemoryCollection<PlayerMatchStats>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DocumentStore for MemoryStore {
    fn users(&self) -> &dyn Collection<User> {
        &self.users
    }

    fn teams(&self) -> &dyn Collection<Team> {
        &self.teams
    }

    fn invites(&self) -> &dyn Collection<Invite> {
        &self.invites
    }

    fn announcements(&self) -> &dyn Collection<Announcement> {
        &self.announcements
    }

    fn messages(&self) -> &dyn Collection<Message> {
        &self.messages
    }

    fn match_stats(&self) -> &dyn Collection<PlayerMatchStats> {
        &self.match_stats
    }
}

struct Credential {
    identity_id: String,
    password_hash: String,
}

#[derive(Default)]
pub struct MemoryAuth {
    // keyed by lowercased email; at most one identity per email
    identities: Mutex<HashMap<String, Credential>>,
    watchers: Mutex<Vec<mpsc::UnboundedSender<IdentityEvent>>>,
    fail_next_authenticate: AtomicBool,
}

impl MemoryAuth {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `authenticate` fail opaquely (neither wrong-password
    /// nor not-found). Exercises the indeterminate orphan-cleanup branch.
    pub fn fail_next_authenticate(&self) {
        self.fail_next_authenticate.store(true, Ordering::SeqCst);
    }

    /// Seed an identity without going through registration. Returns the
    /// identity id; no profile is created, so the identity is an orphan
    /// until one is.
    pub fn seed_identity(&self, email: &str, password: &str) -> String {
        let identity_id = uuid::Uuid::new_v4().to_string();
        let password_hash = hash(password, MEMORY_BCRYPT_COST).expect("bcrypt hash");
        self.identities.lock().unwrap().insert(
            email.to_lowercase(),
            Credential {
                identity_id: identity_id.clone(),
                password_hash,
            },
        );
        identity_id
    }

    fn emit(&self, event: IdentityEvent) {
        let mut watchers = self.watchers.lock().unwrap();
        watchers.retain(|tx| tx.send(event.clone()).is_ok());
    }
}

#[async_trait]
impl AuthProvider for MemoryAuth {
    async fn create_identity(&self, email: &str, password: &str) -> Result<String, AuthError> {
        let key = email.to_lowercase();
        let mut identities = self.identities.lock().unwrap();
        if identities.contains_key(&key) {
            return Err(AuthError::EmailTaken);
        }
        let identity_id = uuid::Uuid::new_v4().to_string();
        let password_hash =
            hash(password, MEMORY_BCRYPT_COST).map_err(|e| AuthError::Other(anyhow!(e)))?;
        identities.insert(
            key,
            Credential {
                identity_id: identity_id.clone(),
                password_hash,
            },
        );
        drop(identities);
        self.emit(IdentityEvent::Established(identity_id.clone()));
        Ok(identity_id)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<String, AuthError> {
        if self.fail_next_authenticate.swap(false, Ordering::SeqCst) {
            return Err(AuthError::Other(anyhow!("injected auth outage")));
        }
        let identities = self.identities.lock().unwrap();
        let credential = identities
            .get(&email.to_lowercase())
            .ok_or(AuthError::IdentityNotFound)?;
        let ok = verify(password, &credential.password_hash)
            .map_err(|e| AuthError::Other(anyhow!(e)))?;
        if !ok {
            return Err(AuthError::WrongPassword);
        }
        Ok(credential.identity_id.clone())
    }

    async fn delete_identity(&self, identity_id: &str) -> Result<(), AuthError> {
        let mut identities = self.identities.lock().unwrap();
        let before = identities.len();
        identities.retain(|_, credential| credential.identity_id != identity_id);
        let removed = identities.len() < before;
        drop(identities);
        if removed {
            self.emit(IdentityEvent::Cleared(identity_id.to_string()));
        }
        Ok(())
    }

    async fn list_identities_for(&self, email: &str) -> Result<Vec<String>, AuthError> {
        let identities = self.identities.lock().unwrap();
        Ok(identities
            .get(&email.to_lowercase())
            .map(|credential| vec![credential.identity_id.clone()])
            .unwrap_or_default())
    }

    fn on_identity_change(&self) -> Subscription<IdentityEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.watchers.lock().unwrap().push(tx);
        Subscription::new(rx)
    }
}

/// Token sink; the transport is someone else's problem.
#[derive(Default)]
pub struct MemoryPush {
    tokens: Mutex<HashMap<String, String>>,
}

impl MemoryPush {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn token_for(&self, user_id: &str) -> Option<String> {
        self.tokens.lock().unwrap().get(user_id).cloned()
    }
}

#[async_trait]
impl PushGateway for MemoryPush {
    async fn register_token(&self, user_id: &str, token: &str) -> Result<(), StoreError> {
        self.tokens
            .lock()
            .unwrap()
            .insert(user_id.to_string(), token.to_string());
        Ok(())
    }
}
