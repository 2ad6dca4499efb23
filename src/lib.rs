//! squadcore: roster, invitation, and status rules for the SquadLinkr team
//! management app. A library of domain rules invoked by a UI shell: the
//! backing document store, authentication service, and push gateway are
//! collaborators behind the traits in [`store`].

pub mod config;
pub mod error;
pub mod models;
pub mod services;
pub mod store;

pub use config::Config;
pub use error::AppError;
pub use services::{
    FeedService, IdentityService, MembershipService, OrphanCleanup, ReadLedger, Session,
    StatusService,
};

use std::sync::Arc;

use store::{AuthProvider, DocumentStore, PushGateway};

/// Composition root. Everything is constructed and wired here, with no
/// singletons, no ambient session state.
pub struct AppState {
    pub identity: IdentityService,
    pub membership: MembershipService,
    pub status: StatusService,
    pub feed: FeedService,
    pub read_ledger: ReadLedger,
}

impl AppState {
    pub fn new(
        config: Config,
        auth: Arc<dyn AuthProvider>,
        store: Arc<dyn DocumentStore>,
        push: Arc<dyn PushGateway>,
    ) -> Self {
        let membership = MembershipService::new(store.clone(), config.clone());
        let identity = IdentityService::new(
            auth,
            store.clone(),
            push,
            membership.clone(),
            config,
        );
        let status = StatusService::new(store.clone());
        let feed = FeedService::new(store.clone());
        let read_ledger = ReadLedger::new(store);

        Self {
            identity,
            membership,
            status,
            feed,
            read_ledger,
        }
    }
}
