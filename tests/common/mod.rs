#![allow(dead_code)]

use std::sync::Arc;

use squadcore::models::commands::{CreateTeam, InviteMember, RegisterUser};
use squadcore::models::{Team, UserType};
use squadcore::store::{
    AuthProvider, Collection, DocumentStore, MemoryAuth, MemoryPush, MemoryStore, PushGateway,
};
use squadcore::{AppState, Config, Session};

pub const TEST_PASSWORD: &str = "password1";

/// Everything a test needs: the wired services plus direct handles on the
/// in-memory collaborators for seeding and failure injection.
pub struct TestApp {
    pub auth: Arc<MemoryAuth>,
    pub store: Arc<MemoryStore>,
    pub push: Arc<MemoryPush>,
    pub state: AppState,
    pub config: Config,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    pub fn with_config(config: Config) -> Self {
        let _ = env_logger::builder().is_test(true).try_init();

        let auth = Arc::new(MemoryAuth::new());
        let store = Arc::new(MemoryStore::new());
        let push = Arc::new(MemoryPush::new());
        let state = AppState::new(
            config.clone(),
            auth.clone() as Arc<dyn AuthProvider>,
            store.clone() as Arc<dyn DocumentStore>,
            push.clone() as Arc<dyn PushGateway>,
        );

        TestApp {
            auth,
            store,
            push,
            state,
            config,
        }
    }

    pub async fn register(&self, name: &str, email: &str, user_type: UserType) -> Session {
        self.state
            .identity
            .register(RegisterUser {
                name: name.to_string(),
                email: email.to_string(),
                password: TEST_PASSWORD.to_string(),
                user_type,
            })
            .await
            .expect("registration should succeed")
    }

    /// Registers a trainer and creates their team in one go.
    pub async fn trainer_with_team(&self, email: &str, team_name: &str) -> (Session, Team) {
        let session = self.register("Coach", email, UserType::Trainer).await;
        let team = self
            .state
            .membership
            .create_team(
                &session,
                CreateTeam {
                    name: team_name.to_string(),
                },
            )
            .await
            .expect("team creation should succeed");
        // The trainer's own profile gained a team reference.
        let session = self.refresh(session).await;
        (session, team)
    }

    /// Invites `email` onto the team and registers the player, so the invite
    /// is consumed at sign-up.
    pub async fn add_player(&self, trainer: &Session, team: &Team, email: &str) -> Session {
        self.state
            .membership
            .invite_member(
                trainer,
                InviteMember {
                    team_id: team.id.clone(),
                    email: email.to_string(),
                    position: "midfield".to_string(),
                    number: 8,
                },
            )
            .await
            .expect("invite should succeed");
        self.register("Player", email, UserType::TeamMember).await
    }

    /// Re-reads the session's profile from the store.
    pub async fn refresh(&self, session: Session) -> Session {
        let user = self
            .store
            .users
            .get(session.user_id())
            .await
            .expect("store should be reachable")
            .expect("profile should exist");
        session.with_user(user)
    }
}
