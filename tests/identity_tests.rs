mod common;

use pretty_assertions::assert_eq;

use squadcore::models::commands::RegisterUser;
use squadcore::models::{UserFilter, UserType};
use squadcore::store::{AuthProvider, Collection};
use squadcore::{AppError, Config, OrphanCleanup};

use common::{TEST_PASSWORD, TestApp};

fn register_input(email: &str) -> RegisterUser {
    RegisterUser {
        name: "Alex".to_string(),
        email: email.to_string(),
        password: TEST_PASSWORD.to_string(),
        user_type: UserType::Individual,
    }
}

#[tokio::test]
async fn register_creates_profile_before_resolving() {
    let app = TestApp::new();

    let session = app.register("Alex", "alex@example.com", UserType::Individual).await;

    // The profile is readable the moment register resolves.
    let profile = app
        .store
        .users
        .get(session.user_id())
        .await
        .unwrap()
        .expect("profile must exist");
    assert_eq!(profile.email, "alex@example.com");
    assert_eq!(profile.user_type, UserType::Individual);
}

#[tokio::test]
async fn failed_profile_write_rolls_back_the_identity() {
    let app = TestApp::new();
    app.store.users.fail_next_write();

    let result = app.state.identity.register(register_input("alex@example.com")).await;

    assert!(matches!(result, Err(AppError::ProfileCreationFailed(_))));
    // The identity created in this attempt no longer exists.
    let identities = app.auth.list_identities_for("alex@example.com").await.unwrap();
    assert!(identities.is_empty());
}

#[tokio::test]
async fn registering_a_live_account_email_is_rejected() {
    let app = TestApp::new();
    app.register("Alex", "alex@example.com", UserType::Individual).await;

    let result = app.state.identity.register(register_input("alex@example.com")).await;

    assert!(matches!(result, Err(AppError::EmailInUse)));
}

#[tokio::test]
async fn wrong_password_conflict_aborts_without_a_profile() {
    let app = TestApp::new();
    app.auth.seed_identity("a@b.com", "somebody-elses-secret");

    let result = app.state.identity.register(register_input("a@b.com")).await;

    assert!(matches!(result, Err(AppError::EmailInUse)));
    let profiles = app
        .store
        .users
        .query(UserFilter::by_email("a@b.com"))
        .await
        .unwrap();
    assert!(profiles.is_empty());
}

#[tokio::test]
async fn genuine_orphan_is_cleaned_up_during_registration() {
    let app = TestApp::new();
    let orphan_id = app.auth.seed_identity("alex@example.com", TEST_PASSWORD);

    let session = app.register("Alex", "alex@example.com", UserType::Individual).await;

    assert_ne!(session.user_id(), orphan_id);
    let identities = app.auth.list_identities_for("alex@example.com").await.unwrap();
    assert_eq!(identities, vec![session.user_id().to_string()]);
}

#[tokio::test]
async fn indeterminate_cleanup_is_refused_under_strict_policy() {
    let app = TestApp::new();
    assert!(app.config.orphan_cleanup_strict);
    app.auth.seed_identity("alex@example.com", TEST_PASSWORD);
    app.auth.fail_next_authenticate();

    let result = app.state.identity.register(register_input("alex@example.com")).await;

    assert!(matches!(result, Err(AppError::EmailInUse)));
}

#[tokio::test]
async fn cleanup_orphan_reports_each_outcome() {
    let app = TestApp::new();

    // Nothing to clean.
    assert_eq!(
        app.state.identity.cleanup_orphan("nobody@example.com", "pw").await,
        OrphanCleanup::Cleaned
    );

    // Orphan with matching credentials.
    app.auth.seed_identity("orphan@example.com", TEST_PASSWORD);
    assert_eq!(
        app.state
            .identity
            .cleanup_orphan("orphan@example.com", TEST_PASSWORD)
            .await,
        OrphanCleanup::Cleaned
    );

    // Wrong credentials: definitely someone else's.
    app.auth.seed_identity("taken@example.com", "their-password");
    assert_eq!(
        app.state
            .identity
            .cleanup_orphan("taken@example.com", "not-their-password")
            .await,
        OrphanCleanup::GenuinelyInUse
    );

    // Live account, even with the right password.
    app.register("Alex", "live@example.com", UserType::Individual).await;
    assert_eq!(
        app.state
            .identity
            .cleanup_orphan("live@example.com", TEST_PASSWORD)
            .await,
        OrphanCleanup::GenuinelyInUse
    );

    // Opaque auth failure: cannot verify.
    app.auth.seed_identity("maybe@example.com", TEST_PASSWORD);
    app.auth.fail_next_authenticate();
    assert_eq!(
        app.state
            .identity
            .cleanup_orphan("maybe@example.com", TEST_PASSWORD)
            .await,
        OrphanCleanup::Indeterminate
    );
}

#[tokio::test]
async fn permissive_policy_is_configurable() {
    let config = Config {
        orphan_cleanup_strict: false,
        ..Config::default()
    };
    let app = TestApp::with_config(config);
    app.auth.seed_identity("alex@example.com", TEST_PASSWORD);
    app.auth.fail_next_authenticate();

    // Registration proceeds past the indeterminate cleanup, but the auth
    // collaborator still refuses a second identity for the email.
    let result = app.state.identity.register(register_input("alex@example.com")).await;
    assert!(matches!(result, Err(AppError::EmailInUse)));
}

#[tokio::test]
async fn established_identity_without_profile_is_collapsed() {
    let app = TestApp::new();
    let orphan_id = app.auth.seed_identity("ghost@example.com", TEST_PASSWORD);

    let session = app.state.identity.on_identity_established(&orphan_id).await.unwrap();

    assert!(session.is_none());
    let identities = app.auth.list_identities_for("ghost@example.com").await.unwrap();
    assert!(identities.is_empty());
}

#[tokio::test]
async fn sign_in_returns_the_profile_session() {
    let app = TestApp::new();
    app.register("Alex", "alex@example.com", UserType::Individual).await;

    let session = app
        .state
        .identity
        .sign_in("alex@example.com", TEST_PASSWORD)
        .await
        .unwrap()
        .expect("session expected");
    assert_eq!(session.email(), "alex@example.com");

    let denied = app.state.identity.sign_in("alex@example.com", "wrong").await;
    assert!(matches!(denied, Err(AppError::NotAuthorized(_))));
}

#[tokio::test]
async fn register_validates_inputs() {
    let app = TestApp::new();

    assert!(matches!(
        app.state.identity.register(register_input("not-an-email")).await,
        Err(AppError::Validation { field: "email", .. })
    ));

    let mut short_password = register_input("alex@example.com");
    short_password.password = "pw".to_string();
    assert!(matches!(
        app.state.identity.register(short_password).await,
        Err(AppError::Validation { field: "password", .. })
    ));

    let mut blank_name = register_input("alex@example.com");
    blank_name.name = "  ".to_string();
    assert!(matches!(
        app.state.identity.register(blank_name).await,
        Err(AppError::Validation { field: "name", .. })
    ));
}

#[tokio::test]
async fn identity_changes_stream_to_subscribers() {
    let app = TestApp::new();
    let mut changes = app.auth.on_identity_change();

    let session = app.register("Alex", "alex@example.com", UserType::Individual).await;
    match changes.next_event().await.unwrap() {
        squadcore::store::IdentityEvent::Established(id) => assert_eq!(id, session.user_id()),
        other => panic!("unexpected event: {:?}", other),
    }

    // Orphan repair emits the clearing too.
    let orphan_id = app.auth.seed_identity("ghost@example.com", TEST_PASSWORD);
    app.state.identity.on_identity_established(&orphan_id).await.unwrap();
    match changes.next_event().await.unwrap() {
        squadcore::store::IdentityEvent::Cleared(id) => assert_eq!(id, orphan_id),
        other => panic!("unexpected event: {:?}", other),
    }
}

#[tokio::test]
async fn push_token_is_persisted_for_the_user() {
    let app = TestApp::new();
    let session = app.register("Alex", "alex@example.com", UserType::Individual).await;

    app.state
        .identity
        .register_push_token(&session, "expo-token-123")
        .await
        .unwrap();

    assert_eq!(
        app.push.token_for(session.user_id()),
        Some("expo-token-123".to_string())
    );
}
