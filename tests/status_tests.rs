mod common;

use pretty_assertions::assert_eq;

use squadcore::AppError;
use squadcore::models::commands::{
    EditMatchStats, ReviewMatchStats, SetPlayerStatus, SubmitMatchStats,
};
use squadcore::models::{PlayerStatus, ReviewStatus, StatLine, UserType};

use common::TestApp;

fn set_status(team_id: &str, user_id: &str, new_status: PlayerStatus) -> SetPlayerStatus {
    SetPlayerStatus {
        team_id: team_id.to_string(),
        user_id: user_id.to_string(),
        new_status,
    }
}

fn stat_line(goals: u32) -> StatLine {
    StatLine {
        goals,
        assists: 1,
        yellow_cards: 0,
        red_cards: 0,
        minutes_played: 90,
    }
}

#[tokio::test]
async fn policy_false_blocks_self_reports_but_not_the_trainer() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    let player = app.add_player(&trainer, &team, "p@example.com").await;
    assert!(!team.allow_player_injury_reporting);

    // Player self-reports injured: denied by policy.
    let denied = app
        .state
        .status
        .set_player_status(
            &player,
            set_status(&team.id, player.user_id(), PlayerStatus::Injured),
        )
        .await;
    assert!(matches!(denied, Err(AppError::NotAuthorized(_))));

    // The trainer sets the same transition: allowed.
    let updated = app
        .state
        .status
        .set_player_status(
            &trainer,
            set_status(&team.id, player.user_id(), PlayerStatus::Injured),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, PlayerStatus::Injured);

    // Now injured, the player tries to come back: still denied.
    let player = app.refresh(player).await;
    let denied = app
        .state
        .status
        .set_player_status(
            &player,
            set_status(&team.id, player.user_id(), PlayerStatus::Active),
        )
        .await;
    assert!(matches!(denied, Err(AppError::NotAuthorized(_))));

    // Trainer brings them back.
    let updated = app
        .state
        .status
        .set_player_status(
            &trainer,
            set_status(&team.id, player.user_id(), PlayerStatus::Active),
        )
        .await
        .unwrap();
    assert_eq!(updated.status, PlayerStatus::Active);
}

#[tokio::test]
async fn policy_true_allows_self_reports_both_ways() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    app.state
        .membership
        .set_injury_reporting_policy(&trainer, &team.id, true)
        .await
        .unwrap();
    let player = app.add_player(&trainer, &team, "p@example.com").await;

    let injured = app
        .state
        .status
        .set_player_status(
            &player,
            set_status(&team.id, player.user_id(), PlayerStatus::Injured),
        )
        .await
        .unwrap();
    assert_eq!(injured.status, PlayerStatus::Injured);

    let player = app.refresh(player).await;
    let active = app
        .state
        .status
        .set_player_status(
            &player,
            set_status(&team.id, player.user_id(), PlayerStatus::Active),
        )
        .await
        .unwrap();
    assert_eq!(active.status, PlayerStatus::Active);
}

#[tokio::test]
async fn players_never_change_another_players_status() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    app.state
        .membership
        .set_injury_reporting_policy(&trainer, &team.id, true)
        .await
        .unwrap();
    let p1 = app.add_player(&trainer, &team, "p1@example.com").await;
    let p2 = app.add_player(&trainer, &team, "p2@example.com").await;

    // Policy allows self-reports, but never cross-player changes.
    let result = app
        .state
        .status
        .set_player_status(
            &p1,
            set_status(&team.id, p2.user_id(), PlayerStatus::Injured),
        )
        .await;

    assert!(matches!(result, Err(AppError::NotAuthorized(_))));
    let profile = app.refresh(p2).await;
    assert_eq!(profile.user.status, PlayerStatus::Active);
}

#[tokio::test]
async fn off_roster_targets_are_rejected_before_any_write() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    let outsider = app.register("Out", "out@example.com", UserType::TeamMember).await;

    let result = app
        .state
        .status
        .set_player_status(
            &trainer,
            set_status(&team.id, outsider.user_id(), PlayerStatus::Injured),
        )
        .await;

    assert!(matches!(
        result,
        Err(AppError::Validation { field: "userId", .. })
    ));
}

#[tokio::test]
async fn player_submissions_start_pending_and_trainer_ones_approved() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    let player = app.add_player(&trainer, &team, "p@example.com").await;

    let pending = app
        .state
        .status
        .submit_match_stats(
            &player,
            SubmitMatchStats {
                match_id: "match-1".to_string(),
                player_id: player.user_id().to_string(),
                stats: stat_line(1),
            },
        )
        .await
        .unwrap();
    assert_eq!(pending.review, ReviewStatus::Pending);

    let approved = app
        .state
        .status
        .submit_match_stats(
            &trainer,
            SubmitMatchStats {
                match_id: "match-1".to_string(),
                player_id: player.user_id().to_string(),
                stats: stat_line(2),
            },
        )
        .await
        .unwrap();
    assert_eq!(approved.review, ReviewStatus::Approved);
}

#[tokio::test]
async fn only_the_trainer_reviews_submissions() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    let player = app.add_player(&trainer, &team, "p@example.com").await;

    let record = app
        .state
        .status
        .submit_match_stats(
            &player,
            SubmitMatchStats {
                match_id: "match-1".to_string(),
                player_id: player.user_id().to_string(),
                stats: stat_line(1),
            },
        )
        .await
        .unwrap();

    let denied = app
        .state
        .status
        .review_match_stats(
            &player,
            ReviewMatchStats {
                stats_id: record.id.clone(),
                approve: true,
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::NotAuthorized(_))));

    let reviewed = app
        .state
        .status
        .review_match_stats(
            &trainer,
            ReviewMatchStats {
                stats_id: record.id.clone(),
                approve: false,
            },
        )
        .await
        .unwrap();
    assert_eq!(reviewed.review, ReviewStatus::Rejected);
}

#[tokio::test]
async fn approved_records_are_immutable_to_non_trainers() {
    let app = TestApp::new();
    let (trainer, team) = app.trainer_with_team("coach@example.com", "Z FC").await;
    let player = app.add_player(&trainer, &team, "p@example.com").await;

    let record = app
        .state
        .status
        .submit_match_stats(
            &player,
            SubmitMatchStats {
                match_id: "match-1".to_string(),
                player_id: player.user_id().to_string(),
                stats: stat_line(1),
            },
        )
        .await
        .unwrap();

    // Own pending submission: editable.
    app.state
        .status
        .edit_match_stats(
            &player,
            EditMatchStats {
                stats_id: record.id.clone(),
                stats: stat_line(2),
            },
        )
        .await
        .unwrap();

    app.state
        .status
        .review_match_stats(
            &trainer,
            ReviewMatchStats {
                stats_id: record.id.clone(),
                approve: true,
            },
        )
        .await
        .unwrap();

    // Approved: frozen for the submitter, still editable for the trainer.
    let denied = app
        .state
        .status
        .edit_match_stats(
            &player,
            EditMatchStats {
                stats_id: record.id.clone(),
                stats: stat_line(3),
            },
        )
        .await;
    assert!(matches!(denied, Err(AppError::NotAuthorized(_))));

    let edited = app
        .state
        .status
        .edit_match_stats(
            &trainer,
            EditMatchStats {
                stats_id: record.id.clone(),
                stats: stat_line(3),
            },
        )
        .await
        .unwrap();
    assert_eq!(edited.stats.goals, 3);
}
