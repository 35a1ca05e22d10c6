//! Setup flow E2E tests.
//!
//! A table goes from lobby to awaiting game start, checking the rules that
//! only show up when the phases are chained together.

use std::sync::Arc;

use talewright_domain::{SessionStatus, SetupPhase, SkillType};

use super::*;
use crate::test_fixtures::{gm, pid};
use crate::use_cases::SessionError;

// =============================================================================
// Full setup
// =============================================================================

#[tokio::test]
async fn test_five_players_reach_awaiting_start_with_late_ranks_holding_tokens() {
    let engine = engine();
    let app = &engine.app;
    let players = ["ana", "bo", "cy", "dee", "eve"];
    let id = started(app, &players).await;

    // Ties resolve by who rolled first: cy before dee
    let session = roll_for_order(
        app,
        id,
        &[("ana", 6), ("bo", 10), ("cy", 8), ("dee", 8), ("eve", 3)],
    )
    .await;
    let setup = session.setup().unwrap();
    assert_eq!(
        setup.definition_order,
        vec![pid("bo"), pid("cy"), pid("dee"), pid("ana"), pid("eve")]
    );
    assert_eq!(setup.interference_token_grants.get(&pid("ana")), Some(&1));
    assert_eq!(setup.interference_token_grants.get(&pid("eve")), Some(&1));
    assert!(!setup.interference_token_grants.contains_key(&pid("bo")));

    let session = build_world(app, id).await;
    let setup = session.setup().unwrap();
    assert_eq!(setup.world_definition.genre.as_ref().unwrap().author, pid("bo"));
    assert_eq!(setup.world_definition.adjective.as_ref().unwrap().author, pid("cy"));
    assert_eq!(setup.world_definition.location.as_ref().unwrap().author, pid("dee"));
    assert_eq!(setup.world_truths.len(), 5);
    assert_eq!(setup.current_phase, SetupPhase::DefiningCharacterConcepts);

    write_concepts(app, id, &players).await;
    let session = roll_for_skills(
        app,
        id,
        &[("ana", 12), ("bo", 2), ("cy", 9), ("dee", 5), ("eve", 7)],
    )
    .await;
    let setup = session.setup().unwrap();
    let quotas: Vec<u32> = setup
        .skill_order
        .iter()
        .map(|p| setup.skills_per_player_allocation[p].total_to_define)
        .collect();
    assert_eq!(quotas, vec![3, 3, 2, 2, 2]);
    assert_eq!(quotas.iter().sum::<u32>(), 12);

    let session = define_skills(app, id).await;
    let setup = session.setup().unwrap();
    assert_eq!(setup.current_phase, SetupPhase::AssigningSkillModifiers);
    let gm_skills = setup
        .defined_skills
        .iter()
        .filter(|s| s.skill_type == SkillType::Gm)
        .count();
    assert_eq!((setup.defined_skills.len(), gm_skills), (16, 4));

    let session = assign_modifiers(app, id, &players).await;
    assert_eq!(session.setup().unwrap().current_phase, SetupPhase::AwaitingGameStart);
    assert_eq!(session.status(), SessionStatus::InProgress);
    assert!(session.gameplay().is_none());
}

#[tokio::test]
async fn test_single_player_defines_every_world_slot() {
    let engine = engine();
    let app = &engine.app;
    let id = started(app, &["solo"]).await;

    roll_for_order(app, id, &[("solo", 7)]).await;
    let session = build_world(app, id).await;

    let setup = session.setup().unwrap();
    let world = &setup.world_definition;
    for entry in [&world.genre, &world.adjective, &world.location] {
        assert_eq!(entry.as_ref().unwrap().author, pid("solo"));
    }
    assert_eq!(setup.world_truths.len(), 1);
}

// =============================================================================
// Counts captured at setup start
// =============================================================================

#[tokio::test]
async fn test_player_leaving_mid_setup_does_not_change_roll_target() {
    let engine = engine();
    let app = &engine.app;
    let id = started(app, &["ana", "bo", "cy"]).await;

    app.use_cases
        .lobby
        .leave_session
        .execute(id, pid("cy"))
        .await
        .unwrap();
    let session = roll_for_order(app, id, &[("ana", 9), ("bo", 4)]).await;

    let setup = session.setup().unwrap();
    assert_eq!(setup.num_players_at_setup_start, 3);
    assert_eq!(setup.current_phase, SetupPhase::Rolling);
}

#[tokio::test]
async fn test_start_with_empty_lobby_is_incomplete() {
    let engine = engine();
    let app = &engine.app;
    let session = app
        .use_cases
        .lobby
        .create_session
        .execute(crate::test_fixtures::profile("gm"), "Empty room")
        .await
        .unwrap();

    let result = app.use_cases.lobby.start_game.execute(session.id(), gm()).await;

    assert!(matches!(
        result.unwrap_err().domain(),
        Some(talewright_domain::DomainError::IncompleteSelection(_))
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_rolls_are_all_kept_and_phase_advances_once() {
    let engine = engine();
    let app = Arc::new(engine.app);
    let players: Vec<String> = (0..10).map(|i| format!("p{}", i)).collect();
    let names: Vec<&str> = players.iter().map(String::as_str).collect();
    let id = started(&app, &names).await;

    let mut handles = Vec::new();
    for (i, player) in players.iter().enumerate() {
        let app = app.clone();
        let player = pid(player);
        handles.push(tokio::spawn(async move {
            app.use_cases
                .setup
                .submit_player_roll
                .execute(id, player, Some(2 + (i as i32 % 11)))
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let session = app.use_cases.query.get_session.execute(id).await.unwrap();
    let setup = session.setup().unwrap();
    assert_eq!(setup.player_rolls.len(), 10);
    assert_eq!(setup.definition_order.len(), 10);
    assert_eq!(setup.current_phase, SetupPhase::DefiningGenre);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_modifier_finalization_advances_exactly_once() {
    let engine = engine();
    let app = Arc::new(engine.app);
    let players = ["ana", "bo", "cy", "dee"];
    let id = started(&app, &players).await;
    let rolls = [("ana", 11), ("bo", 9), ("cy", 7), ("dee", 5)];
    roll_for_order(&app, id, &rolls).await;
    build_world(&app, id).await;
    write_concepts(&app, id, &players).await;
    roll_for_skills(&app, id, &rolls).await;
    define_skills(&app, id).await;

    let mut handles = Vec::new();
    for player in players {
        let app = app.clone();
        handles.push(tokio::spawn(async move {
            let setup = &app.use_cases.setup;
            for (skill, value) in [
                ("Weather sense", 2),
                ("Old debts", 1),
                ("Drowned names", -1),
                ("Lamp lore", -2),
            ] {
                setup
                    .assign_skill_modifier
                    .execute(id, pid(player), skill, value)
                    .await
                    .unwrap();
            }
            setup.finalize_skill_modifiers.execute(id, pid(player)).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let session = app.use_cases.query.get_session.execute(id).await.unwrap();
    let setup = session.setup().unwrap();
    assert_eq!(setup.current_phase, SetupPhase::AwaitingGameStart);
    for player in players {
        let status = &setup.player_modifier_selection_status[&pid(player)];
        assert!(status.finalized);
        assert_eq!(status.assigned_values, vec![2, 1, -1, -2]);
    }

    // A late repeat after the transition is still accepted and changes nothing
    let again = app
        .use_cases
        .setup
        .finalize_skill_modifiers
        .execute(id, pid("ana"))
        .await
        .unwrap();
    assert_eq!(again.setup(), session.setup());
}

#[tokio::test]
async fn test_operations_on_unknown_session_fail_cleanly() {
    let engine = engine();
    let missing = talewright_domain::SessionId::new();

    let result = engine
        .app
        .use_cases
        .setup
        .submit_world_truth
        .execute(missing, pid("ana"), "Nothing here")
        .await;

    assert!(matches!(result, Err(SessionError::SessionNotFound(id)) if id == missing));
}
