//! Drivers that walk a session through setup using only the public use cases.

use talewright_domain::{Session, SessionId, SetupPhase, WorldSlot};

use crate::app::App;
use crate::config::EngineConfig;
use crate::test_fixtures::{at, gm, pid, profile, test_engine, TestEngine};

/// Engine at a fixed instant with default rules.
pub fn engine() -> TestEngine {
    test_engine(at(0), EngineConfig::default())
}

fn turn_holder(session: &Session) -> String {
    session
        .setup()
        .and_then(|s| s.current_player_id_to_define.clone())
        .map(|id| id.to_string())
        .unwrap()
}

/// Create a lobby, seat `players` and start setup.
pub async fn started(app: &App, players: &[&str]) -> SessionId {
    let session = app
        .use_cases
        .lobby
        .create_session
        .execute(profile("gm"), "E2E table")
        .await
        .unwrap();
    for id in players {
        app.use_cases
            .lobby
            .join_session
            .execute(session.id(), profile(id))
            .await
            .unwrap();
    }
    app.use_cases
        .lobby
        .start_game
        .execute(session.id(), gm())
        .await
        .unwrap();
    session.id()
}

/// Players roll the given totals for turn order.
pub async fn roll_for_order(app: &App, id: SessionId, rolls: &[(&str, i32)]) -> Session {
    let mut last = None;
    for (player, value) in rolls {
        let rolled = app
            .use_cases
            .setup
            .submit_player_roll
            .execute(id, pid(player), Some(*value))
            .await
            .unwrap();
        last = Some(rolled.session);
    }
    last.unwrap()
}

/// Whoever holds the turn fills each world slot and then writes a truth.
pub async fn build_world(app: &App, id: SessionId) -> Session {
    let mut session = app.use_cases.query.get_session.execute(id).await.unwrap();
    for (slot, text) in [
        (WorldSlot::Genre, "Gaslamp fantasy"),
        (WorldSlot::Adjective, "Flooded"),
        (WorldSlot::Location, "The drowned archive"),
    ] {
        let author = turn_holder(&session);
        session = app
            .use_cases
            .setup
            .submit_world_definition
            .execute(id, pid(&author), slot, text)
            .await
            .unwrap();
    }
    while session.setup().unwrap().current_phase == SetupPhase::DefiningTruths {
        let author = turn_holder(&session);
        session = app
            .use_cases
            .setup
            .submit_world_truth
            .execute(id, pid(&author), &format!("{} swears the tide lies", author))
            .await
            .unwrap();
    }
    session
}

pub async fn write_concepts(app: &App, id: SessionId, players: &[&str]) -> Session {
    let mut last = None;
    for player in players {
        last = Some(
            app.use_cases
                .setup
                .submit_character_concept
                .execute(id, pid(player), &format!("{} the Archivist", player))
                .await
                .unwrap(),
        );
    }
    last.unwrap()
}

pub async fn roll_for_skills(app: &App, id: SessionId, rolls: &[(&str, i32)]) -> Session {
    let mut last = None;
    for (player, value) in rolls {
        let rolled = app
            .use_cases
            .setup
            .submit_skill_roll
            .execute(id, pid(player), Some(*value))
            .await
            .unwrap();
        last = Some(rolled.session);
    }
    last.unwrap()
}

/// Each player in skill order fills their quota and finalizes, then the GM
/// defines and finalizes a full set.
pub async fn define_skills(app: &App, id: SessionId) -> Session {
    let setup = &app.use_cases.setup;
    let mut session = app.use_cases.query.get_session.execute(id).await.unwrap();
    while session.setup().unwrap().current_phase == SetupPhase::DefiningPlayerSkills {
        let author = turn_holder(&session);
        let quota = session.setup().unwrap().skills_per_player_allocation[&pid(&author)]
            .total_to_define;
        for k in 0..quota {
            setup
                .add_player_skill
                .execute(id, pid(&author), &format!("{} craft {}", author, k))
                .await
                .unwrap();
        }
        session = setup
            .finalize_player_skills
            .execute(id, pid(&author))
            .await
            .unwrap();
    }
    for name in ["Weather sense", "Old debts", "Drowned names", "Lamp lore"] {
        setup.add_gm_skill.execute(id, gm(), name).await.unwrap();
    }
    setup.finalize_gm_skills.execute(id, gm()).await.unwrap()
}

/// Every player spreads the modifier set over the GM's skills and finalizes.
pub async fn assign_modifiers(app: &App, id: SessionId, players: &[&str]) -> Session {
    let setup = &app.use_cases.setup;
    let mut last = None;
    for player in players {
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
        last = Some(
            setup
                .finalize_skill_modifiers
                .execute(id, pid(player))
                .await
                .unwrap(),
        );
    }
    last.unwrap()
}

/// Lobby to live play. Earlier players roll higher.
pub async fn into_play(app: &App, players: &[&str]) -> SessionId {
    let id = started(app, players).await;
    let rolls: Vec<(&str, i32)> = players
        .iter()
        .enumerate()
        .map(|(i, p)| (*p, 12 - i as i32))
        .collect();
    roll_for_order(app, id, &rolls).await;
    build_world(app, id).await;
    write_concepts(app, id, players).await;
    roll_for_skills(app, id, &rolls).await;
    define_skills(app, id).await;
    assign_modifiers(app, id, players).await;
    app.use_cases
        .gameplay
        .initiate_gameplay
        .execute(id, gm())
        .await
        .unwrap();
    id
}
