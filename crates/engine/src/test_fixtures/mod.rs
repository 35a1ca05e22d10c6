//! Common test helpers for engine tests.
//!
//! The GM is always `gm`; players are named by the ids handed in and their
//! display name is the upper-cased id.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};
use talewright_domain::{
    EntryText, GameRules, ParticipantId, ParticipantProfile, Session, SessionName, SkillName,
    WorldSlot,
};

use crate::app::App;
use crate::config::EngineConfig;
use crate::infrastructure::clock::{FixedClock, ScriptedRandom};
use crate::infrastructure::memory_store::InMemorySessionRepo;
use crate::infrastructure::ports::SessionRepo;
use crate::stores::SessionMailboxes;

pub fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 6, 19, 30, 0).unwrap() + Duration::seconds(seconds)
}

pub fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id).unwrap()
}

pub fn gm() -> ParticipantId {
    pid("gm")
}

pub fn profile(id: &str) -> ParticipantProfile {
    ParticipantProfile::new(pid(id), id.to_uppercase()).unwrap()
}

/// A lobby created at `at(0)` with the given players joined.
pub fn lobby_session(players: &[&str]) -> Session {
    let mut session = Session::new(SessionName::new("Test table").unwrap(), profile("gm"), at(0));
    for id in players {
        session.join(profile(id)).unwrap();
    }
    session
}

/// Store seeded with `session` plus mailboxes over it.
pub async fn seeded(session: &Session) -> (Arc<InMemorySessionRepo>, Arc<SessionMailboxes>) {
    let repo = Arc::new(InMemorySessionRepo::new());
    repo.save(session).await.unwrap();
    let mailboxes = Arc::new(SessionMailboxes::new(repo.clone(), 8));
    (repo, mailboxes)
}

// =============================================================================
// Sessions parked at a given setup phase
// =============================================================================

fn current_turn(session: &Session) -> ParticipantId {
    session
        .setup()
        .and_then(|s| s.current_player_id_to_define.clone())
        .unwrap()
}

/// Setup begun, nobody has rolled yet.
pub fn started_session(players: &[&str]) -> Session {
    let mut session = lobby_session(players);
    session.start_game(&gm()).unwrap();
    session
}

/// Every player rolled; earlier players roll higher so the order follows the
/// list. Parked at genre definition.
pub fn rolled_session(players: &[&str]) -> Session {
    let rules = GameRules::default();
    let mut session = started_session(players);
    for (i, id) in players.iter().enumerate() {
        session
            .submit_player_roll(&pid(id), 12 - i as i32, at(i as i64), &rules)
            .unwrap();
    }
    session
}

/// World and truths written. Parked at character concepts.
pub fn concepts_session(players: &[&str]) -> Session {
    let mut session = rolled_session(players);
    for slot in [WorldSlot::Genre, WorldSlot::Adjective, WorldSlot::Location] {
        let author = current_turn(&session);
        session
            .submit_world_definition(&author, slot, EntryText::new(format!("{} by {}", slot, author)).unwrap())
            .unwrap();
    }
    for _ in players {
        let author = current_turn(&session);
        session
            .submit_world_truth(&author, EntryText::new(format!("Truth from {}", author)).unwrap())
            .unwrap();
    }
    session
}

/// Concepts in. Parked at the skill dice roll.
pub fn skill_roll_session(players: &[&str]) -> Session {
    let mut session = concepts_session(players);
    for id in players {
        session
            .submit_character_concept(&pid(id), EntryText::new(format!("{} the Bold", id.to_uppercase())).unwrap())
            .unwrap();
    }
    session
}

/// Skill rolls in. Parked at player skill definition, first listed player up.
pub fn player_skills_session(players: &[&str]) -> Session {
    let rules = GameRules::default();
    let mut session = skill_roll_session(players);
    for (i, id) in players.iter().enumerate() {
        session
            .submit_skill_roll(&pid(id), 12 - i as i32, at(100 + i as i64), &rules)
            .unwrap();
    }
    session
}

/// Every player defined and finalized their quota. Parked at GM skills.
pub fn gm_skills_session(players: &[&str]) -> Session {
    let mut session = player_skills_session(players);
    for _ in players {
        let author = current_turn(&session);
        let quota = session.setup().unwrap().skills_per_player_allocation[&author].total_to_define;
        for k in 0..quota {
            session
                .add_player_skill(&author, SkillName::new(format!("{} skill {}", author, k)).unwrap())
                .unwrap();
        }
        session.finalize_player_skills(&author).unwrap();
    }
    session
}

/// GM skills finalized. Parked at modifier assignment.
pub fn modifiers_session(players: &[&str]) -> Session {
    let rules = GameRules::default();
    let mut session = gm_skills_session(players);
    for k in 0..rules.gm_skill_cap {
        session
            .add_gm_skill(&gm(), SkillName::new(format!("Gm lore {}", k)).unwrap(), &rules)
            .unwrap();
    }
    session.finalize_gm_skills(&gm(), &rules).unwrap();
    session
}

/// Every player assigned the modifier set to the first defined skills and
/// finalized. Parked awaiting game start.
pub fn awaiting_start_session(players: &[&str]) -> Session {
    let rules = GameRules::default();
    let mut session = modifiers_session(players);
    let skills: Vec<String> = session
        .setup()
        .unwrap()
        .defined_skills
        .iter()
        .map(|s| s.name.as_str().to_string())
        .collect();
    for id in players {
        for (skill, value) in skills.iter().zip(rules.modifier_values.clone()) {
            session
                .assign_skill_modifier(&pid(id), skill, value, &rules)
                .unwrap();
        }
        session.finalize_skill_modifiers(&pid(id), &rules).unwrap();
    }
    session
}

/// Gameplay under way.
pub fn active_session(players: &[&str]) -> Session {
    let rules = GameRules::default();
    let mut session = awaiting_start_session(players);
    session.initiate_gameplay(&gm(), at(500), &rules).unwrap();
    session
}

/// Everything a test needs to drive the engine end to end.
pub struct TestEngine {
    pub app: App,
    pub repo: Arc<InMemorySessionRepo>,
    pub dice: Arc<ScriptedRandom>,
}

/// App over the in-memory store with time frozen at `now` and scripted dice.
pub fn test_engine(now: DateTime<Utc>, config: EngineConfig) -> TestEngine {
    let repo = Arc::new(InMemorySessionRepo::new());
    let dice = Arc::new(ScriptedRandom::new([]));
    let app = App::with_ports(
        repo.clone(),
        Arc::new(FixedClock(now)),
        dice.clone(),
        &config,
    );
    TestEngine { app, repo, dice }
}
