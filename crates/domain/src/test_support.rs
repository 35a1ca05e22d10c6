//! Fixture builders that walk a session forward to a given phase.
//!
//! The GM is always `gm`; players are named by the ids handed in and their
//! display name is the upper-cased id.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::aggregates::{ParticipantProfile, Session};
use crate::ids::ParticipantId;
use crate::setup::{SetupPhase, WorldSlot};
use crate::value_objects::{EntryText, GameRules, SessionName, SkillName};

pub(crate) fn at(seconds: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 6, 19, 30, 0).unwrap() + Duration::seconds(seconds)
}

pub(crate) fn pid(id: &str) -> ParticipantId {
    ParticipantId::new(id).unwrap()
}

pub(crate) fn gm() -> ParticipantId {
    pid("gm")
}

pub(crate) fn profile(id: &str) -> ParticipantProfile {
    ParticipantProfile::new(pid(id), id.to_uppercase()).unwrap()
}

pub(crate) fn text(value: &str) -> EntryText {
    EntryText::new(value).unwrap()
}

pub(crate) fn skill(name: &str) -> SkillName {
    SkillName::new(name).unwrap()
}

pub(crate) fn lobby(players: &[&str]) -> Session {
    let mut session = Session::new(SessionName::new("Test table").unwrap(), profile("gm"), at(0));
    for id in players {
        session.join(profile(id)).unwrap();
    }
    session
}

pub(crate) fn started(players: &[&str]) -> Session {
    let mut session = lobby(players);
    session.start_game(&gm()).unwrap();
    session
}

/// Everyone has rolled, in the order given, one second apart.
pub(crate) fn rolled(rolls: &[(&str, i32)]) -> Session {
    let ids: Vec<&str> = rolls.iter().map(|(id, _)| *id).collect();
    let mut session = started(&ids);
    let rules = GameRules::default();
    for (i, (id, value)) in rolls.iter().enumerate() {
        session
            .submit_player_roll(&pid(id), *value, at(i as i64 + 1), &rules)
            .unwrap();
    }
    session
}

fn current_definer(session: &Session) -> ParticipantId {
    session
        .setup()
        .and_then(|s| s.current_player_id_to_define.clone())
        .unwrap()
}

fn phase(session: &Session) -> SetupPhase {
    session.setup().unwrap().current_phase
}

/// Genre, adjective and location filled; truths open.
pub(crate) fn defined_world(rolls: &[(&str, i32)]) -> Session {
    let mut session = rolled(rolls);
    for (slot, value) in [
        (WorldSlot::Genre, "Gothic horror"),
        (WorldSlot::Adjective, "Drowned"),
        (WorldSlot::Location, "Harbour town"),
    ] {
        let definer = current_definer(&session);
        session
            .submit_world_definition(&definer, slot, text(value))
            .unwrap();
    }
    session
}

/// Every truth written; character concepts open.
pub(crate) fn concepts_open(rolls: &[(&str, i32)]) -> Session {
    let mut session = defined_world(rolls);
    while phase(&session) == SetupPhase::DefiningTruths {
        let definer = current_definer(&session);
        let truth = format!("{} swears the tide remembers", definer);
        session.submit_world_truth(&definer, text(&truth)).unwrap();
    }
    session
}

/// Concepts submitted as "<NAME> the Bold"; skill rolls open.
pub(crate) fn skill_roll_open(rolls: &[(&str, i32)]) -> Session {
    let mut session = concepts_open(rolls);
    for (id, _) in rolls {
        let concept = format!("{} the Bold", id.to_uppercase());
        session
            .submit_character_concept(&pid(id), text(&concept))
            .unwrap();
    }
    session
}

/// Skill rolls repeat the initiative values; player skill turns open.
pub(crate) fn player_skills_open(rolls: &[(&str, i32)]) -> Session {
    let mut session = skill_roll_open(rolls);
    let rules = GameRules::default();
    for (i, (id, value)) in rolls.iter().enumerate() {
        session
            .submit_skill_roll(&pid(id), *value, at(100 + i as i64), &rules)
            .unwrap();
    }
    session
}

/// Each player defines "<id> skill <k>" up to their quota and finalizes.
pub(crate) fn gm_skills_open(rolls: &[(&str, i32)]) -> Session {
    let mut session = player_skills_open(rolls);
    while phase(&session) == SetupPhase::DefiningPlayerSkills {
        let definer = current_definer(&session);
        let quota = session.setup().unwrap().skills_per_player_allocation[&definer].total_to_define;
        for k in 0..quota {
            let name = format!("{} skill {}", definer, k);
            session.add_player_skill(&definer, skill(&name)).unwrap();
        }
        session.finalize_player_skills(&definer).unwrap();
    }
    session
}

/// GM defines the capped number of skills; modifier assignment open.
pub(crate) fn modifiers_open(rolls: &[(&str, i32)]) -> Session {
    let mut session = gm_skills_open(rolls);
    let rules = GameRules::default();
    for k in 0..rules.gm_skill_cap {
        session
            .add_gm_skill(&gm(), skill(&format!("Gm lore {}", k)), &rules)
            .unwrap();
    }
    session.finalize_gm_skills(&gm(), &rules).unwrap();
    session
}

/// Every player maps the default modifier values onto the first defined
/// skills and finalizes.
pub(crate) fn awaiting_start(rolls: &[(&str, i32)]) -> Session {
    let mut session = modifiers_open(rolls);
    let rules = GameRules::default();
    let skills: Vec<String> = session
        .setup()
        .unwrap()
        .defined_skills
        .iter()
        .map(|s| s.name.to_string())
        .collect();
    for (id, _) in rolls {
        for (value, skill_name) in rules.modifier_values.iter().zip(&skills) {
            session
                .assign_skill_modifier(&pid(id), skill_name, *value, &rules)
                .unwrap();
        }
        session.finalize_skill_modifiers(&pid(id), &rules).unwrap();
    }
    session
}

/// Gameplay initialised by the GM.
pub(crate) fn active(rolls: &[(&str, i32)]) -> Session {
    let mut session = awaiting_start(rolls);
    session
        .initiate_gameplay(&gm(), at(500), &GameRules::default())
        .unwrap();
    session
}
