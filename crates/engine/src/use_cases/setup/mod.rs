//! Setup use cases.
//!
//! Each call is one step of the setup sequencer: rolls, world building,
//! character concepts, skill lists and modifier assignment. The rules live in
//! the domain; these use cases route every step through the session's mailbox
//! and report phase changes.

use std::sync::Arc;

use talewright_domain::{DomainError, Session, SessionId, SetupPhase};
use tracing::{debug, info};

use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

mod characters;
mod gm_skills;
mod modifiers;
mod rolls;
mod world;

pub use characters::{AddPlayerSkill, FinalizePlayerSkills, RemovePlayerSkill, SubmitCharacterConcept};
pub use gm_skills::{AddGmSkill, FinalizeGmSkills, RemoveGmSkill};
pub use modifiers::{AssignSkillModifier, FinalizeSkillModifiers};
pub use rolls::{RollSubmitted, SubmitPlayerRoll, SubmitSkillRoll};
pub use world::{SubmitWorldDefinition, SubmitWorldTruth};

/// Container for setup use cases.
pub struct SetupUseCases {
    pub submit_player_roll: Arc<SubmitPlayerRoll>,
    pub submit_world_definition: Arc<SubmitWorldDefinition>,
    pub submit_world_truth: Arc<SubmitWorldTruth>,
    pub submit_character_concept: Arc<SubmitCharacterConcept>,
    pub submit_skill_roll: Arc<SubmitSkillRoll>,
    pub add_player_skill: Arc<AddPlayerSkill>,
    pub remove_player_skill: Arc<RemovePlayerSkill>,
    pub finalize_player_skills: Arc<FinalizePlayerSkills>,
    pub add_gm_skill: Arc<AddGmSkill>,
    pub remove_gm_skill: Arc<RemoveGmSkill>,
    pub finalize_gm_skills: Arc<FinalizeGmSkills>,
    pub assign_skill_modifier: Arc<AssignSkillModifier>,
    pub finalize_skill_modifiers: Arc<FinalizeSkillModifiers>,
}

/// Apply one setup step and log the phase change it caused, if any.
pub(crate) async fn run_step<F>(
    mailboxes: &SessionMailboxes,
    session_id: SessionId,
    step: &'static str,
    f: F,
) -> Result<Session, SessionError>
where
    F: FnOnce(&mut Session) -> Result<(), DomainError> + Send + 'static,
{
    let (session, before) = mailboxes
        .submit(session_id, move |s| {
            let before = current_phase(s);
            f(s)?;
            Ok(before)
        })
        .await?;

    let after = current_phase(&session);
    if before != after {
        info!(
            session_id = %session_id,
            step,
            from = ?before,
            to = ?after,
            next_turn = ?session.setup().and_then(|s| s.current_player_id_to_define.as_ref()),
            "Setup phase advanced"
        );
    } else {
        debug!(session_id = %session_id, step, "Setup step applied");
    }
    Ok(session)
}

fn current_phase(session: &Session) -> Option<SetupPhase> {
    session.setup().map(|s| s.current_phase)
}
