//! Character concepts, the skill roll and skill definition turns.

use chrono::{DateTime, Utc};

use crate::aggregates::Session;
use crate::error::DomainError;
use crate::ids::ParticipantId;
use crate::value_objects::{EntryText, GameRules, SkillName};

use super::{
    partition_quota, rank_rolls, upsert_roll, DefinedSkill, ModifierSelectionStatus, RollEntry,
    SetupPhase, SkillAllocation, SkillType,
};

impl Session {
    // =========================================================================
    // Concepts
    // =========================================================================

    /// Set the caller's concept text. Submitting twice is a silent no-op so
    /// repeated taps cannot overwrite an accepted concept.
    pub fn submit_character_concept(
        &mut self,
        participant: &ParticipantId,
        text: EntryText,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningCharacterConcepts)?;
        let setup = self.setup_mut()?;

        let concept = setup
            .character_concepts
            .iter_mut()
            .find(|c| &c.participant_id == participant)
            .ok_or_else(|| {
                DomainError::validation(format!("{} has no character concept to submit", participant))
            })?;
        if concept.submitted {
            return Ok(());
        }
        concept.text = Some(text);
        concept.submitted = true;

        if setup.character_concepts.iter().all(|c| c.submitted) {
            setup.current_phase = SetupPhase::SkillDiceRoll;
            setup.current_player_id_to_define = None;
            setup.skill_rolls.clear();
            setup.skill_order.clear();
        }
        Ok(())
    }

    // =========================================================================
    // Skill roll
    // =========================================================================

    /// Record a skill roll. The last expected roll ranks the table afresh and
    /// splits the player skill total by that ranking.
    pub fn submit_skill_roll(
        &mut self,
        participant: &ParticipantId,
        value: i32,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::SkillDiceRoll)?;
        let name = self.require_player(participant)?.display_name.clone();

        let setup = self.setup_mut()?;
        upsert_roll(
            &mut setup.skill_rolls,
            RollEntry {
                participant_id: participant.clone(),
                name,
                value,
                rolled_at: now,
            },
        );

        if setup.skill_rolls.len() >= setup.num_players_at_setup_start {
            let ranking = rank_rolls(&setup.skill_rolls);
            setup.skills_per_player_allocation = partition_quota(rules.total_player_skills, &ranking)
                .into_iter()
                .map(|(id, quota)| {
                    (
                        id,
                        SkillAllocation {
                            total_to_define: quota,
                            defined_count: 0,
                            finalized: false,
                        },
                    )
                })
                .collect();
            setup.current_player_id_to_define = ranking.first().cloned();
            setup.skill_order = ranking;
            setup.current_phase = SetupPhase::DefiningPlayerSkills;
        }
        Ok(())
    }

    // =========================================================================
    // Player skills
    // =========================================================================

    pub fn add_player_skill(
        &mut self,
        participant: &ParticipantId,
        name: SkillName,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningPlayerSkills)?;
        let setup = self.setup_mut()?;
        setup.require_turn(participant)?;

        let allocation = setup
            .skills_per_player_allocation
            .get(participant)
            .copied()
            .ok_or_else(|| DomainError::validation(format!("{} has no skill allocation", participant)))?;
        if allocation.finalized {
            return Err(DomainError::AlreadyFinalized("skills"));
        }
        if allocation.defined_count >= allocation.total_to_define {
            return Err(DomainError::quota_exceeded(
                allocation.defined_count,
                allocation.total_to_define,
            ));
        }
        setup.ensure_unique_skill(&name)?;

        setup.defined_skills.push(DefinedSkill {
            name,
            skill_type: SkillType::Player,
            author: participant.clone(),
        });
        if let Some(allocation) = setup.skills_per_player_allocation.get_mut(participant) {
            allocation.defined_count += 1;
        }
        Ok(())
    }

    /// Remove one of the caller's own player skills.
    pub fn remove_player_skill(
        &mut self,
        participant: &ParticipantId,
        name: &str,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningPlayerSkills)?;
        let setup = self.setup_mut()?;
        setup.require_turn(participant)?;

        if setup
            .skills_per_player_allocation
            .get(participant)
            .is_some_and(|a| a.finalized)
        {
            return Err(DomainError::AlreadyFinalized("skills"));
        }
        let index = setup
            .defined_skills
            .iter()
            .position(|s| s.name.matches(name))
            .ok_or_else(|| DomainError::validation(format!("No skill named '{}'", name.trim())))?;
        let skill = &setup.defined_skills[index];
        if skill.skill_type != SkillType::Player || &skill.author != participant {
            return Err(DomainError::not_authorized("remove a skill defined by someone else"));
        }

        setup.defined_skills.remove(index);
        if let Some(allocation) = setup.skills_per_player_allocation.get_mut(participant) {
            allocation.defined_count = allocation.defined_count.saturating_sub(1);
        }
        Ok(())
    }

    /// Lock the caller's skills and pass the turn down the skill-roll ranking.
    /// After the last player the GM takes over.
    pub fn finalize_player_skills(&mut self, participant: &ParticipantId) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningPlayerSkills)?;
        let gm_id = self.gm_id().clone();
        let setup = self.setup_mut()?;
        setup.require_turn(participant)?;

        let allocation = setup
            .skills_per_player_allocation
            .get_mut(participant)
            .ok_or_else(|| DomainError::validation(format!("{} has no skill allocation", participant)))?;
        if allocation.defined_count != allocation.total_to_define {
            return Err(DomainError::incomplete(format!(
                "{} of {} skills defined",
                allocation.defined_count, allocation.total_to_define
            )));
        }
        allocation.finalized = true;

        let next = setup
            .skill_order
            .iter()
            .position(|id| id == participant)
            .and_then(|i| setup.skill_order.get(i + 1))
            .cloned();
        match next {
            Some(next) => setup.current_player_id_to_define = Some(next),
            None => {
                setup.current_phase = SetupPhase::DefiningGmSkills;
                setup.current_player_id_to_define = Some(gm_id);
                setup.gm_skills_defined_count = 0;
            }
        }
        Ok(())
    }

    // =========================================================================
    // GM skills
    // =========================================================================

    pub fn add_gm_skill(
        &mut self,
        caller: &ParticipantId,
        name: SkillName,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningGmSkills)?;
        self.ensure_gm(caller, "define GM skills")?;
        let setup = self.setup_mut()?;

        if setup.gm_skills_defined_count >= rules.gm_skill_cap {
            return Err(DomainError::quota_exceeded(
                setup.gm_skills_defined_count,
                rules.gm_skill_cap,
            ));
        }
        setup.ensure_unique_skill(&name)?;

        setup.defined_skills.push(DefinedSkill {
            name,
            skill_type: SkillType::Gm,
            author: caller.clone(),
        });
        setup.gm_skills_defined_count += 1;
        Ok(())
    }

    pub fn remove_gm_skill(&mut self, caller: &ParticipantId, name: &str) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningGmSkills)?;
        self.ensure_gm(caller, "remove GM skills")?;
        let setup = self.setup_mut()?;

        let index = setup
            .defined_skills
            .iter()
            .position(|s| s.name.matches(name))
            .ok_or_else(|| DomainError::validation(format!("No skill named '{}'", name.trim())))?;
        if setup.defined_skills[index].skill_type != SkillType::Gm {
            return Err(DomainError::not_authorized("remove a player skill"));
        }

        setup.defined_skills.remove(index);
        setup.gm_skills_defined_count = setup.gm_skills_defined_count.saturating_sub(1);
        Ok(())
    }

    /// Close skill definition and open modifier assignment for the roster.
    pub fn finalize_gm_skills(
        &mut self,
        caller: &ParticipantId,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningGmSkills)?;
        self.ensure_gm(caller, "finalize GM skills")?;
        let roster: Vec<ParticipantId> = self.roster.iter().map(|p| p.id.clone()).collect();
        let setup = self.setup_mut()?;

        if setup.gm_skills_defined_count != rules.gm_skill_cap {
            return Err(DomainError::incomplete(format!(
                "{} of {} GM skills defined",
                setup.gm_skills_defined_count, rules.gm_skill_cap
            )));
        }

        setup.current_phase = SetupPhase::AssigningSkillModifiers;
        setup.current_player_id_to_define = None;
        setup.player_skill_modifiers = roster.iter().map(|id| (id.clone(), Vec::new())).collect();
        setup.player_modifier_selection_status = roster
            .into_iter()
            .map(|id| (id, ModifierSelectionStatus::default()))
            .collect();
        Ok(())
    }
}
