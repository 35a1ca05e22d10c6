//! Concurrent skill-modifier assignment.

use crate::aggregates::Session;
use crate::error::DomainError;
use crate::ids::ParticipantId;
use crate::value_objects::GameRules;

use super::{SetupPhase, SkillModifierChoice};

impl Session {
    /// Pair one modifier value with one defined skill for the caller.
    ///
    /// A value or skill already used by the caller is released first, so the
    /// latest pairing for either wins.
    pub fn assign_skill_modifier(
        &mut self,
        participant: &ParticipantId,
        skill_name: &str,
        value: i32,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::AssigningSkillModifiers)?;
        let setup = self.setup_mut()?;

        let finalized = setup
            .player_modifier_selection_status
            .get(participant)
            .map(|status| status.finalized)
            .ok_or_else(|| {
                DomainError::validation(format!("{} is not assigning modifiers", participant))
            })?;
        if finalized {
            return Err(DomainError::AlreadyFinalized("modifiers"));
        }
        if !rules.is_modifier_value(value) {
            return Err(DomainError::validation(format!("{} is not a modifier value", value)));
        }
        let skill = setup
            .find_skill(skill_name)
            .map(|s| s.name.clone())
            .ok_or_else(|| DomainError::validation(format!("No skill named '{}'", skill_name.trim())))?;

        let choices = setup
            .player_skill_modifiers
            .entry(participant.clone())
            .or_default();
        choices.retain(|c| c.modifier_value != value && c.skill_name != skill);
        choices.push(SkillModifierChoice {
            skill_name: skill,
            modifier_value: value,
        });

        let mut assigned: Vec<i32> = choices.iter().map(|c| c.modifier_value).collect();
        assigned.sort_unstable_by(|a, b| b.cmp(a));
        if let Some(status) = setup.player_modifier_selection_status.get_mut(participant) {
            status.assigned_values = assigned;
        }
        Ok(())
    }

    /// Lock the caller's modifiers. When the whole roster is locked, setup
    /// reaches its terminal phase. Calling again once finalized changes nothing.
    pub fn finalize_skill_modifiers(
        &mut self,
        participant: &ParticipantId,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        let already_finalized = self
            .setup
            .as_ref()
            .and_then(|s| s.player_modifier_selection_status.get(participant))
            .is_some_and(|status| status.finalized);
        if already_finalized && self.gameplay.is_none() {
            let phase = self.setup_ref()?.current_phase;
            if matches!(
                phase,
                SetupPhase::AssigningSkillModifiers | SetupPhase::AwaitingGameStart
            ) {
                return Ok(());
            }
        }

        self.require_setup_phase(SetupPhase::AssigningSkillModifiers)?;
        let roster: Vec<ParticipantId> = self.roster.iter().map(|p| p.id.clone()).collect();
        let setup = self.setup_mut()?;

        let status = setup
            .player_modifier_selection_status
            .get_mut(participant)
            .ok_or_else(|| {
                DomainError::validation(format!("{} is not assigning modifiers", participant))
            })?;
        let mut required = rules.modifier_values.clone();
        required.sort_unstable_by(|a, b| b.cmp(a));
        if status.assigned_values != required {
            return Err(DomainError::incomplete(format!(
                "assign each of {:?} exactly once",
                rules.modifier_values
            )));
        }
        status.finalized = true;

        let everyone_done = roster.iter().all(|id| {
            setup
                .player_modifier_selection_status
                .get(id)
                .is_some_and(|s| s.finalized)
        });
        if everyone_done {
            setup.current_phase = SetupPhase::AwaitingGameStart;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::error::DomainError;
    use crate::setup::SetupPhase;
    use crate::test_support::*;
    use crate::value_objects::GameRules;

    #[test]
    fn reassigning_a_value_moves_it_to_the_new_skill() {
        let mut session = modifiers_open(&[("a", 9), ("b", 4)]);
        let rules = GameRules::default();
        session
            .assign_skill_modifier(&pid("a"), "a skill 0", 2, &rules)
            .unwrap();
        session
            .assign_skill_modifier(&pid("a"), "a skill 1", 2, &rules)
            .unwrap();

        let setup = session.setup().unwrap();
        let choices = &setup.player_skill_modifiers[&pid("a")];
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].skill_name.as_str(), "a skill 1");
        assert_eq!(setup.player_modifier_selection_status[&pid("a")].assigned_values, vec![2]);
    }

    #[test]
    fn reassigning_a_skill_replaces_its_value() {
        let mut session = modifiers_open(&[("a", 9)]);
        let rules = GameRules::default();
        session
            .assign_skill_modifier(&pid("a"), "Gm lore 0", 1, &rules)
            .unwrap();
        session
            .assign_skill_modifier(&pid("a"), "GM LORE 0", -2, &rules)
            .unwrap();

        let setup = session.setup().unwrap();
        let choices = &setup.player_skill_modifiers[&pid("a")];
        assert_eq!(choices.len(), 1);
        assert_eq!(choices[0].modifier_value, -2);
        assert_eq!(choices[0].skill_name.as_str(), "Gm lore 0");
    }

    #[test]
    fn unknown_skill_and_bad_value_are_rejected() {
        let mut session = modifiers_open(&[("a", 9)]);
        let rules = GameRules::default();
        assert!(matches!(
            session.assign_skill_modifier(&pid("a"), "Juggling", 1, &rules),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            session.assign_skill_modifier(&pid("a"), "Gm lore 0", 3, &rules),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            session.assign_skill_modifier(&pid("a"), "Gm lore 0", 0, &rules),
            Err(DomainError::Validation(_))
        ));
    }

    #[test]
    fn finalize_needs_all_four_values() {
        let mut session = modifiers_open(&[("a", 9), ("b", 4)]);
        let rules = GameRules::default();
        for (value, skill_name) in [(2, "Gm lore 0"), (1, "Gm lore 1"), (-1, "Gm lore 2")] {
            session
                .assign_skill_modifier(&pid("a"), skill_name, value, &rules)
                .unwrap();
        }
        let err = session.finalize_skill_modifiers(&pid("a"), &rules).unwrap_err();
        assert!(matches!(err, DomainError::IncompleteSelection(_)));

        session
            .assign_skill_modifier(&pid("a"), "Gm lore 3", -2, &rules)
            .unwrap();
        session.finalize_skill_modifiers(&pid("a"), &rules).unwrap();

        let setup = session.setup().unwrap();
        assert!(setup.player_modifier_selection_status[&pid("a")].finalized);
        assert_eq!(setup.current_phase, SetupPhase::AssigningSkillModifiers);
    }

    #[test]
    fn finalized_player_cannot_reassign() {
        let mut session = modifiers_open(&[("a", 9), ("b", 4)]);
        let rules = GameRules::default();
        for (value, skill_name) in [(2, "Gm lore 0"), (1, "Gm lore 1"), (-1, "Gm lore 2"), (-2, "Gm lore 3")] {
            session
                .assign_skill_modifier(&pid("a"), skill_name, value, &rules)
                .unwrap();
        }
        session.finalize_skill_modifiers(&pid("a"), &rules).unwrap();

        let err = session
            .assign_skill_modifier(&pid("a"), "a skill 0", 2, &rules)
            .unwrap_err();
        assert_eq!(err, DomainError::AlreadyFinalized("modifiers"));
    }

    #[test]
    fn last_finalize_reaches_awaiting_start_exactly_once() {
        let mut session = awaiting_start(&[("a", 9), ("b", 4)]);
        let rules = GameRules::default();
        assert_eq!(
            session.setup().unwrap().current_phase,
            SetupPhase::AwaitingGameStart
        );

        let before = session.clone();
        session.finalize_skill_modifiers(&pid("a"), &rules).unwrap();
        session.finalize_skill_modifiers(&pid("b"), &rules).unwrap();
        assert_eq!(session, before);
    }

    #[test]
    fn non_player_cannot_finalize() {
        let mut session = modifiers_open(&[("a", 9)]);
        let err = session
            .finalize_skill_modifiers(&gm(), &GameRules::default())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }
}
