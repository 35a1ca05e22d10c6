//! Initiative roll, world definition and world truths.

use chrono::{DateTime, Utc};

use crate::aggregates::Session;
use crate::error::DomainError;
use crate::ids::ParticipantId;
use crate::value_objects::{EntryText, GameRules};

use super::{
    derive_order, upsert_roll, CharacterConcept, RollEntry, SetupPhase, TurnOrder,
    WorldDefinitionEntry, WorldSlot, WorldTruth,
};

impl Session {
    /// Record a player's initiative roll. Once every player counted at setup
    /// start has rolled, the definition order is derived and genre definition
    /// begins.
    pub fn submit_player_roll(
        &mut self,
        participant: &ParticipantId,
        value: i32,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::Rolling)?;
        let name = self.require_player(participant)?.display_name.clone();

        let setup = self.setup_mut()?;
        upsert_roll(
            &mut setup.player_rolls,
            RollEntry {
                participant_id: participant.clone(),
                name,
                value,
                rolled_at: now,
            },
        );

        if setup.player_rolls.len() >= setup.num_players_at_setup_start {
            let TurnOrder {
                order,
                token_grants,
            } = derive_order(&setup.player_rolls, rules);
            setup.current_player_id_to_define = order.first().cloned();
            setup.definition_order = order;
            setup.interference_token_grants = token_grants;
            setup.current_phase = SetupPhase::DefiningGenre;
        }
        Ok(())
    }

    /// Fill the world slot owned by the current phase and hand the turn on.
    ///
    /// The hand-off is deliberately irregular:
    /// - genre -> adjective: `order[1 % n]` (the sole player again when n = 1)
    /// - adjective -> location: `order[0]` when n <= 2, else `order[2]`
    /// - location -> truths: `order[0]`
    pub fn submit_world_definition(
        &mut self,
        participant: &ParticipantId,
        slot: WorldSlot,
        value: EntryText,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(slot.phase())?;
        let setup = self.setup_mut()?;
        setup.require_turn(participant)?;
        if setup.definition_order.is_empty() {
            return Err(DomainError::validation("Definition order has not been set"));
        }
        if setup.world_definition.get(slot).is_some() {
            return Err(DomainError::validation(format!("The {} is already defined", slot)));
        }

        let order = &setup.definition_order;
        let n = order.len();
        let (next_phase, next_definer) = match slot {
            WorldSlot::Genre => {
                let next = if n == 1 { 0 } else { 1 % n };
                (SetupPhase::DefiningAdjective, order[next].clone())
            }
            WorldSlot::Adjective => {
                let next = if n <= 2 { 0 } else { 2 % n };
                (SetupPhase::DefiningLocation, order[next].clone())
            }
            WorldSlot::Location => (SetupPhase::DefiningTruths, order[0].clone()),
        };

        *setup.world_definition.slot_mut(slot) = Some(WorldDefinitionEntry {
            value,
            author: participant.clone(),
        });
        if slot == WorldSlot::Location {
            setup.world_truths.clear();
            setup.truth_cursor = 0;
        }
        setup.current_phase = next_phase;
        setup.current_player_id_to_define = Some(next_definer);
        Ok(())
    }

    /// Append the current definer's truth. After the last player in the
    /// definition order, character concepts open for the whole roster.
    pub fn submit_world_truth(
        &mut self,
        participant: &ParticipantId,
        text: EntryText,
    ) -> Result<(), DomainError> {
        self.require_setup_phase(SetupPhase::DefiningTruths)?;
        self.setup_ref()?.require_turn(participant)?;

        let pending_concepts: Vec<CharacterConcept> = self
            .roster
            .iter()
            .map(|p| CharacterConcept::pending(p.id.clone(), p.display_name.clone()))
            .collect();

        let setup = self.setup_mut()?;
        let order = setup.world_truths.len() + 1;
        setup.world_truths.push(WorldTruth {
            text,
            author: participant.clone(),
            order,
        });
        setup.truth_cursor += 1;

        match setup.definition_order.get(setup.truth_cursor) {
            Some(next) => {
                setup.current_player_id_to_define = Some(next.clone());
            }
            None => {
                setup.current_phase = SetupPhase::DefiningCharacterConcepts;
                setup.current_player_id_to_define = None;
                setup.character_concepts = pending_concepts;
                setup.skill_rolls.clear();
                setup.skill_order.clear();
                setup.defined_skills.clear();
                setup.skills_per_player_allocation.clear();
            }
        }
        Ok(())
    }
}
