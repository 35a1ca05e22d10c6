//! Game setup: the turn sequencer that takes a table from first dice roll to
//! finished character sheets.
//!
//! Phases run strictly forward:
//!
//! ```text
//! Rolling -> DefiningGenre -> DefiningAdjective -> DefiningLocation
//!   -> DefiningTruths -> DefiningCharacterConcepts -> SkillDiceRoll
//!   -> DefiningPlayerSkills -> DefiningGmSkills -> AssigningSkillModifiers
//!   -> AwaitingGameStart
//! ```
//!
//! Turn-gated phases authorise exactly one writer through
//! `current_player_id_to_define`; concurrent phases leave it `None` and gate on
//! per-participant ownership instead.

mod characters;
mod modifiers;
mod turn_order;
mod world;

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::ParticipantId;
use crate::value_objects::{EntryText, SkillName};

pub use turn_order::{derive_order, partition_quota, rank_rolls, TurnOrder};

// =============================================================================
// Phase
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SetupPhase {
    Rolling,
    DefiningGenre,
    DefiningAdjective,
    DefiningLocation,
    DefiningTruths,
    DefiningCharacterConcepts,
    SkillDiceRoll,
    DefiningPlayerSkills,
    DefiningGmSkills,
    AssigningSkillModifiers,
    AwaitingGameStart,
}

impl SetupPhase {
    /// Phases where a single participant holds the turn.
    pub fn is_turn_based(&self) -> bool {
        matches!(
            self,
            Self::DefiningGenre
                | Self::DefiningAdjective
                | Self::DefiningLocation
                | Self::DefiningTruths
                | Self::DefiningPlayerSkills
                | Self::DefiningGmSkills
        )
    }
}

impl fmt::Display for SetupPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Rolling => "rolling",
            Self::DefiningGenre => "defining genre",
            Self::DefiningAdjective => "defining adjective",
            Self::DefiningLocation => "defining location",
            Self::DefiningTruths => "defining truths",
            Self::DefiningCharacterConcepts => "defining character concepts",
            Self::SkillDiceRoll => "skill dice roll",
            Self::DefiningPlayerSkills => "defining player skills",
            Self::DefiningGmSkills => "defining GM skills",
            Self::AssigningSkillModifiers => "assigning skill modifiers",
            Self::AwaitingGameStart => "awaiting game start",
        };
        write!(f, "{}", label)
    }
}

// =============================================================================
// Working memory records
// =============================================================================

/// One participant's die roll. Resubmission replaces the entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollEntry {
    pub participant_id: ParticipantId,
    pub name: String,
    pub value: i32,
    pub rolled_at: DateTime<Utc>,
}

/// The three world-definition slots, each owned by one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WorldSlot {
    Genre,
    Adjective,
    Location,
}

impl WorldSlot {
    pub fn phase(&self) -> SetupPhase {
        match self {
            Self::Genre => SetupPhase::DefiningGenre,
            Self::Adjective => SetupPhase::DefiningAdjective,
            Self::Location => SetupPhase::DefiningLocation,
        }
    }
}

impl fmt::Display for WorldSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Genre => write!(f, "genre"),
            Self::Adjective => write!(f, "adjective"),
            Self::Location => write!(f, "location"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDefinitionEntry {
    pub value: EntryText,
    pub author: ParticipantId,
}

/// Write-once slots filled in definition order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldDefinition {
    #[serde(default)]
    pub genre: Option<WorldDefinitionEntry>,
    #[serde(default)]
    pub adjective: Option<WorldDefinitionEntry>,
    #[serde(default)]
    pub location: Option<WorldDefinitionEntry>,
}

impl WorldDefinition {
    pub fn get(&self, slot: WorldSlot) -> Option<&WorldDefinitionEntry> {
        match slot {
            WorldSlot::Genre => self.genre.as_ref(),
            WorldSlot::Adjective => self.adjective.as_ref(),
            WorldSlot::Location => self.location.as_ref(),
        }
    }

    fn slot_mut(&mut self, slot: WorldSlot) -> &mut Option<WorldDefinitionEntry> {
        match slot {
            WorldSlot::Genre => &mut self.genre,
            WorldSlot::Adjective => &mut self.adjective,
            WorldSlot::Location => &mut self.location,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorldTruth {
    pub text: EntryText,
    pub author: ParticipantId,
    /// 1-based position in the truth list
    pub order: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterConcept {
    pub participant_id: ParticipantId,
    pub name: String,
    #[serde(default)]
    pub text: Option<EntryText>,
    pub submitted: bool,
}

impl CharacterConcept {
    fn pending(participant_id: ParticipantId, name: String) -> Self {
        Self {
            participant_id,
            name,
            text: None,
            submitted: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillAllocation {
    pub total_to_define: u32,
    pub defined_count: u32,
    pub finalized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillType {
    Player,
    Gm,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefinedSkill {
    pub name: SkillName,
    #[serde(rename = "type")]
    pub skill_type: SkillType,
    pub author: ParticipantId,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SkillModifierChoice {
    pub skill_name: SkillName,
    pub modifier_value: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierSelectionStatus {
    /// Values currently assigned, highest first
    pub assigned_values: Vec<i32>,
    pub finalized: bool,
}

// =============================================================================
// SetupState
// =============================================================================

/// The setup sequencer's working memory.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupState {
    pub current_phase: SetupPhase,
    /// Fixed denominator for "has everyone reported"; never recomputed.
    pub num_players_at_setup_start: usize,
    #[serde(default)]
    pub player_rolls: Vec<RollEntry>,
    #[serde(default)]
    pub skill_rolls: Vec<RollEntry>,
    /// Derived once from `player_rolls`; immutable afterwards.
    #[serde(default)]
    pub definition_order: Vec<ParticipantId>,
    /// Ranking from `skill_rolls`, used to hand out skill turns.
    #[serde(default)]
    pub skill_order: Vec<ParticipantId>,
    #[serde(default)]
    pub current_player_id_to_define: Option<ParticipantId>,
    #[serde(default)]
    pub world_definition: WorldDefinition,
    #[serde(default)]
    pub world_truths: Vec<WorldTruth>,
    #[serde(default)]
    pub truth_cursor: usize,
    #[serde(default)]
    pub character_concepts: Vec<CharacterConcept>,
    #[serde(default)]
    pub skills_per_player_allocation: BTreeMap<ParticipantId, SkillAllocation>,
    #[serde(default)]
    pub defined_skills: Vec<DefinedSkill>,
    #[serde(default)]
    pub gm_skills_defined_count: u32,
    #[serde(default)]
    pub player_skill_modifiers: BTreeMap<ParticipantId, Vec<SkillModifierChoice>>,
    #[serde(default)]
    pub player_modifier_selection_status: BTreeMap<ParticipantId, ModifierSelectionStatus>,
    /// Interference tokens earned by first-roll rank, applied when play starts.
    #[serde(default)]
    pub interference_token_grants: BTreeMap<ParticipantId, u32>,
}

impl SetupState {
    pub fn new(num_players_at_setup_start: usize) -> Self {
        Self {
            current_phase: SetupPhase::Rolling,
            num_players_at_setup_start,
            player_rolls: Vec::new(),
            skill_rolls: Vec::new(),
            definition_order: Vec::new(),
            skill_order: Vec::new(),
            current_player_id_to_define: None,
            world_definition: WorldDefinition::default(),
            world_truths: Vec::new(),
            truth_cursor: 0,
            character_concepts: Vec::new(),
            skills_per_player_allocation: BTreeMap::new(),
            defined_skills: Vec::new(),
            gm_skills_defined_count: 0,
            player_skill_modifiers: BTreeMap::new(),
            player_modifier_selection_status: BTreeMap::new(),
            interference_token_grants: BTreeMap::new(),
        }
    }

    pub fn is_turn_of(&self, participant: &ParticipantId) -> bool {
        self.current_player_id_to_define.as_ref() == Some(participant)
    }

    /// Case-insensitive lookup in the global skill list.
    pub fn find_skill(&self, name: &str) -> Option<&DefinedSkill> {
        self.defined_skills.iter().find(|s| s.name.matches(name))
    }

    pub fn concept_for(&self, participant: &ParticipantId) -> Option<&CharacterConcept> {
        self.character_concepts
            .iter()
            .find(|c| &c.participant_id == participant)
    }

    pub(crate) fn require_turn(&self, participant: &ParticipantId) -> Result<(), DomainError> {
        if self.is_turn_of(participant) {
            Ok(())
        } else {
            Err(DomainError::not_your_turn(participant))
        }
    }

    pub(crate) fn ensure_unique_skill(&self, name: &SkillName) -> Result<(), DomainError> {
        match self.find_skill(name.as_str()) {
            Some(existing) => Err(DomainError::DuplicateName(existing.name.to_string())),
            None => Ok(()),
        }
    }
}

/// Replace the participant's roll if present, otherwise append it.
pub(crate) fn upsert_roll(rolls: &mut Vec<RollEntry>, entry: RollEntry) {
    match rolls
        .iter_mut()
        .find(|r| r.participant_id == entry.participant_id)
    {
        Some(existing) => *existing = entry,
        None => rolls.push(entry),
    }
}
