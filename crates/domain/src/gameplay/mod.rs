//! Live play state and the shared game log.
//!
//! Materialised once by the GM from the finished setup, then mutated by dice
//! rolls, token spends and GM edits. Every change appends to `game_log`.

mod actions;

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::{LogEntryId, ParticipantId};
use crate::setup::SkillModifierChoice;
use crate::value_objects::DicePair;

/// One character at the table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerState {
    pub character_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub max_hp: u32,
    pub current_hp: u32,
    /// Copied verbatim from the modifier assignment
    #[serde(default)]
    pub assigned_skills: Vec<SkillModifierChoice>,
    pub interference_tokens: u32,
    #[serde(default)]
    pub is_incapacitated: bool,
}

impl PlayerState {
    /// Modifier the player assigned to `skill`, or 0 when they left it bare.
    pub fn modifier_for(&self, skill: &str) -> i32 {
        self.assigned_skills
            .iter()
            .find(|c| c.skill_name.matches(skill))
            .map(|c| c.modifier_value)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LogEntryType {
    System,
    Roll,
    GenericRoll,
    Token,
}

/// Structured numbers behind a roll entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RollDetail {
    pub dice: [u8; 2],
    pub modifier: i32,
    pub total: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub skill_name: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: LogEntryId,
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "type")]
    pub entry_type: LogEntryType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_id: Option<ParticipantId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub actor_name: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roll: Option<RollDetail>,
}

impl LogEntry {
    pub fn new(
        entry_type: LogEntryType,
        timestamp: DateTime<Utc>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            id: LogEntryId::new(),
            timestamp,
            entry_type,
            actor_id: None,
            actor_name: None,
            message: message.into(),
            roll: None,
        }
    }

    pub fn by(mut self, actor_id: &ParticipantId, actor_name: impl Into<String>) -> Self {
        self.actor_id = Some(actor_id.clone());
        self.actor_name = Some(actor_name.into());
        self
    }

    pub fn with_roll(mut self, roll: RollDetail) -> Self {
        self.roll = Some(roll);
        self
    }
}

/// Whether a roll applies a skill modifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RollKind {
    Skill(String),
    Generic,
}

/// What a dice roll produced, for the caller to display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RollOutcome {
    pub kind: RollKind,
    pub dice: DicePair,
    pub modifier: i32,
    pub total: i32,
    pub bonus_token_granted: bool,
    /// Actor's balance after the roll
    pub interference_tokens: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameplayState {
    pub player_states: BTreeMap<ParticipantId, PlayerState>,
    #[serde(default)]
    pub game_log: Vec<LogEntry>,
    /// Reserved for turn tracking during play; always `None` for now.
    #[serde(default)]
    pub current_turn_player_id: Option<ParticipantId>,
    pub started_at: DateTime<Utc>,
}

impl GameplayState {
    pub fn player(&self, id: &ParticipantId) -> Option<&PlayerState> {
        self.player_states.get(id)
    }

    /// Append an entry, dropping the oldest ones past `max_entries`.
    pub(crate) fn push_log(&mut self, entry: LogEntry, max_entries: Option<usize>) {
        self.game_log.push(entry);
        if let Some(max) = max_entries {
            let excess = self.game_log.len().saturating_sub(max);
            if excess > 0 {
                self.game_log.drain(..excess);
            }
        }
    }
}
