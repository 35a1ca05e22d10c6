//! House rules for setup and play
//!
//! Every number the sequencer depends on lives here so tests and operators can
//! tune a table without touching the state machine. The defaults reproduce the
//! published rules exactly.

use serde::{Deserialize, Serialize};

/// Default number of player skills split across the whole table
pub const DEFAULT_TOTAL_PLAYER_SKILLS: u32 = 12;

/// Default number of skills the GM adds after the players
pub const DEFAULT_GM_SKILL_CAP: u32 = 4;

/// Default hit points for every character
pub const DEFAULT_STARTING_HP: u32 = 10;

/// Default first rank (0-indexed) that receives an interference token at setup
pub const DEFAULT_TOKEN_GRANT_FROM_RANK: usize = 3;

fn default_modifier_values() -> Vec<i32> {
    vec![2, 1, -1, -2]
}

/// Tunable rule constants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameRules {
    // ============================================================================
    // Skills
    // ============================================================================
    /// Player skills shared across all players, partitioned by skill-roll rank
    pub total_player_skills: u32,

    /// Skills the GM defines once the players are done
    pub gm_skill_cap: u32,

    /// Each player assigns every one of these exactly once
    #[serde(default = "default_modifier_values")]
    pub modifier_values: Vec<i32>,

    // ============================================================================
    // Characters
    // ============================================================================
    pub starting_hp: u32,

    /// Players ranked at or after this index in the first roll start with a token
    pub token_grant_from_rank: usize,

    // ============================================================================
    // Log
    // ============================================================================
    /// Oldest entries are dropped past this length. `None` keeps everything.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_log_entries: Option<usize>,
}

impl GameRules {
    /// Whether `value` is one of the assignable modifier values
    pub fn is_modifier_value(&self, value: i32) -> bool {
        self.modifier_values.contains(&value)
    }

    pub fn with_max_log_entries(mut self, max: Option<usize>) -> Self {
        self.max_log_entries = max;
        self
    }
}

impl Default for GameRules {
    fn default() -> Self {
        Self {
            total_player_skills: DEFAULT_TOTAL_PLAYER_SKILLS,
            gm_skill_cap: DEFAULT_GM_SKILL_CAP,
            modifier_values: default_modifier_values(),
            starting_hp: DEFAULT_STARTING_HP,
            token_grant_from_rank: DEFAULT_TOKEN_GRANT_FROM_RANK,
            max_log_entries: None,
        }
    }
}
