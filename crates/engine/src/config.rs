//! Engine configuration loaded from the environment.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `TALEWRIGHT_TOTAL_PLAYER_SKILLS` | 12 |
//! | `TALEWRIGHT_GM_SKILL_CAP` | 4 |
//! | `TALEWRIGHT_MODIFIER_VALUES` | `2,1,-1,-2` |
//! | `TALEWRIGHT_STARTING_HP` | 10 |
//! | `TALEWRIGHT_TOKEN_GRANT_FROM_RANK` | 3 |
//! | `TALEWRIGHT_MAX_LOG_ENTRIES` | unset (unbounded) |
//! | `TALEWRIGHT_STALE_SESSION_HOURS` | 72 |
//! | `TALEWRIGHT_SWEEP_INTERVAL_SECS` | 900 |
//! | `TALEWRIGHT_MAILBOX_CAPACITY` | 64 |

use std::collections::HashSet;
use std::str::FromStr;
use std::time::Duration;

use talewright_domain::GameRules;

pub const DEFAULT_STALE_SESSION_HOURS: i64 = 72;
pub const DEFAULT_SWEEP_INTERVAL_SECS: u64 = 15 * 60;
pub const DEFAULT_MAILBOX_CAPACITY: usize = 64;

#[derive(Debug, Clone, PartialEq)]
pub struct EngineConfig {
    pub rules: GameRules,
    /// Empty sessions whose GM has been away longer than this are swept
    pub stale_session_after: chrono::Duration,
    pub sweep_interval: Duration,
    /// Commands queued per session before submitters wait
    pub mailbox_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            rules: GameRules::default(),
            stale_session_after: chrono::Duration::hours(DEFAULT_STALE_SESSION_HOURS),
            sweep_interval: Duration::from_secs(DEFAULT_SWEEP_INTERVAL_SECS),
            mailbox_capacity: DEFAULT_MAILBOX_CAPACITY,
        }
    }
}

impl EngineConfig {
    /// Read `TALEWRIGHT_*` variables from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup. Missing keys use defaults; unparsable ones
    /// are logged and also use defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let rules = GameRules {
            total_player_skills: parse_or(
                &lookup,
                "TALEWRIGHT_TOTAL_PLAYER_SKILLS",
                defaults.rules.total_player_skills,
            ),
            gm_skill_cap: parse_or(&lookup, "TALEWRIGHT_GM_SKILL_CAP", defaults.rules.gm_skill_cap),
            modifier_values: parse_modifier_values(&lookup)
                .unwrap_or(defaults.rules.modifier_values),
            starting_hp: parse_or(&lookup, "TALEWRIGHT_STARTING_HP", defaults.rules.starting_hp),
            token_grant_from_rank: parse_or(
                &lookup,
                "TALEWRIGHT_TOKEN_GRANT_FROM_RANK",
                defaults.rules.token_grant_from_rank,
            ),
            max_log_entries: lookup("TALEWRIGHT_MAX_LOG_ENTRIES")
                .and_then(|raw| parse_value::<usize>("TALEWRIGHT_MAX_LOG_ENTRIES", &raw))
                .filter(|max| *max > 0),
        };

        let stale_hours = parse_or(
            &lookup,
            "TALEWRIGHT_STALE_SESSION_HOURS",
            DEFAULT_STALE_SESSION_HOURS,
        );
        let stale_session_after = chrono::Duration::try_hours(stale_hours.max(0))
            .unwrap_or_else(|| {
                tracing::warn!(
                    key = "TALEWRIGHT_STALE_SESSION_HOURS",
                    value = stale_hours,
                    "Stale session threshold out of range, using default"
                );
                defaults.stale_session_after
            });
        let sweep_secs = parse_or(
            &lookup,
            "TALEWRIGHT_SWEEP_INTERVAL_SECS",
            DEFAULT_SWEEP_INTERVAL_SECS,
        );
        let mailbox_capacity = parse_or(
            &lookup,
            "TALEWRIGHT_MAILBOX_CAPACITY",
            DEFAULT_MAILBOX_CAPACITY,
        );

        Self {
            rules,
            stale_session_after,
            sweep_interval: Duration::from_secs(sweep_secs.max(1)),
            mailbox_capacity: mailbox_capacity.max(1),
        }
    }
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    match raw.trim().parse() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!(key, value = raw, "Ignoring unparsable config value");
            None
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|raw| parse_value(key, &raw))
        .unwrap_or(default)
}

fn parse_modifier_values(lookup: &impl Fn(&str) -> Option<String>) -> Option<Vec<i32>> {
    const KEY: &str = "TALEWRIGHT_MODIFIER_VALUES";
    let raw = lookup(KEY)?;
    let values: Option<Vec<i32>> = raw.split(',').map(|v| parse_value(KEY, v)).collect();
    match values {
        Some(values) if is_usable_modifier_set(&values) => Some(values),
        _ => {
            tracing::warn!(key = KEY, value = %raw, "Ignoring invalid modifier values");
            None
        }
    }
}

/// Non-empty, no zero, no repeats.
fn is_usable_modifier_set(values: &[i32]) -> bool {
    let distinct: HashSet<i32> = values.iter().copied().collect();
    !values.is_empty() && !values.contains(&0) && distinct.len() == values.len()
}
