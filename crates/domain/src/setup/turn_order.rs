//! Turn-order derivation and skill quota partition.
//!
//! Both are pure functions over roll lists so they can be recomputed at any
//! time from the document.

use std::collections::BTreeMap;

use crate::ids::ParticipantId;
use crate::value_objects::GameRules;

use super::RollEntry;

/// Result of ranking the first roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TurnOrder {
    pub order: Vec<ParticipantId>,
    /// Participants starting play with bonus interference tokens
    pub token_grants: BTreeMap<ParticipantId, u32>,
}

/// Highest value first; ties go to whoever rolled earliest.
pub fn rank_rolls(rolls: &[RollEntry]) -> Vec<ParticipantId> {
    let mut ranked: Vec<&RollEntry> = rolls.iter().collect();
    // sort_by is stable, so identical timestamps keep submission order
    ranked.sort_by(|a, b| {
        b.value
            .cmp(&a.value)
            .then_with(|| a.rolled_at.cmp(&b.rolled_at))
    });
    ranked
        .into_iter()
        .map(|r| r.participant_id.clone())
        .collect()
}

/// Rank the rolls and grant one token to everyone at or after
/// `rules.token_grant_from_rank`.
pub fn derive_order(rolls: &[RollEntry], rules: &GameRules) -> TurnOrder {
    let order = rank_rolls(rolls);
    let token_grants = order
        .iter()
        .enumerate()
        .filter(|(rank, _)| *rank >= rules.token_grant_from_rank)
        .map(|(_, id)| (id.clone(), 1))
        .collect();
    TurnOrder {
        order,
        token_grants,
    }
}

/// Split `total` across `ranking`: everyone gets `total / n`, and the first
/// `total % n` ranked participants get one more.
pub fn partition_quota(total: u32, ranking: &[ParticipantId]) -> Vec<(ParticipantId, u32)> {
    if ranking.is_empty() {
        return Vec::new();
    }
    let n = ranking.len() as u32;
    let base = total / n;
    let remainder = (total % n) as usize;
    ranking
        .iter()
        .enumerate()
        .map(|(rank, id)| {
            let extra = u32::from(rank < remainder);
            (id.clone(), base + extra)
        })
        .collect()
}
