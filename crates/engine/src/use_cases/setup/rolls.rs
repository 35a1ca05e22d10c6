//! Initiative and skill dice rolls.
//!
//! Clients may report the total they rolled; without one the server rolls
//! two dice. The last roll from a participant replaces any earlier one.

use std::sync::Arc;

use talewright_domain::{GameRules, ParticipantId, Session, SessionId};

use super::run_step;
use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::stores::SessionMailboxes;
use crate::use_cases::dice::resolve_total;
use crate::use_cases::SessionError;

/// Result of a setup roll.
#[derive(Debug, Clone)]
pub struct RollSubmitted {
    /// The value that was recorded
    pub value: i32,
    pub session: Session,
}

/// Roll for position in the definition order.
pub struct SubmitPlayerRoll {
    mailboxes: Arc<SessionMailboxes>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<GameRules>,
}

impl SubmitPlayerRoll {
    pub fn new(
        mailboxes: Arc<SessionMailboxes>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<GameRules>,
    ) -> Self {
        Self {
            mailboxes,
            random,
            clock,
            rules,
        }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        client_roll: Option<i32>,
    ) -> Result<RollSubmitted, SessionError> {
        let value = resolve_total(self.random.as_ref(), client_roll)?;
        let now = self.clock.now();
        let rules = self.rules.clone();

        let session = run_step(&self.mailboxes, session_id, "player roll", move |s| {
            s.submit_player_roll(&participant_id, value, now, &rules)
        })
        .await?;
        Ok(RollSubmitted { value, session })
    }
}

/// Roll that decides the order and quota for proposing player skills.
pub struct SubmitSkillRoll {
    mailboxes: Arc<SessionMailboxes>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<GameRules>,
}

impl SubmitSkillRoll {
    pub fn new(
        mailboxes: Arc<SessionMailboxes>,
        random: Arc<dyn RandomPort>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<GameRules>,
    ) -> Self {
        Self {
            mailboxes,
            random,
            clock,
            rules,
        }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        client_roll: Option<i32>,
    ) -> Result<RollSubmitted, SessionError> {
        let value = resolve_total(self.random.as_ref(), client_roll)?;
        let now = self.clock.now();
        let rules = self.rules.clone();

        let session = run_step(&self.mailboxes, session_id, "skill roll", move |s| {
            s.submit_skill_roll(&participant_id, value, now, &rules)
        })
        .await?;
        Ok(RollSubmitted { value, session })
    }
}
