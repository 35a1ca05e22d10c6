//! Gameplay use cases.
//!
//! Starting play, dice rolls, token spending and the GM's edits to player
//! state. Dice are rolled here, through the random port, before the command
//! reaches the session mailbox; the domain only records what was rolled.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use talewright_domain::{
    DicePair, DomainError, GameRules, ParticipantId, RollKind, RollOutcome, Session, SessionId,
};
use tracing::info;

use crate::infrastructure::ports::{ClockPort, RandomPort};
use crate::stores::SessionMailboxes;
use crate::use_cases::dice::roll_pair;
use crate::use_cases::SessionError;

/// Container for gameplay use cases.
pub struct GameplayUseCases {
    pub initiate_gameplay: Arc<InitiateGameplay>,
    pub roll_dice: Arc<RollDice>,
    pub use_interference_token: Arc<UseInterferenceToken>,
    pub edit_player: Arc<EditPlayerState>,
}

impl GameplayUseCases {
    pub fn new(
        initiate_gameplay: Arc<InitiateGameplay>,
        roll_dice: Arc<RollDice>,
        use_interference_token: Arc<UseInterferenceToken>,
        edit_player: Arc<EditPlayerState>,
    ) -> Self {
        Self {
            initiate_gameplay,
            roll_dice,
            use_interference_token,
            edit_player,
        }
    }
}

// =============================================================================
// Initiate
// =============================================================================

/// GM turns the finished setup into live play.
pub struct InitiateGameplay {
    mailboxes: Arc<SessionMailboxes>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<GameRules>,
}

impl InitiateGameplay {
    pub fn new(
        mailboxes: Arc<SessionMailboxes>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<GameRules>,
    ) -> Self {
        Self {
            mailboxes,
            clock,
            rules,
        }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
    ) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let rules = self.rules.clone();
        let session = self
            .mailboxes
            .mutate(session_id, move |s| s.initiate_gameplay(&caller, now, &rules))
            .await?;

        info!(
            session_id = %session_id,
            players = session.gameplay().map(|g| g.player_states.len()).unwrap_or(0),
            "Gameplay started"
        );
        Ok(session)
    }
}

// =============================================================================
// Dice
// =============================================================================

/// A recorded roll and the document it was written to.
#[derive(Debug, Clone)]
pub struct RollResult {
    pub outcome: RollOutcome,
    pub session: Session,
}

/// Skill and plain rolls. Two sixes earn the roller a token.
pub struct RollDice {
    mailboxes: Arc<SessionMailboxes>,
    random: Arc<dyn RandomPort>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<GameRules>,
}

impl RollDice {
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

    /// Roll 2d6 plus the actor's own modifier for `skill_name`.
    pub async fn skill(
        &self,
        session_id: SessionId,
        actor: ParticipantId,
        skill_name: &str,
    ) -> Result<RollResult, SessionError> {
        let skill_name = skill_name.to_string();
        self.roll(session_id, actor, move |s, actor, dice, now, rules| {
            s.roll_skill_dice(actor, &skill_name, dice, now, rules)
        })
        .await
    }

    /// Roll 2d6 with no modifier.
    pub async fn generic(
        &self,
        session_id: SessionId,
        actor: ParticipantId,
    ) -> Result<RollResult, SessionError> {
        self.roll(session_id, actor, |s, actor, dice, now, rules| {
            s.roll_generic_dice(actor, dice, now, rules)
        })
        .await
    }

    async fn roll<F>(
        &self,
        session_id: SessionId,
        actor: ParticipantId,
        record: F,
    ) -> Result<RollResult, SessionError>
    where
        F: FnOnce(&mut Session, &ParticipantId, DicePair, DateTime<Utc>, &GameRules)
                -> Result<RollOutcome, DomainError>
            + Send
            + 'static,
    {
        let dice = roll_pair(self.random.as_ref())?;
        let now = self.clock.now();
        let rules = self.rules.clone();
        let roller = actor.clone();

        let (session, outcome) = self
            .mailboxes
            .submit(session_id, move |s| record(s, &roller, dice, now, rules.as_ref()))
            .await?;

        let skill = match &outcome.kind {
            RollKind::Skill(name) => Some(name.as_str()),
            RollKind::Generic => None,
        };
        info!(
            session_id = %session_id,
            participant_id = %actor,
            skill,
            dice = ?outcome.dice.faces(),
            modifier = outcome.modifier,
            total = outcome.total,
            bonus_token = outcome.bonus_token_granted,
            "Dice rolled"
        );
        Ok(RollResult { outcome, session })
    }
}

// =============================================================================
// Tokens
// =============================================================================

pub struct UseInterferenceToken {
    mailboxes: Arc<SessionMailboxes>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<GameRules>,
}

impl UseInterferenceToken {
    pub fn new(
        mailboxes: Arc<SessionMailboxes>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<GameRules>,
    ) -> Self {
        Self {
            mailboxes,
            clock,
            rules,
        }
    }

    /// Spend one token. Returns the tokens left.
    pub async fn execute(
        &self,
        session_id: SessionId,
        actor: ParticipantId,
    ) -> Result<(u32, Session), SessionError> {
        let now = self.clock.now();
        let rules = self.rules.clone();
        let spender = actor.clone();
        let (session, remaining) = self
            .mailboxes
            .submit(session_id, move |s| s.use_interference_token(&spender, now, &rules))
            .await?;

        info!(
            session_id = %session_id,
            participant_id = %actor,
            remaining,
            "Interference token used"
        );
        Ok((remaining, session))
    }
}

// =============================================================================
// GM edits
// =============================================================================

/// The GM's direct edits to a player's state. Each one is logged in the game log.
pub struct EditPlayerState {
    mailboxes: Arc<SessionMailboxes>,
    clock: Arc<dyn ClockPort>,
    rules: Arc<GameRules>,
}

impl EditPlayerState {
    pub fn new(
        mailboxes: Arc<SessionMailboxes>,
        clock: Arc<dyn ClockPort>,
        rules: Arc<GameRules>,
    ) -> Self {
        Self {
            mailboxes,
            clock,
            rules,
        }
    }

    /// Set current HP, clamped to the player's maximum. Returns the stored value.
    pub async fn set_hp(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
        target: ParticipantId,
        hp: u32,
    ) -> Result<(u32, Session), SessionError> {
        let now = self.clock.now();
        let rules = self.rules.clone();
        let (session, stored) = self
            .mailboxes
            .submit(session_id, move |s| s.set_hp(&caller, &target, hp, now, &rules))
            .await?;
        Ok((stored, session))
    }

    pub async fn set_tokens(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
        target: ParticipantId,
        tokens: u32,
    ) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let rules = self.rules.clone();
        self.mailboxes
            .mutate(session_id, move |s| {
                s.set_tokens(&caller, &target, tokens, now, &rules)
            })
            .await
    }

    pub async fn set_incapacitated(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
        target: ParticipantId,
        incapacitated: bool,
    ) -> Result<Session, SessionError> {
        let now = self.clock.now();
        let rules = self.rules.clone();
        self.mailboxes
            .mutate(session_id, move |s| {
                s.set_incapacitated(&caller, &target, incapacitated, now, &rules)
            })
            .await
    }
}
