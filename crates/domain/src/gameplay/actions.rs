//! Gameplay operations on the session.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};

use crate::aggregates::Session;
use crate::error::DomainError;
use crate::ids::ParticipantId;
use crate::setup::SetupPhase;
use crate::value_objects::{DicePair, GameRules};

use super::{
    GameplayState, LogEntry, LogEntryType, PlayerState, RollDetail, RollKind, RollOutcome,
};

impl Session {
    // =========================================================================
    // Initialisation
    // =========================================================================

    /// GM turns the finished setup into live player states.
    pub fn initiate_gameplay(
        &mut self,
        caller: &ParticipantId,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.ensure_gm(caller, "start gameplay")?;
        self.require_setup_phase(SetupPhase::AwaitingGameStart)?;
        let setup = self.setup_ref()?;

        let pending: Vec<String> = self
            .roster
            .iter()
            .filter(|p| {
                !setup
                    .player_modifier_selection_status
                    .get(&p.id)
                    .is_some_and(|s| s.finalized)
            })
            .map(|p| p.display_name.clone())
            .collect();
        if !pending.is_empty() {
            return Err(DomainError::incomplete(format!(
                "modifiers not finalized by {}",
                pending.join(", ")
            )));
        }

        let player_states: BTreeMap<ParticipantId, PlayerState> = self
            .roster
            .iter()
            .map(|p| {
                let character_name = setup
                    .concept_for(&p.id)
                    .and_then(|c| c.text.as_ref())
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| p.display_name.clone());
                let state = PlayerState {
                    character_name,
                    avatar_url: p.avatar_url.clone(),
                    max_hp: rules.starting_hp,
                    current_hp: rules.starting_hp,
                    assigned_skills: setup
                        .player_skill_modifiers
                        .get(&p.id)
                        .cloned()
                        .unwrap_or_default(),
                    interference_tokens: setup
                        .interference_token_grants
                        .get(&p.id)
                        .copied()
                        .unwrap_or(0),
                    is_incapacitated: false,
                };
                (p.id.clone(), state)
            })
            .collect();

        let mut gameplay = GameplayState {
            player_states,
            game_log: Vec::new(),
            current_turn_player_id: None,
            started_at: now,
        };
        gameplay.push_log(
            LogEntry::new(LogEntryType::System, now, "Session started.")
                .by(&self.gm.id, self.gm.display_name.clone()),
            rules.max_log_entries,
        );
        self.gameplay = Some(gameplay);
        Ok(())
    }

    // =========================================================================
    // Player actions
    // =========================================================================

    /// Roll 2d6 plus the actor's modifier for `skill_name`.
    pub fn roll_skill_dice(
        &mut self,
        actor: &ParticipantId,
        skill_name: &str,
        dice: DicePair,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<RollOutcome, DomainError> {
        self.require_active()?;
        let skill = self
            .setup_ref()?
            .find_skill(skill_name)
            .map(|s| s.name.to_string())
            .ok_or_else(|| DomainError::validation(format!("No skill named '{}'", skill_name.trim())))?;
        self.record_roll(actor, RollKind::Skill(skill), dice, now, rules)
    }

    /// Roll 2d6 with no modifier.
    pub fn roll_generic_dice(
        &mut self,
        actor: &ParticipantId,
        dice: DicePair,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<RollOutcome, DomainError> {
        self.require_active()?;
        self.record_roll(actor, RollKind::Generic, dice, now, rules)
    }

    /// Spend one interference token. Returns the remaining balance.
    pub fn use_interference_token(
        &mut self,
        actor: &ParticipantId,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<u32, DomainError> {
        let gameplay = self.gameplay_mut()?;
        let player = player_mut(gameplay, actor)?;
        if player.interference_tokens == 0 {
            return Err(DomainError::InsufficientResource("interference tokens"));
        }
        player.interference_tokens -= 1;
        let remaining = player.interference_tokens;
        let name = player.character_name.clone();

        gameplay.push_log(
            LogEntry::new(
                LogEntryType::Token,
                now,
                format!("{} used an interference token ({} left)", name, remaining),
            )
            .by(actor, name),
            rules.max_log_entries,
        );
        Ok(remaining)
    }

    // =========================================================================
    // GM edits
    // =========================================================================

    /// Set a character's current HP, clamped to `0..=max_hp`.
    pub fn set_hp(
        &mut self,
        caller: &ParticipantId,
        target: &ParticipantId,
        hp: u32,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<u32, DomainError> {
        self.ensure_gm(caller, "set hit points")?;
        let (gm_id, gm_name) = (self.gm.id.clone(), self.gm.display_name.clone());
        let gameplay = self.gameplay_mut()?;
        let player = player_mut(gameplay, target)?;

        player.current_hp = hp.min(player.max_hp);
        let message = format!(
            "{} set {}'s HP to {}/{}",
            gm_name, player.character_name, player.current_hp, player.max_hp
        );
        let current = player.current_hp;
        gameplay.push_log(
            LogEntry::new(LogEntryType::System, now, message).by(&gm_id, gm_name),
            rules.max_log_entries,
        );
        Ok(current)
    }

    pub fn set_tokens(
        &mut self,
        caller: &ParticipantId,
        target: &ParticipantId,
        tokens: u32,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.ensure_gm(caller, "set interference tokens")?;
        let (gm_id, gm_name) = (self.gm.id.clone(), self.gm.display_name.clone());
        let gameplay = self.gameplay_mut()?;
        let player = player_mut(gameplay, target)?;

        player.interference_tokens = tokens;
        let message = format!(
            "{} set {}'s interference tokens to {}",
            gm_name, player.character_name, tokens
        );
        gameplay.push_log(
            LogEntry::new(LogEntryType::System, now, message).by(&gm_id, gm_name),
            rules.max_log_entries,
        );
        Ok(())
    }

    pub fn set_incapacitated(
        &mut self,
        caller: &ParticipantId,
        target: &ParticipantId,
        incapacitated: bool,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<(), DomainError> {
        self.ensure_gm(caller, "change incapacitation")?;
        let (gm_id, gm_name) = (self.gm.id.clone(), self.gm.display_name.clone());
        let gameplay = self.gameplay_mut()?;
        let player = player_mut(gameplay, target)?;

        player.is_incapacitated = incapacitated;
        let state = if incapacitated {
            "incapacitated"
        } else {
            "able to act"
        };
        let message = format!("{} marked {} as {}", gm_name, player.character_name, state);
        gameplay.push_log(
            LogEntry::new(LogEntryType::System, now, message).by(&gm_id, gm_name),
            rules.max_log_entries,
        );
        Ok(())
    }

    // =========================================================================
    // Helpers
    // =========================================================================

    fn require_active(&self) -> Result<(), DomainError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(DomainError::GameNotActive)
        }
    }

    fn gameplay_mut(&mut self) -> Result<&mut GameplayState, DomainError> {
        self.require_active()?;
        self.gameplay.as_mut().ok_or(DomainError::GameNotActive)
    }

    fn record_roll(
        &mut self,
        actor: &ParticipantId,
        kind: RollKind,
        dice: DicePair,
        now: DateTime<Utc>,
        rules: &GameRules,
    ) -> Result<RollOutcome, DomainError> {
        let gameplay = self.gameplay_mut()?;
        let player = player_mut(gameplay, actor)?;

        let (modifier, skill_name) = match &kind {
            RollKind::Skill(skill) => (player.modifier_for(skill), Some(skill.clone())),
            RollKind::Generic => (0, None),
        };
        let total = dice.sum() + modifier;
        let name = player.character_name.clone();
        // A balance already at the ceiling earns nothing more
        let bonus = dice
            .is_double_six()
            .then(|| player.interference_tokens.checked_add(1))
            .flatten();
        let bonus_token_granted = bonus.is_some();
        if let Some(tokens) = bonus {
            player.interference_tokens = tokens;
        }
        let interference_tokens = player.interference_tokens;

        let (entry_type, message) = match &skill_name {
            Some(skill) => (
                LogEntryType::Roll,
                format!(
                    "{} rolled {}: {} + {} ({:+}) = {}",
                    name,
                    skill,
                    dice.first(),
                    dice.second(),
                    modifier,
                    total
                ),
            ),
            None => (
                LogEntryType::GenericRoll,
                format!("{} rolled {} + {} = {}", name, dice.first(), dice.second(), total),
            ),
        };
        gameplay.push_log(
            LogEntry::new(entry_type, now, message)
                .by(actor, name.clone())
                .with_roll(RollDetail {
                    dice: dice.faces(),
                    modifier,
                    total,
                    skill_name,
                }),
            rules.max_log_entries,
        );
        if bonus_token_granted {
            gameplay.push_log(
                LogEntry::new(
                    LogEntryType::Token,
                    now,
                    format!("{} rolled a double six and gains an interference token", name),
                )
                .by(actor, name),
                rules.max_log_entries,
            );
        }

        Ok(RollOutcome {
            kind,
            dice,
            modifier,
            total,
            bonus_token_granted,
            interference_tokens,
        })
    }
}

fn player_mut<'a>(
    gameplay: &'a mut GameplayState,
    id: &ParticipantId,
) -> Result<&'a mut PlayerState, DomainError> {
    gameplay
        .player_states
        .get_mut(id)
        .ok_or_else(|| DomainError::validation(format!("{} has no character in play", id)))
}
