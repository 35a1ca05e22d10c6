//! Modifier assignment, done by every player at once.

use std::sync::Arc;

use talewright_domain::{GameRules, ParticipantId, Session, SessionId};

use super::run_step;
use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

pub struct AssignSkillModifier {
    mailboxes: Arc<SessionMailboxes>,
    rules: Arc<GameRules>,
}

impl AssignSkillModifier {
    pub fn new(mailboxes: Arc<SessionMailboxes>, rules: Arc<GameRules>) -> Self {
        Self { mailboxes, rules }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        skill_name: &str,
        value: i32,
    ) -> Result<Session, SessionError> {
        let skill_name = skill_name.to_string();
        let rules = self.rules.clone();
        run_step(&self.mailboxes, session_id, "assign modifier", move |s| {
            s.assign_skill_modifier(&participant_id, &skill_name, value, &rules)
        })
        .await
    }
}

pub struct FinalizeSkillModifiers {
    mailboxes: Arc<SessionMailboxes>,
    rules: Arc<GameRules>,
}

impl FinalizeSkillModifiers {
    pub fn new(mailboxes: Arc<SessionMailboxes>, rules: Arc<GameRules>) -> Self {
        Self { mailboxes, rules }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
    ) -> Result<Session, SessionError> {
        let rules = self.rules.clone();
        run_step(&self.mailboxes, session_id, "finalize modifiers", move |s| {
            s.finalize_skill_modifiers(&participant_id, &rules)
        })
        .await
    }
}
