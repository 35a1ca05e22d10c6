//! GM skill definition, capped by the table rules.

use std::sync::Arc;

use talewright_domain::{GameRules, ParticipantId, Session, SessionId, SkillName};

use super::run_step;
use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

pub struct AddGmSkill {
    mailboxes: Arc<SessionMailboxes>,
    rules: Arc<GameRules>,
}

impl AddGmSkill {
    pub fn new(mailboxes: Arc<SessionMailboxes>, rules: Arc<GameRules>) -> Self {
        Self { mailboxes, rules }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
        name: &str,
    ) -> Result<Session, SessionError> {
        let name = SkillName::new(name)?;
        let rules = self.rules.clone();
        run_step(&self.mailboxes, session_id, "add GM skill", move |s| {
            s.add_gm_skill(&caller, name, &rules)
        })
        .await
    }
}

pub struct RemoveGmSkill {
    mailboxes: Arc<SessionMailboxes>,
}

impl RemoveGmSkill {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
        name: &str,
    ) -> Result<Session, SessionError> {
        let name = name.to_string();
        run_step(&self.mailboxes, session_id, "remove GM skill", move |s| {
            s.remove_gm_skill(&caller, &name)
        })
        .await
    }
}

/// Close skill definition. Requires exactly the capped number of GM skills.
pub struct FinalizeGmSkills {
    mailboxes: Arc<SessionMailboxes>,
    rules: Arc<GameRules>,
}

impl FinalizeGmSkills {
    pub fn new(mailboxes: Arc<SessionMailboxes>, rules: Arc<GameRules>) -> Self {
        Self { mailboxes, rules }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
    ) -> Result<Session, SessionError> {
        let rules = self.rules.clone();
        run_step(&self.mailboxes, session_id, "finalize GM skills", move |s| {
            s.finalize_gm_skills(&caller, &rules)
        })
        .await
    }
}
