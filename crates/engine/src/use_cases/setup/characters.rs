//! Character concepts and the players' shared skill list.

use std::sync::Arc;

use talewright_domain::{EntryText, ParticipantId, Session, SessionId, SkillName};

use super::run_step;
use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

/// Everyone writes a concept at once; a repeat submission changes nothing.
pub struct SubmitCharacterConcept {
    mailboxes: Arc<SessionMailboxes>,
}

impl SubmitCharacterConcept {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        text: &str,
    ) -> Result<Session, SessionError> {
        let text = EntryText::new(text)?;
        run_step(&self.mailboxes, session_id, "character concept", move |s| {
            s.submit_character_concept(&participant_id, text)
        })
        .await
    }
}

pub struct AddPlayerSkill {
    mailboxes: Arc<SessionMailboxes>,
}

impl AddPlayerSkill {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        name: &str,
    ) -> Result<Session, SessionError> {
        let name = SkillName::new(name)?;
        run_step(&self.mailboxes, session_id, "add player skill", move |s| {
            s.add_player_skill(&participant_id, name)
        })
        .await
    }
}

/// Withdraw one of the caller's own skills while their turn is open.
pub struct RemovePlayerSkill {
    mailboxes: Arc<SessionMailboxes>,
}

impl RemovePlayerSkill {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        name: &str,
    ) -> Result<Session, SessionError> {
        let name = name.to_string();
        run_step(&self.mailboxes, session_id, "remove player skill", move |s| {
            s.remove_player_skill(&participant_id, &name)
        })
        .await
    }
}

pub struct FinalizePlayerSkills {
    mailboxes: Arc<SessionMailboxes>,
}

impl FinalizePlayerSkills {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
    ) -> Result<Session, SessionError> {
        run_step(&self.mailboxes, session_id, "finalize player skills", move |s| {
            s.finalize_player_skills(&participant_id)
        })
        .await
    }
}
