//! World building: genre, adjective and location, then one truth per player.

use std::sync::Arc;

use talewright_domain::{EntryText, ParticipantId, Session, SessionId, WorldSlot};

use super::run_step;
use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

pub struct SubmitWorldDefinition {
    mailboxes: Arc<SessionMailboxes>,
}

impl SubmitWorldDefinition {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    /// Fill `slot` if it is the caller's turn and the slot's phase is open.
    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
        slot: WorldSlot,
        value: &str,
    ) -> Result<Session, SessionError> {
        let value = EntryText::new(value)?;
        run_step(&self.mailboxes, session_id, "world definition", move |s| {
            s.submit_world_definition(&participant_id, slot, value)
        })
        .await
    }
}

pub struct SubmitWorldTruth {
    mailboxes: Arc<SessionMailboxes>,
}

impl SubmitWorldTruth {
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
        run_step(&self.mailboxes, session_id, "world truth", move |s| {
            s.submit_world_truth(&participant_id, text)
        })
        .await
    }
}
