//! Lobby use cases.
//!
//! Everything that happens before setup begins: opening a table, players
//! coming and going, the GM starting the game, and the GM presence heartbeat
//! the stale-session sweep relies on.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use talewright_domain::{ParticipantId, ParticipantProfile, Session, SessionId, SessionName};
use tracing::info;

use crate::infrastructure::ports::{ClockPort, FieldUpdate, SessionRepo};
use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

/// Container for lobby use cases.
pub struct LobbyUseCases {
    pub create_session: Arc<CreateSession>,
    pub join_session: Arc<JoinSession>,
    pub leave_session: Arc<LeaveSession>,
    pub start_game: Arc<StartGame>,
    pub record_gm_presence: Arc<RecordGmPresence>,
}

impl LobbyUseCases {
    pub fn new(
        create_session: Arc<CreateSession>,
        join_session: Arc<JoinSession>,
        leave_session: Arc<LeaveSession>,
        start_game: Arc<StartGame>,
        record_gm_presence: Arc<RecordGmPresence>,
    ) -> Self {
        Self {
            create_session,
            join_session,
            leave_session,
            start_game,
            record_gm_presence,
        }
    }
}

// =============================================================================
// Create
// =============================================================================

/// Open a new lobby owned by the calling GM.
pub struct CreateSession {
    repo: Arc<dyn SessionRepo>,
    clock: Arc<dyn ClockPort>,
}

impl CreateSession {
    pub fn new(repo: Arc<dyn SessionRepo>, clock: Arc<dyn ClockPort>) -> Self {
        Self { repo, clock }
    }

    pub async fn execute(
        &self,
        gm: ParticipantProfile,
        name: &str,
    ) -> Result<Session, SessionError> {
        let name = SessionName::new(name)?;
        let session = Session::new(name, gm, self.clock.now());
        self.repo.save(&session).await?;

        info!(
            session_id = %session.id(),
            gm_id = %session.gm_id(),
            "Session created"
        );
        Ok(session)
    }
}

// =============================================================================
// Join / Leave
// =============================================================================

pub struct JoinSession {
    mailboxes: Arc<SessionMailboxes>,
}

impl JoinSession {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    /// Add the player to the lobby. Joining again refreshes their profile.
    pub async fn execute(
        &self,
        session_id: SessionId,
        profile: ParticipantProfile,
    ) -> Result<Session, SessionError> {
        let participant_id = profile.id.clone();
        let session = self
            .mailboxes
            .mutate(session_id, move |s| s.join(profile))
            .await?;

        info!(
            session_id = %session_id,
            participant_id = %participant_id,
            roster_size = session.roster().len(),
            "Player joined session"
        );
        Ok(session)
    }
}

pub struct LeaveSession {
    mailboxes: Arc<SessionMailboxes>,
}

impl LeaveSession {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        participant_id: ParticipantId,
    ) -> Result<Session, SessionError> {
        let leaving = participant_id.clone();
        let session = self
            .mailboxes
            .mutate(session_id, move |s| s.leave(&leaving))
            .await?;

        info!(
            session_id = %session_id,
            participant_id = %participant_id,
            roster_size = session.roster().len(),
            "Player left session"
        );
        Ok(session)
    }
}

// =============================================================================
// Start
// =============================================================================

/// GM moves the lobby into setup.
pub struct StartGame {
    mailboxes: Arc<SessionMailboxes>,
}

impl StartGame {
    pub fn new(mailboxes: Arc<SessionMailboxes>) -> Self {
        Self { mailboxes }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
    ) -> Result<Session, SessionError> {
        let session = self
            .mailboxes
            .mutate(session_id, move |s| s.start_game(&caller))
            .await?;

        info!(
            session_id = %session_id,
            players = session.roster().len(),
            phase = %session.phase_label(),
            "Game started"
        );
        Ok(session)
    }
}

// =============================================================================
// GM presence
// =============================================================================

/// Heartbeat from the GM's client.
///
/// Only the presence field is written, as a targeted field update, so a
/// heartbeat never rewrites the rest of the document.
pub struct RecordGmPresence {
    mailboxes: Arc<SessionMailboxes>,
    clock: Arc<dyn ClockPort>,
}

impl RecordGmPresence {
    pub fn new(mailboxes: Arc<SessionMailboxes>, clock: Arc<dyn ClockPort>) -> Self {
        Self { mailboxes, clock }
    }

    pub async fn execute(
        &self,
        session_id: SessionId,
        caller: ParticipantId,
    ) -> Result<DateTime<Utc>, SessionError> {
        let now = self.clock.now();
        let value = serde_json::to_value(now)
            .map_err(|e| SessionError::Repo(e.into()))?;

        self.mailboxes
            .patch(
                session_id,
                move |s| s.ensure_gm(&caller, "report GM presence"),
                vec![FieldUpdate::new(Session::GM_LAST_SEEN_FIELD, value)],
            )
            .await?;
        Ok(now)
    }
}
