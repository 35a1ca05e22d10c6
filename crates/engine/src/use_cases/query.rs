//! Read side: fetch a session or follow its changes.

use std::sync::Arc;

use talewright_domain::{Session, SessionId};
use tokio::sync::broadcast;

use crate::infrastructure::ports::{SessionEvent, SessionRepo};
use crate::use_cases::SessionError;

/// Container for read-side use cases.
pub struct QueryUseCases {
    pub get_session: Arc<GetSession>,
    pub watch_session: Arc<WatchSession>,
}

impl QueryUseCases {
    pub fn new(get_session: Arc<GetSession>, watch_session: Arc<WatchSession>) -> Self {
        Self {
            get_session,
            watch_session,
        }
    }
}

pub struct GetSession {
    repo: Arc<dyn SessionRepo>,
}

impl GetSession {
    pub fn new(repo: Arc<dyn SessionRepo>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, session_id: SessionId) -> Result<Session, SessionError> {
        self.repo
            .get(session_id)
            .await
            .map_err(|e| SessionError::from_repo(session_id, e))?
            .ok_or(SessionError::SessionNotFound(session_id))
    }
}

/// A snapshot plus every whole-document change after it.
pub struct SessionWatch {
    pub snapshot: Session,
    pub events: broadcast::Receiver<SessionEvent>,
}

pub struct WatchSession {
    repo: Arc<dyn SessionRepo>,
}

impl WatchSession {
    pub fn new(repo: Arc<dyn SessionRepo>) -> Self {
        Self { repo }
    }

    /// Subscribe before reading so no write lands between the snapshot and
    /// the first event. Dropping `events` unsubscribes.
    pub async fn execute(&self, session_id: SessionId) -> Result<SessionWatch, SessionError> {
        let events = self
            .repo
            .subscribe(session_id)
            .await
            .map_err(|e| SessionError::from_repo(session_id, e))?;
        let snapshot = self
            .repo
            .get(session_id)
            .await
            .map_err(|e| SessionError::from_repo(session_id, e))?
            .ok_or(SessionError::SessionNotFound(session_id))?;
        Ok(SessionWatch { snapshot, events })
    }
}
