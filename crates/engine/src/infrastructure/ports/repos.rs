//! Repository port for session documents.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use talewright_domain::{Session, SessionId, SessionStatus};
use tokio::sync::broadcast;

use super::error::RepoError;

// =============================================================================
// Document Store Types
// =============================================================================

/// Targeted write of one field, addressed by a dot path into the document
/// (`gmLastSeenAt`, `gameplay.playerStates.<id>.currentHp`).
#[derive(Debug, Clone, PartialEq)]
pub struct FieldUpdate {
    pub path: String,
    pub value: Value,
}

impl FieldUpdate {
    pub fn new(path: impl Into<String>, value: Value) -> Self {
        Self {
            path: path.into(),
            value,
        }
    }
}

/// Pushed to subscribers after every write. Updates carry the whole document.
#[derive(Debug, Clone)]
pub enum SessionEvent {
    Updated(Arc<Session>),
    Deleted(SessionId),
}

// =============================================================================
// Session Storage
// =============================================================================

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SessionRepo: Send + Sync {
    // CRUD
    async fn get(&self, id: SessionId) -> Result<Option<Session>, RepoError>;
    /// Overwrite the whole document.
    async fn save(&self, session: &Session) -> Result<(), RepoError>;
    /// Merge the given fields into the stored document and return the result.
    async fn update_fields(
        &self,
        id: SessionId,
        updates: Vec<FieldUpdate>,
    ) -> Result<Session, RepoError>;
    /// Returns whether a document was removed.
    async fn delete(&self, id: SessionId) -> Result<bool, RepoError>;

    // Queries
    async fn list_by_status(&self, status: SessionStatus) -> Result<Vec<Session>, RepoError>;
    async fn list_all(&self) -> Result<Vec<Session>, RepoError>;

    // Live updates
    /// Dropping the receiver unsubscribes.
    async fn subscribe(&self, id: SessionId)
        -> Result<broadcast::Receiver<SessionEvent>, RepoError>;
}
