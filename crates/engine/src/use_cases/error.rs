//! Error returned by every session use case.

use talewright_domain::{DomainError, SessionId};

use crate::infrastructure::ports::RepoError;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The session document does not exist (bad id, or deleted concurrently).
    #[error("Session not found: {0}")]
    SessionNotFound(SessionId),

    /// A game rule rejected the operation; nothing was written.
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Store error: {0}")]
    Repo(#[from] RepoError),

    /// The session's mailbox could not accept or answer the command.
    #[error("Session is unavailable")]
    Unavailable,
}

impl SessionError {
    /// Map a store error for `id`, turning a missing document into
    /// [`SessionError::SessionNotFound`].
    pub fn from_repo(id: SessionId, err: RepoError) -> Self {
        if err.is_not_found() {
            Self::SessionNotFound(id)
        } else {
            Self::Repo(err)
        }
    }

    /// The rule violation behind this error, if any.
    pub fn domain(&self) -> Option<&DomainError> {
        match self {
            Self::Domain(err) => Some(err),
            _ => None,
        }
    }
}
