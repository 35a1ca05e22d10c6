//! Housekeeping: removing abandoned sessions.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use talewright_domain::SessionId;
use tracing::{info, warn};

use crate::infrastructure::ports::SessionRepo;
use crate::stores::SessionMailboxes;
use crate::use_cases::SessionError;

/// Container for maintenance use cases.
pub struct MaintenanceUseCases {
    pub sweep_stale_sessions: Arc<SweepStaleSessions>,
}

impl MaintenanceUseCases {
    pub fn new(sweep_stale_sessions: Arc<SweepStaleSessions>) -> Self {
        Self {
            sweep_stale_sessions,
        }
    }
}

/// Delete sessions nobody is in whose GM has not been seen for `threshold`.
///
/// Candidates are found from a listing, but each deletion is decided again
/// inside the session's mailbox, so a player joining or a GM heartbeat that
/// lands first keeps the session alive.
pub struct SweepStaleSessions {
    repo: Arc<dyn SessionRepo>,
    mailboxes: Arc<SessionMailboxes>,
    threshold: Duration,
}

impl SweepStaleSessions {
    pub fn new(
        repo: Arc<dyn SessionRepo>,
        mailboxes: Arc<SessionMailboxes>,
        threshold: Duration,
    ) -> Self {
        Self {
            repo,
            mailboxes,
            threshold,
        }
    }

    /// Returns the ids that were deleted.
    pub async fn execute(&self, now: DateTime<Utc>) -> Result<Vec<SessionId>, SessionError> {
        let threshold = self.threshold;
        let candidates: Vec<SessionId> = self
            .repo
            .list_all()
            .await?
            .into_iter()
            .filter(|s| s.is_stale(now, threshold))
            .map(|s| s.id())
            .collect();

        let mut deleted = Vec::new();
        for id in candidates {
            match self
                .mailboxes
                .delete_if(id, move |s| s.is_stale(now, threshold))
                .await
            {
                Ok(true) => deleted.push(id),
                Ok(false) => {}
                Err(e) => warn!(session_id = %id, error = %e, "Failed to sweep session"),
            }
        }

        if !deleted.is_empty() {
            info!(count = deleted.len(), "Swept stale sessions");
        }
        Ok(deleted)
    }
}
