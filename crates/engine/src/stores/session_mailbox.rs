//! Per-session mutation actors.
//!
//! Every write to a session document goes through that session's mailbox: a
//! bounded `mpsc` queue drained by one tokio task. The task re-reads the
//! document, applies the command to a working copy and persists only when the
//! command succeeds, so writes to one session never interleave.
//!
//! A mailbox lives until it is retired (its session was deleted or never
//! existed) and its queue has drained. If a send finds the task gone, the stale handle is replaced and
//! the command is resent once.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use talewright_domain::{DomainError, Session, SessionId};
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, warn};

use crate::infrastructure::ports::{FieldUpdate, SessionRepo};
use crate::use_cases::SessionError;

type Mutation = Box<dyn FnOnce(&mut Session) -> Result<(), DomainError> + Send>;
type Guard = Box<dyn FnOnce(&Session) -> Result<(), DomainError> + Send>;
type Predicate = Box<dyn FnOnce(&Session) -> bool + Send>;

enum SessionCommand {
    /// Apply a rule-checked change to the whole document.
    Mutate {
        mutation: Mutation,
        reply: oneshot::Sender<Result<Session, SessionError>>,
    },
    /// Check the document, then write individual fields.
    Patch {
        guard: Guard,
        updates: Vec<FieldUpdate>,
        reply: oneshot::Sender<Result<Session, SessionError>>,
    },
    /// Delete the document if it still satisfies the predicate.
    DeleteIf {
        predicate: Predicate,
        reply: oneshot::Sender<Result<bool, SessionError>>,
    },
}

struct MailboxHandle {
    generation: u64,
    sender: mpsc::Sender<SessionCommand>,
}

/// Registry of running session mailboxes.
pub struct SessionMailboxes {
    repo: Arc<dyn SessionRepo>,
    handles: DashMap<SessionId, MailboxHandle>,
    next_generation: AtomicU64,
    capacity: usize,
}

impl SessionMailboxes {
    pub fn new(repo: Arc<dyn SessionRepo>, capacity: usize) -> Self {
        Self {
            repo,
            handles: DashMap::new(),
            next_generation: AtomicU64::new(0),
            capacity: capacity.max(1),
        }
    }

    /// Number of sessions with a live mailbox.
    pub fn active(&self) -> usize {
        self.handles.len()
    }

    /// Run `f` against the current document and persist the result.
    ///
    /// Returns the saved document together with whatever `f` produced. When
    /// `f` fails the document is left untouched.
    pub async fn submit<R, F>(&self, id: SessionId, f: F) -> Result<(Session, R), SessionError>
    where
        R: Send + 'static,
        F: FnOnce(&mut Session) -> Result<R, DomainError> + Send + 'static,
    {
        let (value_tx, value_rx) = oneshot::channel();
        let mutation: Mutation = Box::new(move |session| {
            let value = f(session)?;
            let _ = value_tx.send(value);
            Ok(())
        });

        let (reply, response) = oneshot::channel();
        let generation = self
            .dispatch(id, SessionCommand::Mutate { mutation, reply })
            .await?;
        let result = response.await.map_err(|_| SessionError::Unavailable)?;
        let session = self.forget_if_missing(id, generation, result)?;
        let value = value_rx.await.map_err(|_| SessionError::Unavailable)?;
        Ok((session, value))
    }

    /// Like [`submit`](Self::submit) for mutations with nothing to return.
    pub async fn mutate<F>(&self, id: SessionId, f: F) -> Result<Session, SessionError>
    where
        F: FnOnce(&mut Session) -> Result<(), DomainError> + Send + 'static,
    {
        self.submit(id, f).await.map(|(session, ())| session)
    }

    /// Write individual fields once `guard` accepts the current document.
    pub async fn patch<G>(
        &self,
        id: SessionId,
        guard: G,
        updates: Vec<FieldUpdate>,
    ) -> Result<Session, SessionError>
    where
        G: FnOnce(&Session) -> Result<(), DomainError> + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let generation = self
            .dispatch(
                id,
                SessionCommand::Patch {
                    guard: Box::new(guard),
                    updates,
                    reply,
                },
            )
            .await?;
        let result = response.await.map_err(|_| SessionError::Unavailable)?;
        self.forget_if_missing(id, generation, result)
    }

    /// Delete the session if `predicate` still holds when the mailbox gets to
    /// it. A deleted session's mailbox is retired.
    pub async fn delete_if<P>(&self, id: SessionId, predicate: P) -> Result<bool, SessionError>
    where
        P: FnOnce(&Session) -> bool + Send + 'static,
    {
        let (reply, response) = oneshot::channel();
        let generation = self
            .dispatch(
                id,
                SessionCommand::DeleteIf {
                    predicate: Box::new(predicate),
                    reply,
                },
            )
            .await?;
        let result = response.await.map_err(|_| SessionError::Unavailable)?;
        match self.forget_if_missing(id, generation, result) {
            Ok(true) => {
                self.retire(id);
                Ok(true)
            }
            Ok(false) | Err(SessionError::SessionNotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Drop the handle so the task exits once its queue drains.
    pub fn retire(&self, id: SessionId) {
        if self.handles.remove(&id).is_some() {
            debug!(session_id = %id, "Session mailbox retired");
        }
    }

    /// Drop the mailbox that answered `SessionNotFound`, unless a newer one
    /// has already replaced it.
    fn forget_if_missing<T>(
        &self,
        id: SessionId,
        generation: u64,
        result: Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        if matches!(result, Err(SessionError::SessionNotFound(_)))
            && self
                .handles
                .remove_if(&id, |_, handle| handle.generation == generation)
                .is_some()
        {
            debug!(session_id = %id, generation, "Session mailbox retired, no such session");
        }
        result
    }

    /// Send `command` to the session's mailbox and return the generation
    /// that accepted it.
    async fn dispatch(&self, id: SessionId, command: SessionCommand) -> Result<u64, SessionError> {
        let mut command = command;
        for _ in 0..2 {
            let (generation, sender) = self.sender_for(id);
            match sender.send(command).await {
                Ok(()) => return Ok(generation),
                Err(mpsc::error::SendError(returned)) => {
                    warn!(session_id = %id, generation, "Session mailbox closed, respawning");
                    self.handles
                        .remove_if(&id, |_, handle| handle.generation == generation);
                    command = returned;
                }
            }
        }
        Err(SessionError::Unavailable)
    }

    fn sender_for(&self, id: SessionId) -> (u64, mpsc::Sender<SessionCommand>) {
        let handle = self.handles.entry(id).or_insert_with(|| self.spawn(id));
        (handle.generation, handle.sender.clone())
    }

    fn spawn(&self, id: SessionId) -> MailboxHandle {
        let (sender, receiver) = mpsc::channel(self.capacity);
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        tokio::spawn(session_task(id, self.repo.clone(), receiver));
        debug!(session_id = %id, generation, "Session mailbox started");
        MailboxHandle { generation, sender }
    }
}

async fn session_task(
    id: SessionId,
    repo: Arc<dyn SessionRepo>,
    mut commands: mpsc::Receiver<SessionCommand>,
) {
    while let Some(command) = commands.recv().await {
        match command {
            SessionCommand::Mutate { mutation, reply } => {
                let result = apply_mutation(id, repo.as_ref(), mutation).await;
                let _ = reply.send(result);
            }
            SessionCommand::Patch {
                guard,
                updates,
                reply,
            } => {
                let result = apply_patch(id, repo.as_ref(), guard, updates).await;
                let _ = reply.send(result);
            }
            SessionCommand::DeleteIf { predicate, reply } => {
                let result = apply_delete(id, repo.as_ref(), predicate).await;
                let _ = reply.send(result);
            }
        }
    }
    debug!(session_id = %id, "Session mailbox drained");
}

async fn load(id: SessionId, repo: &dyn SessionRepo) -> Result<Session, SessionError> {
    repo.get(id)
        .await
        .map_err(|e| SessionError::from_repo(id, e))?
        .ok_or(SessionError::SessionNotFound(id))
}

async fn apply_mutation(
    id: SessionId,
    repo: &dyn SessionRepo,
    mutation: Mutation,
) -> Result<Session, SessionError> {
    let mut working = load(id, repo).await?;
    if let Err(e) = mutation(&mut working) {
        debug!(session_id = %id, error = %e, "Session command rejected");
        return Err(e.into());
    }
    repo.save(&working).await.map_err(|e| {
        warn!(session_id = %id, error = %e, "Failed to save session");
        SessionError::from_repo(id, e)
    })?;
    Ok(working)
}

async fn apply_patch(
    id: SessionId,
    repo: &dyn SessionRepo,
    guard: Guard,
    updates: Vec<FieldUpdate>,
) -> Result<Session, SessionError> {
    let current = load(id, repo).await?;
    if let Err(e) = guard(&current) {
        debug!(session_id = %id, error = %e, "Session patch rejected");
        return Err(e.into());
    }
    repo.update_fields(id, updates).await.map_err(|e| {
        warn!(session_id = %id, error = %e, "Failed to patch session");
        SessionError::from_repo(id, e)
    })
}

async fn apply_delete(
    id: SessionId,
    repo: &dyn SessionRepo,
    predicate: Predicate,
) -> Result<bool, SessionError> {
    let current = load(id, repo).await?;
    if !predicate(&current) {
        return Ok(false);
    }
    repo.delete(id).await.map_err(|e| {
        warn!(session_id = %id, error = %e, "Failed to delete session");
        SessionError::from_repo(id, e)
    })
}
