//! In-memory document store for session documents.
//!
//! Documents are kept as `serde_json::Value` so dot-path field updates act on
//! the stored representation the same way a managed document database would.
//! Every write is validated by decoding the candidate document before it
//! replaces the stored one.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use serde_json::{Map, Value};
use talewright_domain::{Session, SessionId, SessionStatus};
use tokio::sync::broadcast;

use crate::infrastructure::ports::{FieldUpdate, RepoError, SessionEvent, SessionRepo};

/// Events buffered per subscriber before slow receivers start lagging
const EVENT_BUFFER: usize = 32;

const ENTITY: &str = "Session";

pub struct InMemorySessionRepo {
    documents: DashMap<SessionId, Value>,
    channels: DashMap<SessionId, broadcast::Sender<SessionEvent>>,
}

impl InMemorySessionRepo {
    pub fn new() -> Self {
        Self {
            documents: DashMap::new(),
            channels: DashMap::new(),
        }
    }

    fn publish(&self, id: SessionId, event: SessionEvent) {
        if let Some(sender) = self.channels.get(&id) {
            // No receivers is fine
            let _ = sender.send(event);
        }
    }
}

impl Default for InMemorySessionRepo {
    fn default() -> Self {
        Self::new()
    }
}

fn decode(document: &Value) -> Result<Session, RepoError> {
    Ok(serde_json::from_value(document.clone())?)
}

/// Write `value` at `path`, creating intermediate objects as needed.
fn set_path(document: &mut Value, path: &str, value: Value) -> Result<(), RepoError> {
    let segments: Vec<&str> = path.split('.').collect();
    if segments.iter().any(|s| s.is_empty()) {
        return Err(RepoError::database(
            "update_fields",
            format!("invalid field path '{}'", path),
        ));
    }
    let Some((last, parents)) = segments.split_last() else {
        return Err(RepoError::database("update_fields", "empty field path"));
    };

    let mut current = document;
    for segment in parents {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .ok_or_else(|| {
                RepoError::database(
                    "update_fields",
                    format!("'{}' in '{}' is not an object", segment, path),
                )
            })?
            .entry(segment.to_string())
            .or_insert(Value::Null);
    }
    if current.is_null() {
        *current = Value::Object(Map::new());
    }
    current
        .as_object_mut()
        .ok_or_else(|| {
            RepoError::database("update_fields", format!("parent of '{}' is not an object", path))
        })?
        .insert(last.to_string(), value);
    Ok(())
}

#[async_trait]
impl SessionRepo for InMemorySessionRepo {
    async fn get(&self, id: SessionId) -> Result<Option<Session>, RepoError> {
        self.documents
            .get(&id)
            .map(|doc| decode(doc.value()))
            .transpose()
    }

    async fn save(&self, session: &Session) -> Result<(), RepoError> {
        let document = serde_json::to_value(session)?;
        self.documents.insert(session.id(), document);
        self.publish(session.id(), SessionEvent::Updated(Arc::new(session.clone())));
        Ok(())
    }

    async fn update_fields(
        &self,
        id: SessionId,
        updates: Vec<FieldUpdate>,
    ) -> Result<Session, RepoError> {
        let session = {
            let mut stored = self
                .documents
                .get_mut(&id)
                .ok_or_else(|| RepoError::not_found(ENTITY, id))?;
            let mut candidate = stored.value().clone();
            for update in updates {
                set_path(&mut candidate, &update.path, update.value)?;
            }
            let session = decode(&candidate)?;
            *stored.value_mut() = candidate;
            session
        };
        self.publish(id, SessionEvent::Updated(Arc::new(session.clone())));
        Ok(session)
    }

    async fn delete(&self, id: SessionId) -> Result<bool, RepoError> {
        let removed = self.documents.remove(&id).is_some();
        if removed {
            self.publish(id, SessionEvent::Deleted(id));
            self.channels.remove(&id);
        }
        Ok(removed)
    }

    async fn list_by_status(&self, status: SessionStatus) -> Result<Vec<Session>, RepoError> {
        let wanted = serde_json::to_value(status)?;
        self.documents
            .iter()
            .filter(|doc| doc.value().get("status") == Some(&wanted))
            .map(|doc| decode(doc.value()))
            .collect()
    }

    async fn list_all(&self) -> Result<Vec<Session>, RepoError> {
        self.documents
            .iter()
            .map(|doc| decode(doc.value()))
            .collect()
    }

    async fn subscribe(
        &self,
        id: SessionId,
    ) -> Result<broadcast::Receiver<SessionEvent>, RepoError> {
        if !self.documents.contains_key(&id) {
            return Err(RepoError::not_found(ENTITY, id));
        }
        let receiver = self
            .channels
            .entry(id)
            .or_insert_with(|| broadcast::channel(EVENT_BUFFER).0)
            .subscribe();
        Ok(receiver)
    }
}
