//! In-process note backend over SQLite with realtime fan-out.
//!
//! # Responsibility
//! - Serve list/create/update/delete against the local note store.
//! - Publish every committed write to subscribers of the matching topic,
//!   including the writer's own subscriptions.
//! - Allow tests to inject one-shot failures per operation.
//!
//! # Invariants
//! - An event is published only after its write has committed.
//! - Subscribers whose consumer is gone are pruned on the next publish.

use super::{
    BackendError, BackendResult, EventSink, NoteMutation, NotePatch, NoteQuery,
    RealtimeChannel, RemoteEvent, Subscription, Topic,
};
use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::model::note::{Note, NoteId};
use crate::repo::note_repo::{NoteRepository, RepoError, RepoResult, SqliteNoteRepository};
use log::{debug, info, warn};
use rusqlite::Connection;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

/// Backend call kinds that can be made to fail with `fail_next`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Create,
    Update,
    Delete,
    Subscribe,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::List => "list",
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
            Self::Subscribe => "subscribe",
        }
    }
}

struct Subscriber {
    topic: Topic,
    sink: EventSink,
}

#[derive(Default)]
struct Hub {
    next_id: u64,
    subscribers: BTreeMap<u64, Subscriber>,
}

/// SQLite-backed stand-in for the managed note API.
pub struct LocalBackend {
    conn: Mutex<Connection>,
    hub: Arc<Mutex<Hub>>,
    faults: Mutex<Vec<Operation>>,
}

impl LocalBackend {
    /// Opens (or creates) a file-backed store.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        Ok(Self::from_connection(open_db(path)?))
    }

    pub fn in_memory() -> DbResult<Self> {
        Ok(Self::from_connection(open_db_in_memory()?))
    }

    /// Wraps a connection already migrated by `db::open_db*`.
    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
            hub: Arc::new(Mutex::new(Hub::default())),
            faults: Mutex::new(Vec::new()),
        }
    }

    /// Makes the next call of `operation` fail with `BackendError::Rejected`.
    pub fn fail_next(&self, operation: Operation) {
        lock(&self.faults).push(operation);
    }

    /// Number of subscriptions not yet released.
    pub fn live_subscriptions(&self) -> usize {
        lock(&self.hub).subscribers.len()
    }

    fn check_fault(&self, operation: Operation) -> BackendResult<()> {
        let mut faults = lock(&self.faults);
        if let Some(index) = faults.iter().position(|fault| *fault == operation) {
            faults.remove(index);
            warn!(
                "event=fault_injected module=backend operation={}",
                operation.as_str()
            );
            return Err(BackendError::Rejected(format!(
                "injected {} failure",
                operation.as_str()
            )));
        }
        Ok(())
    }

    fn with_repo<T>(
        &self,
        work: impl FnOnce(&SqliteNoteRepository<'_>) -> RepoResult<T>,
    ) -> BackendResult<T> {
        let conn = lock(&self.conn);
        let repo = SqliteNoteRepository::new(&conn);
        work(&repo).map_err(BackendError::from)
    }

    fn publish(&self, event: RemoteEvent) {
        let topic = event.topic();
        let mut hub = lock(&self.hub);
        let mut delivered = 0usize;
        let mut gone = Vec::new();
        for (id, subscriber) in hub.subscribers.iter() {
            if subscriber.topic != topic {
                continue;
            }
            if subscriber.sink.deliver(event.clone()) {
                delivered += 1;
            } else {
                gone.push(*id);
            }
        }
        for id in &gone {
            hub.subscribers.remove(id);
        }
        debug!(
            "event=publish module=backend topic={} note_id={} delivered={} pruned={}",
            topic.field_name(),
            event.note_id(),
            delivered,
            gone.len()
        );
    }
}

impl NoteQuery for LocalBackend {
    fn list_notes(&self) -> BackendResult<Vec<Note>> {
        self.check_fault(Operation::List)?;
        self.with_repo(|repo| repo.list_notes())
    }
}

impl NoteMutation for LocalBackend {
    fn create_note(&self, note: &Note) -> BackendResult<Note> {
        self.check_fault(Operation::Create)?;
        let stored = self.with_repo(|repo| {
            repo.insert_note(note)?;
            repo.get_note(&note.id)?
                .ok_or_else(|| RepoError::InvalidData("created note missing on read-back".into()))
        })?;
        self.publish(RemoteEvent::Created(stored.clone()));
        Ok(stored)
    }

    fn update_note(&self, id: &NoteId, patch: &NotePatch) -> BackendResult<Note> {
        self.check_fault(Operation::Update)?;
        let stored = self.with_repo(|repo| {
            let mut note = repo
                .get_note(id)?
                .ok_or_else(|| RepoError::NotFound(id.clone()))?;
            patch.apply_to(&mut note);
            repo.update_note(&note)?;
            Ok(note)
        })?;
        self.publish(RemoteEvent::Updated(stored.clone()));
        Ok(stored)
    }

    fn delete_note(&self, id: &NoteId) -> BackendResult<NoteId> {
        self.check_fault(Operation::Delete)?;
        self.with_repo(|repo| repo.delete_note(id))?;
        self.publish(RemoteEvent::Deleted(id.clone()));
        Ok(id.clone())
    }
}

impl RealtimeChannel for LocalBackend {
    fn subscribe(&self, topic: Topic, sink: EventSink) -> BackendResult<Box<dyn Subscription>> {
        self.check_fault(Operation::Subscribe)?;
        let mut hub = lock(&self.hub);
        let id = hub.next_id;
        hub.next_id += 1;
        hub.subscribers.insert(id, Subscriber { topic, sink });
        info!(
            "event=subscribe module=backend topic={} subscription_id={id}",
            topic.field_name()
        );
        Ok(Box::new(LocalSubscription {
            id,
            topic,
            hub: Arc::downgrade(&self.hub),
        }))
    }
}

struct LocalSubscription {
    id: u64,
    topic: Topic,
    hub: Weak<Mutex<Hub>>,
}

impl Subscription for LocalSubscription {
    fn topic(&self) -> Topic {
        self.topic
    }

    fn unsubscribe(self: Box<Self>) {
        // The backend may already be gone; nothing left to release then.
        if let Some(hub) = self.hub.upgrade() {
            lock(&hub).subscribers.remove(&self.id);
        }
    }
}

impl From<RepoError> for BackendError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            err @ (RepoError::Duplicate(_) | RepoError::InvalidData(_)) => {
                Self::Rejected(err.to_string())
            }
            RepoError::Db(err) => Self::Unavailable(err.to_string()),
        }
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}
