//! Remote note backend contracts.
//!
//! # Responsibility
//! - Define the query, mutation and realtime seams the client drives.
//! - Define the event envelope realtime callbacks hand to the client.
//!
//! # Invariants
//! - Realtime sinks only enqueue events; they never touch client state.
//! - Every subscription handle must be released through `unsubscribe`.
//!
//! # See also
//! - `backend::local` for the in-process SQLite implementation.
//! - `backend::graphql` for the transport-driven GraphQL implementation.

use crate::model::note::{Note, NoteId};
use crate::reconcile::command::Command;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::Sender;
use std::sync::Arc;

pub mod graphql;
pub mod local;
pub mod subscription;

pub use subscription::SubscriptionSet;

pub type BackendResult<T> = Result<T, BackendError>;

/// Failure reported by a remote collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendError {
    /// Target note does not exist remotely.
    NotFound(NoteId),
    /// The remote refused the request (GraphQL `errors`, injected failure).
    Rejected(String),
    /// The remote could not be reached or is in a broken state.
    Unavailable(String),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(id) => write!(f, "note not found remotely: {id}"),
            Self::Rejected(message) => write!(f, "remote rejected request: {message}"),
            Self::Unavailable(message) => write!(f, "remote unavailable: {message}"),
        }
    }
}

impl Error for BackendError {}

/// Realtime topic; one subscription per topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Topic {
    Created,
    Updated,
    Deleted,
}

impl Topic {
    pub const ALL: [Topic; 3] = [Topic::Created, Topic::Updated, Topic::Deleted];

    /// Subscription field name in the GraphQL schema.
    pub fn field_name(self) -> &'static str {
        match self {
            Self::Created => "onCreateNote",
            Self::Updated => "onUpdateNote",
            Self::Deleted => "onDeleteNote",
        }
    }
}

/// Decoded realtime delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteEvent {
    Created(Note),
    Updated(Note),
    Deleted(NoteId),
}

impl RemoteEvent {
    pub fn topic(&self) -> Topic {
        match self {
            Self::Created(_) => Topic::Created,
            Self::Updated(_) => Topic::Updated,
            Self::Deleted(_) => Topic::Deleted,
        }
    }

    pub fn note_id(&self) -> &NoteId {
        match self {
            Self::Created(note) | Self::Updated(note) => &note.id,
            Self::Deleted(id) => id,
        }
    }

    pub fn into_command(self) -> Command {
        match self {
            Self::Created(note) => Command::RemoteCreated(note),
            Self::Updated(note) => Command::RemoteUpdated(note),
            Self::Deleted(id) => Command::RemoteDeleted(id),
        }
    }
}

/// Callback target handed to the realtime channel.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: Sender<RemoteEvent>,
}

impl EventSink {
    pub fn new(sender: Sender<RemoteEvent>) -> Self {
        Self { sender }
    }

    /// Enqueues one event; returns `false` once the consumer is gone.
    pub fn deliver(&self, event: RemoteEvent) -> bool {
        self.sender.send(event).is_ok()
    }
}

/// Partial update for `NoteMutation::update_note`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NotePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

impl NotePatch {
    pub fn completed(value: bool) -> Self {
        Self {
            completed: Some(value),
            ..Self::default()
        }
    }

    pub fn apply_to(&self, note: &mut Note) {
        if let Some(name) = &self.name {
            note.name = name.clone();
        }
        if let Some(description) = &self.description {
            note.description = description.clone();
        }
        if let Some(completed) = self.completed {
            note.completed = completed;
        }
    }
}

/// "List all notes" query service.
pub trait NoteQuery {
    fn list_notes(&self) -> BackendResult<Vec<Note>>;
}

/// Remote write service. Calls are independent of one another.
pub trait NoteMutation {
    fn create_note(&self, note: &Note) -> BackendResult<Note>;
    fn update_note(&self, id: &NoteId, patch: &NotePatch) -> BackendResult<Note>;
    fn delete_note(&self, id: &NoteId) -> BackendResult<NoteId>;
}

/// Live subscription handle.
pub trait Subscription {
    fn topic(&self) -> Topic;
    /// Stops delivery. Consumes the handle so it cannot be released twice.
    fn unsubscribe(self: Box<Self>);
}

/// Realtime channel offering one subscription per topic.
pub trait RealtimeChannel {
    fn subscribe(&self, topic: Topic, sink: EventSink) -> BackendResult<Box<dyn Subscription>>;
}

/// Everything a `NoteClient` needs from its remote.
pub trait NoteBackend: NoteQuery + NoteMutation + RealtimeChannel {}

impl<T: NoteQuery + NoteMutation + RealtimeChannel + ?Sized> NoteBackend for T {}

impl<T: NoteQuery + ?Sized> NoteQuery for Arc<T> {
    fn list_notes(&self) -> BackendResult<Vec<Note>> {
        (**self).list_notes()
    }
}

impl<T: NoteMutation + ?Sized> NoteMutation for Arc<T> {
    fn create_note(&self, note: &Note) -> BackendResult<Note> {
        (**self).create_note(note)
    }

    fn update_note(&self, id: &NoteId, patch: &NotePatch) -> BackendResult<Note> {
        (**self).update_note(id, patch)
    }

    fn delete_note(&self, id: &NoteId) -> BackendResult<NoteId> {
        (**self).delete_note(id)
    }
}

impl<T: RealtimeChannel + ?Sized> RealtimeChannel for Arc<T> {
    fn subscribe(&self, topic: Topic, sink: EventSink) -> BackendResult<Box<dyn Subscription>> {
        (**self).subscribe(topic, sink)
    }
}
