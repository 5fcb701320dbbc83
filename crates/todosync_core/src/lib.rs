//! Core logic for the todosync to-do client.
//! This crate owns the list reconciliation rules and the backend seams.

pub mod backend;
pub mod db;
pub mod logging;
pub mod model;
pub mod reconcile;
pub mod repo;
pub mod service;
pub mod wire;

pub use backend::local::{LocalBackend, Operation};
pub use backend::{
    BackendError, BackendResult, EventSink, NoteBackend, NoteMutation, NotePatch, NoteQuery,
    RealtimeChannel, RemoteEvent, Subscription, SubscriptionSet, Topic,
};
pub use logging::{init_logging, logging_status, LogConfig, LogLevel};
pub use model::note::{ActorId, DraftField, Note, NoteDraft, NoteId, NoteValidationError};
pub use reconcile::command::Command;
pub use reconcile::reconciler::Reconciler;
pub use reconcile::state::{LoadStatus, ReconcilerState, SortDirection};
pub use service::note_client::{ClientError, ClientResult, MutationKind, NoteClient};
pub use service::view::NoteListView;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
