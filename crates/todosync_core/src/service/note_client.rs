//! Note client: the single owner and driver of `ReconcilerState`.
//!
//! # Responsibility
//! - Issue remote reads/writes around reconciler commands.
//! - Validate drafts before any create reaches the reconciler.
//! - Own the realtime subscription bundle and drain its event queue.
//! - Surface load and mutation failures to the caller.
//!
//! # Invariants
//! - Optimistic local changes are never rolled back on remote failure.
//! - Every mutation failure is both returned and kept until
//!   `take_failures` is called.
//! - Realtime callbacks only enqueue; state changes happen in `pump`.

use crate::backend::{
    BackendError, EventSink, NoteBackend, NoteMutation, NotePatch, NoteQuery, RemoteEvent,
    SubscriptionSet,
};
use crate::model::note::{ActorId, DraftField, Note, NoteId, NoteValidationError};
use crate::reconcile::command::Command;
use crate::reconcile::reconciler::Reconciler;
use crate::reconcile::state::ReconcilerState;
use crate::service::view::NoteListView;
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::mpsc::{channel, Receiver};

/// Remote write kind, used in failure reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    Create,
    Update,
    Delete,
}

impl MutationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }
}

/// Client-level failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// User input rejected before any command was issued.
    Validation(NoteValidationError),
    /// Full-list fetch failed; state is `Failed`.
    LoadFailure(BackendError),
    /// Remote write failed after the optimistic local change was applied.
    MutationFailure {
        kind: MutationKind,
        note_id: NoteId,
        source: BackendError,
    },
    /// Realtime subscriptions could not be established.
    SubscribeFailure(BackendError),
}

impl Display for ClientError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::LoadFailure(err) => write!(f, "failed to load notes: {err}"),
            Self::MutationFailure {
                kind,
                note_id,
                source,
            } => write!(
                f,
                "failed to {} note {note_id}; local list may differ from server until reload: {source}",
                kind.as_str()
            ),
            Self::SubscribeFailure(err) => write!(f, "failed to subscribe to live updates: {err}"),
        }
    }
}

impl Error for ClientError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::LoadFailure(err) | Self::SubscribeFailure(err) => Some(err),
            Self::MutationFailure { source, .. } => Some(source),
        }
    }
}

impl From<NoteValidationError> for ClientError {
    fn from(value: NoteValidationError) -> Self {
        Self::Validation(value)
    }
}

pub type ClientResult<T> = Result<T, ClientError>;

/// To-do list client over a note backend.
pub struct NoteClient<B: NoteBackend> {
    backend: B,
    reconciler: Reconciler,
    state: ReconcilerState,
    sink: EventSink,
    events: Receiver<RemoteEvent>,
    subscriptions: Option<SubscriptionSet>,
    failures: Vec<ClientError>,
}

impl<B: NoteBackend> NoteClient<B> {
    /// Creates a disconnected client acting as `actor`.
    pub fn new(backend: B, actor: ActorId) -> Self {
        let (sender, events) = channel();
        let reconciler = Reconciler::new(actor);
        let state = reconciler.initial_state();
        Self {
            backend,
            reconciler,
            state,
            sink: EventSink::new(sender),
            events,
            subscriptions: None,
            failures: Vec::new(),
        }
    }

    pub fn actor(&self) -> &ActorId {
        self.reconciler.local_actor()
    }

    pub fn state(&self) -> &ReconcilerState {
        &self.state
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn is_connected(&self) -> bool {
        self.subscriptions
            .as_ref()
            .is_some_and(SubscriptionSet::is_active)
    }

    /// Render model of the current state.
    pub fn view(&self) -> NoteListView {
        NoteListView::from_state(&self.state)
    }

    /// Subscribes to all realtime topics, then fetches the full list.
    ///
    /// Subscribing first means writes racing the fetch are queued rather
    /// than missed; duplicates are absorbed by id.
    ///
    /// # Errors
    /// - `SubscribeFailure` when any topic cannot be subscribed; no
    ///   subscription is left behind.
    /// - `LoadFailure` when the fetch fails; subscriptions stay active.
    pub fn connect(&mut self) -> ClientResult<()> {
        if self.subscriptions.is_none() {
            let set = SubscriptionSet::acquire(&self.backend, &self.sink)
                .map_err(ClientError::SubscribeFailure)?;
            self.subscriptions = Some(set);
        }
        self.refresh()
    }

    /// Releases all three subscriptions together.
    pub fn disconnect(&mut self) {
        if let Some(set) = self.subscriptions.take() {
            set.close();
        }
    }

    /// Fetches the full list and applies the outcome.
    pub fn refresh(&mut self) -> ClientResult<()> {
        match self.backend.list_notes() {
            Ok(notes) => {
                info!(
                    "event=notes_load module=client status=ok count={}",
                    notes.len()
                );
                self.dispatch(Command::LoadSnapshot(notes));
                Ok(())
            }
            Err(err) => {
                warn!("event=notes_load module=client status=error error={err}");
                self.dispatch(Command::LoadFailed);
                Err(ClientError::LoadFailure(err))
            }
        }
    }

    pub fn set_draft_field(&mut self, field: DraftField, value: impl Into<String>) {
        self.dispatch(Command::SetDraftField(field, value.into()));
    }

    /// Creates a note from the current draft.
    ///
    /// The note is inserted locally and the draft cleared before the remote
    /// write is attempted.
    ///
    /// # Errors
    /// - `Validation` when the draft has a blank field; nothing changes.
    /// - `MutationFailure` when the remote create fails; the local note stays.
    pub fn create_from_draft(&mut self) -> ClientResult<NoteId> {
        if let Err(err) = self.state.draft.validate() {
            debug!("event=note_create module=client status=rejected reason={err}");
            return Err(err.into());
        }

        let draft = &self.state.draft;
        let note = Note::new(
            NoteId::generate(),
            draft.name.clone(),
            draft.description.clone(),
            self.actor().clone(),
        );
        let note_id = note.id.clone();
        self.dispatch(Command::CreateAccepted(note.clone()));

        match self.backend.create_note(&note) {
            Ok(_) => {
                info!("event=note_create module=client status=ok note_id={note_id}");
                Ok(note_id)
            }
            Err(err) => Err(self.record_failure(MutationKind::Create, note_id, err)),
        }
    }

    /// Flips completion locally, then writes the new value remotely.
    ///
    /// Returns the new value, or `None` when `id` is not in the list.
    pub fn toggle_completed(&mut self, id: &NoteId) -> ClientResult<Option<bool>> {
        if !self.state.contains(id) {
            debug!("event=note_toggle module=client status=skipped note_id={id}");
            return Ok(None);
        }
        self.dispatch(Command::ToggleCompleted(id.clone()));
        let completed = self
            .state
            .get(id)
            .map(|note| note.completed)
            .unwrap_or_default();

        match self
            .backend
            .update_note(id, &NotePatch::completed(completed))
        {
            Ok(_) => {
                info!(
                    "event=note_toggle module=client status=ok note_id={id} completed={completed}"
                );
                Ok(Some(completed))
            }
            Err(err) => Err(self.record_failure(MutationKind::Update, id.clone(), err)),
        }
    }

    /// Requests remote deletion. The entry leaves the local list when the
    /// delete arrives on the realtime channel.
    pub fn delete(&mut self, id: &NoteId) -> ClientResult<()> {
        match self.backend.delete_note(id) {
            Ok(_) => {
                info!("event=note_delete module=client status=ok note_id={id}");
                Ok(())
            }
            Err(err) => Err(self.record_failure(MutationKind::Delete, id.clone(), err)),
        }
    }

    pub fn toggle_sort(&mut self) {
        self.dispatch(Command::ToggleSort);
    }

    /// Applies every queued realtime event in arrival order.
    ///
    /// Returns the number of events applied.
    pub fn pump(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(event) = self.events.try_recv() {
            if let RemoteEvent::Updated(_) | RemoteEvent::Deleted(_) = &event {
                if !self.state.contains(event.note_id()) {
                    // Update/delete can outrun the create it refers to.
                    debug!(
                        "event=realtime_apply module=client status=ignored topic={} note_id={}",
                        event.topic().field_name(),
                        event.note_id()
                    );
                }
            }
            self.dispatch(event.into_command());
            applied += 1;
        }
        applied
    }

    /// Returns and clears mutation failures not yet shown to the user.
    pub fn take_failures(&mut self) -> Vec<ClientError> {
        std::mem::take(&mut self.failures)
    }

    fn dispatch(&mut self, command: Command) {
        debug!("event=dispatch module=client command={}", command.kind());
        self.state = self.reconciler.apply(&self.state, command);
    }

    fn record_failure(
        &mut self,
        kind: MutationKind,
        note_id: NoteId,
        source: BackendError,
    ) -> ClientError {
        warn!(
            "event=note_{} module=client status=error note_id={} error={}",
            kind.as_str(),
            note_id,
            source
        );
        let err = ClientError::MutationFailure {
            kind,
            note_id,
            source,
        };
        self.failures.push(err.clone());
        err
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientError, MutationKind, NoteClient};
    use crate::backend::local::{LocalBackend, Operation};
    use crate::model::note::{ActorId, DraftField, NoteValidationError};
    use crate::reconcile::state::LoadStatus;

    fn client() -> NoteClient<LocalBackend> {
        let backend = LocalBackend::in_memory().expect("store should open");
        NoteClient::new(backend, ActorId::new("local"))
    }

    #[test]
    fn connect_loads_and_subscribes() {
        let mut client = client();
        client.connect().expect("connect should succeed");
        assert!(client.is_connected());
        assert_eq!(client.state().load_status, LoadStatus::Ready);
        assert_eq!(client.backend().live_subscriptions(), 3);

        client.disconnect();
        assert!(!client.is_connected());
        assert_eq!(client.backend().live_subscriptions(), 0);
    }

    #[test]
    fn failed_load_marks_state_failed() {
        let mut client = client();
        client.backend().fail_next(Operation::List);
        let err = client.connect().expect_err("load should fail");
        assert!(matches!(err, ClientError::LoadFailure(_)));
        assert_eq!(client.state().load_status, LoadStatus::Failed);
        assert!(client.is_connected());
    }

    #[test]
    fn create_requires_name_and_description() {
        let mut client = client();
        client.connect().expect("connect");
        client.set_draft_field(DraftField::Name, "only a name");

        let err = client.create_from_draft().expect_err("description missing");
        assert_eq!(
            err,
            ClientError::Validation(NoteValidationError::EmptyDescription)
        );
        assert!(client.state().notes.is_empty());
        assert_eq!(client.state().draft.name, "only a name");
    }

    #[test]
    fn own_create_echo_is_not_duplicated() {
        let mut client = client();
        client.connect().expect("connect");
        client.set_draft_field(DraftField::Name, "X");
        client.set_draft_field(DraftField::Description, "Y");

        let id = client.create_from_draft().expect("create");
        assert!(client.state().draft.is_empty());
        assert_eq!(client.pump(), 1);
        assert_eq!(client.state().notes.len(), 1);
        assert_eq!(client.state().notes[0].id, id);
        assert!(!client.state().notes[0].completed);
    }

    #[test]
    fn failed_create_keeps_optimistic_note_and_reports() {
        let mut client = client();
        client.connect().expect("connect");
        client.backend().fail_next(Operation::Create);
        client.set_draft_field(DraftField::Name, "X");
        client.set_draft_field(DraftField::Description, "Y");

        let err = client.create_from_draft().expect_err("remote create fails");
        assert!(matches!(
            err,
            ClientError::MutationFailure {
                kind: MutationKind::Create,
                ..
            }
        ));
        assert_eq!(client.state().notes.len(), 1);
        assert!(client.state().draft.is_empty());

        let failures = client.take_failures();
        assert_eq!(failures, vec![err]);
        assert!(client.take_failures().is_empty());
    }

    #[test]
    fn toggle_unknown_id_is_skipped() {
        let mut client = client();
        client.connect().expect("connect");
        let outcome = client
            .toggle_completed(&"missing".into())
            .expect("unknown id is not an error");
        assert_eq!(outcome, None);
    }
}
