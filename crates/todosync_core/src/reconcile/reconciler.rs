//! Pure transition function over `ReconcilerState`.
//!
//! # Invariants
//! - The input state is never mutated; every call returns a new state.
//! - Sorting is stable and case-sensitive on `name`.
//! - `draft` is cleared by `CreateAccepted` even when the note is a duplicate.
//! - A remote create never restores an id a remote delete removed; only a
//!   fresh snapshot clears that record.

use crate::model::note::{ActorId, Note, NoteDraft, NoteId};
use crate::reconcile::command::Command;
use crate::reconcile::state::{LoadStatus, ReconcilerState, SortDirection};
use std::collections::HashSet;

/// Applies commands for one local actor.
#[derive(Debug, Clone)]
pub struct Reconciler {
    local_actor: ActorId,
}

impl Reconciler {
    /// Creates a reconciler that treats `local_actor` as "self" when
    /// filtering realtime echoes.
    pub fn new(local_actor: ActorId) -> Self {
        Self { local_actor }
    }

    pub fn local_actor(&self) -> &ActorId {
        &self.local_actor
    }

    /// Returns the process-start state.
    pub fn initial_state(&self) -> ReconcilerState {
        ReconcilerState::default()
    }

    /// Produces the state that follows `state` after `command`.
    pub fn apply(&self, state: &ReconcilerState, command: Command) -> ReconcilerState {
        let mut next = state.clone();
        match command {
            Command::LoadSnapshot(notes) => {
                next.notes = dedup_by_id(notes);
                next.load_status = LoadStatus::Ready;
                next.removed.clear();
            }
            Command::LoadFailed => {
                next.load_status = LoadStatus::Failed;
            }
            Command::CreateAccepted(note) => {
                next.draft = NoteDraft::default();
                next.notes = prepend(&state.notes, note);
            }
            Command::RemoteCreated(note) => {
                if !note.originated_by(&self.local_actor) && !state.was_removed(&note.id) {
                    next.notes = prepend(&state.notes, note);
                }
            }
            Command::RemoteUpdated(note) => {
                if let Some(index) = state.position(&note.id) {
                    next.notes[index] = note;
                }
            }
            Command::RemoteDeleted(id) => {
                if let Some(index) = state.position(&id) {
                    next.notes.remove(index);
                    next.removed.insert(id);
                }
            }
            Command::ToggleCompleted(id) => {
                if let Some(note) = next.notes.iter_mut().find(|note| note.id == id) {
                    note.completed = !note.completed;
                }
            }
            Command::SetDraftField(field, value) => {
                next.draft.set(field, value);
            }
            Command::ToggleSort => {
                let direction = state.sort_direction.flipped();
                next.notes = sorted_by_name(&state.notes, direction);
                next.sort_direction = direction;
            }
        }
        next
    }

    /// Applies a sequence of commands in order.
    pub fn apply_all(
        &self,
        state: &ReconcilerState,
        commands: impl IntoIterator<Item = Command>,
    ) -> ReconcilerState {
        commands
            .into_iter()
            .fold(state.clone(), |current, command| self.apply(&current, command))
    }
}

fn prepend(notes: &[Note], note: Note) -> Vec<Note> {
    if notes.iter().any(|existing| existing.id == note.id) {
        return notes.to_vec();
    }
    let mut next = Vec::with_capacity(notes.len() + 1);
    next.push(note);
    next.extend_from_slice(notes);
    next
}

fn dedup_by_id(notes: Vec<Note>) -> Vec<Note> {
    let mut seen: HashSet<NoteId> = HashSet::with_capacity(notes.len());
    notes
        .into_iter()
        .filter(|note| seen.insert(note.id.clone()))
        .collect()
}

fn sorted_by_name(notes: &[Note], direction: SortDirection) -> Vec<Note> {
    let mut sorted = notes.to_vec();
    match direction {
        SortDirection::Ascending => sorted.sort_by(|a, b| a.name.cmp(&b.name)),
        SortDirection::Descending => sorted.sort_by(|a, b| b.name.cmp(&a.name)),
    }
    sorted
}
