//! Reconciler state shape.

use crate::model::note::{Note, NoteDraft, NoteId};
use std::collections::HashSet;

/// Sort order currently in effect for `ReconcilerState::notes`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            Self::Ascending => Self::Descending,
            Self::Descending => Self::Ascending,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Ascending => "asc",
            Self::Descending => "desc",
        }
    }
}

/// Outcome of the most recent full-list fetch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadStatus {
    Loading,
    Ready,
    Failed,
}

/// In-memory list state owned by exactly one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconcilerState {
    /// Ordered by the sort in effect; ids are unique.
    pub notes: Vec<Note>,
    pub sort_direction: SortDirection,
    pub load_status: LoadStatus,
    pub draft: NoteDraft,
    /// Ids removed by a remote delete since the last snapshot.
    pub removed: HashSet<NoteId>,
}

impl Default for ReconcilerState {
    /// Starts `Loading` with no notes. The direction starts `Descending` so
    /// the first sort toggle orders ascending.
    fn default() -> Self {
        Self {
            notes: Vec::new(),
            sort_direction: SortDirection::Descending,
            load_status: LoadStatus::Loading,
            draft: NoteDraft::default(),
            removed: HashSet::new(),
        }
    }
}

impl ReconcilerState {
    pub fn position(&self, id: &NoteId) -> Option<usize> {
        self.notes.iter().position(|note| &note.id == id)
    }

    pub fn get(&self, id: &NoteId) -> Option<&Note> {
        self.notes.iter().find(|note| &note.id == id)
    }

    pub fn contains(&self, id: &NoteId) -> bool {
        self.position(id).is_some()
    }

    pub fn was_removed(&self, id: &NoteId) -> bool {
        self.removed.contains(id)
    }
}
