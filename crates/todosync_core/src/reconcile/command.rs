//! Commands accepted by the reconciler.

use crate::model::note::{DraftField, Note, NoteId};

/// One state transition request, originating either from a local user
/// action or from a remote realtime/query event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Full-list fetch succeeded; replaces the list.
    LoadSnapshot(Vec<Note>),
    /// Full-list fetch failed; existing notes are kept.
    LoadFailed,
    /// Local create passed validation; applied before remote confirmation.
    CreateAccepted(Note),
    /// Create delivered by the realtime channel.
    RemoteCreated(Note),
    /// Update delivered by the realtime channel.
    RemoteUpdated(Note),
    /// Delete delivered by the realtime channel.
    RemoteDeleted(NoteId),
    /// Local optimistic completion flip.
    ToggleCompleted(NoteId),
    SetDraftField(DraftField, String),
    ToggleSort,
}

impl Command {
    /// Stable event name used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::LoadSnapshot(_) => "load_snapshot",
            Self::LoadFailed => "load_failed",
            Self::CreateAccepted(_) => "create_accepted",
            Self::RemoteCreated(_) => "remote_created",
            Self::RemoteUpdated(_) => "remote_updated",
            Self::RemoteDeleted(_) => "remote_deleted",
            Self::ToggleCompleted(_) => "toggle_completed",
            Self::SetDraftField(..) => "set_draft_field",
            Self::ToggleSort => "toggle_sort",
        }
    }
}
