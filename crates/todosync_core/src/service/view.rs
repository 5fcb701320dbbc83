//! Render model derived from reconciler state.

use crate::model::note::Note;
use crate::reconcile::state::{LoadStatus, ReconcilerState, SortDirection};

/// Everything a list renderer needs, computed without side effects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListView {
    pub items: Vec<Note>,
    /// Notes not yet completed.
    pub remaining_count: usize,
    pub total_count: usize,
    pub loading: bool,
    pub failed: bool,
    pub sort_direction: SortDirection,
}

impl NoteListView {
    pub fn from_state(state: &ReconcilerState) -> Self {
        Self {
            items: state.notes.clone(),
            remaining_count: state.notes.iter().filter(|note| !note.completed).count(),
            total_count: state.notes.len(),
            loading: state.load_status == LoadStatus::Loading,
            failed: state.load_status == LoadStatus::Failed,
            sort_direction: state.sort_direction,
        }
    }

    /// Plain-text rendering, one line per note.
    pub fn to_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(self.items.len() + 1);
        if self.loading {
            lines.push("loading...".to_string());
        } else if self.failed {
            lines.push("failed to load notes".to_string());
        }
        lines.push(format!(
            "to-dos left: {} / total: {}",
            self.remaining_count, self.total_count
        ));
        for note in &self.items {
            let mark = if note.completed { "x" } else { " " };
            lines.push(format!("[{mark}] {}: {}", note.name, note.description));
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::NoteListView;
    use crate::model::note::{ActorId, Note, NoteId};
    use crate::reconcile::state::{LoadStatus, ReconcilerState};

    #[test]
    fn counts_remaining_and_total() {
        let mut done = Note::new(NoteId::new("1"), "a", "b", ActorId::new("x"));
        done.completed = true;
        let open = Note::new(NoteId::new("2"), "c", "d", ActorId::new("x"));
        let state = ReconcilerState {
            notes: vec![done, open],
            load_status: LoadStatus::Ready,
            ..ReconcilerState::default()
        };

        let view = NoteListView::from_state(&state);
        assert_eq!(view.remaining_count, 1);
        assert_eq!(view.total_count, 2);
        assert!(!view.loading);
        assert_eq!(
            view.to_lines(),
            vec![
                "to-dos left: 1 / total: 2".to_string(),
                "[x] a: b".to_string(),
                "[ ] c: d".to_string(),
            ]
        );
    }

    #[test]
    fn initial_state_renders_loading() {
        let view = NoteListView::from_state(&ReconcilerState::default());
        assert!(view.loading);
        assert_eq!(view.to_lines()[0], "loading...");
    }
}
