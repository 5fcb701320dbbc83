//! To-do domain model.
//!
//! # Responsibility
//! - Define the note record, identities and the pending-create draft.
//!
//! # Invariants
//! - Every note is identified by a `NoteId`; uniqueness within a list is
//!   enforced by the reconciler, not by the model.

pub mod note;
