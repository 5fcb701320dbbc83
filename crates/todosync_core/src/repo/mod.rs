//! Repository layer for the local note store.
//!
//! # Responsibility
//! - Define the note persistence contract used by `LocalBackend`.
//! - Isolate SQLite query details from backend orchestration.
//!
//! # Invariants
//! - Repository APIs return semantic errors (`NotFound`, `Duplicate`) in
//!   addition to DB transport errors.

pub mod note_repo;
