//! Client-side reconciliation of local and remote note mutations.
//!
//! # Responsibility
//! - Merge optimistic local writes and realtime remote events into one list.
//! - Suppress realtime echoes of writes made by the local actor.
//!
//! # Invariants
//! - `apply` is pure: no I/O, no logging, no clock reads.
//! - `notes` never holds two entries with the same id.
//! - Unknown ids are no-ops, never errors.

pub mod command;
pub mod reconciler;
pub mod state;
