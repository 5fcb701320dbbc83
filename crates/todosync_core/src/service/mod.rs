//! Client use-case layer.
//!
//! # Responsibility
//! - Drive the reconciler from user actions and remote events.
//! - Keep renderers decoupled from backend and reconciler details.

pub mod note_client;
pub mod view;
