//! Wire formats spoken with the managed note API.
//!
//! # Responsibility
//! - Encode GraphQL requests and decode responses/subscription payloads.
//! - Keep JSON shape knowledge out of the reconciler and client.

pub mod graphql;
