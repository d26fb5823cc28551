//! Adapters that live inside the domain crate for convenience.
//!
//! The in-memory repository backs unit tests and the `memory` storage
//! provider of the server. The durable SQLite adapter lives in its own crate.

pub mod memory_repo;
