//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the storage contract for workspace snapshots.
//! - Isolate SQLite query details from the workspace service.
//!
//! # Invariants
//! - Writes validate model invariants before touching storage.
//! - Reads reject malformed persisted rows instead of masking them.

pub mod workspace_repo;
