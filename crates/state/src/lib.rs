//! Persisted progress of a bridge shutdown.
//!
//! The shutdown sequence spans several process invocations. This crate keeps
//! the small record that remembers which phases finished and when:
//! - [`ShutdownState`]: the record itself
//! - [`StateStore`]: load/save abstraction injected into the orchestrator
//! - [`FileStateStore`]: JSON file with atomic replace on save

pub mod record;
pub mod store;

pub use record::{LastCommand, ShutdownState};
pub use store::{FileStateStore, StateError, StateScope, StateStore, STATE_DIR, STATE_FILE};
