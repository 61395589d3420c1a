//! Identifier generation.
//!
//! Commands never call `Uuid::new_v4()` directly; an [`IdGenerator`] is
//! injected so tests and replays can use a deterministic sequence.

use uuid::Uuid;

/// Source of event and aggregate identifiers.
pub trait IdGenerator: Send + Sync {
    /// Returns a fresh identifier.
    fn next_id(&self) -> Uuid;
}

/// Production generator backed by random v4 UUIDs.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIdGenerator;

impl IdGenerator for RandomIdGenerator {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}
