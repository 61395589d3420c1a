//! Deterministic `IdGenerator` for tests.

use std::sync::atomic::{AtomicU64, Ordering};

use translationsdb_core::id::IdGenerator;
use uuid::Uuid;

/// Yields `00000000-0000-0000-0000-000000000001`, `…0002`, and so on.
#[derive(Debug, Default)]
pub struct SequentialIdGenerator {
    issued: AtomicU64,
}

impl SequentialIdGenerator {
    /// Creates a generator whose first id is `…0001`.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of ids issued so far.
    pub fn issued(&self) -> u64 {
        self.issued.load(Ordering::SeqCst)
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_id(&self) -> Uuid {
        let n = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        Uuid::from_u128(u128::from(n))
    }
}
