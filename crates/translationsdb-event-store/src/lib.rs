//! Event store implementations for translationsdb.
//!
//! * [`memory`]: an in-memory log and the in-memory transaction boundary.
//! * [`pg_event_store`]: a PostgreSQL log and a `sqlx` transaction boundary.

pub mod memory;
pub mod pg_event_store;
pub mod schema;

pub use memory::{InMemoryEventStore, MemoryTransaction, MemoryTransactionProvider};
pub use pg_event_store::{PgEventStore, PgTransaction, PgTransactionProvider};
