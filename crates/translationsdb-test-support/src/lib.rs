//! Shared test doubles and utilities for translationsdb.

mod clock;
mod event;
mod id;
mod read_model;
mod transaction;

pub use clock::FixedClock;
pub use event::{NOTED_EVENT_TYPE, Noted, NotedEvent};
pub use id::SequentialIdGenerator;
pub use read_model::{FailingReadModel, RecordingReadModel};
pub use transaction::{ScriptedTransaction, ScriptedTransactionProvider, TransactionLog};
