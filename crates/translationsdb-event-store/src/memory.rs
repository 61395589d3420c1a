//! In-memory event store and transaction boundary.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tracing::trace;
use translationsdb_core::error::DomainError;
use translationsdb_core::event::DomainEvent;
use translationsdb_core::read_model::ReadModel;
use translationsdb_core::store::{EventCursor, EventStore, Query, StoredEvent};
use translationsdb_core::transaction::{CommitHook, Transaction, TransactionProvider};

type Log = Arc<RwLock<Vec<StoredEvent>>>;

/// Event log held in process memory.
///
/// As a read model it stages the append in the transaction; the event joins
/// the log only when the transaction commits.
#[derive(Debug, Default, Clone)]
pub struct InMemoryEventStore {
    events: Log,
}

impl InMemoryEventStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of events in the log.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the log is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn push(log: &RwLock<Vec<StoredEvent>>, mut event: StoredEvent) -> StoredEvent {
    let mut events = log.write().unwrap_or_else(PoisonError::into_inner);
    event.position = i64::try_from(events.len()).map_or(i64::MAX, |len| len + 1);
    trace!(position = event.position, event_type = %event.event_type, "appended event");
    events.push(event.clone());
    event
}

#[async_trait]
impl EventStore for InMemoryEventStore {
    async fn append(&self, event: StoredEvent) -> Result<StoredEvent, DomainError> {
        Ok(push(&self.events, event))
    }

    async fn open_cursor(&self, query: Query) -> Result<Box<dyn EventCursor>, DomainError> {
        Ok(Box::new(LogCursor {
            log: Arc::clone(&self.events),
            next: 0,
            end: self.len(),
            query,
        }))
    }
}

/// Walks the shared log up to the length it had when opened. The log is
/// append-only, so that prefix never changes.
#[derive(Debug)]
struct LogCursor {
    log: Log,
    next: usize,
    end: usize,
    query: Query,
}

#[async_trait]
impl EventCursor for LogCursor {
    async fn next(&mut self) -> Result<Option<StoredEvent>, DomainError> {
        let events = self.log.read().unwrap_or_else(PoisonError::into_inner);
        while self.next < self.end {
            let event = &events[self.next];
            self.next += 1;
            if self.query.matches(event) {
                return Ok(Some(event.clone()));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl<Tx, E> ReadModel<Tx, E> for InMemoryEventStore
where
    Tx: Transaction,
    E: DomainEvent,
{
    fn name(&self) -> &str {
        "event_store"
    }

    async fn handle(&self, tx: &mut Tx, event: &E) -> Result<(), DomainError> {
        let stored = event.to_stored()?;
        let log = Arc::clone(&self.events);
        tx.on_commit(Box::new(move || {
            push(&log, stored);
        }));
        Ok(())
    }
}

/// Transaction boundary for deployments with no external storage engine.
/// Commit only runs the staged hooks.
#[derive(Debug, Default, Clone, Copy)]
pub struct MemoryTransactionProvider;

#[async_trait]
impl TransactionProvider for MemoryTransactionProvider {
    type Transaction = MemoryTransaction;

    async fn begin(&self) -> Result<MemoryTransaction, DomainError> {
        Ok(MemoryTransaction::default())
    }
}

/// Transaction handed out by [`MemoryTransactionProvider`].
#[derive(Default)]
pub struct MemoryTransaction {
    hooks: Vec<CommitHook>,
}

impl std::fmt::Debug for MemoryTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryTransaction")
            .field("staged", &self.hooks.len())
            .finish()
    }
}

#[async_trait]
impl Transaction for MemoryTransaction {
    fn on_commit(&mut self, hook: CommitHook) {
        self.hooks.push(hook);
    }

    async fn commit(self) -> Result<(), DomainError> {
        for hook in self.hooks {
            hook();
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        Ok(())
    }
}
