//! Test read models that record or fail.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use translationsdb_core::error::DomainError;
use translationsdb_core::event::DomainEvent;
use translationsdb_core::read_model::ReadModel;
use translationsdb_core::transaction::Transaction;

/// A read model that records every event it is handed and, separately, every
/// event whose transaction committed.
#[derive(Debug)]
pub struct RecordingReadModel<E> {
    name: String,
    handled: Mutex<Vec<E>>,
    committed: Arc<Mutex<Vec<E>>>,
}

impl<E: Clone> RecordingReadModel<E> {
    /// Create a new recording read model.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            handled: Mutex::new(Vec::new()),
            committed: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Events passed to `handle`, whether or not they committed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn handled(&self) -> Vec<E> {
        self.handled.lock().unwrap().clone()
    }

    /// Events whose transaction committed.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn committed(&self) -> Vec<E> {
        self.committed.lock().unwrap().clone()
    }
}

#[async_trait]
impl<Tx, E> ReadModel<Tx, E> for RecordingReadModel<E>
where
    Tx: Transaction,
    E: DomainEvent,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, tx: &mut Tx, event: &E) -> Result<(), DomainError> {
        self.handled.lock().unwrap().push(event.clone());
        let committed = Arc::clone(&self.committed);
        let event = event.clone();
        tx.on_commit(Box::new(move || committed.lock().unwrap().push(event)));
        Ok(())
    }
}

/// A read model that always returns an infrastructure error. Useful for
/// testing rollback paths.
#[derive(Debug)]
pub struct FailingReadModel {
    name: String,
    calls: AtomicUsize,
}

impl FailingReadModel {
    /// Create a new failing read model.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_owned(),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of times `handle` was called.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<Tx, E> ReadModel<Tx, E> for FailingReadModel
where
    Tx: Transaction,
    E: DomainEvent,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn handle(&self, _tx: &mut Tx, _event: &E) -> Result<(), DomainError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(DomainError::Infrastructure(format!("{} is unavailable", self.name)))
    }
}
