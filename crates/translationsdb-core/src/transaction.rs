//! Persistence boundary consumed by the command pipeline.
//!
//! The core only needs "begin, commit, rollback". Read models that live
//! outside the storage engine (in-memory projections, an in-memory log)
//! stage their writes as commit hooks, which run only once the engine has
//! committed.

use async_trait::async_trait;

use crate::error::DomainError;

/// A deferred write applied after a successful commit.
pub type CommitHook = Box<dyn FnOnce() + Send + 'static>;

/// A transactional scope opened by a [`TransactionProvider`].
#[async_trait]
pub trait Transaction: Send + 'static {
    /// Registers a write to apply after commit. Hooks run in registration
    /// order and are discarded on rollback.
    fn on_commit(&mut self, hook: CommitHook);

    /// Commits the transaction, then runs its commit hooks.
    async fn commit(self) -> Result<(), DomainError>;

    /// Rolls the transaction back and discards its commit hooks.
    async fn rollback(self) -> Result<(), DomainError>;
}

/// Source of transactional scopes.
#[async_trait]
pub trait TransactionProvider: Send + Sync + 'static {
    /// The scope type handed to read models.
    type Transaction: Transaction;

    /// Opens a new transaction.
    async fn begin(&self) -> Result<Self::Transaction, DomainError>;
}
