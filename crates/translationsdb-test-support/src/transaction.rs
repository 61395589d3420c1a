//! Scripted persistence boundary: a `TransactionProvider` whose steps can be
//! made to fail on demand.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use translationsdb_core::error::DomainError;
use translationsdb_core::transaction::{CommitHook, Transaction, TransactionProvider};

/// Shared record of the transaction calls made against a provider.
pub type TransactionLog = Arc<Mutex<Vec<&'static str>>>;

/// A provider that records `begin`/`commit`/`rollback` calls and fails the
/// ones it was configured to fail.
#[derive(Debug, Default)]
pub struct ScriptedTransactionProvider {
    fail_begin: bool,
    fail_commit: bool,
    fail_rollback: bool,
    log: TransactionLog,
}

impl ScriptedTransactionProvider {
    /// A provider whose transactions always succeed.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `begin` fail.
    #[must_use]
    pub fn failing_begin(mut self) -> Self {
        self.fail_begin = true;
        self
    }

    /// Make `commit` fail.
    #[must_use]
    pub fn failing_commit(mut self) -> Self {
        self.fail_commit = true;
        self
    }

    /// Make `rollback` fail.
    #[must_use]
    pub fn failing_rollback(mut self) -> Self {
        self.fail_rollback = true;
        self
    }

    /// Returns a snapshot of the calls made so far.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex is poisoned.
    pub fn calls(&self) -> Vec<&'static str> {
        self.log.lock().unwrap().clone()
    }
}

#[async_trait]
impl TransactionProvider for ScriptedTransactionProvider {
    type Transaction = ScriptedTransaction;

    async fn begin(&self) -> Result<ScriptedTransaction, DomainError> {
        self.log.lock().unwrap().push("begin");
        if self.fail_begin {
            return Err(DomainError::Infrastructure("begin refused".into()));
        }
        Ok(ScriptedTransaction {
            hooks: Vec::new(),
            fail_commit: self.fail_commit,
            fail_rollback: self.fail_rollback,
            log: Arc::clone(&self.log),
        })
    }
}

/// Transaction handed out by [`ScriptedTransactionProvider`].
pub struct ScriptedTransaction {
    hooks: Vec<CommitHook>,
    fail_commit: bool,
    fail_rollback: bool,
    log: TransactionLog,
}

#[async_trait]
impl Transaction for ScriptedTransaction {
    fn on_commit(&mut self, hook: CommitHook) {
        self.hooks.push(hook);
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.log.lock().unwrap().push("commit");
        if self.fail_commit {
            return Err(DomainError::Infrastructure("commit refused".into()));
        }
        for hook in self.hooks {
            hook();
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.log.lock().unwrap().push("rollback");
        if self.fail_rollback {
            return Err(DomainError::Infrastructure("rollback refused".into()));
        }
        Ok(())
    }
}
