//! Read model abstraction.

use async_trait::async_trait;

use crate::error::DomainError;
use crate::event::DomainEvent;
use crate::transaction::Transaction;

/// A projection kept consistent with the log by the command pipeline.
///
/// The event store itself is a read model that appends. Implementations must
/// accept events for aggregates they have never seen.
#[async_trait]
pub trait ReadModel<Tx, E>: Send + Sync
where
    Tx: Transaction,
    E: DomainEvent,
{
    /// Name used in logs.
    fn name(&self) -> &str;

    /// Applies `event` within `tx`. Writes must not become visible before
    /// `tx` commits.
    async fn handle(&self, tx: &mut Tx, event: &E) -> Result<(), DomainError>;
}
