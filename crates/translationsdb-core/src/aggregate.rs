//! Aggregate abstraction and the replay engine.

use tokio_util::sync::CancellationToken;
use tracing::trace;

use crate::error::{CodecError, DomainError};
use crate::event::DomainEvent;
use crate::store::EventCursor;

/// State that is rebuilt by folding events.
pub trait Aggregate: Send {
    /// The event type this aggregate consumes.
    type Event: DomainEvent;

    /// Folds one event into the state. Events the aggregate has no rule for
    /// must leave it unchanged.
    fn apply(&mut self, event: &Self::Event);
}

/// Drives `cursor` to exhaustion, folding every event into `initial`.
///
/// Stored events whose tag `A::Event` does not recognize are skipped so that
/// older readers keep working as the event catalog grows.
///
/// # Errors
///
/// Returns `DomainError::Cancelled` if `cancellation` fires before the cursor
/// is exhausted, `DomainError::Codec` for malformed records, and any error
/// the cursor itself reports.
pub async fn replay<A: Aggregate>(
    mut state: A,
    cursor: &mut dyn EventCursor,
    cancellation: &CancellationToken,
) -> Result<A, DomainError> {
    loop {
        if cancellation.is_cancelled() {
            return Err(DomainError::Cancelled);
        }
        let Some(stored) = cursor.next().await? else {
            return Ok(state);
        };
        match A::Event::from_stored(&stored) {
            Ok(event) => state.apply(&event),
            Err(CodecError::NoTypeMatch { type_name }) => {
                trace!(position = stored.position, %type_name, "skipping unrecognized event");
            }
            Err(err) => return Err(err.into()),
        }
    }
}
