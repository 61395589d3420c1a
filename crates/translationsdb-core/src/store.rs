//! Event store abstraction.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::EventMetadata;

/// Stored representation of a domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoredEvent {
    /// Position in the log, assigned on append. Starts at 1.
    pub position: i64,
    /// Event identifier.
    pub event_id: Uuid,
    /// Event type tag.
    pub event_type: String,
    /// Aggregate this event belongs to.
    pub aggregate_id: String,
    /// Who issued the command.
    pub actor: String,
    /// Correlation ID for tracing.
    pub correlation_id: Uuid,
    /// Tagged payload produced by [`crate::codec::encode`].
    pub payload: String,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

impl StoredEvent {
    /// Returns the metadata columns of this record.
    #[must_use]
    pub fn metadata(&self) -> EventMetadata {
        EventMetadata {
            event_id: self.event_id,
            event_type: self.event_type.clone(),
            aggregate_id: self.aggregate_id.clone(),
            actor: self.actor.clone(),
            correlation_id: self.correlation_id,
            occurred_at: self.occurred_at,
        }
    }
}

/// Filter applied by a cursor. An empty query matches the whole log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Only events whose aggregate id is in this set.
    pub aggregate_ids: Option<Vec<String>>,
    /// Only events whose type tag is in this set.
    pub event_types: Option<Vec<String>>,
}

impl Query {
    /// A query matching every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Restricts the query to the given aggregate ids.
    #[must_use]
    pub fn aggregate_ids<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.aggregate_ids = Some(ids.into_iter().map(Into::into).collect());
        self
    }

    /// Restricts the query to the given event type tags.
    #[must_use]
    pub fn event_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.event_types = Some(types.into_iter().map(Into::into).collect());
        self
    }

    /// Returns whether `event` satisfies every predicate of this query.
    #[must_use]
    pub fn matches(&self, event: &StoredEvent) -> bool {
        let aggregate_ok = self
            .aggregate_ids
            .as_ref()
            .is_none_or(|ids| ids.iter().any(|id| *id == event.aggregate_id));
        let type_ok = self
            .event_types
            .as_ref()
            .is_none_or(|types| types.iter().any(|t| *t == event.event_type));
        aggregate_ok && type_ok
    }
}

/// A lazy, finite, non-restartable sequence of events in store order.
///
/// Open a fresh cursor to replay from the start.
#[async_trait]
pub trait EventCursor: Send {
    /// Returns the next matching event, or `Ok(None)` once exhausted.
    async fn next(&mut self) -> Result<Option<StoredEvent>, DomainError>;
}

/// Append-only, ordered log of events.
#[async_trait]
pub trait EventStore: Send + Sync {
    /// Appends an event to the end of the log and returns it with its
    /// assigned position.
    async fn append(&self, event: StoredEvent) -> Result<StoredEvent, DomainError>;

    /// Opens a cursor over the events matching `query`.
    ///
    /// The cursor sees the log as it was when opened; later appends are not
    /// visible to it.
    async fn open_cursor(&self, query: Query) -> Result<Box<dyn EventCursor>, DomainError>;
}

/// Cursor over a snapshot of the log taken when it was opened.
#[derive(Debug)]
pub struct SnapshotCursor {
    events: std::vec::IntoIter<StoredEvent>,
    query: Query,
}

impl SnapshotCursor {
    /// Creates a cursor over `events`, which must already be in store order.
    /// Filtering happens lazily as the cursor advances.
    #[must_use]
    pub fn new(events: Vec<StoredEvent>, query: Query) -> Self {
        Self {
            events: events.into_iter(),
            query,
        }
    }
}

#[async_trait]
impl EventCursor for SnapshotCursor {
    async fn next(&mut self) -> Result<Option<StoredEvent>, DomainError> {
        let query = &self.query;
        Ok(self.events.find(|event| query.matches(event)))
    }
}
