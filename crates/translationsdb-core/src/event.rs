//! Domain event abstractions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CodecError;
use crate::store::StoredEvent;

/// Metadata attached to every domain event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Event identifier.
    pub event_id: Uuid,
    /// Type tag for deserialization routing and query filtering.
    pub event_type: String,
    /// Aggregate this event folds into; the partition key for replay.
    pub aggregate_id: String,
    /// Who issued the command that produced this event.
    pub actor: String,
    /// Correlation ID for tracing a command through its effects.
    pub correlation_id: Uuid,
    /// Timestamp of event creation.
    pub occurred_at: DateTime<Utc>,
}

/// Trait that all domain events implement.
///
/// Implementors are typically an envelope around a closed enum of payload
/// kinds. Only the payload goes through the codec; metadata travels in the
/// [`StoredEvent`] columns.
pub trait DomainEvent: Clone + Send + Sync + std::fmt::Debug + 'static {
    /// Returns the event type tag.
    fn event_type(&self) -> &'static str;

    /// Returns the metadata for this event.
    fn metadata(&self) -> &EventMetadata;

    /// Encodes the payload into the tagged wire format.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the payload cannot be serialized.
    fn encode_payload(&self) -> Result<String, CodecError>;

    /// Rebuilds an event from its metadata and tagged payload.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::NoTypeMatch` for tags this event type does not
    /// know, `CodecError::Malformed` for invalid data.
    fn decode(metadata: EventMetadata, wire: &str) -> Result<Self, CodecError>;

    /// Converts the event into its storage record. The position is assigned
    /// by the store on append.
    ///
    /// # Errors
    ///
    /// Returns `CodecError` if the payload cannot be serialized.
    fn to_stored(&self) -> Result<StoredEvent, CodecError> {
        let meta = self.metadata();
        Ok(StoredEvent {
            position: 0,
            event_id: meta.event_id,
            event_type: self.event_type().to_owned(),
            aggregate_id: meta.aggregate_id.clone(),
            actor: meta.actor.clone(),
            correlation_id: meta.correlation_id,
            payload: self.encode_payload()?,
            occurred_at: meta.occurred_at,
        })
    }

    /// Rebuilds an event from its storage record.
    ///
    /// # Errors
    ///
    /// See [`DomainEvent::decode`].
    fn from_stored(stored: &StoredEvent) -> Result<Self, CodecError> {
        Self::decode(stored.metadata(), &stored.payload)
    }
}
