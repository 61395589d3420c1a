//! A minimal domain event for exercising stores and pipelines without a
//! bounded context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use translationsdb_core::codec::{self, Candidates, Tagged};
use translationsdb_core::error::CodecError;
use translationsdb_core::event::{DomainEvent, EventMetadata};
use uuid::Uuid;

/// Event type tag for [`Noted`].
pub const NOTED_EVENT_TYPE: &str = "test.Noted";

/// Payload: a note was recorded against an aggregate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Noted {
    /// The note text.
    pub text: String,
}

impl Tagged for Noted {
    const TYPE_NAME: &'static str = NOTED_EVENT_TYPE;
}

/// Envelope around [`Noted`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotedEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event payload.
    pub noted: Noted,
}

impl NotedEvent {
    /// Builds a note event for `aggregate_id`.
    #[must_use]
    pub fn new(event_id: Uuid, aggregate_id: &str, text: &str, occurred_at: DateTime<Utc>) -> Self {
        Self {
            metadata: EventMetadata {
                event_id,
                event_type: NOTED_EVENT_TYPE.to_owned(),
                aggregate_id: aggregate_id.to_owned(),
                actor: "tester".to_owned(),
                correlation_id: event_id,
                occurred_at,
            },
            noted: Noted {
                text: text.to_owned(),
            },
        }
    }
}

impl DomainEvent for NotedEvent {
    fn event_type(&self) -> &'static str {
        NOTED_EVENT_TYPE
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn encode_payload(&self) -> Result<String, CodecError> {
        codec::encode(&self.noted)
    }

    fn decode(metadata: EventMetadata, wire: &str) -> Result<Self, CodecError> {
        let noted = Candidates::new().with(|noted: Noted| noted).decode(wire)?;
        Ok(Self { metadata, noted })
    }
}
