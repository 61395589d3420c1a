//! Domain events for the Projects context.

use std::sync::LazyLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use translationsdb_core::codec::{self, Candidates, Tagged};
use translationsdb_core::command::CommandContext;
use translationsdb_core::error::CodecError;
use translationsdb_core::event::{DomainEvent, EventMetadata};
use uuid::Uuid;

/// Event type tag for [`ProjectCreated`].
pub const PROJECT_CREATED_EVENT_TYPE: &str = "translations.ProjectCreated";
/// Event type tag for [`ProjectUpdated`].
pub const PROJECT_UPDATED_EVENT_TYPE: &str = "translations.ProjectUpdated";
/// Event type tag for [`ProjectDeleted`].
pub const PROJECT_DELETED_EVENT_TYPE: &str = "translations.ProjectDeleted";
/// Event type tag for [`KeyCreated`].
pub const KEY_CREATED_EVENT_TYPE: &str = "translations.KeyCreated";
/// Event type tag for [`KeyDeleted`].
pub const KEY_DELETED_EVENT_TYPE: &str = "translations.KeyDeleted";
/// Event type tag for [`TranslationUpdated`].
pub const TRANSLATION_UPDATED_EVENT_TYPE: &str = "translations.TranslationUpdated";
/// Event type tag for [`TranslationDeleted`].
pub const TRANSLATION_DELETED_EVENT_TYPE: &str = "translations.TranslationDeleted";

/// Emitted when a project is created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectCreated {
    /// The project identifier.
    pub id: String,
    /// Display name.
    pub name: String,
}

/// Emitted when a project is renamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectUpdated {
    /// The project identifier.
    pub id: String,
    /// New display name.
    pub name: String,
}

/// Emitted when a project is deleted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDeleted {
    /// The project identifier.
    pub id: String,
}

/// Emitted when a key is added to a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyCreated {
    /// The key identifier, unique within its project.
    pub id: String,
    /// Owning project.
    pub project_id: String,
}

/// Emitted when a key is removed from a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KeyDeleted {
    /// The key identifier.
    pub id: String,
    /// Owning project.
    pub project_id: String,
}

/// Emitted when a translation value is set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationUpdated {
    /// The locale code.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Owning key.
    pub key_id: String,
    /// New value.
    pub value: String,
}

/// Emitted when a translation is removed from its key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationDeleted {
    /// The locale code.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Owning key.
    pub key_id: String,
}

impl Tagged for ProjectCreated {
    const TYPE_NAME: &'static str = PROJECT_CREATED_EVENT_TYPE;
}

impl Tagged for ProjectUpdated {
    const TYPE_NAME: &'static str = PROJECT_UPDATED_EVENT_TYPE;
}

impl Tagged for ProjectDeleted {
    const TYPE_NAME: &'static str = PROJECT_DELETED_EVENT_TYPE;
}

impl Tagged for KeyCreated {
    const TYPE_NAME: &'static str = KEY_CREATED_EVENT_TYPE;
}

impl Tagged for KeyDeleted {
    const TYPE_NAME: &'static str = KEY_DELETED_EVENT_TYPE;
}

impl Tagged for TranslationUpdated {
    const TYPE_NAME: &'static str = TRANSLATION_UPDATED_EVENT_TYPE;
}

impl Tagged for TranslationDeleted {
    const TYPE_NAME: &'static str = TRANSLATION_DELETED_EVENT_TYPE;
}

/// Event payload variants for the Projects context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum ProjectEventKind {
    /// A project has been created.
    ProjectCreated(ProjectCreated),
    /// A project has been renamed.
    ProjectUpdated(ProjectUpdated),
    /// A project has been deleted.
    ProjectDeleted(ProjectDeleted),
    /// A key has been added to a project.
    KeyCreated(KeyCreated),
    /// A key has been removed from a project.
    KeyDeleted(KeyDeleted),
    /// A translation value has been set.
    TranslationUpdated(TranslationUpdated),
    /// A translation has been removed.
    TranslationDeleted(TranslationDeleted),
}

static CANDIDATES: LazyLock<Candidates<ProjectEventKind>> = LazyLock::new(|| {
    Candidates::new()
        .with(ProjectEventKind::ProjectCreated)
        .with(ProjectEventKind::ProjectUpdated)
        .with(ProjectEventKind::ProjectDeleted)
        .with(ProjectEventKind::KeyCreated)
        .with(ProjectEventKind::KeyDeleted)
        .with(ProjectEventKind::TranslationUpdated)
        .with(ProjectEventKind::TranslationDeleted)
});

impl ProjectEventKind {
    /// Tag of the payload type.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::ProjectCreated(_) => PROJECT_CREATED_EVENT_TYPE,
            Self::ProjectUpdated(_) => PROJECT_UPDATED_EVENT_TYPE,
            Self::ProjectDeleted(_) => PROJECT_DELETED_EVENT_TYPE,
            Self::KeyCreated(_) => KEY_CREATED_EVENT_TYPE,
            Self::KeyDeleted(_) => KEY_DELETED_EVENT_TYPE,
            Self::TranslationUpdated(_) => TRANSLATION_UPDATED_EVENT_TYPE,
            Self::TranslationDeleted(_) => TRANSLATION_DELETED_EVENT_TYPE,
        }
    }

    /// The project this payload folds into.
    #[must_use]
    pub fn aggregate_id(&self) -> &str {
        match self {
            Self::ProjectCreated(e) => &e.id,
            Self::ProjectUpdated(e) => &e.id,
            Self::ProjectDeleted(e) => &e.id,
            Self::KeyCreated(e) => &e.project_id,
            Self::KeyDeleted(e) => &e.project_id,
            Self::TranslationUpdated(e) => &e.project_id,
            Self::TranslationDeleted(e) => &e.project_id,
        }
    }

    /// Encodes the payload into the tagged wire format.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::Malformed` if the payload cannot be serialized.
    pub fn encode(&self) -> Result<String, CodecError> {
        match self {
            Self::ProjectCreated(e) => codec::encode(e),
            Self::ProjectUpdated(e) => codec::encode(e),
            Self::ProjectDeleted(e) => codec::encode(e),
            Self::KeyCreated(e) => codec::encode(e),
            Self::KeyDeleted(e) => codec::encode(e),
            Self::TranslationUpdated(e) => codec::encode(e),
            Self::TranslationDeleted(e) => codec::encode(e),
        }
    }

    /// Decodes a tagged payload into one of the seven kinds.
    ///
    /// # Errors
    ///
    /// Returns `CodecError::NoTypeMatch` for a tag outside this context and
    /// `CodecError::Malformed` for invalid data.
    pub fn decode(wire: &str) -> Result<Self, CodecError> {
        CANDIDATES.decode(wire)
    }
}

/// Domain event envelope for the Projects context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectEvent {
    /// Event metadata.
    pub metadata: EventMetadata,
    /// Event-specific payload.
    pub kind: ProjectEventKind,
}

impl ProjectEvent {
    /// Wraps `kind` in metadata taken from the command context.
    #[must_use]
    pub fn new(
        kind: ProjectEventKind,
        event_id: Uuid,
        ctx: &CommandContext,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            metadata: EventMetadata {
                event_id,
                event_type: kind.event_type().to_owned(),
                aggregate_id: kind.aggregate_id().to_owned(),
                actor: ctx.actor.clone(),
                correlation_id: ctx.correlation_id,
                occurred_at,
            },
            kind,
        }
    }

    /// Time the event happened.
    #[must_use]
    pub fn occurred_at(&self) -> DateTime<Utc> {
        self.metadata.occurred_at
    }

    /// Pretty-printed JSON of the whole event, as kept in aggregate history.
    #[must_use]
    pub fn to_history_entry(&self) -> String {
        // Serializing derived Serialize types with string keys cannot fail.
        serde_json::to_string_pretty(self).expect("ProjectEvent serialization is infallible")
    }
}

impl DomainEvent for ProjectEvent {
    fn event_type(&self) -> &'static str {
        self.kind.event_type()
    }

    fn metadata(&self) -> &EventMetadata {
        &self.metadata
    }

    fn encode_payload(&self) -> Result<String, CodecError> {
        self.kind.encode()
    }

    fn decode(metadata: EventMetadata, wire: &str) -> Result<Self, CodecError> {
        let kind = ProjectEventKind::decode(wire)?;
        Ok(Self { metadata, kind })
    }
}
