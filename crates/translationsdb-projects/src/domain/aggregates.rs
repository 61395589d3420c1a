//! Aggregates for the Projects context.
//!
//! [`ProjectState`] folds a single project's stream; [`ProjectList`] folds the
//! whole log, routing each event to the project it belongs to.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::Serialize;
use translationsdb_core::aggregate::Aggregate;

use crate::domain::events::{KeyCreated, ProjectCreated, ProjectEvent, ProjectEventKind};

/// Locales every project starts with.
pub const DEFAULT_LOCALES: [&str; 2] = ["es", "en"];

/// One locale's value for a key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Translation {
    /// The locale code.
    pub id: String,
    /// Owning project.
    pub project_id: String,
    /// Owning key.
    pub key_id: String,
    /// When the translation was created.
    pub date_created: DateTime<Utc>,
    /// When the value last changed.
    pub date_updated: DateTime<Utc>,
    /// Free-text value; empty until first set.
    pub value: String,
}

/// A translatable key, owned by exactly one project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Key {
    /// The key identifier.
    pub id: String,
    /// When the key was created.
    pub date_created: DateTime<Utc>,
    /// When the key or one of its translations last changed.
    pub date_updated: DateTime<Utc>,
    /// Translations by locale.
    pub translations_by_id: BTreeMap<String, Translation>,
}

impl Key {
    fn new(event: &KeyCreated, locales: &[String], at: DateTime<Utc>) -> Self {
        let translations_by_id = locales
            .iter()
            .map(|locale| {
                let translation = Translation {
                    id: locale.clone(),
                    project_id: event.project_id.clone(),
                    key_id: event.id.clone(),
                    date_created: at,
                    date_updated: at,
                    value: String::new(),
                };
                (locale.clone(), translation)
            })
            .collect();
        Self {
            id: event.id.clone(),
            date_created: at,
            date_updated: at,
            translations_by_id,
        }
    }
}

/// The project aggregate root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Project {
    /// The project identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// When the project was created.
    pub date_created: DateTime<Utc>,
    /// When a folded event last changed the project.
    pub date_updated: DateTime<Utc>,
    /// Locales each new key is created with.
    pub locales: Vec<String>,
    /// Keys by id.
    pub keys_by_id: BTreeMap<String, Key>,
    /// Serialized events folded so far, most recent first.
    pub history: Vec<String>,
}

impl Project {
    fn new(event: &ProjectCreated, at: DateTime<Utc>) -> Self {
        Self {
            id: event.id.clone(),
            name: event.name.clone(),
            date_created: at,
            date_updated: at,
            locales: DEFAULT_LOCALES.iter().map(|&l| l.to_owned()).collect(),
            keys_by_id: BTreeMap::new(),
            history: Vec::new(),
        }
    }

    /// Whether the project has a key with this id.
    #[must_use]
    pub fn has_key(&self, key_id: &str) -> bool {
        self.keys_by_id.contains_key(key_id)
    }

    /// Whether the project knows this locale.
    #[must_use]
    pub fn has_locale(&self, locale: &str) -> bool {
        self.locales.iter().any(|l| l == locale)
    }

    /// Looks up a translation by key and locale.
    #[must_use]
    pub fn translation(&self, key_id: &str, locale: &str) -> Option<&Translation> {
        self.keys_by_id
            .get(key_id)
            .and_then(|key| key.translations_by_id.get(locale))
    }

    fn record(&mut self, event: &ProjectEvent) {
        self.history.insert(0, event.to_history_entry());
    }

    /// Applies a non-lifecycle event. Returns whether anything changed.
    fn fold(&mut self, kind: &ProjectEventKind, at: DateTime<Utc>) -> bool {
        match kind {
            ProjectEventKind::ProjectUpdated(e) => {
                self.name.clone_from(&e.name);
                true
            }
            ProjectEventKind::KeyCreated(e) => {
                if self.has_key(&e.id) {
                    return false;
                }
                let key = Key::new(e, &self.locales, at);
                self.keys_by_id.insert(e.id.clone(), key);
                true
            }
            ProjectEventKind::KeyDeleted(e) => self.keys_by_id.remove(&e.id).is_some(),
            ProjectEventKind::TranslationUpdated(e) => {
                let Some(key) = self.keys_by_id.get_mut(&e.key_id) else {
                    return false;
                };
                let Some(translation) = key.translations_by_id.get_mut(&e.id) else {
                    return false;
                };
                translation.value.clone_from(&e.value);
                translation.date_updated = at;
                key.date_updated = at;
                true
            }
            ProjectEventKind::TranslationDeleted(e) => self
                .keys_by_id
                .get_mut(&e.key_id)
                .is_some_and(|key| key.translations_by_id.remove(&e.id).is_some()),
            ProjectEventKind::ProjectCreated(_) | ProjectEventKind::ProjectDeleted(_) => false,
        }
    }
}

/// Lifecycle of a single project.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "project", rename_all = "snake_case")]
pub enum ProjectState {
    /// No creation event has been folded.
    #[default]
    Empty,
    /// The project exists.
    Active(Project),
    /// The project was deleted; its last state is kept for inspection.
    Deleted(Project),
}

impl ProjectState {
    /// The live project, if any.
    #[must_use]
    pub fn project(&self) -> Option<&Project> {
        match self {
            Self::Active(project) => Some(project),
            Self::Empty | Self::Deleted(_) => None,
        }
    }

    /// Consumes the state, returning the live project if any.
    #[must_use]
    pub fn into_project(self) -> Option<Project> {
        match self {
            Self::Active(project) => Some(project),
            Self::Empty | Self::Deleted(_) => None,
        }
    }

    /// Whether a deletion was the last lifecycle event.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        matches!(self, Self::Deleted(_))
    }
}

impl Aggregate for ProjectState {
    type Event = ProjectEvent;

    fn apply(&mut self, event: &ProjectEvent) {
        let at = event.occurred_at();
        *self = match (std::mem::take(self), &event.kind) {
            (_, ProjectEventKind::ProjectCreated(e)) => {
                let mut project = Project::new(e, at);
                project.record(event);
                Self::Active(project)
            }
            (Self::Active(mut project), ProjectEventKind::ProjectDeleted(_)) => {
                project.date_updated = at;
                project.record(event);
                Self::Deleted(project)
            }
            (Self::Active(mut project), kind) => {
                if project.fold(kind, at) {
                    project.date_updated = at;
                }
                project.record(event);
                Self::Active(project)
            }
            (unchanged, _) => unchanged,
        };
    }
}

/// Every live project, plus the history of the whole log in append order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ProjectList {
    /// Live projects by id.
    pub projects_by_id: BTreeMap<String, Project>,
    /// Serialized events folded so far, oldest first.
    pub history: Vec<String>,
}

impl ProjectList {
    /// Looks up a live project.
    #[must_use]
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects_by_id.get(id)
    }
}

impl Aggregate for ProjectList {
    type Event = ProjectEvent;

    fn apply(&mut self, event: &ProjectEvent) {
        let id = &event.metadata.aggregate_id;
        let mut state = self
            .projects_by_id
            .remove(id)
            .map_or(ProjectState::Empty, ProjectState::Active);
        state.apply(event);
        if let ProjectState::Active(project) = state {
            self.projects_by_id.insert(id.clone(), project);
        }
        self.history.push(event.to_history_entry());
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, TimeZone};
    use translationsdb_core::command::CommandContext;
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::{
        KeyDeleted, ProjectDeleted, ProjectUpdated, TranslationDeleted, TranslationUpdated,
    };

    fn at(minutes: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 1, 15, 10, 0, 0).unwrap() + Duration::minutes(minutes)
    }

    fn event(minutes: i64, kind: ProjectEventKind) -> ProjectEvent {
        let ctx = CommandContext::new("tester", Uuid::nil());
        let n = u128::try_from(minutes).unwrap();
        ProjectEvent::new(kind, Uuid::from_u128(n), &ctx, at(minutes))
    }

    fn created(minutes: i64, id: &str, name: &str) -> ProjectEvent {
        event(
            minutes,
            ProjectEventKind::ProjectCreated(ProjectCreated {
                id: id.into(),
                name: name.into(),
            }),
        )
    }

    fn key_created(minutes: i64, project_id: &str, id: &str) -> ProjectEvent {
        event(
            minutes,
            ProjectEventKind::KeyCreated(KeyCreated {
                id: id.into(),
                project_id: project_id.into(),
            }),
        )
    }

    fn translated(minutes: i64, project_id: &str, key_id: &str, locale: &str, value: &str) -> ProjectEvent {
        event(
            minutes,
            ProjectEventKind::TranslationUpdated(TranslationUpdated {
                id: locale.into(),
                project_id: project_id.into(),
                key_id: key_id.into(),
                value: value.into(),
            }),
        )
    }

    fn deleted(minutes: i64, id: &str) -> ProjectEvent {
        event(minutes, ProjectEventKind::ProjectDeleted(ProjectDeleted { id: id.into() }))
    }

    fn fold<A: Aggregate<Event = ProjectEvent> + Default>(events: &[ProjectEvent]) -> A {
        let mut state = A::default();
        for e in events {
            state.apply(e);
        }
        state
    }

    fn active(state: ProjectState) -> Project {
        state.into_project().expect("project should be active")
    }

    #[test]
    fn test_created_key_has_one_empty_translation_per_locale() {
        // Arrange
        let events = [created(0, "p1", "Demo"), key_created(1, "p1", "k1")];

        // Act
        let project = active(fold(&events));

        // Assert
        let key = &project.keys_by_id["k1"];
        assert_eq!(project.locales, ["es", "en"]);
        assert_eq!(key.translations_by_id.len(), 2);
        assert!(key.translations_by_id.values().all(|t| t.value.is_empty()));
        assert_eq!(key.translations_by_id["es"].key_id, "k1");
        assert_eq!(key.translations_by_id["es"].project_id, "p1");
        assert_eq!(project.date_updated, at(1));
    }

    #[test]
    fn test_created_updated_translated_scenario() {
        // Arrange
        let events = [
            created(0, "p1", "Demo"),
            key_created(1, "p1", "k1"),
            translated(2, "p1", "k1", "en", "Hello"),
        ];

        // Act
        let project = active(fold(&events));

        // Assert
        assert_eq!(project.name, "Demo");
        assert_eq!(project.keys_by_id.len(), 1);
        assert_eq!(project.translation("k1", "en").unwrap().value, "Hello");
        assert_eq!(project.translation("k1", "es").unwrap().value, "");
        assert_eq!(project.keys_by_id["k1"].date_updated, at(2));
        assert_eq!(project.date_created, at(0));
        assert_eq!(project.date_updated, at(2));
    }

    #[test]
    fn test_history_is_most_recent_first() {
        let events = [created(0, "p1", "Demo"), key_created(1, "p1", "k1")];

        let project = active(fold(&events));

        assert_eq!(project.history.len(), 2);
        assert_eq!(project.history[0], events[1].to_history_entry());
        assert_eq!(project.history[1], events[0].to_history_entry());
    }

    #[test]
    fn test_translation_update_for_missing_key_changes_only_history() {
        // Arrange
        let before: ProjectState = fold(&[created(0, "p1", "Demo"), key_created(1, "p1", "k1")]);
        let mut after = before.clone();

        // Act
        after.apply(&translated(5, "p1", "missing", "en", "Hello"));

        // Assert
        let mut before = active(before);
        let after = active(after);
        assert_eq!(after.history.len(), before.history.len() + 1);
        before.history.clone_from(&after.history);
        assert_eq!(after, before);
    }

    #[test]
    fn test_translation_update_for_unknown_locale_is_ignored() {
        let before: ProjectState = fold(&[created(0, "p1", "Demo"), key_created(1, "p1", "k1")]);
        let mut after = before.clone();

        after.apply(&translated(5, "p1", "k1", "fr", "Bonjour"));

        let after = active(after);
        assert!(after.translation("k1", "fr").is_none());
        assert_eq!(after.date_updated, at(1));
    }

    #[test]
    fn test_duplicate_key_creation_keeps_existing_translations() {
        let events = [
            created(0, "p1", "Demo"),
            key_created(1, "p1", "k1"),
            translated(2, "p1", "k1", "en", "Hello"),
            key_created(3, "p1", "k1"),
        ];

        let project = active(fold(&events));

        assert_eq!(project.translation("k1", "en").unwrap().value, "Hello");
        assert_eq!(project.date_updated, at(2));
    }

    #[test]
    fn test_key_and_translation_deletion() {
        // Arrange
        let events = [
            created(0, "p1", "Demo"),
            key_created(1, "p1", "k1"),
            key_created(2, "p1", "k2"),
            event(
                3,
                ProjectEventKind::KeyDeleted(KeyDeleted {
                    id: "k1".into(),
                    project_id: "p1".into(),
                }),
            ),
            event(
                4,
                ProjectEventKind::TranslationDeleted(TranslationDeleted {
                    id: "es".into(),
                    project_id: "p1".into(),
                    key_id: "k2".into(),
                }),
            ),
        ];

        // Act
        let project = active(fold(&events));

        // Assert
        assert!(!project.has_key("k1"));
        assert!(project.translation("k2", "es").is_none());
        assert!(project.translation("k2", "en").is_some());
        assert_eq!(project.date_updated, at(4));
    }

    #[test]
    fn test_project_update_renames() {
        let events = [
            created(0, "p1", "Demo"),
            event(
                1,
                ProjectEventKind::ProjectUpdated(ProjectUpdated {
                    id: "p1".into(),
                    name: "Renamed".into(),
                }),
            ),
        ];

        let project = active(fold(&events));

        assert_eq!(project.name, "Renamed");
        assert_eq!(project.date_updated, at(1));
    }

    #[test]
    fn test_deleted_project_is_inspectable_and_ignores_later_events() {
        // Arrange
        let events = [
            created(0, "p1", "Demo"),
            deleted(1, "p1"),
            key_created(2, "p1", "k1"),
        ];

        // Act
        let state: ProjectState = fold(&events);

        // Assert
        assert!(state.is_deleted());
        assert!(state.project().is_none());
        let ProjectState::Deleted(last) = state else {
            panic!("expected deleted state");
        };
        assert_eq!(last.name, "Demo");
        assert!(!last.has_key("k1"));
        assert_eq!(last.history.len(), 2);
    }

    #[test]
    fn test_events_before_creation_are_ignored() {
        let state: ProjectState = fold(&[key_created(0, "p1", "k1")]);

        assert_eq!(state, ProjectState::Empty);
    }

    #[test]
    fn test_creation_after_deletion_starts_over() {
        let events = [
            created(0, "p1", "Demo"),
            key_created(1, "p1", "k1"),
            deleted(2, "p1"),
            created(3, "p1", "Again"),
        ];

        let project = active(fold(&events));

        assert_eq!(project.name, "Again");
        assert!(project.keys_by_id.is_empty());
        assert_eq!(project.history.len(), 1);
    }

    #[test]
    fn test_project_list_partitions_by_aggregate() {
        // Arrange
        let events = [
            created(0, "p1", "One"),
            created(1, "p2", "Two"),
            key_created(2, "p1", "k1"),
            deleted(3, "p2"),
            key_created(4, "ghost", "k9"),
        ];

        // Act
        let list: ProjectList = fold(&events);

        // Assert
        assert_eq!(list.projects_by_id.len(), 1);
        assert!(list.project("p1").unwrap().has_key("k1"));
        assert!(list.project("p2").is_none());
        assert!(list.project("ghost").is_none());
    }

    #[test]
    fn test_project_list_history_is_in_append_order() {
        let events = [created(0, "p1", "One"), created(1, "p2", "Two")];

        let list: ProjectList = fold(&events);

        assert_eq!(list.history, [events[0].to_history_entry(), events[1].to_history_entry()]);
    }
}
