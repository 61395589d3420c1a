//! Query handlers for the Projects context.
//!
//! Each query opens a fresh cursor and replays the matching events, so the
//! answer reflects the log at the moment the cursor was opened.

use tokio_util::sync::CancellationToken;
use translationsdb_core::aggregate::replay;
use translationsdb_core::error::DomainError;
use translationsdb_core::store::{EventStore, Query};

use crate::domain::aggregates::{Project, ProjectList, ProjectState};

/// Replays one project's stream into its lifecycle state.
///
/// # Errors
///
/// Returns `DomainError::Cancelled` if `cancellation` fires mid-replay,
/// `DomainError::Codec` for malformed records, and any store error.
pub async fn get_project_state(
    store: &dyn EventStore,
    id: &str,
    cancellation: &CancellationToken,
) -> Result<ProjectState, DomainError> {
    let mut cursor = store.open_cursor(Query::all().aggregate_ids([id])).await?;
    replay(ProjectState::Empty, cursor.as_mut(), cancellation).await
}

/// Retrieves a live project by id.
///
/// # Errors
///
/// Returns `DomainError::NotFound` if the project was never created or has
/// been deleted, plus the errors of [`get_project_state`].
pub async fn get_project(
    store: &dyn EventStore,
    id: &str,
    cancellation: &CancellationToken,
) -> Result<Project, DomainError> {
    get_project_state(store, id, cancellation)
        .await?
        .into_project()
        .ok_or_else(|| DomainError::NotFound(format!("project {id}")))
}

/// Replays the whole log into the list of live projects.
///
/// # Errors
///
/// See [`get_project_state`].
pub async fn get_project_list(
    store: &dyn EventStore,
    cancellation: &CancellationToken,
) -> Result<ProjectList, DomainError> {
    let mut cursor = store.open_cursor(Query::all()).await?;
    replay(ProjectList::default(), cursor.as_mut(), cancellation).await
}

#[cfg(test)]
mod tests {
    use translationsdb_core::command::CommandContext;
    use translationsdb_core::event::DomainEvent;
    use translationsdb_event_store::InMemoryEventStore;
    use translationsdb_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::{
        KeyCreated, ProjectCreated, ProjectDeleted, ProjectEvent, ProjectEventKind,
        TranslationUpdated,
    };

    async fn append(store: &InMemoryEventStore, kind: ProjectEventKind) {
        let ctx = CommandContext::new("tester", Uuid::nil());
        let event = ProjectEvent::new(kind, Uuid::new_v4(), &ctx, FixedClock::standard().0);
        store.append(event.to_stored().unwrap()).await.unwrap();
    }

    async fn seed_demo(store: &InMemoryEventStore) {
        append(
            store,
            ProjectEventKind::ProjectCreated(ProjectCreated {
                id: "p1".into(),
                name: "Demo".into(),
            }),
        )
        .await;
        append(
            store,
            ProjectEventKind::KeyCreated(KeyCreated {
                id: "k1".into(),
                project_id: "p1".into(),
            }),
        )
        .await;
        append(
            store,
            ProjectEventKind::TranslationUpdated(TranslationUpdated {
                id: "en".into(),
                project_id: "p1".into(),
                key_id: "k1".into(),
                value: "Hello".into(),
            }),
        )
        .await;
    }

    #[tokio::test]
    async fn test_get_project_replays_only_its_own_stream() {
        // Arrange
        let store = InMemoryEventStore::new();
        seed_demo(&store).await;
        append(
            &store,
            ProjectEventKind::ProjectCreated(ProjectCreated {
                id: "p2".into(),
                name: "Other".into(),
            }),
        )
        .await;

        // Act
        let project = get_project(&store, "p1", &CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert_eq!(project.name, "Demo");
        assert_eq!(project.history.len(), 3);
        let key = &project.keys_by_id["k1"];
        assert_eq!(key.translations_by_id["en"].value, "Hello");
        assert_eq!(key.translations_by_id["es"].value, "");
    }

    #[tokio::test]
    async fn test_get_project_for_unknown_id_is_not_found() {
        let store = InMemoryEventStore::new();
        seed_demo(&store).await;

        let result = get_project(&store, "missing", &CancellationToken::new()).await;

        assert!(matches!(result, Err(DomainError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_get_project_for_deleted_project_is_not_found() {
        // Arrange
        let store = InMemoryEventStore::new();
        seed_demo(&store).await;
        append(
            &store,
            ProjectEventKind::ProjectDeleted(ProjectDeleted { id: "p1".into() }),
        )
        .await;

        // Act
        let result = get_project(&store, "p1", &CancellationToken::new()).await;
        let state = get_project_state(&store, "p1", &CancellationToken::new())
            .await
            .unwrap();

        // Assert
        assert!(matches!(result, Err(DomainError::NotFound(_))));
        assert!(state.is_deleted());
    }

    #[tokio::test]
    async fn test_get_project_list_folds_every_project() {
        let store = InMemoryEventStore::new();
        seed_demo(&store).await;
        append(
            &store,
            ProjectEventKind::ProjectCreated(ProjectCreated {
                id: "p2".into(),
                name: "Other".into(),
            }),
        )
        .await;

        let list = get_project_list(&store, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(list.projects_by_id.len(), 2);
        assert_eq!(list.history.len(), 4);
        assert!(list.project("p1").unwrap().has_key("k1"));
    }

    #[tokio::test]
    async fn test_cancelled_query_fails() {
        let store = InMemoryEventStore::new();
        seed_demo(&store).await;
        let token = CancellationToken::new();
        token.cancel();

        let result = get_project_list(&store, &token).await;

        assert!(matches!(result, Err(DomainError::Cancelled)));
    }
}
