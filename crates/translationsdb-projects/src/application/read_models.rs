//! Materialized read models for the Projects context.

use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};
use translationsdb_core::aggregate::Aggregate;
use translationsdb_core::error::DomainError;
use translationsdb_core::read_model::ReadModel;
use translationsdb_core::store::EventStore;
use translationsdb_core::transaction::Transaction;

use crate::application::query_handlers::get_project_list;
use crate::domain::aggregates::{Project, ProjectList};
use crate::domain::events::ProjectEvent;

/// A [`ProjectList`] kept in memory and folded forward as commands commit.
#[derive(Debug, Default, Clone)]
pub struct InMemoryProjectList {
    list: Arc<RwLock<ProjectList>>,
}

impl InMemoryProjectList {
    /// Creates an empty projection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the projection with a full replay of `store`.
    ///
    /// # Errors
    ///
    /// Returns the replay's error; the projection is left untouched.
    pub async fn hydrate(
        &self,
        store: &dyn EventStore,
        cancellation: &CancellationToken,
    ) -> Result<(), DomainError> {
        let list = get_project_list(store, cancellation).await?;
        debug!(
            projects = list.projects_by_id.len(),
            events = list.history.len(),
            "project list hydrated"
        );
        *self.list.write().unwrap_or_else(PoisonError::into_inner) = list;
        Ok(())
    }

    /// A live project by id.
    #[must_use]
    pub fn get_project(&self, id: &str) -> Option<Project> {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .project(id)
            .cloned()
    }

    /// Every live project, ordered by id.
    #[must_use]
    pub fn list_projects(&self) -> Vec<Project> {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .projects_by_id
            .values()
            .cloned()
            .collect()
    }

    /// Number of events folded so far.
    #[must_use]
    pub fn history_len(&self) -> usize {
        self.list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .history
            .len()
    }
}

#[async_trait]
impl<Tx: Transaction> ReadModel<Tx, ProjectEvent> for InMemoryProjectList {
    fn name(&self) -> &str {
        "project_list"
    }

    async fn handle(&self, tx: &mut Tx, event: &ProjectEvent) -> Result<(), DomainError> {
        let list = Arc::clone(&self.list);
        let event = event.clone();
        tx.on_commit(Box::new(move || {
            trace!(aggregate_id = %event.metadata.aggregate_id, "folding into project list");
            list.write()
                .unwrap_or_else(PoisonError::into_inner)
                .apply(&event);
        }));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use translationsdb_core::command::CommandContext;
    use translationsdb_core::event::DomainEvent;
    use translationsdb_core::transaction::TransactionProvider;
    use translationsdb_event_store::{InMemoryEventStore, MemoryTransactionProvider};
    use translationsdb_test_support::FixedClock;
    use uuid::Uuid;

    use super::*;
    use crate::domain::events::{KeyCreated, ProjectCreated, ProjectEventKind};

    fn event(kind: ProjectEventKind) -> ProjectEvent {
        let ctx = CommandContext::new("tester", Uuid::nil());
        ProjectEvent::new(kind, Uuid::new_v4(), &ctx, FixedClock::standard().0)
    }

    fn created(id: &str) -> ProjectEvent {
        event(ProjectEventKind::ProjectCreated(ProjectCreated {
            id: id.into(),
            name: format!("Project {id}"),
        }))
    }

    #[tokio::test]
    async fn test_handle_becomes_visible_on_commit() {
        // Arrange
        let projection = InMemoryProjectList::new();
        let mut tx = MemoryTransactionProvider.begin().await.unwrap();

        // Act
        projection.handle(&mut tx, &created("p1")).await.unwrap();
        let before = projection.get_project("p1");
        tx.commit().await.unwrap();

        // Assert
        assert!(before.is_none());
        assert_eq!(projection.get_project("p1").unwrap().name, "Project p1");
        assert_eq!(projection.history_len(), 1);
    }

    #[tokio::test]
    async fn test_handle_is_discarded_on_rollback() {
        let projection = InMemoryProjectList::new();
        let mut tx = MemoryTransactionProvider.begin().await.unwrap();

        projection.handle(&mut tx, &created("p1")).await.unwrap();
        tx.rollback().await.unwrap();

        assert!(projection.list_projects().is_empty());
        assert_eq!(projection.history_len(), 0);
    }

    #[tokio::test]
    async fn test_events_for_unseen_projects_are_tolerated() {
        let projection = InMemoryProjectList::new();
        let mut tx = MemoryTransactionProvider.begin().await.unwrap();

        projection
            .handle(
                &mut tx,
                &event(ProjectEventKind::KeyCreated(KeyCreated {
                    id: "k1".into(),
                    project_id: "ghost".into(),
                })),
            )
            .await
            .unwrap();
        tx.commit().await.unwrap();

        assert!(projection.list_projects().is_empty());
        assert_eq!(projection.history_len(), 1);
    }

    #[tokio::test]
    async fn test_hydrate_replays_the_log() {
        // Arrange
        let store = InMemoryEventStore::new();
        for id in ["p2", "p1"] {
            store.append(created(id).to_stored().unwrap()).await.unwrap();
        }
        let projection = InMemoryProjectList::new();

        // Act
        projection
            .hydrate(&store, &CancellationToken::new())
            .await
            .unwrap();

        // Assert
        let ids: Vec<String> = projection
            .list_projects()
            .into_iter()
            .map(|p| p.id)
            .collect();
        assert_eq!(ids, ["p1", "p2"]);
        assert_eq!(projection.history_len(), 2);
    }
}
