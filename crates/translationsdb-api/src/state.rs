//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;
use tokio_util::sync::CancellationToken;
use translationsdb_core::clock::Clock;
use translationsdb_core::id::IdGenerator;
use translationsdb_core::pipeline::SharedReadModel;
use translationsdb_core::read_model::ReadModel;
use translationsdb_core::store::EventStore;
use translationsdb_core::transaction::TransactionProvider;
use translationsdb_event_store::{
    InMemoryEventStore, MemoryTransactionProvider, PgEventStore, PgTransactionProvider,
};
use translationsdb_projects::application::command_handlers::CommandDeps;
use translationsdb_projects::application::pipelines::ProjectCommands;
use translationsdb_projects::application::read_models::InMemoryProjectList;
use translationsdb_projects::domain::events::ProjectEvent;

/// Application state shared across all request handlers.
#[derive(Clone)]
pub struct AppState {
    /// One pipeline per command.
    pub commands: ProjectCommands,
    /// The log, for replay-based queries.
    pub event_store: Arc<dyn EventStore>,
    /// Materialized list of live projects.
    pub projection: Arc<InMemoryProjectList>,
    /// Storage backend name, reported by `/health`.
    pub storage: &'static str,
    /// Cancelled on shutdown. Each request works under a child token.
    pub shutdown: CancellationToken,
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("storage", &self.storage)
            .finish_non_exhaustive()
    }
}

impl AppState {
    /// A token for one request, cancelled when the server shuts down.
    #[must_use]
    pub fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }

    /// State backed by an in-memory log.
    #[must_use]
    pub fn in_memory(clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let store = Arc::new(InMemoryEventStore::new());
        Self::wire(Arc::new(MemoryTransactionProvider), store, clock, ids, "memory")
    }

    /// State backed by the PostgreSQL `events` table.
    #[must_use]
    pub fn postgres(pool: PgPool, clock: Arc<dyn Clock>, ids: Arc<dyn IdGenerator>) -> Self {
        let store = Arc::new(PgEventStore::new(pool.clone()));
        let provider = Arc::new(PgTransactionProvider::new(pool));
        Self::wire(provider, store, clock, ids, "postgres")
    }

    /// Registers the log first, then the project list, so the projection
    /// never sees an event the log does not hold.
    fn wire<P, S>(
        provider: Arc<P>,
        store: Arc<S>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
        storage: &'static str,
    ) -> Self
    where
        P: TransactionProvider,
        S: EventStore + ReadModel<P::Transaction, ProjectEvent> + 'static,
    {
        let projection = Arc::new(InMemoryProjectList::new());
        let event_store: Arc<dyn EventStore> = store.clone();
        let deps = CommandDeps::new(Arc::clone(&event_store), clock, ids);

        let mut read_models: Vec<SharedReadModel<P::Transaction, ProjectEvent>> = Vec::new();
        read_models.push(store);
        read_models.push(projection.clone());

        Self {
            commands: ProjectCommands::new(provider, &deps, &read_models),
            event_store,
            projection,
            storage,
            shutdown: CancellationToken::new(),
        }
    }
}
