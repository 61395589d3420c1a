//! `PostgreSQL` implementation of the event store and transaction boundary.

use std::collections::VecDeque;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgConnection, PgPool, Postgres};
use tracing::{debug, trace};
use uuid::Uuid;

use translationsdb_core::error::DomainError;
use translationsdb_core::event::DomainEvent;
use translationsdb_core::read_model::ReadModel;
use translationsdb_core::store::{EventCursor, EventStore, Query, StoredEvent};
use translationsdb_core::transaction::{CommitHook, Transaction, TransactionProvider};

use crate::schema::CREATE_EVENTS_TABLE;

const INSERT_EVENT: &str = r"
INSERT INTO events (event_id, event_type, aggregate_id, actor, correlation_id, payload, occurred_at)
VALUES ($1, $2, $3, $4, $5, $6, $7)
RETURNING position
";

const SELECT_EVENTS_PAGE: &str = r"
SELECT position, event_id, event_type, aggregate_id, actor, correlation_id, payload, occurred_at
FROM events
WHERE ($1::TEXT[] IS NULL OR aggregate_id = ANY($1))
  AND ($2::TEXT[] IS NULL OR event_type = ANY($2))
  AND position > $3
ORDER BY position
LIMIT $4
";

const SNAPSHOT_ISOLATION: &str = "SET TRANSACTION ISOLATION LEVEL REPEATABLE READ, READ ONLY";

/// Rows fetched per round trip by a cursor.
pub const DEFAULT_PAGE_SIZE: i64 = 500;

fn infrastructure(err: sqlx::Error) -> DomainError {
    DomainError::Infrastructure(err.to_string())
}

#[derive(sqlx::FromRow)]
struct EventRow {
    position: i64,
    event_id: Uuid,
    event_type: String,
    aggregate_id: String,
    actor: String,
    correlation_id: Uuid,
    payload: String,
    occurred_at: DateTime<Utc>,
}

impl From<EventRow> for StoredEvent {
    fn from(row: EventRow) -> Self {
        Self {
            position: row.position,
            event_id: row.event_id,
            event_type: row.event_type,
            aggregate_id: row.aggregate_id,
            actor: row.actor,
            correlation_id: row.correlation_id,
            payload: row.payload,
            occurred_at: row.occurred_at,
        }
    }
}

async fn insert(conn: &mut PgConnection, mut event: StoredEvent) -> Result<StoredEvent, DomainError> {
    let (position,): (i64,) = sqlx::query_as(INSERT_EVENT)
        .bind(event.event_id)
        .bind(&event.event_type)
        .bind(&event.aggregate_id)
        .bind(&event.actor)
        .bind(event.correlation_id)
        .bind(&event.payload)
        .bind(event.occurred_at)
        .fetch_one(conn)
        .await
        .map_err(infrastructure)?;
    event.position = position;
    trace!(position, event_type = %event.event_type, "inserted event");
    Ok(event)
}

/// PostgreSQL-backed event store.
#[derive(Debug, Clone)]
pub struct PgEventStore {
    pool: PgPool,
    page_size: i64,
}

impl PgEventStore {
    /// Creates a new `PgEventStore`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            page_size: DEFAULT_PAGE_SIZE,
        }
    }

    /// Sets how many rows a cursor fetches at a time. Values below 1 are
    /// raised to 1.
    #[must_use]
    pub fn with_page_size(mut self, page_size: i64) -> Self {
        self.page_size = page_size.max(1);
        self
    }

    /// Creates the `events` table and its indexes if they are missing.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the DDL cannot be executed.
    pub async fn ensure_schema(&self) -> Result<(), DomainError> {
        sqlx::raw_sql(CREATE_EVENTS_TABLE)
            .execute(&self.pool)
            .await
            .map_err(infrastructure)?;
        debug!("event schema ready");
        Ok(())
    }
}

#[async_trait]
impl EventStore for PgEventStore {
    async fn append(&self, event: StoredEvent) -> Result<StoredEvent, DomainError> {
        let mut conn = self.pool.acquire().await.map_err(infrastructure)?;
        insert(&mut conn, event).await
    }

    async fn open_cursor(&self, query: Query) -> Result<Box<dyn EventCursor>, DomainError> {
        let mut tx = self.pool.begin().await.map_err(infrastructure)?;
        sqlx::query(SNAPSHOT_ISOLATION)
            .execute(&mut *tx)
            .await
            .map_err(infrastructure)?;
        let mut cursor = PgCursor {
            tx: Some(tx),
            page: VecDeque::new(),
            after: 0,
            page_size: self.page_size,
            query,
        };
        // The snapshot is taken by the first read, so read now.
        cursor.fetch_page().await?;
        Ok(Box::new(cursor))
    }
}

/// Reads the log a page at a time inside one REPEATABLE READ transaction,
/// so every page comes from the snapshot taken when the cursor opened.
///
/// Holds a pooled connection until it is exhausted or dropped.
struct PgCursor {
    tx: Option<sqlx::Transaction<'static, Postgres>>,
    page: VecDeque<StoredEvent>,
    after: i64,
    page_size: i64,
    query: Query,
}

impl PgCursor {
    async fn fetch_page(&mut self) -> Result<(), DomainError> {
        let Some(tx) = self.tx.as_mut() else {
            return Ok(());
        };
        let rows: Vec<EventRow> = sqlx::query_as(SELECT_EVENTS_PAGE)
            .bind(self.query.aggregate_ids.as_deref())
            .bind(self.query.event_types.as_deref())
            .bind(self.after)
            .bind(self.page_size)
            .fetch_all(&mut **tx)
            .await
            .map_err(infrastructure)?;
        let exhausted = rows.len() < usize::try_from(self.page_size).unwrap_or(usize::MAX);
        self.page.extend(rows.into_iter().map(StoredEvent::from));
        if let Some(last) = self.page.back() {
            self.after = last.position;
        }
        trace!(buffered = self.page.len(), exhausted, "fetched event page");
        if exhausted {
            if let Some(tx) = self.tx.take() {
                tx.commit().await.map_err(infrastructure)?;
            }
        }
        Ok(())
    }
}

#[async_trait]
impl EventCursor for PgCursor {
    async fn next(&mut self) -> Result<Option<StoredEvent>, DomainError> {
        if self.page.is_empty() {
            self.fetch_page().await?;
        }
        Ok(self.page.pop_front())
    }
}

#[async_trait]
impl<E: DomainEvent> ReadModel<PgTransaction, E> for PgEventStore {
    fn name(&self) -> &str {
        "event_store"
    }

    async fn handle(&self, tx: &mut PgTransaction, event: &E) -> Result<(), DomainError> {
        insert(tx.connection(), event.to_stored()?).await?;
        Ok(())
    }
}

/// Opens `PostgreSQL` transactions for the command pipeline.
#[derive(Debug, Clone)]
pub struct PgTransactionProvider {
    pool: PgPool,
}

impl PgTransactionProvider {
    /// Creates a new `PgTransactionProvider`.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionProvider for PgTransactionProvider {
    type Transaction = PgTransaction;

    async fn begin(&self) -> Result<PgTransaction, DomainError> {
        let inner = self.pool.begin().await.map_err(infrastructure)?;
        Ok(PgTransaction {
            inner,
            hooks: Vec::new(),
        })
    }
}

/// A database transaction plus the commit hooks staged against it.
pub struct PgTransaction {
    inner: sqlx::Transaction<'static, Postgres>,
    hooks: Vec<CommitHook>,
}

impl PgTransaction {
    /// Connection bound to this transaction, for read models that write to
    /// the database.
    pub fn connection(&mut self) -> &mut PgConnection {
        &mut self.inner
    }
}

impl std::fmt::Debug for PgTransaction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PgTransaction")
            .field("staged", &self.hooks.len())
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Transaction for PgTransaction {
    fn on_commit(&mut self, hook: CommitHook) {
        self.hooks.push(hook);
    }

    async fn commit(self) -> Result<(), DomainError> {
        self.inner.commit().await.map_err(infrastructure)?;
        for hook in self.hooks {
            hook();
        }
        Ok(())
    }

    async fn rollback(self) -> Result<(), DomainError> {
        self.inner.rollback().await.map_err(infrastructure)
    }
}
