//! translationsdb API server entry point.

use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use translationsdb_api::config::Config;
use translationsdb_api::error::AppError;
use translationsdb_api::state::AppState;
use translationsdb_api::{routes, seed};
use translationsdb_core::clock::SystemClock;
use translationsdb_core::id::RandomIdGenerator;
use translationsdb_event_store::PgEventStore;

#[tokio::main]
async fn main() -> Result<(), AppError> {
    // Initialize tracing subscriber.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .json()
        .init();

    tracing::info!("Starting translationsdb API server");

    let config = Config::from_env()?;
    let clock = Arc::new(SystemClock);
    let ids = Arc::new(RandomIdGenerator);

    let app_state = match &config.database_url {
        Some(database_url) => {
            let pool = PgPoolOptions::new()
                .max_connections(config.database_max_connections)
                .connect(database_url)
                .await?;
            PgEventStore::new(pool.clone()).ensure_schema().await?;
            AppState::postgres(pool, clock, ids)
        }
        None => {
            tracing::warn!("DATABASE_URL not set, events are kept in memory only");
            AppState::in_memory(clock, ids)
        }
    };
    tracing::info!(storage = app_state.storage, "event store ready");

    app_state
        .projection
        .hydrate(app_state.event_store.as_ref(), &app_state.request_token())
        .await?;

    if config.seed_demo {
        seed::seed_demo(&app_state).await?;
    }

    let shutdown = app_state.shutdown.clone();
    let app = routes::build_router(app_state);

    let addr = config.addr()?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    Ok(())
}

/// Resolves on Ctrl-C after cancelling `shutdown`, so in-flight commands stop
/// at their next step and roll back.
async fn shutdown_signal(shutdown: CancellationToken) {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "cannot listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown requested");
    shutdown.cancel();
}
