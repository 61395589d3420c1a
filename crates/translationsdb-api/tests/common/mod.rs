//! Shared test helpers for API integration tests.
#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;
use translationsdb_test_support::{FixedClock, SequentialIdGenerator};

use translationsdb_api::routes;
use translationsdb_api::state::AppState;

/// State over an in-memory log with a fixed clock and sequential ids.
pub fn memory_state() -> AppState {
    AppState::in_memory(
        Arc::new(FixedClock::standard()),
        Arc::new(SequentialIdGenerator::new()),
    )
}

/// State over the PostgreSQL `events` table with a fixed clock and sequential ids.
pub fn postgres_state(pool: PgPool) -> AppState {
    AppState::postgres(
        pool,
        Arc::new(FixedClock::standard()),
        Arc::new(SequentialIdGenerator::new()),
    )
}

/// Build the full app router over `state`. Uses the same routes as `main.rs`.
pub fn build_test_app(state: &AppState) -> Router {
    routes::build_router(state.clone())
}

async fn send(
    app: Router,
    method: &str,
    uri: &str,
    body: Option<&serde_json::Value>,
) -> (StatusCode, serde_json::Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(body).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let body_bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = serde_json::from_slice(&body_bytes).unwrap_or(serde_json::Value::Null);

    (status, json)
}

/// Send a POST request with a JSON body and return the response.
pub async fn post_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "POST", uri, Some(body)).await
}

/// Send a PUT request with a JSON body and return the response.
pub async fn put_json(
    app: Router,
    uri: &str,
    body: &serde_json::Value,
) -> (StatusCode, serde_json::Value) {
    send(app, "PUT", uri, Some(body)).await
}

/// Send a GET request and return the response.
pub async fn get_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "GET", uri, None).await
}

/// Send a DELETE request and return the response.
pub async fn delete_json(app: Router, uri: &str) -> (StatusCode, serde_json::Value) {
    send(app, "DELETE", uri, None).await
}
