//! Routes for the Projects bounded context.

use axum::extract::{Path, State};
use axum::http::HeaderMap;
use axum::routing::{get, post, put};
use axum::{Json, Router};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use translationsdb_core::command::CommandContext;
use translationsdb_core::event::DomainEvent;
use translationsdb_projects::application::query_handlers;
use translationsdb_projects::domain::aggregates::Project;
use translationsdb_projects::domain::commands::{
    CreateKeyInput, CreateProjectInput, DeleteKeyInput, DeleteProjectInput,
    DeleteTranslationInput, UpdateProjectInput, UpdateTranslationInput,
};
use translationsdb_projects::domain::events::ProjectEvent;

use crate::error::ApiError;
use crate::state::AppState;

/// Header naming who issued a command.
pub const ACTOR_HEADER: &str = "x-actor";

/// Actor recorded when the header is absent.
pub const DEFAULT_ACTOR: &str = "anonymous";

/// Request body for POST /projects and PUT /projects/{id}.
#[derive(Debug, Deserialize)]
pub struct ProjectRequest {
    /// Display name.
    pub name: String,
}

/// Request body for POST /projects/{id}/keys.
#[derive(Debug, Deserialize)]
pub struct CreateKeyRequest {
    /// The key identifier.
    pub id: String,
}

/// Request body for PUT /projects/{id}/keys/{key_id}/translations/{locale}.
#[derive(Debug, Deserialize)]
pub struct TranslationRequest {
    /// New value.
    pub value: String,
}

/// Response body returned after a command is committed.
#[derive(Debug, Serialize)]
pub struct CommandResponse {
    /// ID of the event produced and persisted.
    pub event_id: Uuid,
    /// Type tag of that event.
    pub event_type: &'static str,
    /// Project the event belongs to.
    pub project_id: String,
}

impl From<&ProjectEvent> for CommandResponse {
    fn from(event: &ProjectEvent) -> Self {
        Self {
            event_id: event.metadata.event_id,
            event_type: event.event_type(),
            project_id: event.metadata.aggregate_id.clone(),
        }
    }
}

/// One row of GET /projects.
#[derive(Debug, Serialize)]
pub struct ProjectSummary {
    /// The project identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Number of keys.
    pub key_count: usize,
    /// When the project was created.
    pub date_created: DateTime<Utc>,
    /// When the project last changed.
    pub date_updated: DateTime<Utc>,
}

impl From<&Project> for ProjectSummary {
    fn from(project: &Project) -> Self {
        Self {
            id: project.id.clone(),
            name: project.name.clone(),
            key_count: project.keys_by_id.len(),
            date_created: project.date_created,
            date_updated: project.date_updated,
        }
    }
}

fn context(state: &AppState, headers: &HeaderMap) -> CommandContext {
    let actor = headers
        .get(ACTOR_HEADER)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|actor| !actor.is_empty())
        .unwrap_or(DEFAULT_ACTOR);
    CommandContext::new(actor, Uuid::new_v4()).with_cancellation(state.request_token())
}

/// POST /projects
#[instrument(skip(state, headers, request))]
async fn create_project(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(request): Json<ProjectRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling create_project command");

    let event = state
        .commands
        .create_project
        .dispatch(&ctx, CreateProjectInput { name: request.name })
        .await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// GET /projects
#[instrument(skip(state))]
async fn list_projects(State(state): State<AppState>) -> Result<Json<Vec<ProjectSummary>>, ApiError> {
    let list =
        query_handlers::get_project_list(state.event_store.as_ref(), &state.request_token())
            .await?;
    Ok(Json(list.projects_by_id.values().map(ProjectSummary::from).collect()))
}

/// GET /projects/{id}
#[instrument(skip(state), fields(project_id = %project_id))]
async fn get_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
) -> Result<Json<Project>, ApiError> {
    let project = query_handlers::get_project(
        state.event_store.as_ref(),
        &project_id,
        &state.request_token(),
    )
    .await?;
    Ok(Json(project))
}

/// PUT /projects/{id}
#[instrument(skip(state, headers, request), fields(project_id = %project_id))]
async fn update_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<ProjectRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling update_project command");

    let input = UpdateProjectInput {
        id: project_id,
        name: request.name,
    };
    let event = state.commands.update_project.dispatch(&ctx, input).await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// DELETE /projects/{id}
#[instrument(skip(state, headers), fields(project_id = %project_id))]
async fn delete_project(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling delete_project command");

    let input = DeleteProjectInput { id: project_id };
    let event = state.commands.delete_project.dispatch(&ctx, input).await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// POST /projects/{id}/keys
#[instrument(skip(state, headers, request), fields(project_id = %project_id))]
async fn create_key(
    State(state): State<AppState>,
    Path(project_id): Path<String>,
    headers: HeaderMap,
    Json(request): Json<CreateKeyRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling create_key command");

    let input = CreateKeyInput {
        project_id,
        id: request.id,
    };
    let event = state.commands.create_key.dispatch(&ctx, input).await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// DELETE /projects/{id}/keys/{key_id}
#[instrument(skip(state, headers), fields(project_id = %project_id, key_id = %key_id))]
async fn delete_key(
    State(state): State<AppState>,
    Path((project_id, key_id)): Path<(String, String)>,
    headers: HeaderMap,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling delete_key command");

    let input = DeleteKeyInput {
        project_id,
        id: key_id,
    };
    let event = state.commands.delete_key.dispatch(&ctx, input).await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// PUT /projects/{id}/keys/{key_id}/translations/{locale}
#[instrument(
    skip(state, headers, request),
    fields(project_id = %project_id, key_id = %key_id, locale = %locale)
)]
async fn update_translation(
    State(state): State<AppState>,
    Path((project_id, key_id, locale)): Path<(String, String, String)>,
    headers: HeaderMap,
    Json(request): Json<TranslationRequest>,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling update_translation command");

    let input = UpdateTranslationInput {
        project_id,
        key_id,
        id: locale,
        value: request.value,
    };
    let event = state.commands.update_translation.dispatch(&ctx, input).await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// DELETE /projects/{id}/keys/{key_id}/translations/{locale}
#[instrument(
    skip(state, headers),
    fields(project_id = %project_id, key_id = %key_id, locale = %locale)
)]
async fn delete_translation(
    State(state): State<AppState>,
    Path((project_id, key_id, locale)): Path<(String, String, String)>,
    headers: HeaderMap,
) -> Result<Json<CommandResponse>, ApiError> {
    let ctx = context(&state, &headers);
    info!(correlation_id = %ctx.correlation_id, actor = %ctx.actor, "handling delete_translation command");

    let input = DeleteTranslationInput {
        project_id,
        key_id,
        id: locale,
    };
    let event = state.commands.delete_translation.dispatch(&ctx, input).await?;

    Ok(Json(CommandResponse::from(&event)))
}

/// GET /catalog
async fn catalog(State(state): State<AppState>) -> Json<Vec<Project>> {
    Json(state.projection.list_projects())
}

/// Returns the router for the projects context.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/projects", post(create_project).get(list_projects))
        .route(
            "/projects/{id}",
            get(get_project).put(update_project).delete(delete_project),
        )
        .route("/projects/{id}/keys", post(create_key))
        .route(
            "/projects/{id}/keys/{key_id}",
            axum::routing::delete(delete_key),
        )
        .route(
            "/projects/{id}/keys/{key_id}/translations/{locale}",
            put(update_translation).delete(delete_translation),
        )
        .route("/catalog", get(catalog))
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;

    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use serde_json::Value;
    use tower::ServiceExt;
    use translationsdb_test_support::{FixedClock, SequentialIdGenerator};

    fn test_app_state() -> AppState {
        AppState::in_memory(
            Arc::new(FixedClock::standard()),
            Arc::new(SequentialIdGenerator::new()),
        )
    }

    async fn send(
        state: &AppState,
        method: &str,
        uri: &str,
        actor: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(actor) = actor {
            builder = builder.header(ACTOR_HEADER, actor);
        }
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = router()
            .with_state(state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);
        (status, json)
    }

    #[tokio::test]
    async fn test_create_project_returns_event_and_project_id() {
        // Arrange
        let state = test_app_state();
        let body = serde_json::json!({ "name": "Demo" });

        // Act
        let (status, json) = send(&state, "POST", "/projects", None, Some(body)).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["event_type"], "translations.ProjectCreated");
        assert_eq!(json["project_id"], Uuid::from_u128(1).to_string());
        assert_eq!(json["event_id"], Uuid::from_u128(2).to_string());
    }

    #[tokio::test]
    async fn test_get_project_returns_replayed_state() {
        // Arrange
        let state = test_app_state();
        let (_, created) = send(
            &state,
            "POST",
            "/projects",
            None,
            Some(serde_json::json!({ "name": "Demo" })),
        )
        .await;
        let id = created["project_id"].as_str().unwrap().to_owned();
        send(
            &state,
            "POST",
            &format!("/projects/{id}/keys"),
            None,
            Some(serde_json::json!({ "id": "header_1" })),
        )
        .await;

        // Act
        let (status, json) = send(&state, "GET", &format!("/projects/{id}"), None, None).await;

        // Assert
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["name"], "Demo");
        assert_eq!(json["locales"], serde_json::json!(["es", "en"]));
        let translations = &json["keys_by_id"]["header_1"]["translations_by_id"];
        assert_eq!(translations["en"]["value"], "");
        assert_eq!(translations["es"]["value"], "");
        assert_eq!(json["history"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_get_missing_project_returns_404() {
        let state = test_app_state();

        let (status, json) = send(&state, "GET", "/projects/missing", None, None).await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "not_found");
    }

    #[tokio::test]
    async fn test_blank_project_name_returns_400() {
        let state = test_app_state();

        let (status, json) = send(
            &state,
            "POST",
            "/projects",
            None,
            Some(serde_json::json!({ "name": "   " })),
        )
        .await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "validation_error");
    }

    #[tokio::test]
    async fn test_create_project_returns_422_for_missing_field() {
        let state = test_app_state();

        let (status, _) = send(&state, "POST", "/projects", None, Some(serde_json::json!({}))).await;

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_actor_header_is_recorded_on_the_event() {
        // Arrange
        let state = test_app_state();
        let (_, created) = send(
            &state,
            "POST",
            "/projects",
            Some("alice"),
            Some(serde_json::json!({ "name": "Demo" })),
        )
        .await;
        let id = created["project_id"].as_str().unwrap().to_owned();

        // Act
        let (_, json) = send(&state, "GET", &format!("/projects/{id}"), None, None).await;

        // Assert
        let entry: Value = serde_json::from_str(json["history"][0].as_str().unwrap()).unwrap();
        assert_eq!(entry["metadata"]["actor"], "alice");
    }

    #[test]
    fn test_context_defaults_to_anonymous_actor() {
        let state = test_app_state();
        let mut headers = HeaderMap::new();
        assert_eq!(context(&state, &headers).actor, DEFAULT_ACTOR);

        headers.insert(ACTOR_HEADER, "  ".parse().unwrap());
        assert_eq!(context(&state, &headers).actor, DEFAULT_ACTOR);

        headers.insert(ACTOR_HEADER, "bob".parse().unwrap());
        assert_eq!(context(&state, &headers).actor, "bob");
    }

    #[test]
    fn test_context_is_cancelled_by_shutdown() {
        let state = test_app_state();
        let ctx = context(&state, &HeaderMap::new());

        state.shutdown.cancel();

        assert!(ctx.cancellation.is_cancelled());
    }

    #[tokio::test]
    async fn test_requests_after_shutdown_return_503_and_write_nothing() {
        // Arrange
        let state = test_app_state();
        state.shutdown.cancel();

        // Act
        let (create_status, json) = send(
            &state,
            "POST",
            "/projects",
            None,
            Some(serde_json::json!({ "name": "Demo" })),
        )
        .await;
        let (list_status, _) = send(&state, "GET", "/projects", None, None).await;

        // Assert
        assert_eq!(create_status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["error"], "cancelled");
        assert_eq!(list_status, StatusCode::SERVICE_UNAVAILABLE);
        assert!(state.projection.list_projects().is_empty());
    }
}
