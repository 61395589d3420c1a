//! Demo data for a fresh deployment.

use translationsdb_core::command::CommandContext;
use translationsdb_core::error::DomainError;
use translationsdb_projects::domain::commands::{
    CreateKeyInput, CreateProjectInput, UpdateTranslationInput,
};
use uuid::Uuid;

use crate::state::AppState;

/// Actor recorded on seeded events.
pub const SEED_ACTOR: &str = "seed";

/// Creates "Test Project" with key `header_1` translated to English and
/// Spanish. Does nothing if the projection already holds a project.
///
/// Returns the id of the created project, or `None` when skipped.
///
/// # Errors
///
/// Returns the first command failure.
pub async fn seed_demo(state: &AppState) -> Result<Option<String>, DomainError> {
    if !state.projection.list_projects().is_empty() {
        tracing::info!("projects already present, skipping demo seed");
        return Ok(None);
    }

    let ctx =
        CommandContext::new(SEED_ACTOR, Uuid::new_v4()).with_cancellation(state.request_token());
    let created = state
        .commands
        .create_project
        .dispatch(
            &ctx,
            CreateProjectInput {
                name: "Test Project".into(),
            },
        )
        .await?;
    let project_id = created.metadata.aggregate_id;

    state
        .commands
        .create_key
        .dispatch(
            &ctx,
            CreateKeyInput {
                project_id: project_id.clone(),
                id: "header_1".into(),
            },
        )
        .await?;

    for (locale, value) in [("en", "Hello"), ("es", "Hola")] {
        state
            .commands
            .update_translation
            .dispatch(
                &ctx,
                UpdateTranslationInput {
                    project_id: project_id.clone(),
                    key_id: "header_1".into(),
                    id: locale.into(),
                    value: value.into(),
                },
            )
            .await?;
    }

    tracing::info!(project_id = %project_id, "seeded demo project");
    Ok(Some(project_id))
}
