//! Commands for the Projects context.
//!
//! Each command validates its input against the current state of the log and
//! derives exactly one event. Nothing here writes; the pipeline does that.

use std::sync::Arc;

use async_trait::async_trait;
use translationsdb_core::clock::Clock;
use translationsdb_core::command::{Command, CommandContext};
use translationsdb_core::error::DomainError;
use translationsdb_core::id::IdGenerator;
use translationsdb_core::store::EventStore;

use crate::application::query_handlers::get_project;
use crate::domain::aggregates::Project;
use crate::domain::commands::{
    CreateKeyInput, CreateProjectInput, DeleteKeyInput, DeleteProjectInput,
    DeleteTranslationInput, UpdateProjectInput, UpdateTranslationInput,
};
use crate::domain::events::{
    KeyCreated, KeyDeleted, ProjectCreated, ProjectDeleted, ProjectEvent, ProjectEventKind,
    ProjectUpdated, TranslationDeleted, TranslationUpdated,
};

/// What every command reads from: the log, the clock and the id source.
#[derive(Clone)]
pub struct CommandDeps {
    /// Log the commands validate against.
    pub store: Arc<dyn EventStore>,
    /// Source of event timestamps.
    pub clock: Arc<dyn Clock>,
    /// Source of event and project ids.
    pub ids: Arc<dyn IdGenerator>,
}

impl std::fmt::Debug for CommandDeps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandDeps").finish_non_exhaustive()
    }
}

impl CommandDeps {
    /// Bundles the dependencies.
    #[must_use]
    pub fn new(
        store: Arc<dyn EventStore>,
        clock: Arc<dyn Clock>,
        ids: Arc<dyn IdGenerator>,
    ) -> Self {
        Self { store, clock, ids }
    }

    fn event(&self, ctx: &CommandContext, kind: ProjectEventKind) -> ProjectEvent {
        ProjectEvent::new(kind, self.ids.next_id(), ctx, self.clock.now())
    }

    async fn project(&self, ctx: &CommandContext, id: &str) -> Result<Project, DomainError> {
        get_project(self.store.as_ref(), id, &ctx.cancellation).await
    }
}

fn require(value: &str, what: &str) -> Result<String, DomainError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(DomainError::Validation(format!("{what} must not be blank")));
    }
    Ok(trimmed.to_owned())
}

fn require_key(project: &Project, key_id: &str) -> Result<(), DomainError> {
    if project.has_key(key_id) {
        Ok(())
    } else {
        Err(DomainError::NotFound(format!(
            "key {key_id} in project {}",
            project.id
        )))
    }
}

/// Creates a project with a generated id.
#[derive(Debug, Clone)]
pub struct CreateProject {
    deps: CommandDeps,
}

impl CreateProject {
    /// Creates the command over `deps`.
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

/// Renames an existing project.
#[derive(Debug, Clone)]
pub struct UpdateProject {
    deps: CommandDeps,
}

impl UpdateProject {
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

/// Deletes an existing project.
#[derive(Debug, Clone)]
pub struct DeleteProject {
    deps: CommandDeps,
}

impl DeleteProject {
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

/// Adds a key to an existing project.
#[derive(Debug, Clone)]
pub struct CreateKey {
    deps: CommandDeps,
}

impl CreateKey {
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

/// Removes a key from a project.
#[derive(Debug, Clone)]
pub struct DeleteKey {
    deps: CommandDeps,
}

impl DeleteKey {
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

/// Sets one locale's value for a key.
#[derive(Debug, Clone)]
pub struct UpdateTranslation {
    deps: CommandDeps,
}

impl UpdateTranslation {
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

/// Removes one locale's translation from a key.
#[derive(Debug, Clone)]
pub struct DeleteTranslation {
    deps: CommandDeps,
}

impl DeleteTranslation {
    #[must_use]
    pub fn new(deps: CommandDeps) -> Self {
        Self { deps }
    }
}

#[async_trait]
impl Command for CreateProject {
    type Input = CreateProjectInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.create_project"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: CreateProjectInput,
    ) -> Result<ProjectEvent, DomainError> {
        let name = require(&input.name, "project name")?;
        let id = self.deps.ids.next_id().to_string();
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::ProjectCreated(ProjectCreated { id, name }),
        ))
    }
}

#[async_trait]
impl Command for UpdateProject {
    type Input = UpdateProjectInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.update_project"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: UpdateProjectInput,
    ) -> Result<ProjectEvent, DomainError> {
        let name = require(&input.name, "project name")?;
        let project = self.deps.project(ctx, &input.id).await?;
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::ProjectUpdated(ProjectUpdated {
                id: project.id,
                name,
            }),
        ))
    }
}

#[async_trait]
impl Command for DeleteProject {
    type Input = DeleteProjectInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.delete_project"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: DeleteProjectInput,
    ) -> Result<ProjectEvent, DomainError> {
        let project = self.deps.project(ctx, &input.id).await?;
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::ProjectDeleted(ProjectDeleted { id: project.id }),
        ))
    }
}

#[async_trait]
impl Command for CreateKey {
    type Input = CreateKeyInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.create_key"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: CreateKeyInput,
    ) -> Result<ProjectEvent, DomainError> {
        let key_id = require(&input.id, "key id")?;
        let project = self.deps.project(ctx, &input.project_id).await?;
        if project.has_key(&key_id) {
            return Err(DomainError::Validation(format!(
                "key {key_id} already exists in project {}",
                project.id
            )));
        }
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::KeyCreated(KeyCreated {
                id: key_id,
                project_id: project.id,
            }),
        ))
    }
}

#[async_trait]
impl Command for DeleteKey {
    type Input = DeleteKeyInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.delete_key"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: DeleteKeyInput,
    ) -> Result<ProjectEvent, DomainError> {
        let project = self.deps.project(ctx, &input.project_id).await?;
        require_key(&project, &input.id)?;
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::KeyDeleted(KeyDeleted {
                id: input.id,
                project_id: project.id,
            }),
        ))
    }
}

#[async_trait]
impl Command for UpdateTranslation {
    type Input = UpdateTranslationInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.update_translation"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: UpdateTranslationInput,
    ) -> Result<ProjectEvent, DomainError> {
        let project = self.deps.project(ctx, &input.project_id).await?;
        require_key(&project, &input.key_id)?;
        if !project.has_locale(&input.id) {
            return Err(DomainError::Validation(format!(
                "locale {} is not enabled for project {}",
                input.id, project.id
            )));
        }
        if project.translation(&input.key_id, &input.id).is_none() {
            return Err(DomainError::NotFound(format!(
                "translation {} for key {}",
                input.id, input.key_id
            )));
        }
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::TranslationUpdated(TranslationUpdated {
                id: input.id,
                project_id: project.id,
                key_id: input.key_id,
                value: input.value,
            }),
        ))
    }
}

#[async_trait]
impl Command for DeleteTranslation {
    type Input = DeleteTranslationInput;
    type Event = ProjectEvent;

    fn command_type(&self) -> &'static str {
        "translations.delete_translation"
    }

    async fn derive(
        &self,
        ctx: &CommandContext,
        input: DeleteTranslationInput,
    ) -> Result<ProjectEvent, DomainError> {
        let project = self.deps.project(ctx, &input.project_id).await?;
        require_key(&project, &input.key_id)?;
        if project.translation(&input.key_id, &input.id).is_none() {
            return Err(DomainError::NotFound(format!(
                "translation {} for key {}",
                input.id, input.key_id
            )));
        }
        Ok(self.deps.event(
            ctx,
            ProjectEventKind::TranslationDeleted(TranslationDeleted {
                id: input.id,
                project_id: project.id,
                key_id: input.key_id,
            }),
        ))
    }
}
