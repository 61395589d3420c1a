//! Pipeline wiring for the Projects context.

use std::sync::Arc;

use translationsdb_core::command::Command;
use translationsdb_core::pipeline::{CommandPipeline, Dispatch, PoisonFlag, SharedReadModel};
use translationsdb_core::transaction::TransactionProvider;

use crate::application::command_handlers::{
    CommandDeps, CreateKey, CreateProject, DeleteKey, DeleteProject, DeleteTranslation,
    UpdateProject, UpdateTranslation,
};
use crate::domain::commands::{
    CreateKeyInput, CreateProjectInput, DeleteKeyInput, DeleteProjectInput,
    DeleteTranslationInput, UpdateProjectInput, UpdateTranslationInput,
};
use crate::domain::events::ProjectEvent;

/// A dispatchable pipeline for one command input.
pub type ProjectPipeline<I> = Arc<dyn Dispatch<I, ProjectEvent>>;

/// One pipeline per command, all sharing the same read models and one
/// poison flag.
#[derive(Clone)]
pub struct ProjectCommands {
    /// Creates a project.
    pub create_project: ProjectPipeline<CreateProjectInput>,
    /// Renames a project.
    pub update_project: ProjectPipeline<UpdateProjectInput>,
    /// Deletes a project.
    pub delete_project: ProjectPipeline<DeleteProjectInput>,
    /// Adds a key.
    pub create_key: ProjectPipeline<CreateKeyInput>,
    /// Removes a key.
    pub delete_key: ProjectPipeline<DeleteKeyInput>,
    /// Sets a translation value.
    pub update_translation: ProjectPipeline<UpdateTranslationInput>,
    /// Removes a translation.
    pub delete_translation: ProjectPipeline<DeleteTranslationInput>,
    poison: PoisonFlag,
}

impl std::fmt::Debug for ProjectCommands {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProjectCommands")
            .field("poisoned", &self.is_poisoned())
            .finish_non_exhaustive()
    }
}

fn pipeline<C, P>(
    provider: &Arc<P>,
    command: C,
    read_models: &[SharedReadModel<P::Transaction, ProjectEvent>],
    poison: &PoisonFlag,
) -> ProjectPipeline<C::Input>
where
    C: Command<Event = ProjectEvent> + 'static,
    P: TransactionProvider,
{
    Arc::new(
        CommandPipeline::new(Arc::clone(provider), command)
            .with_read_models(read_models.iter().cloned())
            .with_poison_flag(poison.clone()),
    )
}

impl ProjectCommands {
    /// Builds every pipeline over `provider`. Read models receive each event
    /// in the order given. A failed rollback in any pipeline disables all
    /// seven.
    #[must_use]
    pub fn new<P: TransactionProvider>(
        provider: Arc<P>,
        deps: &CommandDeps,
        read_models: &[SharedReadModel<P::Transaction, ProjectEvent>],
    ) -> Self {
        let poison = PoisonFlag::new();
        Self {
            create_project: pipeline(
                &provider,
                CreateProject::new(deps.clone()),
                read_models,
                &poison,
            ),
            update_project: pipeline(
                &provider,
                UpdateProject::new(deps.clone()),
                read_models,
                &poison,
            ),
            delete_project: pipeline(
                &provider,
                DeleteProject::new(deps.clone()),
                read_models,
                &poison,
            ),
            create_key: pipeline(&provider, CreateKey::new(deps.clone()), read_models, &poison),
            delete_key: pipeline(&provider, DeleteKey::new(deps.clone()), read_models, &poison),
            update_translation: pipeline(
                &provider,
                UpdateTranslation::new(deps.clone()),
                read_models,
                &poison,
            ),
            delete_translation: pipeline(
                &provider,
                DeleteTranslation::new(deps.clone()),
                read_models,
                &poison,
            ),
            poison,
        }
    }

    /// Whether a failed rollback has disabled every command.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poison.is_poisoned()
    }
}
