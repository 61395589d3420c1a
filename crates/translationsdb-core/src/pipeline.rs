//! Command pipeline: derive an event, then fan it out to read models inside
//! one transaction.
//!
//! ```text
//! derive ──► begin ──► handle(model 1) ──► … ──► handle(model N) ──► commit
//!   │                        │ any failure
//!   ▼                        ▼
//! error (no tx opened)    rollback ──► original error
//!                            │ rollback failed
//!                            ▼
//!                         poisoned
//! ```
//!
//! Read models run strictly sequentially in registration order. Registration
//! order is part of wiring, not an invariant of the pipeline.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tracing::{debug, error, instrument};

use crate::command::{Command, CommandContext};
use crate::error::DomainError;
use crate::read_model::ReadModel;
use crate::transaction::{Transaction, TransactionProvider};

/// Shared handle to a read model registered with a pipeline.
pub type SharedReadModel<Tx, E> = Arc<dyn ReadModel<Tx, E>>;

/// Set once a rollback fails. Every pipeline holding a clone of the same flag
/// refuses further work, since the log and the read models may disagree.
#[derive(Debug, Clone, Default)]
pub struct PoisonFlag(Arc<AtomicBool>);

impl PoisonFlag {
    /// A flag that has not been set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether any pipeline sharing this flag failed to roll back.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    fn poison(&self) {
        self.0.store(true, Ordering::Release);
    }
}

/// Runs one command against a persistence boundary and a list of read models.
pub struct CommandPipeline<C, P>
where
    C: Command,
    P: TransactionProvider,
{
    command: C,
    provider: Arc<P>,
    read_models: Vec<SharedReadModel<P::Transaction, C::Event>>,
    poison: PoisonFlag,
}

impl<C, P> CommandPipeline<C, P>
where
    C: Command,
    P: TransactionProvider,
{
    /// Creates a pipeline with no read models and a poison flag of its own.
    #[must_use]
    pub fn new(provider: Arc<P>, command: C) -> Self {
        Self {
            command,
            provider,
            read_models: Vec::new(),
            poison: PoisonFlag::new(),
        }
    }

    /// Shares `poison` with other pipelines over the same log, so a failed
    /// rollback in any of them disables all of them.
    #[must_use]
    pub fn with_poison_flag(mut self, poison: PoisonFlag) -> Self {
        self.poison = poison;
        self
    }

    /// Registers a read model after those already registered.
    #[must_use]
    pub fn with_read_model(
        mut self,
        read_model: SharedReadModel<P::Transaction, C::Event>,
    ) -> Self {
        self.read_models.push(read_model);
        self
    }

    /// Registers several read models, in iteration order.
    #[must_use]
    pub fn with_read_models<I>(mut self, read_models: I) -> Self
    where
        I: IntoIterator<Item = SharedReadModel<P::Transaction, C::Event>>,
    {
        self.read_models.extend(read_models);
        self
    }

    /// Names of the registered read models, in fan-out order.
    pub fn read_model_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.read_models.iter().map(|model| model.name())
    }

    /// Whether a failed rollback has disabled this pipeline.
    #[must_use]
    pub fn is_poisoned(&self) -> bool {
        self.poison.is_poisoned()
    }

    /// Executes the command and applies the resulting event to every read
    /// model atomically.
    ///
    /// Returns the event once it has been committed.
    ///
    /// # Errors
    ///
    /// * the command's own error if derivation fails (no transaction opened);
    /// * the first read model's error, after a successful rollback;
    /// * `DomainError::Cancelled` if `ctx` is cancelled before commit;
    /// * `DomainError::TransactionPoisoned` if rollback failed, now or on an
    ///   earlier call;
    /// * `DomainError::Infrastructure` if begin or commit fails.
    #[instrument(
        skip_all,
        fields(command = self.command.command_type(), correlation_id = %ctx.correlation_id)
    )]
    pub async fn execute(
        &self,
        ctx: &CommandContext,
        input: C::Input,
    ) -> Result<C::Event, DomainError> {
        if self.is_poisoned() {
            return Err(DomainError::TransactionPoisoned(format!(
                "`{}` refused: a previous rollback failed",
                self.command.command_type()
            )));
        }

        ctx.ensure_active()?;
        let event = self.command.derive(ctx, input).await?;
        debug!(actor = %ctx.actor, "command derived event");

        ctx.ensure_active()?;
        let mut tx = self.provider.begin().await?;

        if let Err(err) = self.fan_out(ctx, &mut tx, &event).await {
            if let Err(rollback_err) = tx.rollback().await {
                self.poison.poison();
                error!(
                    error = %rollback_err,
                    cause = %err,
                    "rollback failed; log and read models may disagree"
                );
                return Err(DomainError::TransactionPoisoned(rollback_err.to_string()));
            }
            return Err(err);
        }

        // Commit runs on its own task so a caller dropping this future cannot
        // interrupt it half way.
        tokio::spawn(tx.commit())
            .await
            .map_err(|e| DomainError::Infrastructure(format!("commit task failed: {e}")))??;
        debug!("transaction committed");

        Ok(event)
    }

    /// Hands `event` to every read model in order, then checks for
    /// cancellation one last time before the caller commits.
    async fn fan_out(
        &self,
        ctx: &CommandContext,
        tx: &mut P::Transaction,
        event: &C::Event,
    ) -> Result<(), DomainError> {
        for model in &self.read_models {
            ctx.ensure_active()?;
            model.handle(tx, event).await.inspect_err(|err| {
                debug!(read_model = model.name(), error = %err, "read model failed, rolling back");
            })?;
        }
        ctx.ensure_active()
    }
}

/// Object-safe view of a pipeline, so pipelines over different commands and
/// providers can be stored side by side.
#[async_trait]
pub trait Dispatch<I, E>: Send + Sync
where
    I: Send + 'static,
    E: Send + 'static,
{
    /// See [`CommandPipeline::execute`].
    async fn dispatch(&self, ctx: &CommandContext, input: I) -> Result<E, DomainError>;
}

#[async_trait]
impl<C, P> Dispatch<C::Input, C::Event> for CommandPipeline<C, P>
where
    C: Command,
    P: TransactionProvider,
{
    async fn dispatch(
        &self,
        ctx: &CommandContext,
        input: C::Input,
    ) -> Result<C::Event, DomainError> {
        self.execute(ctx, input).await
    }
}
