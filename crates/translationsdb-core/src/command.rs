//! Command abstractions.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::DomainError;
use crate::event::DomainEvent;

/// Call context threaded from the command-issuing boundary into event
/// construction.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Who issued the command.
    pub actor: String,
    /// Correlation ID to trace this command through the system.
    pub correlation_id: Uuid,
    /// Cancels the command between pipeline steps.
    pub cancellation: CancellationToken,
}

impl CommandContext {
    /// Creates a context for `actor` with its own cancellation token.
    #[must_use]
    pub fn new(actor: impl Into<String>, correlation_id: Uuid) -> Self {
        Self {
            actor: actor.into(),
            correlation_id,
            cancellation: CancellationToken::new(),
        }
    }

    /// Replaces the cancellation token, e.g. with a child of a request-scoped
    /// token.
    #[must_use]
    pub fn with_cancellation(mut self, cancellation: CancellationToken) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Returns `Err(DomainError::Cancelled)` once the token has fired.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Cancelled` if cancellation was requested.
    pub fn ensure_active(&self) -> Result<(), DomainError> {
        if self.cancellation.is_cancelled() {
            Err(DomainError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Turns validated input into exactly one event.
///
/// Commands may read whatever they need (e.g. replay an aggregate to check it
/// exists) but never write; persistence is the pipeline's job.
#[async_trait]
pub trait Command: Send + Sync {
    /// Typed input constructed by the caller.
    type Input: Send + 'static;
    /// The event this command produces.
    type Event: DomainEvent;

    /// The type name for this command (for logging/routing).
    fn command_type(&self) -> &'static str;

    /// Validates `input` and derives the event.
    async fn derive(
        &self,
        ctx: &CommandContext,
        input: Self::Input,
    ) -> Result<Self::Event, DomainError>;
}
