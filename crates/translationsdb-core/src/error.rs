//! Domain error types.

use thiserror::Error;

/// Errors produced while encoding or decoding tagged event payloads.
#[derive(Debug, Error)]
pub enum CodecError {
    /// The wrapper's type tag matched none of the candidate types.
    #[error("no type match found in targets for `{type_name}`")]
    NoTypeMatch {
        /// The tag found in the wrapper.
        type_name: String,
    },

    /// The outer wrapper or the inner payload is not valid JSON for the
    /// expected shape.
    #[error("malformed event data: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Top-level domain error type.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The requested aggregate has no creation event in its stream.
    #[error("not found: {0}")]
    NotFound(String),

    /// A validation error in domain logic.
    #[error("validation error: {0}")]
    Validation(String),

    /// An event payload could not be encoded or decoded.
    #[error(transparent)]
    Codec(#[from] CodecError),

    /// The caller cancelled the replay or command before it completed.
    #[error("operation cancelled")]
    Cancelled,

    /// A rollback failed, so the log and its projections may disagree.
    /// The pipeline refuses further work once this has been returned.
    #[error("transaction state can no longer be trusted: {0}")]
    TransactionPoisoned(String),

    /// An infrastructure/persistence error.
    #[error("infrastructure error: {0}")]
    Infrastructure(String),
}
