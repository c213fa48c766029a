//! Error types for checkpoint storage backends.

use thiserror::Error;

/// Errors a [`crate::CheckpointSaver`] implementation can surface.
///
/// Matches the transient/contract split spec'd for the engine: `Unavailable`
/// is a transient failure safe to retry by the caller, `ConflictingWrite` is
/// a concurrency conflict the caller should retry against the new tip, and
/// the rest are programming errors (missing thread, missing checkpoint).
#[derive(Debug, Error)]
pub enum CheckpointError {
    /// The underlying persistence layer could not be reached.
    #[error("checkpoint store unavailable: {0}")]
    StoreUnavailable(String),

    /// Two writers attempted to extend the same checkpoint concurrently.
    #[error("conflicting write for thread {thread_id}: expected parent {expected:?}, tip is {actual:?}")]
    ConflictingWrite {
        thread_id: String,
        expected: Option<String>,
        actual: Option<String>,
    },

    /// No checkpoint exists for the given thread.
    #[error("no checkpoint for thread {0}")]
    ThreadNotFound(String),

    /// A specific checkpoint id was requested but does not exist.
    #[error("checkpoint {checkpoint_id} not found for thread {thread_id}")]
    CheckpointNotFound {
        thread_id: String,
        checkpoint_id: String,
    },

    /// The caller passed an invalid or incomplete identifier.
    #[error("invalid checkpoint request: {0}")]
    Invalid(String),

    /// Serialization of the state blob failed.
    #[error("checkpoint serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CheckpointError>;
