//! [`CheckpointSaver`] — the storage-backend abstraction for durable thread
//! state.
//!
//! Implementations must guarantee write-ahead ordering (pending writes
//! visible before the successor snapshot is durable) and must treat
//! `put` as an optimistic-concurrency operation: the caller supplies the
//! `parent_id` it last observed, and a mismatch against the current tip is
//! reported as [`CheckpointError::ConflictingWrite`] rather than silently
//! overwritten.

use crate::checkpoint::{Checkpoint, CheckpointMetadata, CheckpointTuple, PendingWrite};
use crate::error::Result;
use async_trait::async_trait;
use futures::stream::Stream;
use std::pin::Pin;

/// Async stream of checkpoints, oldest first.
pub type CheckpointStream = Pin<Box<dyn Stream<Item = Result<Checkpoint>> + Send + 'static>>;

#[async_trait]
pub trait CheckpointSaver: Send + Sync {
    /// Persist a new snapshot for `thread_id`, chained onto `parent_id`.
    ///
    /// `parent_id` must equal the id of the thread's current tip (`None` if
    /// the thread has no checkpoints yet); otherwise a writer lost a race
    /// and must retry against the new tip.
    async fn put(
        &self,
        thread_id: &str,
        parent_id: Option<&str>,
        state: serde_json::Value,
        metadata: CheckpointMetadata,
    ) -> Result<Checkpoint>;

    /// Buffer a node's output against `checkpoint_id` before it has been
    /// reduced into a successor snapshot.
    async fn put_writes(
        &self,
        thread_id: &str,
        checkpoint_id: &str,
        writes: Vec<PendingWrite>,
    ) -> Result<()>;

    /// Fetch the latest checkpoint for `thread_id`, plus any writes
    /// buffered against it that have not yet been committed.
    async fn get_tuple(&self, thread_id: &str) -> Result<Option<CheckpointTuple>>;

    /// Fetch a specific checkpoint by id, regardless of whether it is the
    /// current tip. Used by eval/debug tooling for time-travel inspection.
    async fn get(&self, thread_id: &str, checkpoint_id: &str) -> Result<Option<Checkpoint>>;

    /// Stream the full history for `thread_id`, oldest checkpoint first.
    async fn list(&self, thread_id: &str) -> Result<CheckpointStream>;

    /// Permanently remove every checkpoint and pending write for a thread.
    async fn delete_thread(&self, thread_id: &str) -> Result<()>;
}
