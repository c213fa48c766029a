//! Checkpoint data types.
//!
//! A [`Checkpoint`] is a durable, immutable snapshot of a thread's state at
//! one point in its execution. Checkpoints form a parent-pointer chain per
//! `thread_id`; the chain is never mutated, only appended to.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Opaque, monotonically-ordered checkpoint identifier.
///
/// Callers must not parse this string; only compare it for equality or rely
/// on its ordering *within a single thread*. The in-memory backend formats
/// it as a zero-padded sequence number so that string comparison and
/// numeric ordering agree.
pub type CheckpointId = String;

/// Metadata recorded alongside every checkpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckpointMetadata {
    /// Superstep counter for this thread, starting at 0.
    pub step: u64,
    /// Name of the node whose output produced this checkpoint, or a
    /// synthetic source such as `"__input__"` for the initial snapshot.
    pub source: String,
    /// Wall-clock time the checkpoint was written.
    pub ts: DateTime<Utc>,
}

impl CheckpointMetadata {
    pub fn new(step: u64, source: impl Into<String>) -> Self {
        Self {
            step,
            source: source.into(),
            ts: Utc::now(),
        }
    }
}

/// A durable snapshot of a thread's state.
///
/// `state` is kept as an opaque, already-serialized [`serde_json::Value`] so
/// that this crate never needs to know the shape of the graph engine's
/// `ThreadState` type — any reader can decode the blob independently, as
/// required of the persisted checkpoint layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Checkpoint {
    pub id: CheckpointId,
    pub thread_id: String,
    pub parent_id: Option<CheckpointId>,
    pub state: serde_json::Value,
    pub metadata: CheckpointMetadata,
}

/// A checkpoint plus everything a resuming caller needs to continue a
/// thread: the snapshot itself and any writes buffered against it that have
/// not yet been folded into a successor checkpoint.
#[derive(Debug, Clone)]
pub struct CheckpointTuple {
    pub checkpoint: Checkpoint,
    pub pending_writes: Vec<PendingWrite>,
}

/// A node output recorded before it has been reduced into a successor
/// snapshot. Replayed on resume instead of re-running the producing node,
/// which is what makes `Resume` idempotent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingWrite {
    /// Name of the task (node) that produced this write.
    pub task_id: String,
    /// The partial state the node returned, serialized.
    pub writes: serde_json::Value,
}
