//! In-memory reference [`CheckpointSaver`] implementation.
//!
//! Intended for tests, evals, and single-process deployments. Every
//! checkpoint lives in a `Vec` appended under its `thread_id`; nothing is
//! ever mutated or removed except via `delete_thread`.

use crate::checkpoint::{Checkpoint, CheckpointMetadata, CheckpointTuple, PendingWrite};
use crate::error::{CheckpointError, Result};
use crate::traits::{CheckpointSaver, CheckpointStream};
use async_trait::async_trait;
use futures::stream;
use std::collections::HashMap;
use tokio::sync::RwLock;

struct ThreadLog {
    checkpoints: Vec<Checkpoint>,
    writes: HashMap<CheckpointIdKey, Vec<PendingWrite>>,
    next_seq: u64,
}

type CheckpointIdKey = String;

impl ThreadLog {
    fn new() -> Self {
        Self {
            checkpoints: Vec::new(),
            writes: HashMap::new(),
            next_seq: 0,
        }
    }

    fn tip(&self) -> Option<&Checkpoint> {
        self.checkpoints.last()
    }

    fn next_id(&mut self, thread_id: &str) -> String {
        let id = format!("{thread_id}:{:020}", self.next_seq);
        self.next_seq += 1;
        id
    }
}

/// In-memory checkpoint store, safe to share across tasks via `Clone`.
#[derive(Clone, Default)]
pub struct InMemoryCheckpointSaver {
    threads: std::sync::Arc<RwLock<HashMap<String, ThreadLog>>>,
}

impl InMemoryCheckpointSaver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of threads currently tracked. Test/debug helper.
    pub async fn thread_count(&self) -> usize {
        self.threads.read().await.len()
    }

    /// Total checkpoints across all threads. Test/debug helper.
    pub async fn checkpoint_count(&self) -> usize {
        self.threads
            .read()
            .await
            .values()
            .map(|log| log.checkpoints.len())
            .sum()
    }
}

#[async_trait]
impl CheckpointSaver for InMemoryCheckpointSaver {
    async fn put(
        &self,
        thread_id: &str,
        parent_id: Option<&str>,
        state: serde_json::Value,
        metadata: CheckpointMetadata,
    ) -> Result<Checkpoint> {
        let mut threads = self.threads.write().await;
        let log = threads.entry(thread_id.to_string()).or_insert_with(ThreadLog::new);

        let actual_tip = log.tip().map(|c| c.id.clone());
        if actual_tip != parent_id.map(|s| s.to_string()) {
            return Err(CheckpointError::ConflictingWrite {
                thread_id: thread_id.to_string(),
                expected: parent_id.map(|s| s.to_string()),
                actual: actual_tip,
            });
        }

        let id = log.next_id(thread_id);
        let checkpoint = Checkpoint {
            id: id.clone(),
            thread_id: thread_id.to_string(),
            parent_id: parent_id.map(|s| s.to_string()),
            state,
            metadata,
        };
        log.checkpoints.push(checkpoint.clone());
        tracing::debug!(thread_id, checkpoint_id = %id, "checkpoint written");
        Ok(checkpoint)
    }

    async fn put_writes(
        &self,
        thread_id: &str,
        checkpoint_id: &str,
        writes: Vec<PendingWrite>,
    ) -> Result<()> {
        let mut threads = self.threads.write().await;
        let log = threads
            .get_mut(thread_id)
            .ok_or_else(|| CheckpointError::ThreadNotFound(thread_id.to_string()))?;

        if !log.checkpoints.iter().any(|c| c.id == checkpoint_id) {
            return Err(CheckpointError::CheckpointNotFound {
                thread_id: thread_id.to_string(),
                checkpoint_id: checkpoint_id.to_string(),
            });
        }

        log.writes
            .entry(checkpoint_id.to_string())
            .or_default()
            .extend(writes);
        Ok(())
    }

    async fn get_tuple(&self, thread_id: &str) -> Result<Option<CheckpointTuple>> {
        let threads = self.threads.read().await;
        let Some(log) = threads.get(thread_id) else {
            return Ok(None);
        };
        let Some(checkpoint) = log.tip().cloned() else {
            return Ok(None);
        };
        let pending_writes = log.writes.get(&checkpoint.id).cloned().unwrap_or_default();
        Ok(Some(CheckpointTuple {
            checkpoint,
            pending_writes,
        }))
    }

    async fn get(&self, thread_id: &str, checkpoint_id: &str) -> Result<Option<Checkpoint>> {
        let threads = self.threads.read().await;
        Ok(threads
            .get(thread_id)
            .and_then(|log| log.checkpoints.iter().find(|c| c.id == checkpoint_id).cloned()))
    }

    async fn list(&self, thread_id: &str) -> Result<CheckpointStream> {
        let threads = self.threads.read().await;
        let items: Vec<Result<Checkpoint>> = threads
            .get(thread_id)
            .map(|log| log.checkpoints.iter().cloned().map(Ok).collect())
            .unwrap_or_default();
        Ok(Box::pin(stream::iter(items)))
    }

    async fn delete_thread(&self, thread_id: &str) -> Result<()> {
        self.threads.write().await.remove(thread_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;
    use serde_json::json;

    #[tokio::test]
    async fn put_and_get_roundtrip() {
        let saver = InMemoryCheckpointSaver::new();
        let cp = saver
            .put("t1", None, json!({"n": 1}), CheckpointMetadata::new(0, "analyzeRecord"))
            .await
            .unwrap();

        let tuple = saver.get_tuple("t1").await.unwrap().unwrap();
        assert_eq!(tuple.checkpoint.id, cp.id);
        assert_eq!(tuple.checkpoint.state, json!({"n": 1}));
        assert!(tuple.pending_writes.is_empty());
    }

    #[tokio::test]
    async fn conflicting_write_detected() {
        let saver = InMemoryCheckpointSaver::new();
        saver
            .put("t1", None, json!({}), CheckpointMetadata::new(0, "a"))
            .await
            .unwrap();

        let err = saver
            .put("t1", None, json!({}), CheckpointMetadata::new(1, "b"))
            .await
            .unwrap_err();
        assert!(matches!(err, CheckpointError::ConflictingWrite { .. }));
    }

    #[tokio::test]
    async fn chain_extends_from_tip() {
        let saver = InMemoryCheckpointSaver::new();
        let c0 = saver
            .put("t1", None, json!({"step": 0}), CheckpointMetadata::new(0, "a"))
            .await
            .unwrap();
        let c1 = saver
            .put("t1", Some(&c0.id), json!({"step": 1}), CheckpointMetadata::new(1, "b"))
            .await
            .unwrap();

        assert_eq!(c1.parent_id.as_deref(), Some(c0.id.as_str()));

        let history: Vec<_> = saver.list("t1").await.unwrap().collect().await;
        assert_eq!(history.len(), 2);
    }

    #[tokio::test]
    async fn pending_writes_are_buffered_until_commit() {
        let saver = InMemoryCheckpointSaver::new();
        let c0 = saver
            .put("t1", None, json!({}), CheckpointMetadata::new(0, "sendEmail"))
            .await
            .unwrap();

        saver
            .put_writes(
                "t1",
                &c0.id,
                vec![PendingWrite {
                    task_id: "sendEmail".into(),
                    writes: json!({"attempts": 1}),
                }],
            )
            .await
            .unwrap();

        let tuple = saver.get_tuple("t1").await.unwrap().unwrap();
        assert_eq!(tuple.pending_writes.len(), 1);
        assert_eq!(tuple.pending_writes[0].task_id, "sendEmail");
    }

    #[tokio::test]
    async fn delete_thread_clears_history() {
        let saver = InMemoryCheckpointSaver::new();
        saver
            .put("t1", None, json!({}), CheckpointMetadata::new(0, "a"))
            .await
            .unwrap();
        assert_eq!(saver.thread_count().await, 1);

        saver.delete_thread("t1").await.unwrap();
        assert_eq!(saver.thread_count().await, 0);
    }
}
