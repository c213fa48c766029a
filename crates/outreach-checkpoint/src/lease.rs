//! Per-thread write exclusivity.
//!
//! The checkpoint store is the only shared mutable resource in the engine;
//! §5 requires at most one active writer per `thread_id`. A database-backed
//! saver would implement this with an advisory lock keyed by `thread_id`
//! (see spec.md §9); the in-process registry here gives every
//! [`crate::CheckpointSaver`] the same guarantee for a single process via a
//! keyed `tokio::sync::Mutex`, and is what the graph runtime reaches for
//! before executing a superstep.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};

/// Holding this guard means no other caller can hold a lease on the same
/// `thread_id` at the same time. Dropping it releases the lease.
pub struct ThreadLease {
    _guard: OwnedMutexGuard<()>,
}

/// Registry of per-thread leases, shared across all workers in a process.
#[derive(Clone, Default)]
pub struct ThreadLeaseRegistry {
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,
}

impl ThreadLeaseRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Acquire exclusive access to `thread_id`. Waits if another worker
    /// currently holds the lease for this thread rather than failing --
    /// cross-process deployments must swap this for a real advisory lock.
    pub async fn acquire(&self, thread_id: &str) -> ThreadLease {
        let lock = {
            let read = self.locks.read().await;
            if let Some(lock) = read.get(thread_id) {
                lock.clone()
            } else {
                drop(read);
                let mut write = self.locks.write().await;
                write
                    .entry(thread_id.to_string())
                    .or_insert_with(|| Arc::new(Mutex::new(())))
                    .clone()
            }
        };

        let guard = lock.lock_owned().await;
        ThreadLease { _guard: guard }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_acquire_waits_for_first_to_drop() {
        let registry = ThreadLeaseRegistry::new();
        let lease = registry.acquire("t1").await;

        let registry2 = registry.clone();
        let handle = tokio::spawn(async move {
            let _lease = registry2.acquire("t1").await;
        });

        tokio::time::sleep(std::time::Duration::from_millis(20)).await;
        assert!(!handle.is_finished());

        drop(lease);
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn distinct_threads_do_not_contend() {
        let registry = ThreadLeaseRegistry::new();
        let _a = registry.acquire("a").await;
        let _b = registry.acquire("b").await;
    }
}
