//! Durable, append-only checkpoint storage for graph threads.
//!
//! This crate knows nothing about nodes, edges, or LLMs — it stores opaque
//! state blobs under a `thread_id`, chained by parent pointer, and buffers
//! pending writes so a crashed worker can resume a thread without re-running
//! the node that was in flight. Kept free of any dependency on the graph
//! engine so storage backends can be swapped independently of it.

mod checkpoint;
mod error;
mod lease;
mod memory;
mod traits;

pub use checkpoint::{Checkpoint, CheckpointId, CheckpointMetadata, CheckpointTuple, PendingWrite};
pub use error::{CheckpointError, Result};
pub use lease::{ThreadLease, ThreadLeaseRegistry};
pub use memory::InMemoryCheckpointSaver;
pub use traits::{CheckpointSaver, CheckpointStream};
