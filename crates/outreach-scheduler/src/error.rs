//! Error type for the scheduler tick.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SchedulerError {
    /// The record provider (the application's DB layer) could not be
    /// reached. Mirrors `StoreUnavailable`'s transient/retry-safe role in
    /// the graph engine's taxonomy.
    #[error("record provider unavailable: {0}")]
    ProviderUnavailable(String),

    /// The graph runtime surfaced a fatal error while processing a record.
    /// Recorded as an `error` outcome for that record rather than aborting
    /// the whole tick.
    #[error("graph run failed for record {record_id}: {source}")]
    GraphRun {
        record_id: String,
        #[source]
        source: outreach_graph::GraphError,
    },

    /// Another tick for this workflow is already in flight (spec.md §4.8:
    /// at most one tick per workflow may run concurrently).
    #[error("a tick for workflow {0} is already running")]
    TickInFlight(String),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
