//! Error type for the eval runner and verifier.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum EvalError {
    /// The graph runtime failed while driving a scenario.
    #[error("scenario {scenario_id} failed to run: {source}")]
    GraphRun {
        scenario_id: String,
        #[source]
        source: outreach_graph::GraphError,
    },

    /// A scenario's `finalState` expectation names a key the serialized
    /// state doesn't have, or the value isn't addressable by dot path.
    #[error("scenario {scenario_id}: cannot read final state key {key:?}")]
    UnknownStateKey { scenario_id: String, key: String },

    /// The scenario's scripted interrupts were exhausted and the runner
    /// resumed more than the outer cap allows — indicates a scenario that
    /// never converges rather than a genuinely long-running workflow.
    #[error("scenario {scenario_id} exceeded {cap} outer resumes without finishing")]
    TooManyResumes { scenario_id: String, cap: u32 },
}

pub type Result<T> = std::result::Result<T, EvalError>;
