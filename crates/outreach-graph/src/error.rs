//! Error taxonomy for graph construction and execution.
//!
//! Split along the lines that matter to a caller of [`crate::runtime::Runtime`]:
//! transient errors leave the last checkpoint intact and are safe to retry by
//! re-invoking with the same `thread_id`; contract violations and bounded-loop
//! guards are fatal for the current run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    /// The LLM provider could not be reached or returned a server error.
    #[error("LLM unavailable: {0}")]
    LLMUnavailable(String),

    /// A tool call failed in a way the caller should retry (network blip,
    /// rate limit) rather than treat as a contract violation.
    #[error("tool transiently unavailable: {0}")]
    ToolTransient(String),

    /// The checkpoint store could not be reached.
    #[error("checkpoint store unavailable: {0}")]
    StoreUnavailable(#[from] outreach_checkpoint::CheckpointError),

    /// A tool call's arguments did not parse as JSON.
    #[error("invalid tool arguments for {tool}: {source}")]
    ToolArgsInvalid {
        tool: String,
        source: serde_json::Error,
    },

    /// An edge or entrypoint referenced a node that isn't registered.
    #[error("unknown node: {0}")]
    UnknownNode(String),

    /// A node requested a tool that isn't in the registry.
    #[error("unknown tool: {0}")]
    UnknownTool(String),

    /// The LLM invocation's tool-call loop exceeded its iteration cap.
    #[error("tool-call loop exceeded {cap} iterations")]
    ToolLoopExceeded { cap: u32 },

    /// The outer stream/invoke loop exceeded its iteration cap.
    #[error("run exceeded {cap} outer iterations without reaching a terminal or interrupt")]
    RunawayLoop { cap: u32 },

    /// `Resume` was called on a thread that is not currently suspended at an
    /// interrupt.
    #[error("no pending interrupt for thread {0}")]
    NoPendingInterrupt(String),

    /// `Resume` or `Stream` was called on a thread id with no checkpoint
    /// history.
    #[error("thread not found: {0}")]
    ThreadNotFound(String),

    /// Graph structure is invalid: missing entrypoint, dangling edge target,
    /// or a conditional edge with no matching branch.
    #[error("graph validation failed: {0}")]
    Validation(String),

    /// A workflow definition file failed to parse.
    #[error("failed to parse workflow definition: {0}")]
    DefinitionParse(String),
}

pub type Result<T> = std::result::Result<T, GraphError>;
