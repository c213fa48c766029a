//! Error type for tool gateway implementations.
//!
//! Per spec.md §4.6/§7, handler failures never cross the
//! [`outreach_graph::ToolExecutor`] boundary as a Rust `Err` — they are
//! converted to `ToolResult { success: false, .. }` by the registry. This
//! type exists one layer down, for the gateway traits themselves
//! (`EmailGateway`, `CallGateway`, `RecordStore`) to report provider-specific
//! failures before that conversion happens.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ToolError {
    #[error("{0}")]
    Provider(String),

    #[error("invalid arguments: {0}")]
    InvalidArgs(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ToolError>;
