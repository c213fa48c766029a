//! Error types for LLM provider implementations.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, LlmError>;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API key not configured: {0}")]
    ApiKeyMissing(String),

    #[error("invalid response from provider: {0}")]
    InvalidResponse(String),

    #[error("tool arguments for {tool} were not valid JSON: {source}")]
    ToolArgsInvalid {
        tool: String,
        source: serde_json::Error,
    },

    #[error("tool-call loop exceeded {cap} iterations")]
    ToolLoopExceeded { cap: u32 },
}

impl From<LlmError> for outreach_graph::GraphError {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::ToolArgsInvalid { tool, source } => {
                outreach_graph::GraphError::ToolArgsInvalid { tool, source }
            }
            LlmError::ToolLoopExceeded { cap } => outreach_graph::GraphError::ToolLoopExceeded { cap },
            other => outreach_graph::GraphError::LLMUnavailable(other.to_string()),
        }
    }
}
