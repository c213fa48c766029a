//! The `ToolExecutor` capability the graph runtime and LLM layer call
//! through.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Structured result every tool call produces. Handlers never throw across
/// this boundary: failures are encoded as `success: false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl ToolResult {
    pub fn ok(message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            success: true,
            message: message.into(),
            data,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
            data: None,
        }
    }
}

#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Dispatches `name` with `args` and returns a structured result.
    /// Implementations must never panic or propagate an error for an
    /// unknown tool name or a handler failure — both are encoded in the
    /// returned [`ToolResult`].
    async fn execute(&self, name: &str, args: Value) -> ToolResult;
}
