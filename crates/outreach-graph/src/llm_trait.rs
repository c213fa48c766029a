//! The `InvokeLlm` capability the graph runtime calls through.
//!
//! The engine is model-agnostic: [`outreach-llm`](../outreach_llm/index.html)
//! provides the real implementation, and evals swap in a deterministic
//! keyword-driven stub. Neither this trait nor any node implementation knows
//! which one is in play.

use crate::error::Result;
use crate::messages::Message;
use crate::retry::RetryPolicy;
use async_trait::async_trait;

/// Context passed alongside the conversation history, used to build the
/// system prompt and filter the tool catalogue.
#[derive(Debug, Clone)]
pub struct InvokeContext {
    pub model: String,
    pub temperature: f32,
    pub system_prompt: Option<String>,
    pub allowed_tools: Vec<String>,
    /// Retry policy applied around `InvokeLlm::invoke` calls inside
    /// analyze/process-response nodes for the `LLMUnavailable` transient
    /// error branch (spec.md §7). Not applied to `ToolExecutor::execute`:
    /// that contract never returns an `Err` to retry (spec.md §4.6 —
    /// handlers never throw across the boundary, failures are encoded as
    /// `ToolResult { success: false, .. }`).
    pub retry: RetryPolicy,
}

impl Default for InvokeContext {
    fn default() -> Self {
        Self {
            model: "gpt-4o-class".to_string(),
            temperature: 0.7,
            system_prompt: None,
            allowed_tools: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }
}

#[async_trait]
pub trait InvokeLlm: Send + Sync {
    /// Runs one decision round: send `history` plus `user_message` to the
    /// model, following tool calls until the model produces a final text
    /// response. Returns the assistant's final text.
    async fn invoke(
        &self,
        history: &[Message],
        user_message: &str,
        ctx: &InvokeContext,
    ) -> Result<String>;
}
