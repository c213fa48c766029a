//! Deterministic, scripted `InvokeLlm` used by evals (component I) and unit
//! tests. Each call returns the next entry from a fixed script; once
//! exhausted it returns a benign default that the analyze node's keyword
//! matcher classifies as `markComplete`, so a scenario that runs longer than
//! scripted converges instead of looping forever.

use async_trait::async_trait;
use outreach_graph::{InvokeContext, InvokeLlm, Message};
use std::sync::atomic::{AtomicUsize, Ordering};

pub struct KeywordStub {
    script: Vec<String>,
    cursor: AtomicUsize,
    default_response: String,
}

impl KeywordStub {
    pub fn new(script: Vec<impl Into<String>>) -> Self {
        Self {
            script: script.into_iter().map(Into::into).collect(),
            cursor: AtomicUsize::new(0),
            default_response: "complete".to_string(),
        }
    }

    pub fn calls_made(&self) -> usize {
        self.cursor.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl InvokeLlm for KeywordStub {
    async fn invoke(
        &self,
        _history: &[Message],
        _user_message: &str,
        _ctx: &InvokeContext,
    ) -> outreach_graph::Result<String> {
        let i = self.cursor.fetch_add(1, Ordering::SeqCst);
        Ok(self
            .script
            .get(i)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_script_then_falls_back_to_default() {
        let stub = KeywordStub::new(vec!["needs_email", "escalate"]);
        let ctx = InvokeContext::default();

        assert_eq!(stub.invoke(&[], "", &ctx).await.unwrap(), "needs_email");
        assert_eq!(stub.invoke(&[], "", &ctx).await.unwrap(), "escalate");
        assert_eq!(stub.invoke(&[], "", &ctx).await.unwrap(), "complete");
        assert_eq!(stub.calls_made(), 3);
    }
}
