//! Scripted [`ToolExecutor`] used by the eval runner (component I) and by
//! tests elsewhere in the workspace: returns a fixed response per tool name
//! and records every call `{name, args, timestamp}` for later verification
//! against a scenario's `toolsCalled` expectations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use outreach_graph::{ToolExecutor, ToolResult};
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::Mutex;

/// One observed call, as required by spec.md §4.9's verifier.
#[derive(Debug, Clone)]
pub struct RecordedCall {
    pub name: String,
    pub args: Value,
    pub timestamp: DateTime<Utc>,
}

/// Returns the scenario's scripted response for each tool name; any call to
/// a tool the scenario didn't script gets a benign default `{success: true}`
/// rather than failing the run, since an un-scripted tool is a scenario
/// authoring gap, not a contract violation.
#[derive(Default)]
pub struct ScriptedToolExecutor {
    responses: HashMap<String, ToolResult>,
    calls: Mutex<Vec<RecordedCall>>,
}

impl ScriptedToolExecutor {
    pub fn new(responses: HashMap<String, ToolResult>) -> Self {
        Self {
            responses,
            calls: Mutex::new(Vec::new()),
        }
    }

    pub async fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().await.clone()
    }
}

#[async_trait]
impl ToolExecutor for ScriptedToolExecutor {
    async fn execute(&self, name: &str, args: Value) -> ToolResult {
        self.calls.lock().await.push(RecordedCall {
            name: name.to_string(),
            args: args.clone(),
            timestamp: Utc::now(),
        });
        self.responses
            .get(name)
            .cloned()
            .unwrap_or_else(|| ToolResult::ok("ok", None))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn records_calls_and_returns_scripted_response() {
        let mut responses = HashMap::new();
        responses.insert(
            "sendEmail".to_string(),
            ToolResult::ok("sent", Some(json!({"messageId": "m1"}))),
        );
        let executor = ScriptedToolExecutor::new(responses);

        let result = executor
            .execute("sendEmail", json!({"subject": "hi"}))
            .await;
        assert!(result.success);

        let calls = executor.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].name, "sendEmail");
        assert_eq!(calls[0].args, json!({"subject": "hi"}));
    }

    #[tokio::test]
    async fn unscripted_tool_gets_benign_default() {
        let executor = ScriptedToolExecutor::new(HashMap::new());
        let result = executor.execute("getRecord", json!({})).await;
        assert!(result.success);
    }
}
