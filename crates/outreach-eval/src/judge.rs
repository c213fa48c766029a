//! LLM-as-judge oracle for semantic tool-argument equivalence (spec.md
//! §4.9's `matchMode: judge`).

use async_trait::async_trait;
use outreach_graph::{InvokeContext, InvokeLlm};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct JudgeVerdict {
    pub matched: bool,
    pub reason: String,
}

#[async_trait]
pub trait LlmJudge: Send + Sync {
    /// Judges whether `actual` args are an acceptable match for `expected`
    /// args on a call to `tool`.
    async fn judge_args(&self, tool: &str, expected: &Value, actual: &Value) -> JudgeVerdict;
}

#[derive(Deserialize)]
struct JudgeResponse {
    #[serde(rename = "match")]
    matched: bool,
    #[serde(default)]
    reason: String,
}

/// Wraps any [`InvokeLlm`] as a judge: prompts it to answer `{match,
/// reason}` and parses the reply as JSON. A malformed or failed response is
/// treated as a non-match rather than aborting verification.
pub struct InvokeLlmJudge {
    llm: Arc<dyn InvokeLlm>,
    ctx: InvokeContext,
}

impl InvokeLlmJudge {
    pub fn new(llm: Arc<dyn InvokeLlm>, ctx: InvokeContext) -> Self {
        Self { llm, ctx }
    }
}

#[async_trait]
impl LlmJudge for InvokeLlmJudge {
    async fn judge_args(&self, tool: &str, expected: &Value, actual: &Value) -> JudgeVerdict {
        let prompt = format!(
            "Tool \"{tool}\" was expected to be called with arguments {expected}. It was \
             actually called with {actual}. Are these semantically equivalent for this tool \
             call? Respond with exactly this JSON shape: {{\"match\": bool, \"reason\": string}}."
        );
        let response = match self.llm.invoke(&[], &prompt, &self.ctx).await {
            Ok(text) => text,
            Err(e) => {
                return JudgeVerdict {
                    matched: false,
                    reason: format!("judge LLM call failed: {e}"),
                }
            }
        };
        match serde_json::from_str::<JudgeResponse>(&response) {
            Ok(parsed) => JudgeVerdict {
                matched: parsed.matched,
                reason: parsed.reason,
            },
            Err(_) => JudgeVerdict {
                matched: false,
                reason: format!("unparseable judge response: {response}"),
            },
        }
    }
}

/// Deterministic stand-in judge for tests and offline scenarios (spec.md
/// S6): normalizes both values to lowercase alphanumerics and checks the
/// expected value's normalized form appears within the actual value's. Lets
/// an eval assert "subject mentions invoice 1001" without a live model call.
#[derive(Default)]
pub struct StubJudge;

fn normalize(value: &Value) -> String {
    value
        .to_string()
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(|c| c.to_lowercase())
        .collect()
}

#[async_trait]
impl LlmJudge for StubJudge {
    async fn judge_args(&self, _tool: &str, expected: &Value, actual: &Value) -> JudgeVerdict {
        let expected_norm = normalize(expected);
        let actual_norm = normalize(actual);
        if actual_norm.contains(&expected_norm) {
            JudgeVerdict {
                matched: true,
                reason: "normalized expected value found within actual value".to_string(),
            }
        } else {
            JudgeVerdict {
                matched: false,
                reason: format!("{expected_norm:?} not found in {actual_norm:?}"),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn stub_judge_matches_fuzzy_subject_line() {
        let judge = StubJudge;
        let verdict = judge
            .judge_args(
                "sendEmail",
                &json!({"subject": "Invoice 1001"}),
                &json!({"subject": "Re: Invoice #1001", "body": "…"}),
            )
            .await;
        assert!(verdict.matched);
    }

    #[tokio::test]
    async fn stub_judge_rejects_unrelated_values() {
        let judge = StubJudge;
        let verdict = judge
            .judge_args(
                "sendEmail",
                &json!({"subject": "Invoice 1001"}),
                &json!({"subject": "Welcome aboard"}),
            )
            .await;
        assert!(!verdict.matched);
    }
}
