//! Verifies a [`RunResult`] against a scenario's `expected` outcome
//! (spec.md §4.9). A scenario passes iff every requested check passes.

use crate::error::{EvalError, Result};
use crate::judge::LlmJudge;
use crate::runner::RunResult;
use crate::scenario::{EvalScenario, MatchMode};
use serde_json::Value;

/// One verification dimension's outcome, reported individually rather than
/// collapsed into a single bool so a failing scenario says which check
/// failed and why.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub name: String,
    pub passed: bool,
    pub detail: String,
}

#[derive(Debug, Clone)]
pub struct VerificationReport {
    pub scenario_id: String,
    pub checks: Vec<CheckResult>,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.checks.iter().all(|c| c.passed)
    }
}

pub struct Verifier<'a> {
    judge: &'a dyn LlmJudge,
}

impl<'a> Verifier<'a> {
    pub fn new(judge: &'a dyn LlmJudge) -> Self {
        Self { judge }
    }

    pub async fn verify(
        &self,
        scenario: &EvalScenario,
        result: &RunResult,
    ) -> Result<VerificationReport> {
        let mut checks = Vec::new();

        if let Some(expected_sequence) = &scenario.expected.node_sequence {
            let passed = &result.node_sequence == expected_sequence;
            checks.push(CheckResult {
                name: "nodeSequence".to_string(),
                passed,
                detail: format!(
                    "expected {expected_sequence:?}, observed {:?}",
                    result.node_sequence
                ),
            });
        }

        if !scenario.expected.final_state.is_empty() {
            let state_blob =
                serde_json::to_value(&result.final_state).map_err(|_| EvalError::UnknownStateKey {
                    scenario_id: scenario.id.clone(),
                    key: "<final state serialization>".to_string(),
                })?;
            for (path, expected_value) in &scenario.expected.final_state {
                let observed = lookup_path(&state_blob, path);
                let passed = observed.as_ref() == Some(expected_value);
                checks.push(CheckResult {
                    name: format!("finalState.{path}"),
                    passed,
                    detail: format!(
                        "expected {expected_value}, observed {}",
                        observed.unwrap_or(Value::Null)
                    ),
                });
            }
        }

        if let Some(expected_status) = scenario.expected.record_status {
            let passed = result.final_state.record.status == expected_status;
            checks.push(CheckResult {
                name: "record.status".to_string(),
                passed,
                detail: format!(
                    "expected {expected_status:?}, observed {:?}",
                    result.final_state.record.status
                ),
            });
        }

        for expected_call in &scenario.expected.tools_called {
            let matching_calls: Vec<_> = result
                .tool_calls
                .iter()
                .filter(|c| c.name == expected_call.name)
                .collect();

            let passed = if matching_calls.is_empty() {
                false
            } else {
                match (&expected_call.args, expected_call.match_mode) {
                    (None, _) => true,
                    (Some(expected_args), MatchMode::Strict) => {
                        matching_calls.iter().any(|c| &c.args == expected_args)
                    }
                    (Some(expected_args), MatchMode::Judge) => {
                        let mut any_matched = false;
                        for call in &matching_calls {
                            let verdict = self
                                .judge
                                .judge_args(&expected_call.name, expected_args, &call.args)
                                .await;
                            if verdict.matched {
                                any_matched = true;
                                break;
                            }
                        }
                        any_matched
                    }
                }
            };
            checks.push(CheckResult {
                name: format!("toolsCalled.{}", expected_call.name),
                passed,
                detail: format!(
                    "{} recorded call(s) named {:?}",
                    matching_calls.len(),
                    expected_call.name
                ),
            });
        }

        for expected_response in &scenario.expected.llm_responses {
            let combined: String = result
                .assistant_messages_by_node
                .iter()
                .filter(|(node, _)| node == &expected_response.node)
                .map(|(_, content)| content.as_str())
                .collect::<Vec<_>>()
                .join(" ")
                .to_lowercase();
            let missing: Vec<&String> = expected_response
                .contains
                .iter()
                .filter(|substr| !combined.contains(substr.to_lowercase().as_str()))
                .collect();
            checks.push(CheckResult {
                name: format!("llmResponses.{}", expected_response.node),
                passed: missing.is_empty(),
                detail: if missing.is_empty() {
                    "all substrings present".to_string()
                } else {
                    format!("missing substrings: {missing:?}")
                },
            });
        }

        Ok(VerificationReport {
            scenario_id: scenario.id.clone(),
            checks,
        })
    }
}

/// Resolves a dot-separated path (`"record.status"`) against a JSON value.
fn lookup_path(value: &Value, path: &str) -> Option<Value> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.get(segment)?;
    }
    Some(current.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::judge::StubJudge;
    use crate::scenario::{ExpectedLlmResponse, ExpectedOutcome, ExpectedToolCall};
    use outreach_graph::{Record, RecordStatus, ThreadState};
    use outreach_tools::RecordedCall;
    use serde_json::json;
    use std::collections::HashMap;

    fn sample_record() -> Record {
        Record {
            id: "r1".into(),
            title: "Invoice".into(),
            status: RecordStatus::Done,
            priority: None,
            record_type: "invoice".into(),
            metadata: HashMap::new(),
        }
    }

    fn sample_result() -> RunResult {
        let mut final_state = ThreadState::new(sample_record(), None);
        final_state.attempts = 1;
        RunResult {
            node_sequence: vec!["analyzeRecord".into(), "sendEmail".into()],
            final_state,
            tool_calls: vec![RecordedCall {
                name: "sendEmail".into(),
                args: json!({"subject": "Re: Invoice #1001", "body": "…"}),
                timestamp: chrono::Utc::now(),
            }],
            assistant_messages_by_node: vec![(
                "analyzeRecord".into(),
                "Decision: needs_email, sending invoice reminder".into(),
            )],
        }
    }

    fn scenario_with(expected: ExpectedOutcome) -> EvalScenario {
        EvalScenario {
            id: "s1".into(),
            record: sample_record(),
            contact: None,
            mock_tools: HashMap::new(),
            llm_script: vec![],
            interrupts: vec![],
            expected,
        }
    }

    #[tokio::test]
    async fn node_sequence_matches_exactly() {
        let judge = StubJudge;
        let verifier = Verifier::new(&judge);
        let scenario = scenario_with(ExpectedOutcome {
            node_sequence: Some(vec!["analyzeRecord".into(), "sendEmail".into()]),
            ..Default::default()
        });
        let report = verifier.verify(&scenario, &sample_result()).await.unwrap();
        assert!(report.passed());
    }

    #[tokio::test]
    async fn node_sequence_mismatch_fails() {
        let judge = StubJudge;
        let verifier = Verifier::new(&judge);
        let scenario = scenario_with(ExpectedOutcome {
            node_sequence: Some(vec!["analyzeRecord".into()]),
            ..Default::default()
        });
        let report = verifier.verify(&scenario, &sample_result()).await.unwrap();
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn final_state_dot_path_and_record_status() {
        let judge = StubJudge;
        let verifier = Verifier::new(&judge);
        let mut final_state_expectations = HashMap::new();
        final_state_expectations.insert("attempts".to_string(), json!(1));
        let scenario = scenario_with(ExpectedOutcome {
            final_state: final_state_expectations,
            record_status: Some(RecordStatus::Done),
            ..Default::default()
        });
        let report = verifier.verify(&scenario, &sample_result()).await.unwrap();
        assert!(report.passed());
    }

    #[tokio::test]
    async fn strict_tool_args_require_exact_match() {
        let judge = StubJudge;
        let verifier = Verifier::new(&judge);
        let scenario = scenario_with(ExpectedOutcome {
            tools_called: vec![ExpectedToolCall::strict(
                "sendEmail",
                json!({"subject": "Invoice 1001"}),
            )],
            ..Default::default()
        });
        let report = verifier.verify(&scenario, &sample_result()).await.unwrap();
        assert!(!report.passed());
    }

    #[tokio::test]
    async fn judge_tool_args_accept_semantic_match() {
        let judge = StubJudge;
        let verifier = Verifier::new(&judge);
        let scenario = scenario_with(ExpectedOutcome {
            tools_called: vec![ExpectedToolCall::judge(
                "sendEmail",
                json!({"subject": "Invoice 1001"}),
            )],
            ..Default::default()
        });
        let report = verifier.verify(&scenario, &sample_result()).await.unwrap();
        assert!(report.passed());
    }

    #[tokio::test]
    async fn llm_response_requires_all_substrings_case_insensitively() {
        let judge = StubJudge;
        let verifier = Verifier::new(&judge);
        let scenario = scenario_with(ExpectedOutcome {
            llm_responses: vec![ExpectedLlmResponse {
                node: "analyzeRecord".into(),
                contains: vec!["INVOICE REMINDER".into(), "missing phrase".into()],
            }],
            ..Default::default()
        });
        let report = verifier.verify(&scenario, &sample_result()).await.unwrap();
        assert!(!report.passed());
    }
}
