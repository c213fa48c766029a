//! The scenario shape a workflow is verified against (spec.md §4.9):
//! `{ id, initialState, mockTools, interrupts, expected }`.

use outreach_graph::{Contact, Record, RecordStatus};
use serde_json::Value;
use std::collections::HashMap;

/// How an expected tool-call argument comparison is resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchMode {
    /// Deep-equality between expected and recorded args.
    Strict,
    /// Delegated to an [`crate::judge::LlmJudge`] for semantic equivalence.
    Judge,
}

/// One `toolsCalled` expectation: at least one recorded call with `name`
/// must exist, and its args must satisfy `match_mode` against `args` (when
/// given — `None` means any args are acceptable, only the call itself is
/// checked for).
#[derive(Debug, Clone)]
pub struct ExpectedToolCall {
    pub name: String,
    pub args: Option<Value>,
    pub match_mode: MatchMode,
}

impl ExpectedToolCall {
    pub fn strict(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args: Some(args),
            match_mode: MatchMode::Strict,
        }
    }

    pub fn judge(name: impl Into<String>, args: Value) -> Self {
        Self {
            name: name.into(),
            args: Some(args),
            match_mode: MatchMode::Judge,
        }
    }

    pub fn any_args(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: None,
            match_mode: MatchMode::Strict,
        }
    }
}

/// One `llmResponses` expectation: the concatenation of assistant messages
/// produced at `node` must contain every `contains` substring, case
/// insensitively.
#[derive(Debug, Clone)]
pub struct ExpectedLlmResponse {
    pub node: String,
    pub contains: Vec<String>,
}

/// The full set of checks a scenario is verified against. A scenario passes
/// iff every non-empty check passes (spec.md §4.9); an empty `Vec` or `None`
/// field means that dimension isn't checked.
#[derive(Debug, Clone, Default)]
pub struct ExpectedOutcome {
    pub node_sequence: Option<Vec<String>>,
    /// Dot-path keys into the serialized final `ThreadState` (e.g.
    /// `"record.status"`, `"attempts"`) mapped to their expected value.
    pub final_state: HashMap<String, Value>,
    pub record_status: Option<RecordStatus>,
    pub tools_called: Vec<ExpectedToolCall>,
    pub llm_responses: Vec<ExpectedLlmResponse>,
}

/// A deterministic end-to-end scenario: initial record/contact, scripted
/// tool responses, a scripted LLM script, and scripted interrupt-resume
/// values fed in order.
#[derive(Debug, Clone)]
pub struct EvalScenario {
    pub id: String,
    pub record: Record,
    pub contact: Option<Contact>,
    /// Per-tool-name scripted response; a tool called but not scripted here
    /// gets the runner's benign default rather than failing the scenario.
    pub mock_tools: HashMap<String, outreach_graph::ToolResult>,
    /// Responses the keyword-driven LLM stub returns, in call order.
    pub llm_script: Vec<String>,
    /// Resume values fed to successive interrupts, in order.
    pub interrupts: Vec<Value>,
    pub expected: ExpectedOutcome,
}
