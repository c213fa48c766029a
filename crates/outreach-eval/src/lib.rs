//! Deterministic scenario runner and assertion engine with optional LLM
//! judge (component I): drives a workflow against scripted mock tools and
//! scripted interrupt responses, then verifies node sequence, final state,
//! tool-call arguments, and LLM output content.

mod error;
mod judge;
mod runner;
mod scenario;
mod verifier;

pub use error::{EvalError, Result};
pub use judge::{InvokeLlmJudge, JudgeVerdict, LlmJudge, StubJudge};
pub use runner::{RunResult, Runner, MAX_OUTER_RESUMES};
pub use scenario::{
    EvalScenario, ExpectedLlmResponse, ExpectedOutcome, ExpectedToolCall, MatchMode,
};
pub use verifier::{CheckResult, VerificationReport, Verifier};
