//! Deterministic scenario driver (spec.md §4.9's runner algorithm): builds a
//! graph over an in-memory checkpointer, a scripted tool executor, and a
//! keyword-driven LLM stub, then streams it to completion, feeding scripted
//! resume values on every interrupt until the scenario finishes or its
//! scripted interrupts run out.

use crate::error::{EvalError, Result};
use crate::scenario::EvalScenario;
use outreach_checkpoint::InMemoryCheckpointSaver;
use outreach_graph::{
    legacy_topology, CompiledGraph, InvokeContext, Role, RunOutcome, Runtime, ThreadState,
    WorkflowStatus,
};
use outreach_llm::KeywordStub;
use outreach_tools::{RecordedCall, ScriptedToolExecutor};
use std::sync::Arc;

/// Outer cap on interrupt/resume round-trips per scenario (spec.md §4.9).
pub const MAX_OUTER_RESUMES: u32 = 50;

/// Everything the verifier needs from a completed scenario run.
pub struct RunResult {
    /// `current_node` of each committed checkpoint, in run order.
    pub node_sequence: Vec<String>,
    pub final_state: ThreadState,
    pub tool_calls: Vec<RecordedCall>,
    /// Assistant-message content produced at each node, in node-run order.
    pub assistant_messages_by_node: Vec<(String, String)>,
}

/// Builds and drives scenarios against a fixed graph topology.
pub struct Runner {
    build_graph: Box<dyn Fn() -> outreach_graph::Result<CompiledGraph> + Send + Sync>,
    invoke_ctx: InvokeContext,
}

impl Runner {
    pub fn new(
        build_graph: impl Fn() -> outreach_graph::Result<CompiledGraph> + Send + Sync + 'static,
        invoke_ctx: InvokeContext,
    ) -> Self {
        Self {
            build_graph: Box::new(build_graph),
            invoke_ctx,
        }
    }

    /// A runner over the fixed legacy topology (spec.md §4.4), the default
    /// used by scenarios that don't supply a declarative graph definition.
    pub fn legacy() -> Self {
        Self::new(legacy_topology, InvokeContext::default())
    }

    pub async fn run(&self, scenario: &EvalScenario) -> Result<RunResult> {
        let graph = (self.build_graph)().map_err(|source| EvalError::GraphRun {
            scenario_id: scenario.id.clone(),
            source,
        })?;

        let saver = InMemoryCheckpointSaver::new();
        let tools = Arc::new(ScriptedToolExecutor::new(scenario.mock_tools.clone()));
        let llm = Arc::new(KeywordStub::new(scenario.llm_script.clone()));
        let runtime = Runtime::new(graph, saver, llm, tools.clone(), self.invoke_ctx.clone());

        let thread_id = scenario.id.clone();
        let initial = ThreadState::new(scenario.record.clone(), scenario.contact.clone());

        let (mut snapshots, mut outcome) = runtime
            .stream(&thread_id, Some(initial), None)
            .await
            .map_err(|source| EvalError::GraphRun {
                scenario_id: scenario.id.clone(),
                source,
            })?;

        let mut interrupts = scenario.interrupts.clone().into_iter();
        let mut resumes = 0u32;

        let final_state = loop {
            match outcome {
                RunOutcome::Finished(state) => break state,
                RunOutcome::Interrupted { state, .. } => match interrupts.next() {
                    Some(resume_value) => {
                        resumes += 1;
                        if resumes > MAX_OUTER_RESUMES {
                            return Err(EvalError::TooManyResumes {
                                scenario_id: scenario.id.clone(),
                                cap: MAX_OUTER_RESUMES,
                            });
                        }
                        let (more, next_outcome) = runtime
                            .stream(&thread_id, None, Some(resume_value))
                            .await
                            .map_err(|source| EvalError::GraphRun {
                                scenario_id: scenario.id.clone(),
                                source,
                            })?;
                        snapshots.extend(more);
                        outcome = next_outcome;
                    }
                    None => {
                        let mut waiting = state;
                        waiting.workflow_status = WorkflowStatus::WaitingHuman;
                        break waiting;
                    }
                },
            }
        };

        let node_sequence = snapshots
            .iter()
            .filter_map(|s| s.current_node.clone())
            .collect();

        let mut assistant_messages_by_node = Vec::new();
        let mut prev_len = 0usize;
        for snap in &snapshots {
            let node_name = snap.current_node.clone().unwrap_or_default();
            for message in &snap.messages[prev_len..] {
                if message.role == Role::Assistant {
                    assistant_messages_by_node.push((node_name.clone(), message.content.clone()));
                }
            }
            prev_len = snap.messages.len();
        }

        Ok(RunResult {
            node_sequence,
            final_state,
            tool_calls: tools.calls().await,
            assistant_messages_by_node,
        })
    }
}
