//! The Pregel-style runtime loop: `Stream`/`Invoke`.
//!
//! Loads the latest checkpoint (or treats the caller's input as checkpoint
//! zero), resolves the next node to run, executes it, applies reducers,
//! checkpoints, and loops — checkpointing after every step so a crash or
//! restart resumes mid-conversation rather than from scratch.

use crate::error::{GraphError, Result};
use crate::graph::CompiledGraph;
use crate::llm_trait::{InvokeContext, InvokeLlm};
pub use crate::node::NodeOutcome;
use crate::state::{PartialThreadState, ThreadState};
use crate::tool_trait::ToolExecutor;
use outreach_checkpoint::{CheckpointMetadata, CheckpointSaver, PendingWrite, ThreadLeaseRegistry};
use serde_json::Value;
use std::sync::Arc;

/// Default cap on outer loop iterations (spec §4.4 / §5): escapes
/// pathological routing loops rather than running forever.
pub const DEFAULT_MAX_ITERATIONS: u32 = 50;

const INTERRUPT_SOURCE_PREFIX: &str = "interrupt:";

/// What a `Stream`/`Invoke` call produced.
#[derive(Debug, Clone)]
pub enum RunOutcome {
    /// The graph reached `__end__`.
    Finished(ThreadState),
    /// A wait-interrupt node suspended; `node` names it and `payload` is
    /// what it surfaced to the caller.
    Interrupted {
        state: ThreadState,
        node: String,
        payload: Value,
    },
}

pub struct Runtime<S: CheckpointSaver> {
    graph: CompiledGraph,
    saver: S,
    leases: ThreadLeaseRegistry,
    llm: Arc<dyn InvokeLlm>,
    tools: Arc<dyn ToolExecutor>,
    invoke_ctx: InvokeContext,
    max_iterations: u32,
}

impl<S: CheckpointSaver> Runtime<S> {
    pub fn new(
        graph: CompiledGraph,
        saver: S,
        llm: Arc<dyn InvokeLlm>,
        tools: Arc<dyn ToolExecutor>,
        invoke_ctx: InvokeContext,
    ) -> Self {
        Self {
            graph,
            saver,
            leases: ThreadLeaseRegistry::new(),
            llm,
            tools,
            invoke_ctx,
            max_iterations: DEFAULT_MAX_ITERATIONS,
        }
    }

    pub fn with_max_iterations(mut self, cap: u32) -> Self {
        self.max_iterations = cap;
        self
    }

    /// Drives a fresh or existing thread to completion or the next
    /// interrupt, returning every intermediate snapshot plus the final
    /// outcome.
    pub async fn stream(
        &self,
        thread_id: &str,
        input: Option<ThreadState>,
        resume_value: Option<Value>,
    ) -> Result<(Vec<ThreadState>, RunOutcome)> {
        let _lease = self.leases.acquire(thread_id).await;

        let existing = self.saver.get_tuple(thread_id).await?;

        let (mut state, mut current_node_name, mut parent_id) = match existing {
            Some(tuple) => {
                let state: ThreadState = serde_json::from_value(tuple.checkpoint.state.clone())
                    .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
                let waiting_node = tuple
                    .checkpoint
                    .metadata
                    .source
                    .strip_prefix(INTERRUPT_SOURCE_PREFIX)
                    .map(str::to_string);

                if resume_value.is_some() && waiting_node.is_none() {
                    return Err(GraphError::NoPendingInterrupt(thread_id.to_string()));
                }

                let in_flight_node = tuple.pending_writes.first().map(|w| w.task_id.clone());

                // Which node runs next: a suspended interrupt takes priority,
                // then a task whose write was buffered but never committed
                // (the crash window `put_writes` exists to survive), then
                // whatever the edge map says follows the last committed
                // node, and finally the entrypoint if nothing has run yet.
                let current = if let Some(waiting) = waiting_node {
                    waiting
                } else if let Some(in_flight) = in_flight_node {
                    in_flight
                } else if let Some(last_ran) = state.current_node.clone() {
                    match self.graph.next_after(&last_ran, &state)? {
                        Some(next) => next,
                        None => return Ok((Vec::new(), RunOutcome::Finished(state))),
                    }
                } else {
                    self.graph.entrypoint.clone()
                };

                (state, current, Some(tuple.checkpoint.id))
            }
            None => {
                if resume_value.is_some() {
                    return Err(GraphError::ThreadNotFound(thread_id.to_string()));
                }
                let state = input.ok_or_else(|| GraphError::ThreadNotFound(thread_id.to_string()))?;
                let blob = serde_json::to_value(&state)
                    .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
                let cp = self
                    .saver
                    .put(thread_id, None, blob, CheckpointMetadata::new(0, "__input__"))
                    .await?;
                (state, self.graph.entrypoint.clone(), Some(cp.id))
            }
        };

        let mut resume_value = resume_value;
        let mut snapshots = Vec::new();

        for step in 0..self.max_iterations {
            let node = self.graph.node(&current_node_name)?;

            let partial = if let Some(existing) =
                self.pending_write_for(thread_id, parent_id.as_deref(), &current_node_name).await?
            {
                tracing::debug!(
                    thread_id,
                    node = %current_node_name,
                    "replaying pending write instead of re-running node"
                );
                existing
            } else {
                match node
                    .run(
                        &state,
                        resume_value.take(),
                        self.llm.as_ref(),
                        self.tools.as_ref(),
                        &self.invoke_ctx,
                    )
                    .await?
                {
                    NodeOutcome::Suspend(payload) => {
                        let blob = serde_json::to_value(&state)
                            .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
                        self.saver
                            .put(
                                thread_id,
                                parent_id.as_deref(),
                                blob,
                                CheckpointMetadata::new(
                                    step + 1,
                                    format!("{INTERRUPT_SOURCE_PREFIX}{current_node_name}"),
                                ),
                            )
                            .await?;
                        return Ok((
                            snapshots,
                            RunOutcome::Interrupted {
                                state,
                                node: current_node_name,
                                payload,
                            },
                        ));
                    }
                    NodeOutcome::Progress(partial) => {
                        if let Some(parent) = parent_id.as_deref() {
                            let writes = serde_json::to_value(&partial)
                                .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
                            self.saver
                                .put_writes(
                                    thread_id,
                                    parent,
                                    vec![PendingWrite {
                                        task_id: current_node_name.clone(),
                                        writes,
                                    }],
                                )
                                .await?;
                        }
                        partial
                    }
                }
            };

            let next_state = state.merge(partial);
            let blob = serde_json::to_value(&next_state)
                .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
            let cp = self
                .saver
                .put(
                    thread_id,
                    parent_id.as_deref(),
                    blob,
                    CheckpointMetadata::new(step + 1, current_node_name.clone()),
                )
                .await?;
            parent_id = Some(cp.id);
            snapshots.push(next_state.clone());

            match self.graph.next_after(&current_node_name, &next_state)? {
                None => return Ok((snapshots, RunOutcome::Finished(next_state))),
                Some(next) => {
                    current_node_name = next;
                    state = next_state;
                }
            }
        }

        Err(GraphError::RunawayLoop {
            cap: self.max_iterations,
        })
    }

    /// Convenience wrapper returning only the final outcome.
    pub async fn invoke(&self, thread_id: &str, input: Option<ThreadState>) -> Result<RunOutcome> {
        self.stream(thread_id, input, None).await.map(|(_, o)| o)
    }

    /// Re-enters a suspended thread with an external value.
    pub async fn resume(&self, thread_id: &str, resume_value: Value) -> Result<RunOutcome> {
        self.stream(thread_id, None, Some(resume_value))
            .await
            .map(|(_, o)| o)
    }

    async fn pending_write_for(
        &self,
        thread_id: &str,
        checkpoint_id: Option<&str>,
        task_id: &str,
    ) -> Result<Option<PartialThreadState>> {
        let Some(checkpoint_id) = checkpoint_id else {
            return Ok(None);
        };
        let tuple = self.saver.get_tuple(thread_id).await?;
        let Some(tuple) = tuple else {
            return Ok(None);
        };
        if tuple.checkpoint.id != checkpoint_id {
            return Ok(None);
        }
        for write in tuple.pending_writes {
            if write.task_id == task_id {
                let partial: PartialThreadState = serde_json::from_value(write.writes)
                    .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
                return Ok(Some(partial));
            }
        }
        Ok(None)
    }
}
