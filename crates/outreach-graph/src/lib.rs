//! Declarative graph compiler and checkpointed runtime for outreach
//! workflows.
//!
//! Binds the five node kinds, the edge map, and the LLM/tool capability
//! traits together into a [`runtime::Runtime`] that streams a thread to
//! completion or its next interrupt, checkpointing after every step.

pub mod error;
pub mod graph;
pub mod llm_trait;
pub mod messages;
pub mod node;
pub mod retry;
pub mod runtime;
pub mod state;
pub mod tool_trait;
pub mod visualization;
pub mod workflow_def;

pub use error::{GraphError, Result};
pub use graph::{legacy_topology, CompiledGraph, Edge, GraphBuilder};
pub use llm_trait::{InvokeContext, InvokeLlm};
pub use messages::{Message, MessagePatch, Role};
pub use node::{EffectChannel, InterruptKind, Node, NextAction, NodeOutcome};
pub use runtime::{Runtime, RunOutcome, DEFAULT_MAX_ITERATIONS};
pub use state::{
    Channel, Contact, PartialThreadState, Priority, Record, RecordStatus, ThreadState,
    WorkflowStatus, END,
};
pub use tool_trait::{ToolExecutor, ToolResult};
pub use workflow_def::WorkflowDefinition;
