//! Declarative workflow definition file (YAML/JSON) and its compilation into
//! a [`CompiledGraph`].

use crate::error::{GraphError, Result};
use crate::graph::{legacy_topology, CompiledGraph, Edge, GraphBuilder};
use crate::node::{EffectChannel, InterruptKind, Node};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// A single `{condition, target}` branch of a conditional `next`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionalTarget {
    pub condition: String,
    pub target: String,
}

/// `next` is either a single static target or a list of conditional
/// branches, matching the workflow definition's wire shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NextSpec {
    Static(String),
    Conditional(Vec<ConditionalTarget>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NodeType {
    Llm,
    Tool,
    Interrupt,
}

/// One entry of the `nodes` map in a workflow definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeSpec {
    #[serde(rename = "type")]
    pub node_type: NodeType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<serde_json::Value>,
    pub next: NextSpec,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_complete: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_response: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub on_timeout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SchedulerSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cron: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch_size: Option<u32>,
    #[serde(default)]
    pub filters: HashMap<String, serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphDefinitionSpec {
    pub entrypoint: String,
    pub nodes: HashMap<String, NodeSpec>,
}

/// The top-level workflow definition file, per the wire contract.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDefinition {
    pub id: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system_prompt: Option<String>,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default)]
    pub allowed_tools: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub graph_definition: Option<GraphDefinitionSpec>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheduler: Option<SchedulerSpec>,
    /// Retries around the `LLMUnavailable` transient branch of an analyze
    /// or process-response node's `InvokeLlm::invoke` call (spec.md §7).
    /// Defaults to `RetryPolicy::default()`'s attempt count when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_retries: Option<usize>,
    /// Initial backoff delay in milliseconds before the first retry;
    /// doubles (capped) on each subsequent attempt, per `RetryPolicy`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_delay_ms: Option<u64>,
}

fn default_model() -> String {
    "gpt-4o-class".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

impl WorkflowDefinition {
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        serde_yaml::from_str(raw).map_err(|e| GraphError::DefinitionParse(e.to_string()))
    }

    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path.as_ref())
            .map_err(|e| GraphError::DefinitionParse(e.to_string()))?;
        Self::from_yaml_str(&raw)
    }

    /// Compiles the declarative `graphDefinition`, or falls back to the
    /// fixed legacy topology when it is absent.
    pub fn compile(&self) -> Result<CompiledGraph> {
        match &self.graph_definition {
            None => legacy_topology(),
            Some(def) => {
                let mut builder = GraphBuilder::new().entrypoint(def.entrypoint.clone());
                for (name, spec) in &def.nodes {
                    let node = node_from_spec(name, spec)?;
                    let edge = edge_from_next(&spec.next);
                    builder = builder.add_node(name.clone(), node, edge);
                }
                builder.compile()
            }
        }
    }
}

fn node_from_spec(name: &str, spec: &NodeSpec) -> Result<Node> {
    match spec.node_type {
        NodeType::Llm => Ok(Node::Analyze),
        NodeType::Tool => match spec.tool.as_deref() {
            Some("sendEmail") => Ok(Node::SendEffect(EffectChannel::Email)),
            Some("sendCall") => Ok(Node::SendEffect(EffectChannel::Call)),
            Some("updateRecordStatus") => Ok(Node::Terminal),
            Some(other) => Err(GraphError::Validation(format!(
                "node {name:?} has unsupported tool {other:?}"
            ))),
            None => Err(GraphError::Validation(format!(
                "tool node {name:?} is missing a tool name"
            ))),
        },
        NodeType::Interrupt => {
            if name.eq_ignore_ascii_case("humanReview") {
                Ok(Node::WaitInterrupt(InterruptKind::HumanReview))
            } else {
                Ok(Node::WaitInterrupt(InterruptKind::WaitForResponse))
            }
        }
    }
}

fn edge_from_next(next: &NextSpec) -> Edge {
    match next {
        NextSpec::Static(target) => Edge::Static(target.clone()),
        NextSpec::Conditional(branches) => Edge::Conditional(
            branches
                .iter()
                .map(|b| (b.condition.clone(), b.target.clone()))
                .collect(),
        ),
    }
}

/// Convenience constructor for the [`crate::llm_trait::InvokeContext`] a
/// compiled workflow should be invoked with.
pub fn invoke_context(def: &WorkflowDefinition) -> crate::llm_trait::InvokeContext {
    let mut retry = crate::retry::RetryPolicy::default();
    if let Some(max_retries) = def.max_retries {
        retry.max_attempts = max_retries;
    }
    if let Some(base_delay_ms) = def.base_delay_ms {
        retry.initial_interval = std::time::Duration::from_millis(base_delay_ms);
    }

    crate::llm_trait::InvokeContext {
        model: def.model.clone(),
        temperature: def.temperature,
        system_prompt: def.system_prompt.clone(),
        allowed_tools: def.allowed_tools.clone(),
        retry,
    }
}
