//! Graph compiler: binds node names to implementations and wires edges.
//!
//! Accepts either a declarative node/edge map or falls back to the fixed
//! legacy topology when a workflow definition omits `graphDefinition`.

use crate::error::{GraphError, Result};
use crate::node::{EffectChannel, InterruptKind, Node};
use crate::state::{ThreadState, END};
use std::collections::HashMap;

/// A single declarative edge target: either always taken, or selected by
/// reading `state.next_node` against a set of conditions.
#[derive(Debug, Clone)]
pub enum Edge {
    Static(String),
    Conditional(Vec<(String, String)>),
}

impl Edge {
    /// Resolve this edge given the state produced by the node that just ran.
    /// Conditional edges match on `state.next_node`; the literal `"__end__"`
    /// is never rewritten here — it is recognized as the terminal sentinel
    /// by the runtime loop.
    fn resolve(&self, state: &ThreadState) -> Result<String> {
        match self {
            Edge::Static(target) => Ok(target.clone()),
            Edge::Conditional(branches) => {
                let observed = state.next_node.as_deref().unwrap_or("");
                branches
                    .iter()
                    .find(|(cond, _)| cond == observed)
                    .map(|(_, target)| target.clone())
                    .ok_or_else(|| {
                        GraphError::Validation(format!(
                            "no conditional branch matches next_node = {observed:?}"
                        ))
                    })
            }
        }
    }
}

/// A compiled graph: entrypoint, node implementations, and the edge map.
pub struct CompiledGraph {
    pub entrypoint: String,
    nodes: HashMap<String, Node>,
    edges: HashMap<String, Edge>,
}

impl CompiledGraph {
    pub fn node(&self, name: &str) -> Result<&Node> {
        self.nodes
            .get(name)
            .ok_or_else(|| GraphError::UnknownNode(name.to_string()))
    }

    /// Resolve the node that should run after `current`, given the state the
    /// just-run node produced. Returns `None` when the edge resolves to the
    /// terminal sentinel.
    pub fn next_after(&self, current: &str, state: &ThreadState) -> Result<Option<String>> {
        let edge = self
            .edges
            .get(current)
            .ok_or_else(|| GraphError::UnknownNode(current.to_string()))?;
        let target = edge.resolve(state)?;
        if target == END {
            Ok(None)
        } else {
            Ok(Some(target))
        }
    }
}

/// Builder for a declarative graph. Mirrors the shape of a workflow
/// definition's `graphDefinition` block: an entrypoint plus a node map where
/// each node names its implementation and its outgoing edge(s).
#[derive(Default)]
pub struct GraphBuilder {
    entrypoint: Option<String>,
    nodes: HashMap<String, Node>,
    edges: HashMap<String, Edge>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entrypoint(mut self, name: impl Into<String>) -> Self {
        self.entrypoint = Some(name.into());
        self
    }

    pub fn add_node(mut self, name: impl Into<String>, node: Node, edge: Edge) -> Self {
        let name = name.into();
        self.nodes.insert(name.clone(), node);
        self.edges.insert(name, edge);
        self
    }

    pub fn compile(self) -> Result<CompiledGraph> {
        let entrypoint = self
            .entrypoint
            .ok_or_else(|| GraphError::Validation("graph has no entrypoint".to_string()))?;

        if !self.nodes.contains_key(&entrypoint) {
            return Err(GraphError::Validation(format!(
                "entrypoint {entrypoint:?} is not a registered node"
            )));
        }

        for (name, edge) in &self.edges {
            let targets: Vec<&str> = match edge {
                Edge::Static(t) => vec![t.as_str()],
                Edge::Conditional(branches) => branches.iter().map(|(_, t)| t.as_str()).collect(),
            };
            for target in targets {
                if target != END && !self.nodes.contains_key(target) {
                    return Err(GraphError::Validation(format!(
                        "node {name:?} has an edge to unregistered node {target:?}"
                    )));
                }
            }
        }

        Ok(CompiledGraph {
            entrypoint,
            nodes: self.nodes,
            edges: self.edges,
        })
    }
}

/// The fixed topology used when a workflow definition omits
/// `graphDefinition`:
///
/// ```text
/// START → analyzeRecord
/// analyzeRecord --cond(state.nextNode)--> {sendEmail|sendCall|humanReview|markComplete}
/// sendEmail → waitForResponse
/// sendCall → waitForResponse
/// waitForResponse --cond(state.nextNode)--> processResponse | END
/// processResponse → analyzeRecord
/// humanReview --cond(state.nextNode)--> analyzeRecord | END
/// markComplete --cond(state.nextNode)--> END
/// ```
pub fn legacy_topology() -> Result<CompiledGraph> {
    GraphBuilder::new()
        .entrypoint("analyzeRecord")
        .add_node(
            "analyzeRecord",
            Node::Analyze,
            Edge::Conditional(vec![
                ("sendEmail".into(), "sendEmail".into()),
                ("sendCall".into(), "sendCall".into()),
                ("humanReview".into(), "humanReview".into()),
                ("markComplete".into(), "markComplete".into()),
            ]),
        )
        .add_node(
            "sendEmail",
            Node::SendEffect(EffectChannel::Email),
            Edge::Static("waitForResponse".into()),
        )
        .add_node(
            "sendCall",
            Node::SendEffect(EffectChannel::Call),
            Edge::Static("waitForResponse".into()),
        )
        .add_node(
            "waitForResponse",
            Node::WaitInterrupt(InterruptKind::WaitForResponse),
            Edge::Conditional(vec![
                ("processResponse".into(), "processResponse".into()),
                (END.into(), END.into()),
            ]),
        )
        .add_node(
            "processResponse",
            Node::ProcessResponse,
            Edge::Static("analyzeRecord".into()),
        )
        .add_node(
            "humanReview",
            Node::WaitInterrupt(InterruptKind::HumanReview),
            // `humanReview` always sets next_node to "analyzeRecord"; the
            // conditional form is kept for symmetry with the other wait
            // node rather than collapsed to a static edge (see open
            // question on markComplete below).
            Edge::Conditional(vec![
                ("analyzeRecord".into(), "analyzeRecord".into()),
                (END.into(), END.into()),
            ]),
        )
        .add_node(
            "markComplete",
            Node::Terminal,
            // markComplete always sets next_node = "__end__", so this
            // conditional is effectively constant; preserved in conditional
            // form for symmetry with the rest of the topology.
            Edge::Conditional(vec![(END.into(), END.into())]),
        )
        .compile()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_topology_compiles() {
        let graph = legacy_topology().unwrap();
        assert_eq!(graph.entrypoint, "analyzeRecord");
        assert!(graph.node("sendEmail").is_ok());
        assert!(graph.node("nope").is_err());
    }

    #[test]
    fn unknown_edge_target_fails_compilation() {
        let result = GraphBuilder::new()
            .entrypoint("a")
            .add_node("a", Node::Terminal, Edge::Static("ghost".into()))
            .compile();
        assert!(result.is_err());
    }
}
