//! Mermaid rendering of a compiled graph, for documenting a workflow
//! definition. Read-only: participates in no execution path.

use crate::graph::{CompiledGraph, Edge};

/// Render `graph` as a Mermaid flowchart (`graph TD`).
pub fn to_mermaid(graph: &CompiledGraph, edges: &[(String, Edge)]) -> String {
    let mut out = String::from("graph TD\n");
    out.push_str(&format!("    START([START]) --> {}\n", graph.entrypoint));

    for (name, edge) in edges {
        match edge {
            Edge::Static(target) => {
                out.push_str(&render_edge(name, target));
            }
            Edge::Conditional(branches) => {
                for (cond, target) in branches {
                    out.push_str(&format!(
                        "    {name} -->|{cond}| {}\n",
                        render_target(target)
                    ));
                }
            }
        }
    }

    out
}

fn render_edge(from: &str, to: &str) -> String {
    format!("    {from} --> {}\n", render_target(to))
}

fn render_target(name: &str) -> String {
    if name == crate::state::END {
        "END([END])".to_string()
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::legacy_topology;

    #[test]
    fn renders_legacy_topology_entrypoint() {
        let graph = legacy_topology().unwrap();
        let edges = vec![(
            "analyzeRecord".to_string(),
            Edge::Conditional(vec![("sendEmail".into(), "sendEmail".into())]),
        )];
        let mermaid = to_mermaid(&graph, &edges);
        assert!(mermaid.starts_with("graph TD"));
        assert!(mermaid.contains("START([START]) --> analyzeRecord"));
        assert!(mermaid.contains("analyzeRecord -->|sendEmail| sendEmail"));
    }
}
