//! Dead reference cycles: declarations that only keep each other alive.
//!
//! A uses B, B uses A, and nothing reachable uses either. Reference counting
//! would keep both; the marker correctly drops both. Reporting the cycle as a
//! unit tells the reader why neither looks unused on its own.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::graph::{DeclarationId, Project, UsageKind};

/// One strongly connected component of dead declarations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeadCycle {
    /// Members in declaration order
    pub members: Vec<DeclarationId>,
    /// Human-readable names, `<statement>` for anonymous ones
    pub names: Vec<String>,
}

impl DeadCycle {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

/// Find cycles among declarations for which `is_dead` holds.
///
/// Edges are usages between two dead declarations; grep usages count only
/// with `include_grep`. A single declaration forms a cycle only when it
/// references itself. Largest cycles first.
pub fn find_dead_cycles(
    project: &Project,
    is_dead: impl Fn(DeclarationId) -> bool,
    include_grep: bool,
) -> Vec<DeadCycle> {
    let mut graph: DiGraph<DeclarationId, ()> = DiGraph::new();
    let mut index: HashMap<DeclarationId, NodeIndex> = HashMap::new();

    for (id, _) in project.declarations() {
        if is_dead(id) {
            index.insert(id, graph.add_node(id));
        }
    }

    for (_, usage) in project.usages() {
        if usage.kind() == UsageKind::Grep && !include_grep {
            continue;
        }
        let Some(from) = usage.containing_declaration() else {
            continue;
        };
        if let (Some(&a), Some(&b)) = (index.get(&from), index.get(&usage.target())) {
            graph.update_edge(a, b, ());
        }
    }

    let mut cycles: Vec<DeadCycle> = tarjan_scc(&graph)
        .into_iter()
        .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
        .map(|scc| {
            let mut members: Vec<DeclarationId> = scc.iter().map(|&n| graph[n]).collect();
            members.sort();
            let names = members
                .iter()
                .map(|&d| project.declaration(d).name().unwrap_or("<statement>").to_string())
                .collect();
            DeadCycle { members, names }
        })
        .collect();

    cycles.sort_by(|a, b| b.size().cmp(&a.size()).then_with(|| a.members.cmp(&b.members)));
    debug!(count = cycles.len(), "dead reference cycles found");
    cycles
}
