//! petgraph-based directed view of a validated branch graph.

use std::collections::HashMap;

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use serde::Serialize;

use crate::names::NameTable;
use crate::parse::{BranchGraphDefinition, EdgeProperties};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FlowLabel {
    /// Declared in `forceFlowTo` as well as `flowsTo`.
    pub forced: bool,
    /// Index into the definition's `edges`, when the flow has properties.
    pub edge: Option<usize>,
}

pub struct BranchGraph {
    pub graph: DiGraph<String, FlowLabel>,
    pub node_indices: HashMap<String, NodeIndex>,
    names: NameTable,
}

impl BranchGraph {
    /// One vertex per branch (canonical upper-cased name), one edge per
    /// resolved `flowsTo` target.
    pub fn build(definition: &BranchGraphDefinition) -> Self {
        let names = definition.names.clone();
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();

        for branch in &definition.branches {
            let id = branch.name.to_uppercase();
            let idx = graph.add_node(id.clone());
            node_indices.insert(id, idx);
        }

        let mut edge_lookup = HashMap::new();
        for (i, edge) in definition.edges.iter().flatten().enumerate() {
            if let (Some(from), Some(to)) = (names.resolve(&edge.from), names.resolve(&edge.to)) {
                edge_lookup.entry((from.to_string(), to.to_string())).or_insert(i);
            }
        }

        for branch in &definition.branches {
            let from = branch.name.to_uppercase();
            let Some(&source) = node_indices.get(&from) else {
                continue;
            };
            for target in branch.flows_to() {
                let Some(to) = names.resolve(target) else {
                    continue;
                };
                let Some(&dest) = node_indices.get(to) else {
                    continue;
                };
                if graph.find_edge(source, dest).is_some() {
                    continue;
                }
                let forced = branch
                    .force_flow_to()
                    .iter()
                    .any(|f| names.resolve(f) == Some(to));
                let edge = edge_lookup.get(&(from.clone(), to.to_string())).copied();
                graph.add_edge(source, dest, FlowLabel { forced, edge });
            }
        }

        BranchGraph {
            graph,
            node_indices,
            names,
        }
    }

    fn index_of(&self, name: &str) -> Option<NodeIndex> {
        let canonical = self.names.resolve(name)?;
        self.node_indices.get(canonical).copied()
    }

    /// Branches `name` flows to, by canonical name.
    pub fn successors(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.index_of(name) else {
            return vec![];
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names
    }

    /// Branches flowing into `name`, by canonical name.
    pub fn predecessors(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.index_of(name) else {
            return vec![];
        };
        let mut names: Vec<&str> = self
            .graph
            .neighbors_directed(idx, Direction::Incoming)
            .map(|n| self.graph[n].as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn force_flows_to(&self, name: &str) -> Vec<&str> {
        let Some(idx) = self.index_of(name) else {
            return vec![];
        };
        let mut names: Vec<&str> = self
            .graph
            .edges_directed(idx, Direction::Outgoing)
            .filter(|e| e.weight().forced)
            .map(|e| self.graph[e.target()].as_str())
            .collect();
        names.sort_unstable();
        names
    }

    pub fn flows_to(&self, from: &str, to: &str) -> bool {
        self.label(from, to).is_some()
    }

    pub fn label(&self, from: &str, to: &str) -> Option<&FlowLabel> {
        let (source, dest) = (self.index_of(from)?, self.index_of(to)?);
        let edge = self.graph.find_edge(source, dest)?;
        Some(&self.graph[edge])
    }

    /// The edge properties governing the `from -> to` flow, if declared.
    pub fn edge_properties<'a>(
        &self,
        definition: &'a BranchGraphDefinition,
        from: &str,
        to: &str,
    ) -> Option<&'a EdgeProperties> {
        let index = self.label(from, to)?.edge?;
        definition.edges.as_ref()?.get(index)
    }

    /// Groups of branches that flow into each other, each sorted by name.
    /// Round trips between branches are common and allowed; this is for
    /// reporting.
    pub fn flow_cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = tarjan_scc(&self.graph)
            .into_iter()
            .filter(|scc| {
                scc.len() > 1 || self.graph.find_edge(scc[0], scc[0]).is_some()
            })
            .map(|scc| {
                let mut names: Vec<String> = scc.iter().map(|&n| self.graph[n].clone()).collect();
                names.sort_unstable();
                names
            })
            .collect();
        cycles.sort();
        cycles
    }

    pub fn branch_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn flow_count(&self) -> usize {
        self.graph.edge_count()
    }
}
