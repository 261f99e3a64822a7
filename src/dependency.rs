//! Condition dependency graph
//!
//! Edge `a -> b` means field `b` has a condition reading field `a`, so a
//! change to `a` can change whether `b` is visible. Built once per schema.

use std::collections::{BTreeSet, HashMap, HashSet};

use petgraph::algo::kosaraju_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use crate::field::Field;

/// Precomputed map from a field to the fields whose visibility it drives
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    graph: DiGraph<String, ()>,
    index: HashMap<String, NodeIndex>,
}

impl DependencyGraph {
    /// Build the graph. Conditions on unknown fields add no edge.
    pub fn build(fields: &[Field]) -> Self {
        let mut graph = DiGraph::new();
        let mut index = HashMap::new();

        for field in fields {
            let node = graph.add_node(field.id.clone());
            index.entry(field.id.clone()).or_insert(node);
        }

        for field in fields {
            let Some(target) = field.depends_on() else {
                continue;
            };
            if let (Some(&from), Some(&to)) = (index.get(target), index.get(&field.id)) {
                graph.add_edge(from, to, ());
            }
        }

        Self { graph, index }
    }

    pub fn field_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Fields whose condition reads `field_id` directly, in field order
    pub fn dependents(&self, field_id: &str) -> Vec<&str> {
        let Some(&node) = self.index.get(field_id) else {
            return Vec::new();
        };
        let mut nodes: Vec<NodeIndex> = self.graph.neighbors_directed(node, Direction::Outgoing).collect();
        nodes.sort();
        nodes.dedup();
        nodes.into_iter().map(|n| self.graph[n].as_str()).collect()
    }

    /// Every field reachable from `field_id` through conditions.
    ///
    /// `field_id` itself is only included when it sits on a cycle.
    pub fn affected_by(&self, field_id: &str) -> BTreeSet<String> {
        let mut result = BTreeSet::new();
        let Some(&start) = self.index.get(field_id) else {
            return result;
        };

        let mut seen = HashSet::new();
        let mut stack: Vec<NodeIndex> = self.graph.neighbors_directed(start, Direction::Outgoing).collect();

        while let Some(node) = stack.pop() {
            if !seen.insert(node) {
                continue;
            }
            result.insert(self.graph[node].clone());
            stack.extend(self.graph.neighbors_directed(node, Direction::Outgoing));
        }

        result
    }

    /// Groups of fields whose conditions reference each other in a loop
    pub fn cycles(&self) -> Vec<Vec<String>> {
        let mut cycles: Vec<Vec<String>> = kosaraju_scc(&self.graph)
            .into_iter()
            .filter(|scc| scc.len() > 1 || self.graph.contains_edge(scc[0], scc[0]))
            .map(|mut scc| {
                scc.sort();
                scc.into_iter().map(|n| self.graph[n].clone()).collect()
            })
            .collect();
        cycles.sort();
        cycles
    }

    /// Export the graph in Graphviz DOT format
    pub fn to_dot(&self) -> String {
        let mut output = String::from("digraph FormConditions {\n  rankdir=LR;\n  node [shape=box];\n");

        for node in self.graph.node_indices() {
            output.push_str(&format!("  \"{}\";\n", self.graph[node]));
        }
        for edge in self.graph.edge_indices() {
            if let Some((from, to)) = self.graph.edge_endpoints(edge) {
                output.push_str(&format!("  \"{}\" -> \"{}\";\n", self.graph[from], self.graph[to]));
            }
        }

        output.push_str("}\n");
        output
    }
}
