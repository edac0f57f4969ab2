//! Dependency graph for a scheduling run
//!
//! Built once from validated input and thrown away afterwards. Node `i`
//! is input task `i`; an edge `dep -> task` means `dep` must be ordered
//! before `task`. Repeated dependencies become parallel edges and
//! self-dependencies become self-loops, so both show up in in-degree
//! counts and cycle detection. Uses petgraph for graph operations.

use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use super::validate::ValidatedTasks;

/// Directed dependency graph over input indices
#[derive(Debug, Default)]
pub struct DependencyGraph {
    /// Node weight is the input index of the task
    graph: DiGraph<usize, ()>,
}

impl DependencyGraph {
    /// Builds the graph from validated tasks
    pub fn build(tasks: &ValidatedTasks<'_>) -> Self {
        let mut graph = DiGraph::with_capacity(tasks.len(), 0);

        // First pass: add all nodes, so node index == input index
        for index in 0..tasks.len() {
            graph.add_node(index);
        }

        // Second pass: add all edges (dependency -> dependent)
        for index in 0..tasks.len() {
            for &dep in tasks.dependencies(index) {
                graph.add_edge(NodeIndex::new(dep), NodeIndex::new(index), ());
            }
        }

        Self { graph }
    }

    /// Returns the number of tasks in the graph
    pub fn len(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns true if the graph is empty
    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    /// Returns the number of dependency edges, counting repeats
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Returns the in-degree of every task, indexed by input position
    pub fn in_degrees(&self) -> Vec<usize> {
        self.graph
            .node_indices()
            .map(|idx| {
                self.graph
                    .edges_directed(idx, Direction::Incoming)
                    .count()
            })
            .collect()
    }

    /// Returns the tasks that depend on `index`, once per edge
    pub fn dependents(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(index, Direction::Outgoing)
    }

    /// Returns the tasks that `index` depends on, once per edge
    pub fn dependencies(&self, index: usize) -> impl Iterator<Item = usize> + '_ {
        self.neighbors(index, Direction::Incoming)
    }

    fn neighbors(&self, index: usize, dir: Direction) -> impl Iterator<Item = usize> + '_ {
        let neighbors = (index < self.len())
            .then(|| self.graph.neighbors_directed(NodeIndex::new(index), dir));

        neighbors
            .into_iter()
            .flatten()
            .filter_map(|idx| self.graph.node_weight(idx).copied())
    }

    /// Finds one dependency cycle, if any
    ///
    /// Returns the members of the cycle containing the lowest input index,
    /// sorted by input index. A self-dependency is a cycle of one.
    pub fn find_cycle(&self) -> Option<Vec<usize>> {
        tarjan_scc(&self.graph)
            .into_iter()
            .filter(|component| match component.as_slice() {
                [single] => self.graph.contains_edge(*single, *single),
                _ => true,
            })
            .map(|component| {
                let mut members: Vec<usize> = component
                    .into_iter()
                    .filter_map(|idx| self.graph.node_weight(idx).copied())
                    .collect();
                members.sort_unstable();
                members
            })
            .min_by_key(|members| members.first().copied())
    }
}
