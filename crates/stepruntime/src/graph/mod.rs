//! Static analysis of workflow graphs: validation, edge inference and
//! execution ordering.

mod inference;
mod toposort;
mod validate;

pub use inference::infer_edges;
pub use toposort::order;
pub use validate::validate;

use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Dfs, Reversed};
use petgraph::Direction;
use std::collections::BTreeSet;

use stepcore::Workflow;

/// Dependency graph over a workflow's step ids.
///
/// Parallel edges collapse into one. Edges naming unknown steps add those
/// ids as nodes, so run [`validate`] before trusting the result.
#[derive(Debug, Clone)]
pub struct StepGraph<'a> {
    graph: DiGraphMap<&'a str, ()>,
}

impl<'a> StepGraph<'a> {
    pub fn new(workflow: &'a Workflow) -> Self {
        let mut graph = DiGraphMap::new();
        for step in &workflow.steps {
            graph.add_node(step.id.as_str());
        }
        for edge in &workflow.edges {
            graph.add_edge(edge.from_step_id.as_str(), edge.to_step_id.as_str(), ());
        }
        Self { graph }
    }

    pub fn contains(&self, step_id: &str) -> bool {
        self.node(step_id).is_some()
    }

    /// Direct predecessors, sorted.
    pub fn predecessors(&self, step_id: &str) -> BTreeSet<&'a str> {
        self.neighbors(step_id, Direction::Incoming)
    }

    /// Direct successors, sorted.
    pub fn successors(&self, step_id: &str) -> BTreeSet<&'a str> {
        self.neighbors(step_id, Direction::Outgoing)
    }

    /// Every step that reaches `step_id` through one or more edges.
    pub fn ancestors(&self, step_id: &str) -> BTreeSet<&'a str> {
        let Some(start) = self.node(step_id) else {
            return BTreeSet::new();
        };
        let reversed = Reversed(&self.graph);
        let mut dfs = Dfs::new(reversed, start);
        let mut found = BTreeSet::new();
        while let Some(node) = dfs.next(reversed) {
            if node != start {
                found.insert(node);
            }
        }
        found
    }

    pub(crate) fn in_degree(&self, step_id: &str) -> usize {
        self.node(step_id)
            .map(|n| self.graph.neighbors_directed(n, Direction::Incoming).count())
            .unwrap_or(0)
    }

    fn neighbors(&self, step_id: &str, dir: Direction) -> BTreeSet<&'a str> {
        match self.node(step_id) {
            Some(n) => self.graph.neighbors_directed(n, dir).collect(),
            None => BTreeSet::new(),
        }
    }

    // Maps a borrowed id back to the workflow-owned key.
    fn node(&self, step_id: &str) -> Option<&'a str> {
        self.graph.nodes().find(|n| *n == step_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepcore::Step;

    fn diamond() -> Workflow {
        let mut wf = Workflow::new("wf", "diamond");
        for id in ["a", "b", "c", "d"] {
            wf.add_step(Step::new(id, "tool"));
        }
        wf.connect("a", "b");
        wf.connect("a", "c");
        wf.connect("b", "d");
        wf.connect("c", "d");
        wf
    }

    #[test]
    fn predecessors_and_ancestors() {
        let wf = diamond();
        let graph = StepGraph::new(&wf);

        assert_eq!(graph.predecessors("d").into_iter().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(graph.ancestors("d").into_iter().collect::<Vec<_>>(), vec!["a", "b", "c"]);
        assert!(graph.ancestors("a").is_empty());
        assert_eq!(graph.successors("a").into_iter().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(graph.in_degree("d"), 2);
    }

    #[test]
    fn duplicate_edges_collapse() {
        let mut wf = diamond();
        wf.connect("a", "b");
        let graph = StepGraph::new(&wf);
        assert_eq!(graph.in_degree("b"), 1);
    }
}
