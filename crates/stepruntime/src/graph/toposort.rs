use std::collections::{BTreeSet, HashMap};

use stepcore::Workflow;

use super::StepGraph;

/// Execution order for a validated workflow.
///
/// Kahn's algorithm, always taking the smallest ready step id next, so the
/// same graph always yields the same order. Assumes the graph is acyclic;
/// steps caught in a cycle are left out.
pub fn order(workflow: &Workflow) -> Vec<String> {
    let graph = StepGraph::new(workflow);

    let mut in_degree: HashMap<&str, usize> = workflow
        .step_ids()
        .map(|id| (id, graph.in_degree(id)))
        .collect();

    let mut ready: BTreeSet<&str> = in_degree
        .iter()
        .filter(|(_, degree)| **degree == 0)
        .map(|(id, _)| *id)
        .collect();

    let mut sorted = Vec::with_capacity(workflow.steps.len());
    while let Some(next) = ready.pop_first() {
        sorted.push(next.to_string());
        for succ in graph.successors(next) {
            if let Some(degree) = in_degree.get_mut(succ) {
                *degree -= 1;
                if *degree == 0 {
                    ready.insert(succ);
                }
            }
        }
    }

    if sorted.len() < in_degree.len() {
        tracing::warn!(
            "Workflow {} has {} steps unreachable by topological sort",
            workflow.id,
            in_degree.len() - sorted.len()
        );
    }
    sorted
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepcore::Step;

    fn workflow(ids: &[&str], edges: &[(&str, &str)]) -> Workflow {
        let mut wf = Workflow::new("wf", "order");
        for id in ids {
            wf.add_step(Step::new(*id, "tool"));
        }
        for (from, to) in edges {
            wf.connect(*from, *to);
        }
        wf
    }

    #[test]
    fn linear_chain() {
        let wf = workflow(&["c", "b", "a"], &[("a", "b"), ("b", "c")]);
        assert_eq!(order(&wf), vec!["a", "b", "c"]);
    }

    #[test]
    fn parallel_roots_sort_by_id() {
        let wf = workflow(&["zeta", "alpha", "mid"], &[]);
        assert_eq!(order(&wf), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn diamond() {
        let wf = workflow(
            &["d", "c", "b", "a"],
            &[("a", "c"), ("a", "b"), ("c", "d"), ("b", "d")],
        );
        assert_eq!(order(&wf), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn newly_ready_steps_compete_with_existing_ones() {
        // z becomes ready after a, but b is smaller and goes first.
        let wf = workflow(&["a", "b", "c", "z"], &[("a", "z"), ("b", "c")]);
        assert_eq!(order(&wf), vec!["a", "b", "c", "z"]);
    }

    #[test]
    fn order_is_deterministic() {
        let wf = workflow(
            &["e", "d", "c", "b", "a"],
            &[("a", "d"), ("b", "d"), ("c", "e"), ("d", "e")],
        );
        let first = order(&wf);
        for _ in 0..10 {
            assert_eq!(order(&wf), first);
        }
        assert_eq!(first, vec!["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn every_step_follows_its_predecessors() {
        let wf = workflow(
            &["fetch", "parse", "enrich", "store", "notify"],
            &[
                ("fetch", "parse"),
                ("parse", "enrich"),
                ("parse", "store"),
                ("enrich", "store"),
                ("store", "notify"),
            ],
        );
        let sorted = order(&wf);
        let position = |id: &str| sorted.iter().position(|s| s == id).unwrap();
        for edge in &wf.edges {
            assert!(position(&edge.from_step_id) < position(&edge.to_step_id));
        }
        assert_eq!(sorted.len(), 5);
    }
}
