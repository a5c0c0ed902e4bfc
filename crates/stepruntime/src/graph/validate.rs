use std::collections::{HashMap, HashSet};

use stepcore::{GraphError, Reference, Workflow};

use super::StepGraph;

/// Check that `workflow` is a well-formed DAG whose data references follow
/// its edges.
///
/// # Errors
/// - [`GraphError::DuplicateStep`] if two steps share an id.
/// - [`GraphError::UnknownEdgeStep`] if an edge names a missing step.
/// - [`GraphError::Cycle`] if the edges form a cycle.
/// - [`GraphError::UnknownReference`] / [`GraphError::NotPredecessor`] if an
///   input mapping reads from a step that is missing or not upstream.
pub fn validate(workflow: &Workflow) -> Result<(), GraphError> {
    check_unique_ids(workflow)?;
    check_edge_endpoints(workflow)?;

    let graph = StepGraph::new(workflow);
    check_acyclic(workflow, &graph)?;
    check_input_mappings(workflow, &graph)?;

    tracing::debug!(
        "Workflow {} is valid: {} steps, {} edges",
        workflow.id,
        workflow.steps.len(),
        workflow.edges.len()
    );
    Ok(())
}

fn check_unique_ids(workflow: &Workflow) -> Result<(), GraphError> {
    let mut seen = HashSet::new();
    for id in workflow.step_ids() {
        if !seen.insert(id) {
            return Err(GraphError::DuplicateStep(id.to_string()));
        }
    }
    Ok(())
}

fn check_edge_endpoints(workflow: &Workflow) -> Result<(), GraphError> {
    let ids: HashSet<&str> = workflow.step_ids().collect();
    for edge in &workflow.edges {
        for endpoint in [&edge.from_step_id, &edge.to_step_id] {
            if !ids.contains(endpoint.as_str()) {
                return Err(GraphError::UnknownEdgeStep(endpoint.clone()));
            }
        }
    }
    Ok(())
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

fn check_acyclic<'a>(workflow: &'a Workflow, graph: &StepGraph<'a>) -> Result<(), GraphError> {
    let mut color: HashMap<&str, Color> = workflow.step_ids().map(|id| (id, Color::White)).collect();
    let mut path = Vec::new();

    for id in workflow.step_ids() {
        if color.get(id) == Some(&Color::White) {
            visit(id, graph, &mut color, &mut path)?;
        }
    }
    Ok(())
}

fn visit<'a>(
    node: &'a str,
    graph: &StepGraph<'a>,
    color: &mut HashMap<&'a str, Color>,
    path: &mut Vec<&'a str>,
) -> Result<(), GraphError> {
    color.insert(node, Color::Gray);
    path.push(node);

    for next in graph.successors(node) {
        match color.get(next).copied().unwrap_or(Color::White) {
            Color::Gray => {
                let start = path.iter().position(|n| *n == next).unwrap_or(0);
                let mut cycle: Vec<String> = path[start..].iter().map(|n| n.to_string()).collect();
                cycle.push(next.to_string());
                return Err(GraphError::Cycle { path: cycle });
            }
            Color::White => visit(next, graph, color, path)?,
            Color::Black => {}
        }
    }

    path.pop();
    color.insert(node, Color::Black);
    Ok(())
}

fn check_input_mappings(workflow: &Workflow, graph: &StepGraph<'_>) -> Result<(), GraphError> {
    for step in &workflow.steps {
        let ancestors = graph.ancestors(&step.id);
        for expr in step.input_mapping.values() {
            let Some(reference) = Reference::parse(expr).step_id() else {
                continue;
            };
            if !graph.contains(reference) {
                return Err(GraphError::UnknownReference {
                    step: step.id.clone(),
                    reference: reference.to_string(),
                });
            }
            if !ancestors.contains(reference) {
                return Err(GraphError::NotPredecessor {
                    step: step.id.clone(),
                    reference: reference.to_string(),
                });
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepcore::Step;

    fn workflow(steps: Vec<Step>, edges: &[(&str, &str)]) -> Workflow {
        let mut wf = Workflow::new("wf", "test");
        for step in steps {
            wf.add_step(step);
        }
        for (from, to) in edges {
            wf.connect(*from, *to);
        }
        wf
    }

    fn steps(ids: &[&str]) -> Vec<Step> {
        ids.iter().map(|id| Step::new(*id, "tool")).collect()
    }

    #[test]
    fn single_node_is_valid() {
        assert_eq!(validate(&workflow(steps(&["solo"]), &[])), Ok(()));
    }

    #[test]
    fn linear_chain_with_references_is_valid() {
        let wf = workflow(
            vec![
                Step::new("a", "t"),
                Step::new("b", "t").with_input("x", "a.value"),
                Step::new("c", "t").with_input("y", "a.nested.0").with_input("z", "$input.city"),
            ],
            &[("a", "b"), ("b", "c")],
        );
        assert_eq!(validate(&wf), Ok(()));
    }

    #[test]
    fn diamond_is_valid() {
        let wf = workflow(
            steps(&["a", "b", "c", "d"]),
            &[("a", "b"), ("a", "c"), ("b", "d"), ("c", "d")],
        );
        assert_eq!(validate(&wf), Ok(()));
    }

    #[test]
    fn edge_to_unknown_step_is_rejected() {
        let wf = workflow(steps(&["a"]), &[("a", "ghost")]);
        assert_eq!(validate(&wf), Err(GraphError::UnknownEdgeStep("ghost".into())));
    }

    #[test]
    fn duplicate_step_is_rejected() {
        let wf = workflow(steps(&["a", "a"]), &[]);
        assert_eq!(validate(&wf), Err(GraphError::DuplicateStep("a".into())));
    }

    #[test]
    fn two_node_cycle_is_rejected() {
        let wf = workflow(steps(&["a", "b"]), &[("a", "b"), ("b", "a")]);
        assert_eq!(
            validate(&wf),
            Err(GraphError::Cycle {
                path: vec!["a".into(), "b".into(), "a".into()]
            })
        );
    }

    #[test]
    fn longer_cycle_is_rejected() {
        let wf = workflow(steps(&["a", "b", "c"]), &[("a", "b"), ("b", "c"), ("c", "a")]);
        assert!(matches!(validate(&wf), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn self_loop_is_a_cycle() {
        let wf = workflow(steps(&["a"]), &[("a", "a")]);
        assert!(matches!(validate(&wf), Err(GraphError::Cycle { .. })));
    }

    #[test]
    fn reference_to_sibling_is_rejected() {
        let wf = workflow(
            vec![
                Step::new("root", "t"),
                Step::new("left", "t"),
                Step::new("right", "t").with_input("x", "left.value"),
            ],
            &[("root", "left"), ("root", "right")],
        );
        assert_eq!(
            validate(&wf),
            Err(GraphError::NotPredecessor {
                step: "right".into(),
                reference: "left".into()
            })
        );
    }

    #[test]
    fn reference_to_unknown_step_is_rejected() {
        let wf = workflow(vec![Step::new("a", "t").with_input("x", "nowhere.value")], &[]);
        assert_eq!(
            validate(&wf),
            Err(GraphError::UnknownReference {
                step: "a".into(),
                reference: "nowhere".into()
            })
        );
    }

    #[test]
    fn transitive_predecessor_reference_is_valid() {
        let wf = workflow(
            vec![
                Step::new("a", "t"),
                Step::new("b", "t"),
                Step::new("c", "t").with_input("x", "a.deep.path"),
            ],
            &[("a", "b"), ("b", "c")],
        );
        assert_eq!(validate(&wf), Ok(()));
    }

    #[test]
    fn reference_to_descendant_is_rejected() {
        let wf = workflow(
            vec![Step::new("a", "t").with_input("x", "b.value"), Step::new("b", "t")],
            &[("a", "b")],
        );
        assert!(matches!(validate(&wf), Err(GraphError::NotPredecessor { .. })));
    }
}
