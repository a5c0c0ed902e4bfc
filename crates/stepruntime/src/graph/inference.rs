use std::collections::{BTreeSet, HashSet};

use stepcore::{Edge, Reference, Workflow};

/// The workflow's explicit edges followed by every edge implied by a
/// step-output reference in an input mapping and not already present.
///
/// Inferred edges come out sorted. `$input.` references, literals,
/// self-references and references to unknown steps imply nothing.
pub fn infer_edges(workflow: &Workflow) -> Vec<Edge> {
    let step_ids: HashSet<&str> = workflow.step_ids().collect();
    let mut seen: HashSet<(&str, &str)> = HashSet::new();
    let mut edges = Vec::with_capacity(workflow.edges.len());

    for edge in &workflow.edges {
        if seen.insert((edge.from_step_id.as_str(), edge.to_step_id.as_str())) {
            edges.push(edge.clone());
        }
    }

    let mut inferred = BTreeSet::new();
    for step in &workflow.steps {
        for expr in step.input_mapping.values() {
            let Some(source) = Reference::parse(expr).step_id() else {
                continue;
            };
            if source == step.id || !step_ids.contains(source) {
                continue;
            }
            if !seen.contains(&(source, step.id.as_str())) {
                inferred.insert((source, step.id.as_str()));
            }
        }
    }

    if !inferred.is_empty() {
        tracing::debug!(
            "Inferred {} edges for workflow {}",
            inferred.len(),
            workflow.id
        );
    }
    edges.extend(inferred.into_iter().map(|(from, to)| Edge::new(from, to)));
    edges
}

#[cfg(test)]
mod tests {
    use super::*;
    use stepcore::Step;

    #[test]
    fn infers_edges_from_step_references() {
        let mut wf = Workflow::new("wf", "weather");
        wf.add_step(Step::new("geocode", "geo").with_input("name", "$input.city"));
        wf.add_step(
            Step::new("forecast", "weather")
                .with_input("latitude", "geocode.results.0.latitude")
                .with_input("longitude", "geocode.results.0.longitude")
                .with_input("current", "temperature_2m"),
        );

        assert_eq!(infer_edges(&wf), vec![Edge::new("geocode", "forecast")]);
    }

    #[test]
    fn explicit_edges_come_first_and_are_not_duplicated() {
        let mut wf = Workflow::new("wf", "chain");
        wf.add_step(Step::new("a", "t"));
        wf.add_step(Step::new("b", "t").with_input("x", "a.out"));
        wf.add_step(Step::new("c", "t").with_input("x", "a.out").with_input("y", "b.out"));
        wf.connect("a", "b");

        assert_eq!(
            infer_edges(&wf),
            vec![Edge::new("a", "b"), Edge::new("a", "c"), Edge::new("b", "c")]
        );
    }

    #[test]
    fn ignores_inputs_literals_self_and_unknown_steps() {
        let mut wf = Workflow::new("wf", "noise");
        wf.add_step(
            Step::new("a", "t")
                .with_input("u", "$input.query")
                .with_input("l", "literal")
                .with_input("s", "a.previous")
                .with_input("g", "ghost.value"),
        );

        assert!(infer_edges(&wf).is_empty());
    }

    #[test]
    fn inference_is_idempotent() {
        let mut wf = Workflow::new("wf", "fan-in");
        wf.add_step(Step::new("left", "t"));
        wf.add_step(Step::new("right", "t"));
        wf.add_step(
            Step::new("join", "t")
                .with_input("l", "left.value")
                .with_input("r", "right.value"),
        );

        let once = infer_edges(&wf);
        wf.edges = once.clone();
        assert_eq!(infer_edges(&wf), once);
        assert_eq!(once.len(), 2);
    }
}
