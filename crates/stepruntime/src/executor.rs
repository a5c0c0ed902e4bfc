use chrono::Utc;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Instant;

use stepcore::{
    GraphError, RegistryError, Run, RunObserver, RunStatus, StepResult, StepSeverity, StepStatus,
    ToolConfig, ToolDefinition, Transition, ValueMap, Workflow,
};

use crate::graph::{self, StepGraph};
use crate::invoker::ToolInvoker;
use crate::state::StateManager;
use crate::step::StepExecutor;

/// Executes workflows one step at a time in topological order
pub struct WorkflowExecutor {
    steps: StepExecutor,
}

impl WorkflowExecutor {
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self {
            steps: StepExecutor::new(invoker),
        }
    }

    /// Run `workflow` to completion.
    ///
    /// Only a structurally invalid workflow is an error, reported before any
    /// step starts. Step failures are recorded in the returned [`Run`]. A
    /// failed or skipped step skips every step downstream of it; the run
    /// fails only if a critical step failed.
    pub async fn execute(
        &self,
        workflow: &Workflow,
        user_inputs: ValueMap,
        tools: &HashMap<String, ToolDefinition>,
        tool_configs: &HashMap<String, ToolConfig>,
        run_id: Option<String>,
        observer: Option<&dyn RunObserver>,
    ) -> Result<Run, GraphError> {
        graph::validate(workflow)?;
        let order = graph::order(workflow);
        let graph = StepGraph::new(workflow);
        let start_time = Instant::now();

        let mut state = StateManager::new(user_inputs.clone());
        let mut run = Run::start(run_id, &workflow.id, &order, user_inputs);
        tracing::info!("Starting run {} of workflow {}", run.id, workflow.id);
        notify(observer, Transition::RunStarted, &run);

        let no_config = ToolConfig::new();
        let mut failed_steps: HashSet<&str> = HashSet::new();
        let mut critical_failure = false;

        for (idx, step_id) in order.iter().enumerate() {
            let Some(step) = workflow.find_step(step_id) else {
                continue;
            };

            if let Some(upstream) = graph.predecessors(step_id).into_iter().find(|p| failed_steps.contains(p)) {
                tracing::info!("Skipping step {}: upstream step {} did not succeed", step_id, upstream);
                let slot = &mut run.step_results[idx];
                slot.status = StepStatus::Skipped;
                slot.finished_at = Some(Utc::now());
                failed_steps.insert(&step.id);
                notify(
                    observer,
                    Transition::StepFinished {
                        step_id: step.id.clone(),
                        status: StepStatus::Skipped,
                    },
                    &run,
                );
                continue;
            }

            tracing::debug!("Running step {} with tool {}", step.id, step.tool_id);
            {
                let slot = &mut run.step_results[idx];
                slot.status = StepStatus::Running;
                slot.started_at = Some(Utc::now());
            }
            notify(
                observer,
                Transition::StepStarted {
                    step_id: step.id.clone(),
                },
                &run,
            );

            let result = match tools.get(&step.tool_id) {
                Some(tool) => {
                    let config = tool_configs.get(&step.tool_id).unwrap_or(&no_config);
                    self.steps.execute(step, tool, &mut state, config).await
                }
                None => {
                    let e = RegistryError::UnknownTool(step.tool_id.clone());
                    tracing::warn!("Step {} cannot run: {}", step.id, e);
                    StepResult::failed(&step.id, e.to_string())
                }
            };

            let slot = &mut run.step_results[idx];
            slot.status = result.status;
            slot.output_data = result.output_data;
            slot.error = result.error;
            slot.warnings = result.warnings;
            slot.finished_at = Some(Utc::now());
            let status = slot.status;

            if status == StepStatus::Failed {
                failed_steps.insert(&step.id);
                if step.severity == StepSeverity::Critical {
                    tracing::error!("Critical step {} failed", step.id);
                    critical_failure = true;
                }
            }
            notify(
                observer,
                Transition::StepFinished {
                    step_id: step.id.clone(),
                    status,
                },
                &run,
            );
        }

        run.status = if critical_failure {
            RunStatus::Failed
        } else {
            RunStatus::Success
        };
        run.finished_at = Some(Utc::now());
        tracing::info!(
            "Run {} finished with status {:?} in {}ms",
            run.id,
            run.status,
            start_time.elapsed().as_millis()
        );
        notify(observer, Transition::RunFinished { status: run.status }, &run);

        Ok(run)
    }
}

fn notify(observer: Option<&dyn RunObserver>, transition: Transition, run: &Run) {
    if let Some(observer) = observer {
        observer.on_transition(&transition, run);
    }
}
