use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

use stepcore::{EventBus, FlowError, Run, RunEvent, ValueMap, Workflow};

use crate::graph;
use crate::invoker::ToolInvoker;
use crate::registry::ToolRegistry;
use crate::store::{MemoryStore, WorkflowStore};
use crate::WorkflowExecutor;

/// Main runtime for registering and executing workflows
pub struct StepRuntime {
    config: RuntimeConfig,
    registry: Arc<ToolRegistry>,
    executor: Arc<WorkflowExecutor>,
    event_bus: Arc<EventBus>,
    store: Arc<dyn WorkflowStore>,
}

impl StepRuntime {
    /// Create a runtime with default settings and an in-memory store
    pub fn new(invoker: Arc<dyn ToolInvoker>, registry: ToolRegistry) -> Self {
        Self::with_config(invoker, registry, RuntimeConfig::default())
    }

    pub fn with_config(
        invoker: Arc<dyn ToolInvoker>,
        registry: ToolRegistry,
        config: RuntimeConfig,
    ) -> Self {
        Self::with_store(invoker, registry, Arc::new(MemoryStore::new()), config)
    }

    /// Create a runtime backed by a caller-supplied store
    pub fn with_store(
        invoker: Arc<dyn ToolInvoker>,
        registry: ToolRegistry,
        store: Arc<dyn WorkflowStore>,
        config: RuntimeConfig,
    ) -> Self {
        let executor = Arc::new(WorkflowExecutor::new(invoker));
        let event_bus = Arc::new(EventBus::new(config.event_buffer_size));

        Self {
            config,
            registry: Arc::new(registry),
            executor,
            event_bus,
            store,
        }
    }

    pub fn registry(&self) -> &Arc<ToolRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &Arc<dyn WorkflowStore> {
        &self.store
    }

    /// Complete the edge set (if configured), validate and save a workflow.
    ///
    /// Returns the workflow as stored.
    pub async fn register_workflow(&self, mut workflow: Workflow) -> Result<Workflow, FlowError> {
        if self.config.infer_edges {
            workflow.edges = graph::infer_edges(&workflow);
        }
        graph::validate(&workflow)?;
        self.store.save_workflow(&workflow).await?;
        tracing::info!("Registered workflow {} ({} steps)", workflow.id, workflow.steps.len());
        Ok(workflow)
    }

    /// Execute a stored workflow and save the finished run
    pub async fn execute_workflow(
        &self,
        workflow_id: &str,
        inputs: ValueMap,
    ) -> Result<Run, FlowError> {
        let workflow = self.store.load_workflow(workflow_id).await?;
        let run = self.execute(&workflow, inputs).await?;
        self.store.save_run(&run).await?;
        Ok(run)
    }

    /// Execute a workflow directly (without registration)
    pub async fn execute(&self, workflow: &Workflow, inputs: ValueMap) -> Result<Run, FlowError> {
        let run = self
            .executor
            .execute(
                workflow,
                inputs,
                self.registry.tool_map(),
                self.registry.tool_configs(),
                None,
                Some(self.event_bus.as_ref()),
            )
            .await?;
        Ok(run)
    }

    /// Subscribe to run events
    pub fn subscribe_events(&self) -> broadcast::Receiver<RunEvent> {
        self.event_bus.subscribe()
    }

    /// Get the event bus for direct access
    pub fn event_bus(&self) -> &Arc<EventBus> {
        &self.event_bus
    }
}

/// Configuration for the runtime
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    pub event_buffer_size: usize,
    /// Add edges implied by input mappings when registering a workflow.
    pub infer_edges: bool,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            event_buffer_size: 1000,
            infer_edges: true,
        }
    }
}
