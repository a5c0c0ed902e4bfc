use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

use stepcore::{Run, StoreError, Workflow};

/// Persistence for workflows and their runs.
///
/// Saves replace the whole record; implementations must make that atomic
/// with respect to concurrent writers.
#[async_trait]
pub trait WorkflowStore: Send + Sync {
    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), StoreError>;

    /// Fails with [`StoreError::WorkflowNotFound`] for an unknown id.
    async fn load_workflow(&self, workflow_id: &str) -> Result<Workflow, StoreError>;

    async fn list_workflows(&self) -> Result<Vec<Workflow>, StoreError>;

    async fn save_run(&self, run: &Run) -> Result<(), StoreError>;

    async fn load_run(&self, run_id: &str) -> Result<Run, StoreError>;

    /// Runs, optionally only those of one workflow.
    async fn list_runs(&self, workflow_id: Option<&str>) -> Result<Vec<Run>, StoreError>;
}

/// In-process store backed by locked maps
#[derive(Debug, Default)]
pub struct MemoryStore {
    workflows: RwLock<HashMap<String, Workflow>>,
    runs: RwLock<HashMap<String, Run>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowStore for MemoryStore {
    async fn save_workflow(&self, workflow: &Workflow) -> Result<(), StoreError> {
        let mut workflows = self.workflows.write().await;
        workflows.insert(workflow.id.clone(), workflow.clone());
        Ok(())
    }

    async fn load_workflow(&self, workflow_id: &str) -> Result<Workflow, StoreError> {
        let workflows = self.workflows.read().await;
        workflows
            .get(workflow_id)
            .cloned()
            .ok_or_else(|| StoreError::WorkflowNotFound(workflow_id.to_string()))
    }

    async fn list_workflows(&self) -> Result<Vec<Workflow>, StoreError> {
        let workflows = self.workflows.read().await;
        let mut all: Vec<_> = workflows.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(all)
    }

    async fn save_run(&self, run: &Run) -> Result<(), StoreError> {
        let mut runs = self.runs.write().await;
        runs.insert(run.id.clone(), run.clone());
        Ok(())
    }

    async fn load_run(&self, run_id: &str) -> Result<Run, StoreError> {
        let runs = self.runs.read().await;
        runs.get(run_id)
            .cloned()
            .ok_or_else(|| StoreError::RunNotFound(run_id.to_string()))
    }

    async fn list_runs(&self, workflow_id: Option<&str>) -> Result<Vec<Run>, StoreError> {
        let runs = self.runs.read().await;
        let mut matching: Vec<_> = runs
            .values()
            .filter(|r| workflow_id.map_or(true, |id| r.workflow_id == id))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.started_at.cmp(&b.started_at).then_with(|| a.id.cmp(&b.id)));
        Ok(matching)
    }
}
