use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::ValueMap;

pub type RunId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    Running,
    Success,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Pending,
    Running,
    Success,
    Failed,
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, StepStatus::Success | StepStatus::Failed | StepStatus::Skipped)
    }
}

/// Outcome of one step within a run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepResult {
    pub step_id: String,
    pub status: StepStatus,
    #[serde(default)]
    pub output_data: ValueMap,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub warnings: Vec<String>,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl StepResult {
    pub fn pending(step_id: impl Into<String>) -> Self {
        Self {
            step_id: step_id.into(),
            status: StepStatus::Pending,
            output_data: ValueMap::new(),
            error: None,
            warnings: Vec::new(),
            started_at: None,
            finished_at: None,
        }
    }

    pub fn success(step_id: impl Into<String>, output: ValueMap) -> Self {
        Self {
            status: StepStatus::Success,
            output_data: output,
            ..Self::pending(step_id)
        }
    }

    pub fn failed(step_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            status: StepStatus::Failed,
            error: Some(error.into()),
            ..Self::pending(step_id)
        }
    }

    pub fn with_output(mut self, output: ValueMap) -> Self {
        self.output_data = output;
        self
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings = warnings;
        self
    }
}

/// One execution attempt of a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Run {
    pub id: RunId,
    pub workflow_id: String,
    pub status: RunStatus,
    /// One entry per step, in execution order.
    pub step_results: Vec<StepResult>,
    #[serde(default)]
    pub user_inputs: ValueMap,
    #[serde(default)]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub finished_at: Option<DateTime<Utc>>,
}

impl Run {
    /// A fresh RUNNING run with every step PENDING.
    pub fn start(
        id: Option<RunId>,
        workflow_id: impl Into<String>,
        order: &[String],
        user_inputs: ValueMap,
    ) -> Self {
        Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            workflow_id: workflow_id.into(),
            status: RunStatus::Running,
            step_results: order.iter().map(StepResult::pending).collect(),
            user_inputs,
            started_at: Some(Utc::now()),
            finished_at: None,
        }
    }

    pub fn result(&self, step_id: &str) -> Option<&StepResult> {
        self.step_results.iter().find(|r| r.step_id == step_id)
    }

    pub fn statuses(&self) -> Vec<StepStatus> {
        self.step_results.iter().map(|r| r.status).collect()
    }

    pub fn is_finished(&self) -> bool {
        self.status != RunStatus::Running
    }
}
