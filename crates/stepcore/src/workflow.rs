use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type WorkflowId = String;
pub type StepId = String;

/// Complete workflow definition
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub id: WorkflowId,
    pub name: String,
    #[serde(default)]
    pub status: WorkflowStatus,
    pub steps: Vec<Step>,
    #[serde(default)]
    pub edges: Vec<Edge>,
}

impl Workflow {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            status: WorkflowStatus::default(),
            steps: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn add_step(&mut self, step: Step) -> StepId {
        let id = step.id.clone();
        self.steps.push(step);
        id
    }

    pub fn connect(&mut self, from: impl Into<String>, to: impl Into<String>) {
        self.edges.push(Edge::new(from, to));
    }

    pub fn find_step(&self, id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == id)
    }

    pub fn step_ids(&self) -> impl Iterator<Item = &str> {
        self.steps.iter().map(|s| s.id.as_str())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowStatus {
    #[default]
    Draft,
    Approved,
}

/// One tool invocation in a workflow
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    pub id: StepId,
    pub tool_id: String,
    /// Tool parameter name -> reference expression.
    #[serde(default)]
    pub input_mapping: BTreeMap<String, String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: StepSeverity,
    #[serde(default)]
    pub validations: Vec<StepValidation>,
}

impl Step {
    pub fn new(id: impl Into<String>, tool_id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            tool_id: tool_id.into(),
            input_mapping: BTreeMap::new(),
            description: String::new(),
            severity: StepSeverity::default(),
            validations: Vec::new(),
        }
    }

    pub fn with_input(mut self, param: impl Into<String>, reference: impl Into<String>) -> Self {
        self.input_mapping.insert(param.into(), reference.into());
        self
    }

    pub fn with_severity(mut self, severity: StepSeverity) -> Self {
        self.severity = severity;
        self
    }

    pub fn with_validation(mut self, validation: StepValidation) -> Self {
        self.validations.push(validation);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn has_validations_for(&self, target: ValidationTarget) -> bool {
        self.validations.iter().any(|v| v.target == target)
    }
}

/// Whether a step's failure fails the whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepSeverity {
    #[default]
    Critical,
    NonCritical,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationTarget {
    Input,
    #[default]
    Output,
}

/// Declarative check run against a step's resolved inputs or raw output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepValidation {
    /// Dot-path into the checked data.
    pub field: String,
    /// One of `not_null`, `not_empty`, `min_length`, `regex`, `type`.
    pub check: String,
    #[serde(default)]
    pub target: ValidationTarget,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default = "default_critical")]
    pub critical: bool,
}

fn default_critical() -> bool {
    true
}

impl StepValidation {
    pub fn new(field: impl Into<String>, check: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            check: check.into(),
            target: ValidationTarget::default(),
            value: None,
            message: None,
            critical: true,
        }
    }

    pub fn on(mut self, target: ValidationTarget) -> Self {
        self.target = target;
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn warning_only(mut self) -> Self {
        self.critical = false;
        self
    }
}

/// `to_step_id` must not run before `from_step_id` has finished.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    pub from_step_id: StepId,
    pub to_step_id: StepId,
}

impl Edge {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from_step_id: from.into(),
            to_step_id: to.into(),
        }
    }
}
