use thiserror::Error;

#[derive(Error, Debug)]
pub enum FlowError {
    #[error("Invalid workflow graph: {0}")]
    Graph(#[from] GraphError),

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Structural defects in a workflow. Fatal to a planning or execution attempt.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    #[error("Duplicate step id: {0}")]
    DuplicateStep(String),

    #[error("Edge references unknown step: {0}")]
    UnknownEdgeStep(String),

    #[error("Cycle detected in workflow: {}", path.join(" -> "))]
    Cycle { path: Vec<String> },

    #[error("Step {step} input_mapping references unknown step: {reference}")]
    UnknownReference { step: String, reference: String },

    #[error("Step {step} references step {reference} which is not a predecessor")]
    NotPredecessor { step: String, reference: String },
}

/// Failure to walk a dot-path into a value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("cannot index list with '{segment}'")]
    BadIndex { segment: String },

    #[error("missing field '{segment}'")]
    MissingField { segment: String },

    #[error("cannot traverse into {kind} at '{segment}'")]
    NotTraversable { segment: String, kind: &'static str },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StateResolutionError {
    #[error("Missing user input: {0}")]
    MissingUserInput(String),

    #[error("Missing output from step: {0}")]
    MissingStepOutput(String),

    #[error("Step {step_id}: {source}")]
    Path {
        step_id: String,
        #[source]
        source: PathError,
    },
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StepExecutionError {
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("HTTP request failed: {0}")]
    Request(String),

    #[error("HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Response extraction failed: field '{path}' not found")]
    Extraction { path: String },

    #[error("Tool panicked: {0}")]
    Panicked(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    #[error("Missing template key: {0}")]
    MissingKey(String),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Tool not found: {0}")]
    UnknownTool(String),
}

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Workflow '{0}' not found")]
    WorkflowNotFound(String),

    #[error("Run '{0}' not found")]
    RunNotFound(String),

    #[error("Store backend error: {0}")]
    Backend(String),
}
