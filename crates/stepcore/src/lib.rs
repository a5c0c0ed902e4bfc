//! Core abstractions for the step engine
//!
//! This crate provides the workflow and run data model, the error taxonomy,
//! dot-path traversal over dynamic values, the reference-expression parser,
//! the request template renderer, and run transition events. It performs no
//! I/O of its own.

mod error;
pub mod events;
mod reference;
mod run;
pub mod template;
mod tool;
pub mod value;
mod workflow;

pub use error::{
    FlowError, GraphError, PathError, RegistryError, StateResolutionError,
    StepExecutionError, StoreError, TemplateError,
};
pub use events::{EventBus, RunEvent, RunObserver, Transition};
pub use reference::Reference;
pub use run::{Run, RunStatus, StepResult, StepStatus};
pub use template::{extract_template_keys, render_template};
pub use tool::{
    AuthConfig, AuthType, RequestConfig, ResponseExtractConfig, ToolConfig, ToolDefinition,
    FORM_URLENCODED,
};
pub use value::{Value, ValueMap};
pub use workflow::{
    Edge, Step, StepSeverity, StepValidation, ValidationTarget, Workflow, WorkflowStatus,
};

/// Result type for flow operations
pub type Result<T> = std::result::Result<T, FlowError>;
