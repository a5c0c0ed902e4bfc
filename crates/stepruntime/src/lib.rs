//! Workflow execution runtime
//!
//! This crate provides the engine that validates, orders and runs step
//! workflows: graph analysis, input resolution, declarative step checks,
//! the tool registry, persistence and the runtime facade that ties them
//! together. Calling the tools themselves is delegated to a [`ToolInvoker`].

mod checks;
mod executor;
pub mod graph;
mod invoker;
mod registry;
mod runtime;
mod state;
mod step;
mod store;

pub use checks::{check, ValidationReport};
pub use executor::WorkflowExecutor;
pub use graph::{infer_edges, order, validate, StepGraph};
pub use invoker::ToolInvoker;
pub use registry::ToolRegistry;
pub use runtime::{RuntimeConfig, StepRuntime};
pub use state::StateManager;
pub use step::StepExecutor;
pub use store::{MemoryStore, WorkflowStore};
