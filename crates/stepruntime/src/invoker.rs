use async_trait::async_trait;

use stepcore::{StepExecutionError, ToolConfig, ToolDefinition, ValueMap};

/// Calls an external tool with a step's resolved inputs.
///
/// `inputs` belongs to the invoker; it may consume entries as it places them
/// into the path, query string, headers or body.
#[async_trait]
pub trait ToolInvoker: Send + Sync {
    async fn call(
        &self,
        tool: &ToolDefinition,
        inputs: ValueMap,
        config: &ToolConfig,
    ) -> Result<ValueMap, StepExecutionError>;
}
