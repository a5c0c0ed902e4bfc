use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use futures::FutureExt;

use stepcore::{Step, StepExecutionError, StepResult, ToolConfig, ToolDefinition, ValidationTarget};

use crate::checks::check;
use crate::invoker::ToolInvoker;
use crate::state::StateManager;

/// Runs one step: resolve, check inputs, call, store, check output.
///
/// Never fails. Every problem ends up in the returned [`StepResult`].
#[derive(Clone)]
pub struct StepExecutor {
    invoker: Arc<dyn ToolInvoker>,
}

impl StepExecutor {
    pub fn new(invoker: Arc<dyn ToolInvoker>) -> Self {
        Self { invoker }
    }

    pub async fn execute(
        &self,
        step: &Step,
        tool: &ToolDefinition,
        state: &mut StateManager,
        config: &ToolConfig,
    ) -> StepResult {
        let inputs = match state.resolve(&step.input_mapping) {
            Ok(inputs) => inputs,
            Err(e) => {
                tracing::warn!("Step {} input resolution failed: {}", step.id, e);
                return StepResult::failed(&step.id, e.to_string());
            }
        };

        let mut warnings = Vec::new();
        if step.has_validations_for(ValidationTarget::Input) {
            let report = check(&inputs, &step.validations, ValidationTarget::Input);
            warnings.extend(report.warnings);
            if !report.errors.is_empty() {
                let error = format!("Input validation failed: {}", report.errors.join("; "));
                tracing::warn!("Step {}: {}", step.id, error);
                return StepResult::failed(&step.id, error).with_warnings(warnings);
            }
        }

        let call = self.invoker.call(tool, inputs, config);
        let output = match AssertUnwindSafe(call).catch_unwind().await {
            Ok(Ok(output)) => output,
            Ok(Err(e)) => {
                tracing::warn!("Step {} tool {} failed: {}", step.id, tool.id, e);
                return StepResult::failed(&step.id, e.to_string()).with_warnings(warnings);
            }
            Err(payload) => {
                let e = StepExecutionError::Panicked(panic_message(payload.as_ref()));
                tracing::error!("Step {} tool {} panicked: {}", step.id, tool.id, e);
                return StepResult::failed(&step.id, e.to_string()).with_warnings(warnings);
            }
        };
        state.store_step_output(&step.id, output.clone());

        if step.has_validations_for(ValidationTarget::Output) {
            let report = check(&output, &step.validations, ValidationTarget::Output);
            warnings.extend(report.warnings);
            if !report.errors.is_empty() {
                let error = format!("Output validation failed: {}", report.errors.join("; "));
                tracing::warn!("Step {}: {}", step.id, error);
                return StepResult::failed(&step.id, error)
                    .with_output(output)
                    .with_warnings(warnings);
            }
        }

        if !warnings.is_empty() {
            tracing::debug!("Step {} succeeded with {} warnings", step.id, warnings.len());
        }
        StepResult::success(&step.id, output).with_warnings(warnings)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use serde_json::json;
    use stepcore::{StepStatus, StepValidation, Value, ValueMap};

    /// Echoes its inputs back under `echo`, or fails / panics on request.
    struct Echo;

    #[async_trait]
    impl ToolInvoker for Echo {
        async fn call(
            &self,
            tool: &ToolDefinition,
            inputs: ValueMap,
            _config: &ToolConfig,
        ) -> Result<ValueMap, StepExecutionError> {
            match tool.id.as_str() {
                "fail" => Err(StepExecutionError::Status {
                    status: 503,
                    body: "unavailable".into(),
                }),
                "panic" => panic!("tool blew up"),
                _ => {
                    let mut out = ValueMap::new();
                    out.insert("echo".into(), Value::Object(inputs));
                    Ok(out)
                }
            }
        }
    }

    fn executor() -> StepExecutor {
        StepExecutor::new(Arc::new(Echo))
    }

    fn state() -> StateManager {
        let mut inputs = ValueMap::new();
        inputs.insert("city".into(), json!("Berlin"));
        inputs.insert("blank".into(), json!(""));
        StateManager::new(inputs)
    }

    #[tokio::test]
    async fn success_stores_output() {
        let mut state = state();
        let step = Step::new("s", "echo").with_input("name", "$input.city");
        let result = executor()
            .execute(&step, &ToolDefinition::new("echo", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Success);
        assert_eq!(result.output_data["echo"]["name"], json!("Berlin"));
        assert!(state.step_output("s").is_some());
    }

    #[tokio::test]
    async fn resolution_error_fails_without_calling() {
        let mut state = state();
        let step = Step::new("s", "echo").with_input("name", "$input.country");
        let result = executor()
            .execute(&step, &ToolDefinition::new("echo", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("Missing user input: country"));
        assert!(state.step_output("s").is_none());
    }

    #[tokio::test]
    async fn input_validation_short_circuits() {
        let mut state = state();
        let step = Step::new("s", "echo")
            .with_input("q", "$input.blank")
            .with_input("name", "$input.city")
            .with_validation(StepValidation::new("q", "not_empty").on(ValidationTarget::Input))
            .with_validation(
                StepValidation::new("name", "min_length")
                    .with_value("10")
                    .on(ValidationTarget::Input)
                    .warning_only(),
            );
        let result = executor()
            .execute(&step, &ToolDefinition::new("echo", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("Input validation failed: 'q' is empty"));
        assert_eq!(result.warnings, vec!["'name' length 6 < 10"]);
        assert!(result.output_data.is_empty());
    }

    #[tokio::test]
    async fn output_validation_failure_keeps_output() {
        let mut state = state();
        let step = Step::new("s", "echo")
            .with_input("name", "$input.city")
            .with_validation(StepValidation::new("echo.missing", "not_null"))
            .with_validation(StepValidation::new("echo.name", "type").with_value("int"));
        let result = executor()
            .execute(&step, &ToolDefinition::new("echo", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(
            result.error.as_deref(),
            Some("Output validation failed: 'echo.missing' is null; 'echo.name' is str, expected int")
        );
        assert_eq!(result.output_data["echo"]["name"], json!("Berlin"));
    }

    #[tokio::test]
    async fn call_error_fails_the_step() {
        let mut state = state();
        let result = executor()
            .execute(&Step::new("s", "fail"), &ToolDefinition::new("fail", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("HTTP 503: unavailable"));
    }

    #[tokio::test]
    async fn panic_is_caught() {
        let mut state = state();
        let result = executor()
            .execute(&Step::new("s", "panic"), &ToolDefinition::new("panic", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Failed);
        assert_eq!(result.error.as_deref(), Some("Tool panicked: tool blew up"));
    }

    #[tokio::test]
    async fn output_warnings_do_not_fail() {
        let mut state = state();
        let step = Step::new("s", "echo")
            .with_validation(StepValidation::new("echo.extra", "not_null").warning_only());
        let result = executor()
            .execute(&step, &ToolDefinition::new("echo", "http://x"), &mut state, &ToolConfig::new())
            .await;

        assert_eq!(result.status, StepStatus::Success);
        assert_eq!(result.warnings, vec!["'echo.extra' is null"]);
    }
}
