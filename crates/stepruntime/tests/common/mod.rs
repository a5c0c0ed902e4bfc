// Shared helpers for stepruntime integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

use stepcore::{StepExecutionError, ToolConfig, ToolDefinition, ValueMap};
use stepruntime::ToolInvoker;

pub fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let _ = fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
        .with_test_writer()
        .try_init();
}

pub fn map(value: Value) -> ValueMap {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

/// What a scripted tool does when called
#[derive(Clone)]
pub enum Reply {
    Output(ValueMap),
    /// Echo the received inputs back as the output.
    Echo,
    Fail(StepExecutionError),
}

/// A `ToolInvoker` that answers per tool id and records every call.
#[derive(Default)]
pub struct ScriptedInvoker {
    replies: HashMap<String, Reply>,
    calls: Mutex<Vec<(String, ValueMap, ToolConfig)>>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reply(mut self, tool_id: &str, reply: Reply) -> Self {
        self.replies.insert(tool_id.to_string(), reply);
        self
    }

    pub fn output(self, tool_id: &str, output: Value) -> Self {
        self.reply(tool_id, Reply::Output(map(output)))
    }

    pub fn fail(self, tool_id: &str) -> Self {
        self.reply(
            tool_id,
            Reply::Fail(StepExecutionError::Status {
                status: 500,
                body: format!("{tool_id} is down"),
            }),
        )
    }

    /// Tool ids in call order
    pub fn called(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(id, _, _)| id.clone()).collect()
    }

    pub fn inputs_for(&self, tool_id: &str) -> Option<ValueMap> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _, _)| id == tool_id)
            .map(|(_, inputs, _)| inputs.clone())
    }

    pub fn config_for(&self, tool_id: &str) -> Option<ToolConfig> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .find(|(id, _, _)| id == tool_id)
            .map(|(_, _, config)| config.clone())
    }
}

#[async_trait]
impl ToolInvoker for ScriptedInvoker {
    async fn call(
        &self,
        tool: &ToolDefinition,
        inputs: ValueMap,
        config: &ToolConfig,
    ) -> Result<ValueMap, StepExecutionError> {
        self.calls
            .lock()
            .unwrap()
            .push((tool.id.clone(), inputs.clone(), config.clone()));

        match self.replies.get(&tool.id).cloned().unwrap_or(Reply::Echo) {
            Reply::Output(output) => Ok(output),
            Reply::Echo => Ok(inputs),
            Reply::Fail(e) => Err(e),
        }
    }
}

/// Tool definitions for every id, all pointing nowhere
pub fn tools(ids: &[&str]) -> HashMap<String, ToolDefinition> {
    ids.iter()
        .map(|id| (id.to_string(), ToolDefinition::new(*id, "http://tools.invalid")))
        .collect()
}
