use std::collections::HashMap;

use stepcore::{RegistryError, ToolConfig, ToolDefinition};

/// Registry of callable tools and their per-tool credentials
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, ToolDefinition>,
    configs: HashMap<String, ToolConfig>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a tool, replacing any tool with the same id
    pub fn register(&mut self, tool: ToolDefinition) {
        tracing::info!("Registering tool: {}", tool.id);
        self.tools.insert(tool.id.clone(), tool);
    }

    /// Attach credentials/settings to a tool id
    pub fn register_config(&mut self, tool_id: impl Into<String>, config: ToolConfig) {
        self.configs.insert(tool_id.into(), config);
    }

    pub fn get_tool(&self, tool_id: &str) -> Result<&ToolDefinition, RegistryError> {
        self.tools
            .get(tool_id)
            .ok_or_else(|| RegistryError::UnknownTool(tool_id.to_string()))
    }

    pub fn get_config(&self, tool_id: &str) -> Option<&ToolConfig> {
        self.configs.get(tool_id)
    }

    /// All tools, sorted by id
    pub fn list_tools(&self) -> Vec<&ToolDefinition> {
        let mut tools: Vec<_> = self.tools.values().collect();
        tools.sort_by(|a, b| a.id.cmp(&b.id));
        tools
    }

    pub fn tool_map(&self) -> &HashMap<String, ToolDefinition> {
        &self.tools
    }

    pub fn tool_configs(&self) -> &HashMap<String, ToolConfig> {
        &self.configs
    }

    /// One line per tool, suitable for a planning prompt or a CLI listing.
    pub fn describe(&self) -> String {
        self.list_tools()
            .iter()
            .map(|t| format!("- {}: {} — {}", t.id, t.name, t.description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}
