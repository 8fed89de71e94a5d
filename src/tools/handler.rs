// Tool handler trait and description overrides

use super::error::Result;
use super::types::{ErrorBody, ToolDefinition, ToolOutput};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tracing::debug;

/// Internal trait for tool implementations
#[async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the tool definition (name, description, input_schema)
    fn definition(&self) -> ToolDefinition;

    /// Run the tool with JSON input
    async fn run(&self, input: serde_json::Value) -> std::result::Result<ToolOutput, ErrorBody>;

    /// Get tool name
    fn name(&self) -> String {
        self.definition().name.clone()
    }
}

/// Deserialize tool arguments, mapping failures to an invalid_input error.
pub(crate) fn parse_input<T: DeserializeOwned>(
    tool: &str,
    input: serde_json::Value,
) -> std::result::Result<T, ErrorBody> {
    serde_json::from_value(input).map_err(|e| {
        ErrorBody::new(
            "invalid_input",
            format!("Invalid arguments for '{}': {}", tool, e),
        )
    })
}

/// Load tool description overrides from a TOML config file
pub fn load_tool_descriptions(
    path: &std::path::Path,
) -> Result<std::collections::HashMap<String, String>> {
    use std::collections::HashMap;

    if !path.exists() {
        debug!(path = %path.display(), "tools.toml not found, using default descriptions");
        return Ok(HashMap::new());
    }

    let content = std::fs::read_to_string(path)?;
    let config: toml::Value = toml::from_str(&content)?;

    let mut descriptions = HashMap::new();

    if let Some(table) = config.as_table() {
        for (key, value) in table {
            if let Some(desc) = value.get("description") {
                if let Some(s) = desc.as_str() {
                    descriptions.insert(key.clone(), s.to_string());
                }
            }
        }
    }

    debug!(path = %path.display(), tool_count = descriptions.len(), "loaded tool descriptions from config");
    Ok(descriptions)
}
