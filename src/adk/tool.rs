// SPDX-License-Identifier: MIT

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;

/// Trait for tools that can be bound to a model and run by a `ToolNode`.
///
/// `name()`, `description()` and `schema()` return borrowed values;
/// implementations store them in struct fields or statics.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Returns the tool name (must be unique within a bound tool set)
    fn name(&self) -> &str;

    /// Returns a human-readable description of what the tool does
    fn description(&self) -> &str;

    /// Returns the JSON schema for the tool's input parameters
    fn schema(&self) -> &Value;

    /// Execute the tool with the given input and return the result
    async fn execute(&self, input: Value) -> Result<Value, Box<dyn Error + Send + Sync>>;

    /// Provider-neutral view of the tool, serialized into model requests
    fn definition(&self) -> ToolDefinition<'_> {
        ToolDefinition {
            name: self.name(),
            description: self.description(),
            parameters: self.schema(),
        }
    }
}

/// Borrowed tool description sent to a model
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition<'a> {
    pub name: &'a str,
    pub description: &'a str,
    pub parameters: &'a Value,
}
