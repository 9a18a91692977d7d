// SPDX-License-Identifier: MIT

//! Prebuilt pieces for tool-calling agents
//!
//! - [`ToolNode`] runs every function call of the last message
//! - [`tools_condition`] routes to the tools node while the model asks for tools

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::join_all;
use serde_json::{json, Value};

use super::constants::END;
use super::node::Node;
use super::state::{GraphState, HasMessages};
use crate::adk::error::GraphError;
use crate::adk::model::{Content, FunctionCallRef};
use crate::adk::tool::Tool;

/// Conventional name of the tools node
pub const TOOLS_NODE: &str = "tools";

/// Route to [`TOOLS_NODE`] if the last message requests tool calls, else `END`
pub fn tools_condition<S: HasMessages>(state: &S) -> String {
    match state.last_message() {
        Some(message) if message.has_function_calls() => TOOLS_NODE.to_string(),
        _ => END.to_string(),
    }
}

/// Executes the function calls of the last message.
///
/// Calls run concurrently; the update holds one tool message per call, in
/// call order. Failures are reported back to the model as `{"error": ...}`
/// responses rather than aborting the graph.
pub struct ToolNode {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolNode {
    pub fn new(tools: Vec<Arc<dyn Tool>>) -> Self {
        let tools = tools
            .into_iter()
            .map(|t| (t.name().to_string(), t))
            .collect();
        Self { tools }
    }

    pub fn tool_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    async fn call(&self, call: FunctionCallRef<'_>) -> Content {
        let response = match self.tools.get(call.name) {
            Some(tool) => {
                log::info!("Tool call: {}", call.name);
                match tool.execute(call.args.clone()).await {
                    Ok(res) => res,
                    Err(e) => {
                        log::error!("Tool {} failed: {}", call.name, e);
                        json!({ "error": format!("Error: {}\n Please fix your mistakes.", e) })
                    }
                }
            }
            None => {
                log::error!("Tool {} not found", call.name);
                json!({
                    "error": format!(
                        "Error: {} is not a valid tool, try one of [{}].",
                        call.name,
                        self.tool_names().join(", ")
                    )
                })
            }
        };

        log::debug!("Tool {} response: {}", call.name, preview(&response));
        Content::tool_response(call.id.map(str::to_string), call.name, response)
    }
}

fn preview(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    if text.chars().count() > 200 {
        format!("{}...", text.chars().take(200).collect::<String>())
    } else {
        text
    }
}

#[async_trait]
impl<S> Node<S> for ToolNode
where
    S: GraphState<Update = Vec<Content>> + HasMessages,
{
    async fn run(&self, state: &S) -> Result<Vec<Content>, GraphError> {
        let message = state
            .last_message()
            .ok_or_else(|| GraphError::node(TOOLS_NODE, "no messages in state"))?;

        let calls = message.function_calls();
        if calls.is_empty() {
            return Err(GraphError::node(
                TOOLS_NODE,
                "last message carries no tool calls",
            ));
        }

        Ok(join_all(calls.into_iter().map(|call| self.call(call))).await)
    }
}
