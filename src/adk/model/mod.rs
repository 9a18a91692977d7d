// SPDX-License-Identifier: MIT

//! Model module - defines LLM model trait and implementations
//!
//! This module provides the core Model trait and the conversation types
//! shared by every provider. Implementations live in their own submodules:
//! - [anthropic] - Anthropic's Claude API
//! - [openai] - OpenAI-compatible chat completions (OpenAI, OpenRouter)

pub mod anthropic;
pub mod openai;

use crate::adk::tool::Tool;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::error::Error;
use std::sync::Arc;

pub const ROLE_SYSTEM: &str = "system";
pub const ROLE_USER: &str = "user";
pub const ROLE_MODEL: &str = "model";
pub const ROLE_TOOL: &str = "tool";

/// Configuration for model generation
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct GenerationConfig {
    pub temperature: Option<f32>,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Content {
    pub role: String,
    pub parts: Vec<Part>,
}

/// Parts of a message - text, thinking, function calls, etc.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Part {
    /// Regular text output from the model
    Text(String),
    /// Thinking/reasoning content from thinking models
    Thinking(String),
    /// Function/tool call requested by the model
    FunctionCall {
        /// Provider call id, echoed back in the matching response
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        args: Value,
    },
    /// Response from executing a function/tool
    FunctionResponse {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<String>,
        name: String,
        response: Value,
    },
}

/// Borrowed view of one function call inside a message
#[derive(Debug, Clone, Copy)]
pub struct FunctionCallRef<'a> {
    pub id: Option<&'a str>,
    pub name: &'a str,
    pub args: &'a Value,
}

impl Content {
    pub fn new(role: impl Into<String>, parts: Vec<Part>) -> Self {
        Self {
            role: role.into(),
            parts,
        }
    }

    pub fn system(text: impl Into<String>) -> Self {
        Self::new(ROLE_SYSTEM, vec![Part::Text(text.into())])
    }

    pub fn user(text: impl Into<String>) -> Self {
        Self::new(ROLE_USER, vec![Part::Text(text.into())])
    }

    pub fn model(text: impl Into<String>) -> Self {
        Self::new(ROLE_MODEL, vec![Part::Text(text.into())])
    }

    /// A tool message answering a single function call
    pub fn tool_response(id: Option<String>, name: impl Into<String>, response: Value) -> Self {
        Self::new(
            ROLE_TOOL,
            vec![Part::FunctionResponse {
                id,
                name: name.into(),
                response,
            }],
        )
    }

    /// Concatenated text parts
    pub fn text(&self) -> String {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::Text(t) => Some(t.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("")
    }

    pub fn function_calls(&self) -> Vec<FunctionCallRef<'_>> {
        self.parts
            .iter()
            .filter_map(|part| match part {
                Part::FunctionCall { id, name, args } => Some(FunctionCallRef {
                    id: id.as_deref(),
                    name: name.as_str(),
                    args,
                }),
                _ => None,
            })
            .collect()
    }

    pub fn has_function_calls(&self) -> bool {
        self.parts
            .iter()
            .any(|part| matches!(part, Part::FunctionCall { .. }))
    }

    /// Number of tool responses carried by this message
    pub fn function_response_count(&self) -> usize {
        self.parts
            .iter()
            .filter(|part| matches!(part, Part::FunctionResponse { .. }))
            .count()
    }
}

/// Core trait for LLM model implementations
#[async_trait]
pub trait Model: Send + Sync {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, Box<dyn Error + Send + Sync>>;
}

/// A model with a fixed tool set and generation config attached
#[derive(Clone)]
pub struct BoundModel {
    model: Arc<dyn Model>,
    tools: Vec<Arc<dyn Tool>>,
    config: Option<GenerationConfig>,
}

impl BoundModel {
    pub fn new(model: Arc<dyn Model>, tools: Vec<Arc<dyn Tool>>) -> Self {
        Self {
            model,
            tools,
            config: None,
        }
    }

    pub fn with_config(mut self, config: GenerationConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn tools(&self) -> &[Arc<dyn Tool>] {
        &self.tools
    }

    pub async fn invoke(
        &self,
        history: &[Content],
    ) -> Result<Content, Box<dyn Error + Send + Sync>> {
        let tools = if self.tools.is_empty() {
            None
        } else {
            Some(self.tools.as_slice())
        };
        self.model
            .generate_content(history, self.config.as_ref(), tools)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    #[test]
    fn test_content_text_joins_text_parts() {
        let content = Content::new(
            ROLE_MODEL,
            vec![
                Part::Thinking("hmm".to_string()),
                Part::Text("Hello, ".to_string()),
                Part::Text("world".to_string()),
            ],
        );
        assert_eq!(content.text(), "Hello, world");
    }

    #[test]
    fn test_function_calls_view() {
        let content = Content::new(
            ROLE_MODEL,
            vec![
                Part::Text("calling".to_string()),
                Part::FunctionCall {
                    id: Some("call_1".to_string()),
                    name: "summarize".to_string(),
                    args: json!({"input_text": "abc"}),
                },
            ],
        );
        assert!(content.has_function_calls());
        let calls = content.function_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].id, Some("call_1"));
        assert_eq!(calls[0].name, "summarize");
        assert_eq!(calls[0].args["input_text"], "abc");
    }

    #[test]
    fn test_tool_response_counts() {
        let content = Content::tool_response(Some("call_1".to_string()), "summarize", json!("ok"));
        assert_eq!(content.role, ROLE_TOOL);
        assert_eq!(content.function_response_count(), 1);
        assert!(!content.has_function_calls());
        assert_eq!(Content::user("hi").function_response_count(), 0);
    }

    struct RecordingModel {
        tool_counts: Mutex<Vec<Option<usize>>>,
        configs: Mutex<Vec<Option<GenerationConfig>>>,
    }

    #[async_trait]
    impl Model for RecordingModel {
        async fn generate_content(
            &self,
            _history: &[Content],
            config: Option<&GenerationConfig>,
            tools: Option<&[Arc<dyn Tool>]>,
        ) -> Result<Content, Box<dyn Error + Send + Sync>> {
            self.tool_counts.lock().unwrap().push(tools.map(|t| t.len()));
            self.configs.lock().unwrap().push(config.cloned());
            Ok(Content::model("ok"))
        }
    }

    #[tokio::test]
    async fn test_bound_model_passes_config_and_skips_empty_tools() {
        let model = Arc::new(RecordingModel {
            tool_counts: Mutex::new(vec![]),
            configs: Mutex::new(vec![]),
        });
        let bound = BoundModel::new(model.clone(), vec![]).with_config(GenerationConfig {
            temperature: Some(0.2),
        });

        let reply = bound.invoke(&[Content::user("hi")]).await.unwrap();
        assert_eq!(reply.text(), "ok");
        assert_eq!(model.tool_counts.lock().unwrap()[0], None);
        assert_eq!(
            model.configs.lock().unwrap()[0].as_ref().unwrap().temperature,
            Some(0.2)
        );
    }
}
