// SPDX-License-Identifier: MIT

//! Anthropic Model - Claude messages API implementation

use super::{Content, GenerationConfig, Model, Part, ROLE_MODEL, ROLE_SYSTEM};
use crate::adk::error::{FabricAgentError, ModelError};
use crate::adk::tool::Tool;
use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};
use std::env;
use std::error::Error;
use std::sync::Arc;

const ANTHROPIC_VERSION: &str = "2023-06-01";
const DEFAULT_MAX_TOKENS: u32 = 4096;

/// Anthropic Claude model implementation
pub struct AnthropicModel {
    client: Client,
    api_key: String,
    model_name: String,
    base_url: String,
}

impl AnthropicModel {
    /// Create a new AnthropicModel
    ///
    /// Requires `ANTHROPIC_API_KEY` environment variable to be set.
    /// Optionally uses `ANTHROPIC_BASE_URL` for custom endpoints.
    pub fn new(model_name: String) -> Result<Self, FabricAgentError> {
        let api_key = env::var("ANTHROPIC_API_KEY")
            .map_err(|_| ModelError::ApiKeyMissing("Anthropic (ANTHROPIC_API_KEY)".to_string()))?;
        let base_url = env::var("ANTHROPIC_BASE_URL")
            .unwrap_or_else(|_| "https://api.anthropic.com/v1".to_string());

        Ok(Self {
            client: Client::new(),
            api_key,
            model_name,
            base_url,
        })
    }

    /// Join all system messages; Anthropic takes them as a top-level field
    fn extract_system_message(history: &[Content]) -> Option<String> {
        let system: Vec<String> = history
            .iter()
            .filter(|c| c.role == ROLE_SYSTEM)
            .map(Content::text)
            .filter(|t| !t.is_empty())
            .collect();

        if system.is_empty() {
            None
        } else {
            Some(system.join("\n\n"))
        }
    }

    /// Convert internal Content to Anthropic message format
    fn content_to_anthropic_message(content: &Content) -> Option<Value> {
        if content.role == ROLE_SYSTEM {
            return None;
        }

        // Tool results travel in user turns
        let role = match content.role.as_str() {
            "model" => "assistant",
            _ => "user",
        };

        let mut message_content = Vec::new();

        for part in &content.parts {
            match part {
                Part::Text(t) => {
                    if !t.is_empty() {
                        message_content.push(json!({
                            "type": "text",
                            "text": t
                        }));
                    }
                }
                // Unsigned thinking blocks are rejected when replayed
                Part::Thinking(_) => {}
                Part::FunctionCall { id, name, args } => {
                    message_content.push(json!({
                        "type": "tool_use",
                        "id": id.clone().unwrap_or_else(|| format!("tool_{}", name)),
                        "name": name,
                        "input": args
                    }));
                }
                Part::FunctionResponse { id, name, response } => {
                    let body = match response {
                        Value::String(s) => s.clone(),
                        other => other.to_string(),
                    };
                    message_content.push(json!({
                        "type": "tool_result",
                        "tool_use_id": id.clone().unwrap_or_else(|| format!("tool_{}", name)),
                        "content": body
                    }));
                }
            }
        }

        if message_content.is_empty() {
            return None;
        }

        Some(json!({
            "role": role,
            "content": message_content
        }))
    }

    fn apply_generation_config(body: &mut Value, config: Option<&GenerationConfig>) {
        if let Some(temp) = config.and_then(|c| c.temperature) {
            body["temperature"] = json!(temp);
        }
    }

    /// Fold same-role neighbours into one turn, so every tool_result of an
    /// assistant turn lands in the single user turn that follows it
    fn merge_consecutive_turns(messages: Vec<Value>) -> Vec<Value> {
        let mut merged: Vec<Value> = Vec::with_capacity(messages.len());
        for message in messages {
            match merged.last_mut() {
                Some(prev) if prev["role"] == message["role"] => {
                    if let (Some(blocks), Some(more)) =
                        (prev["content"].as_array_mut(), message["content"].as_array())
                    {
                        blocks.extend(more.iter().cloned());
                    }
                }
                _ => merged.push(message),
            }
        }
        merged
    }

    /// Convert tools to Anthropic tool format
    fn tools_to_anthropic_format(tools: &[Arc<dyn Tool>]) -> Vec<Value> {
        tools
            .iter()
            .map(|t| {
                json!({
                    "name": t.name(),
                    "description": t.description(),
                    "input_schema": t.schema()
                })
            })
            .collect()
    }

    /// Parse Anthropic response into Content
    fn parse_anthropic_response(response: &Value) -> Result<Content, ModelError> {
        let content_blocks = response["content"]
            .as_array()
            .ok_or_else(|| ModelError::InvalidResponse("no content in response".to_string()))?;

        let mut parts = Vec::new();

        for block in content_blocks {
            match block["type"].as_str() {
                Some("text") => {
                    if let Some(text) = block["text"].as_str() {
                        if !text.is_empty() {
                            parts.push(Part::Text(text.to_string()));
                        }
                    }
                }
                Some("thinking") => {
                    if let Some(thinking) = block["thinking"].as_str() {
                        if !thinking.is_empty() {
                            parts.push(Part::Thinking(thinking.to_string()));
                        }
                    }
                }
                Some("tool_use") => {
                    parts.push(Part::FunctionCall {
                        id: block["id"].as_str().map(str::to_string),
                        name: block["name"].as_str().unwrap_or_default().to_string(),
                        args: block["input"].clone(),
                    });
                }
                _ => {}
            }
        }

        if let Some(stop_reason) = response["stop_reason"].as_str() {
            log::debug!("Anthropic stop reason: {}", stop_reason);
        }

        Ok(Content::new(ROLE_MODEL, parts))
    }
}

#[async_trait]
impl Model for AnthropicModel {
    async fn generate_content(
        &self,
        history: &[Content],
        config: Option<&GenerationConfig>,
        tools: Option<&[Arc<dyn Tool>]>,
    ) -> Result<Content, Box<dyn Error + Send + Sync>> {
        let url = format!("{}/messages", self.base_url);

        let system = Self::extract_system_message(history);

        let messages = Self::merge_consecutive_turns(
            history
                .iter()
                .filter_map(Self::content_to_anthropic_message)
                .collect(),
        );

        let mut body = json!({
            "model": self.model_name,
            "messages": messages,
            "max_tokens": DEFAULT_MAX_TOKENS
        });

        if let Some(sys) = system {
            body["system"] = json!(sys);
        }

        Self::apply_generation_config(&mut body, config);

        if let Some(tools) = tools {
            if !tools.is_empty() {
                body["tools"] = json!(Self::tools_to_anthropic_format(tools));
                log::debug!("Binding {} tools for Anthropic", tools.len());
            }
        }

        log::debug!(
            "Anthropic request body: {}",
            serde_json::to_string_pretty(&body).unwrap_or_default()
        );

        let resp = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", ANTHROPIC_VERSION)
            .json(&body)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let text = resp.text().await?;
            return Err(Box::new(FabricAgentError::api(
                "Anthropic",
                format!("{}: {}", status, text),
            )));
        }

        let resp_json: Value = resp.json().await?;
        log::debug!("Anthropic response: {}", resp_json);

        Ok(Self::parse_anthropic_response(&resp_json)?)
    }
}
