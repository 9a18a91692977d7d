// SPDX-License-Identifier: MIT

//! LLM provider
//!
//! Turns a [`ModelSpec`] into an [`AgentLLM`]: a model handle plus the two
//! facts the agents need about it, its generation config and whether it
//! accepts a system message.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use crate::adk::error::{FabricAgentError, ModelError};
use crate::adk::model::anthropic::AnthropicModel;
use crate::adk::model::openai::OpenAIModel;
use crate::adk::model::{BoundModel, Content, GenerationConfig, Model};
use crate::adk::tool::Tool;
use crate::fabric::config::{LlmConfig, ModelSpec};

pub const OPENROUTER_BASE_URL: &str = "https://openrouter.ai/api/v1";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LlmProviderKind {
    OpenAI,
    OpenRouter,
    Anthropic,
}

impl FromStr for LlmProviderKind {
    type Err = FabricAgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(Self::OpenAI),
            "openrouter" => Ok(Self::OpenRouter),
            "anthropic" => Ok(Self::Anthropic),
            other => Err(ModelError::UnsupportedProvider(other.to_string()).into()),
        }
    }
}

impl fmt::Display for LlmProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::OpenAI => "openai",
            Self::OpenRouter => "openrouter",
            Self::Anthropic => "anthropic",
        };
        f.write_str(name)
    }
}

/// A ready-to-use model and how to talk to it
#[derive(Clone)]
pub struct AgentLLM {
    pub model: Arc<dyn Model>,
    pub use_system_message: bool,
    pub config: GenerationConfig,
}

impl AgentLLM {
    pub fn new(model: Arc<dyn Model>, use_system_message: bool, config: GenerationConfig) -> Self {
        Self {
            model,
            use_system_message,
            config,
        }
    }

    /// Attach a tool set; the result is what an assistant node invokes
    pub fn bind_tools(&self, tools: Vec<Arc<dyn Tool>>) -> BoundModel {
        BoundModel::new(self.model.clone(), tools).with_config(self.config.clone())
    }

    /// Wrap a prompt as a system message, or as a user message for models
    /// that reject system messages
    pub fn prompt_message(&self, prompt: impl Into<String>) -> Content {
        if self.use_system_message {
            Content::system(prompt)
        } else {
            Content::user(prompt)
        }
    }
}

/// Source of the two LLMs an action needs
pub trait LlmProvider: Send + Sync {
    /// Model that drives the agent graph
    fn create_agent_llm(&self) -> Result<AgentLLM, FabricAgentError>;

    /// Model that executes Fabric patterns
    fn create_fabric_llm(&self) -> Result<AgentLLM, FabricAgentError>;
}

/// Models in the o1 family reject system messages and custom temperature
pub fn supports_system_message(model_name: &str) -> bool {
    let name = model_name.rsplit('/').next().unwrap_or(model_name);
    !name.to_lowercase().starts_with("o1")
}

/// Provider built from [`LlmConfig`] and API keys in the environment
pub struct ConfiguredLlmProvider {
    config: LlmConfig,
}

impl ConfiguredLlmProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    fn create(&self, spec: &ModelSpec) -> Result<AgentLLM, FabricAgentError> {
        let use_system_message = supports_system_message(&spec.model);
        let temperature = if use_system_message {
            spec.temperature
        } else {
            log::debug!("Model {} does not take a temperature, ignoring it", spec.model);
            None
        };

        log::info!(
            "Using provider '{}' with model '{}' (temperature: {:?})",
            spec.provider,
            spec.model,
            temperature
        );

        let model: Arc<dyn Model> = match spec.provider {
            LlmProviderKind::OpenAI => Arc::new(OpenAIModel::new(spec.model.clone())?),
            LlmProviderKind::OpenRouter => {
                let api_key = env::var("OPENROUTER_API_KEY").map_err(|_| {
                    ModelError::ApiKeyMissing("OpenRouter (OPENROUTER_API_KEY)".to_string())
                })?;
                Arc::new(OpenAIModel::with_endpoint(
                    "OpenRouter",
                    spec.model.clone(),
                    api_key,
                    OPENROUTER_BASE_URL,
                ))
            }
            LlmProviderKind::Anthropic => Arc::new(AnthropicModel::new(spec.model.clone())?),
        };

        Ok(AgentLLM::new(
            model,
            use_system_message,
            GenerationConfig { temperature },
        ))
    }
}

impl LlmProvider for ConfiguredLlmProvider {
    fn create_agent_llm(&self) -> Result<AgentLLM, FabricAgentError> {
        self.create(&self.config.agent)
    }

    fn create_fabric_llm(&self) -> Result<AgentLLM, FabricAgentError> {
        self.create(&self.config.fabric)
    }
}
