// SPDX-License-Identifier: MIT

//! Typed error handling for fabric-agent-rs
//!
//! Models and tools keep returning `Box<dyn Error + Send + Sync>` so that
//! third-party implementations stay easy to write; everything above them
//! (graphs, agents, the action) speaks these types.

use thiserror::Error;

/// Top-level error type for fabric-agent-rs
#[derive(Debug, Error)]
pub enum FabricAgentError {
    /// The agent factory was asked for a key it does not know
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),

    /// API errors from LLM providers
    #[error("API error from {provider}: {message}")]
    Api { provider: String, message: String },

    /// Configuration errors (missing env vars, invalid flags, empty input)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Graph construction or execution errors
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),

    /// Model/LLM-specific errors
    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    /// I/O errors
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// HTTP request errors
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Generic error wrapper for compatibility
    #[error("{0}")]
    Other(String),
}

/// Errors raised while building or running a state graph
#[derive(Debug, Error)]
pub enum GraphError {
    /// `START` and `END` cannot be used as node names
    #[error("Node name '{0}' is reserved")]
    ReservedNodeName(String),

    /// A node with this name was already added
    #[error("Node '{0}' already exists")]
    DuplicateNode(String),

    /// No edge leaves `START`
    #[error("Graph has no entry point, add an edge from START")]
    MissingEntryPoint,

    /// An edge references a node that was never added
    #[error("Node '{0}' not found")]
    NodeNotFound(String),

    /// A conditional edge produced a route with no matching node
    #[error("Invalid route '{route}' from node '{from}'")]
    InvalidRoute { from: String, route: String },

    /// Too many node executions in a single invocation
    #[error("Recursion limit of {0} reached without hitting END")]
    RecursionLimit(usize),

    /// A node failed while running
    #[error("Node '{node}' failed: {message}")]
    Node { node: String, message: String },
}

/// Model/LLM-specific errors
#[derive(Debug, Error)]
pub enum ModelError {
    /// API key not configured
    #[error("API key not configured for provider: {0}")]
    ApiKeyMissing(String),

    /// Provider not supported
    #[error("Provider not supported: {0}")]
    UnsupportedProvider(String),

    /// Invalid response from model
    #[error("Invalid response from model: {0}")]
    InvalidResponse(String),
}

impl FabricAgentError {
    /// Create an API error
    pub fn api(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Api {
            provider: provider.into(),
            message: message.into(),
        }
    }

    /// Create a config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create from a generic error
    pub fn other(message: impl Into<String>) -> Self {
        Self::Other(message.into())
    }
}

impl GraphError {
    /// Create a node failure
    pub fn node(node: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Node {
            node: node.into(),
            message: message.into(),
        }
    }
}

impl From<&str> for FabricAgentError {
    fn from(s: &str) -> Self {
        Self::Other(s.to_string())
    }
}

impl From<String> for FabricAgentError {
    fn from(s: String) -> Self {
        Self::Other(s)
    }
}

// Agent::run and Model/Tool calls return boxed errors
impl From<Box<dyn std::error::Error + Send + Sync>> for FabricAgentError {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        match err.downcast::<FabricAgentError>() {
            Ok(inner) => *inner,
            Err(other) => Self::Other(other.to_string()),
        }
    }
}
