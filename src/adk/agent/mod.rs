// SPDX-License-Identifier: MIT

//! Agent module - the runnable face of a compiled graph
//!
//! An `Agent` takes one input string and produces one output string. The
//! Fabric agents implement it on top of `adk::graph`.

use async_trait::async_trait;
use std::error::Error;

/// Core agent trait for all agent types
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent name
    fn name(&self) -> &str;

    /// Run the agent with the given input
    async fn run(&self, input: String) -> Result<String, Box<dyn Error + Send + Sync>>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    /// A simple mock agent that transforms input
    pub struct MockAgent {
        name: String,
        transform: fn(String) -> String,
    }

    impl MockAgent {
        pub fn new(name: &str, transform: fn(String) -> String) -> Self {
            Self {
                name: name.to_string(),
                transform,
            }
        }
    }

    #[async_trait]
    impl Agent for MockAgent {
        fn name(&self) -> &str {
            &self.name
        }

        async fn run(&self, input: String) -> Result<String, Box<dyn Error + Send + Sync>> {
            Ok((self.transform)(input))
        }
    }

    #[tokio::test]
    async fn test_agent_is_object_safe() {
        let agent: Arc<dyn Agent> = Arc::new(MockAgent::new("upper", |s| s.to_uppercase()));
        assert_eq!(agent.name(), "upper");

        let result = agent.run("input".to_string()).await.unwrap();
        assert_eq!(result, "INPUT");
    }
}
