// SPDX-License-Identifier: MIT

use std::sync::Arc;

use super::prompts::FABRIC_ASSISTANT_PROMPT;
use super::{build_tool_calling_graph, AgentGraph, AgentState, BaseAgent};
use crate::adk::error::FabricAgentError;
use crate::adk::graph::prebuilt::tools_condition;
use crate::adk::graph::END;
use crate::fabric::llms::LlmProvider;
use crate::fabric::tools::FabricTools;

/// Single-shot agent: picks one pattern, runs it, and ends with its output
pub struct RouterAgent {
    llm_provider: Arc<dyn LlmProvider>,
    fabric_tools: Arc<FabricTools>,
}

impl RouterAgent {
    pub fn new(llm_provider: Arc<dyn LlmProvider>, fabric_tools: Arc<FabricTools>) -> Self {
        Self {
            llm_provider,
            fabric_tools,
        }
    }
}

impl BaseAgent for RouterAgent {
    fn name(&self) -> &'static str {
        "RouterAgent"
    }

    fn build_graph(&self) -> Result<AgentGraph, FabricAgentError> {
        build_tool_calling_graph(
            self.name(),
            FABRIC_ASSISTANT_PROMPT,
            self.llm_provider.as_ref(),
            &self.fabric_tools,
            tools_condition::<AgentState>,
            END,
        )
    }
}
