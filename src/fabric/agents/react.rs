// SPDX-License-Identifier: MIT

//! ReAct agents
//!
//! The assistant may call patterns repeatedly, seeing each result before
//! deciding the next step. [`react_tools_condition`] ends the loop once the
//! conversation holds `max_num_turns` tool messages.

use std::sync::Arc;

use super::prompts::{FABRIC_ASSISTANT_PROMPT, FABRIC_ISSUE_PROMPT, FABRIC_PR_PROMPT};
use super::{
    build_tool_calling_graph, AgentGraph, AgentState, BaseAgent, ASSISTANT_NODE,
    DEFAULT_MAX_NUM_TURNS,
};
use crate::adk::error::FabricAgentError;
use crate::adk::graph::prebuilt::tools_condition;
use crate::adk::graph::END;
use crate::fabric::llms::LlmProvider;
use crate::fabric::tools::FabricTools;

/// [`tools_condition`] with a cap on the number of tool messages
pub fn react_tools_condition(state: &AgentState) -> String {
    let max_num_turns = state.max_num_turns.unwrap_or(DEFAULT_MAX_NUM_TURNS) as usize;
    let tool_turns = state.tool_response_count();

    if tool_turns >= max_num_turns {
        log::warn!(
            "Exceeded maximum number of tools turns: {} >= {}",
            tool_turns,
            max_num_turns
        );
        return END.to_string();
    }

    tools_condition(state)
}

fn build_react_graph(
    agent_name: &str,
    prompt: &str,
    llm_provider: &dyn LlmProvider,
    fabric_tools: &FabricTools,
) -> Result<AgentGraph, FabricAgentError> {
    build_tool_calling_graph(
        agent_name,
        prompt,
        llm_provider,
        fabric_tools,
        react_tools_condition,
        ASSISTANT_NODE,
    )
}

/// General ReAct agent over free-form input
pub struct ReActAgent {
    llm_provider: Arc<dyn LlmProvider>,
    fabric_tools: Arc<FabricTools>,
}

impl ReActAgent {
    pub fn new(llm_provider: Arc<dyn LlmProvider>, fabric_tools: Arc<FabricTools>) -> Self {
        Self {
            llm_provider,
            fabric_tools,
        }
    }
}

impl BaseAgent for ReActAgent {
    fn name(&self) -> &'static str {
        "ReActAgent"
    }

    fn build_graph(&self) -> Result<AgentGraph, FabricAgentError> {
        build_react_graph(
            self.name(),
            FABRIC_ASSISTANT_PROMPT,
            self.llm_provider.as_ref(),
            &self.fabric_tools,
        )
    }
}

/// ReAct agent for GitHub issues and their comment threads
pub struct ReActIssueAgent {
    llm_provider: Arc<dyn LlmProvider>,
    fabric_tools: Arc<FabricTools>,
}

impl ReActIssueAgent {
    pub fn new(llm_provider: Arc<dyn LlmProvider>, fabric_tools: Arc<FabricTools>) -> Self {
        Self {
            llm_provider,
            fabric_tools,
        }
    }
}

impl BaseAgent for ReActIssueAgent {
    fn name(&self) -> &'static str {
        "ReActIssueAgent"
    }

    fn build_graph(&self) -> Result<AgentGraph, FabricAgentError> {
        build_react_graph(
            self.name(),
            FABRIC_ISSUE_PROMPT,
            self.llm_provider.as_ref(),
            &self.fabric_tools,
        )
    }
}

/// ReAct agent for pull requests, their diff and comments
pub struct ReActPRAgent {
    llm_provider: Arc<dyn LlmProvider>,
    fabric_tools: Arc<FabricTools>,
}

impl ReActPRAgent {
    pub fn new(llm_provider: Arc<dyn LlmProvider>, fabric_tools: Arc<FabricTools>) -> Self {
        Self {
            llm_provider,
            fabric_tools,
        }
    }
}

impl BaseAgent for ReActPRAgent {
    fn name(&self) -> &'static str {
        "ReActPRAgent"
    }

    fn build_graph(&self) -> Result<AgentGraph, FabricAgentError> {
        build_react_graph(
            self.name(),
            FABRIC_PR_PROMPT,
            self.llm_provider.as_ref(),
            &self.fabric_tools,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::graph::prebuilt::TOOLS_NODE;
    use crate::adk::graph::GraphState;
    use crate::adk::model::{Content, Part, ROLE_MODEL};
    use serde_json::json;

    fn call_message(name: &str) -> Content {
        Content::new(
            ROLE_MODEL,
            vec![Part::FunctionCall {
                id: Some(format!("call_{}", name)),
                name: name.to_string(),
                args: json!({"input_text": "x"}),
            }],
        )
    }

    fn state_with_turns(turns: usize, max_num_turns: Option<u32>) -> AgentState {
        let mut state = AgentState::new("summarize this", max_num_turns);
        for i in 0..turns {
            state.apply(vec![
                call_message("summarize"),
                Content::tool_response(Some(format!("call_{}", i)), "summarize", json!("ok")),
            ]);
        }
        state.apply(vec![call_message("summarize")]);
        state
    }

    #[test]
    fn test_routes_to_tools_below_limit() {
        let state = state_with_turns(2, Some(3));
        assert_eq!(react_tools_condition(&state), TOOLS_NODE);
    }

    #[test]
    fn test_stops_at_limit() {
        let state = state_with_turns(3, Some(3));
        assert_eq!(react_tools_condition(&state), END);
    }

    #[test]
    fn test_default_limit_is_ten() {
        assert_eq!(react_tools_condition(&state_with_turns(9, None)), TOOLS_NODE);
        assert_eq!(react_tools_condition(&state_with_turns(10, None)), END);
    }

    fn double_call_message(step: usize) -> Content {
        Content::new(
            ROLE_MODEL,
            vec![
                Part::FunctionCall {
                    id: Some(format!("call_{}_a", step)),
                    name: "summarize".to_string(),
                    args: json!({"input_text": "x"}),
                },
                Part::FunctionCall {
                    id: Some(format!("call_{}_b", step)),
                    name: "extract_wisdom".to_string(),
                    args: json!({"input_text": "x"}),
                },
            ],
        )
    }

    #[test]
    fn test_every_parallel_call_counts_as_a_turn() {
        let mut state = AgentState::new("summarize and extract", Some(3));
        state.apply(vec![double_call_message(0)]);
        assert_eq!(react_tools_condition(&state), TOOLS_NODE);

        state.apply(vec![
            Content::tool_response(Some("call_0_a".to_string()), "summarize", json!("a")),
            Content::tool_response(Some("call_0_b".to_string()), "extract_wisdom", json!("b")),
            double_call_message(1),
        ]);
        assert_eq!(state.tool_response_count(), 2);
        assert_eq!(react_tools_condition(&state), TOOLS_NODE);

        state.apply(vec![
            Content::tool_response(Some("call_1_a".to_string()), "summarize", json!("a")),
            Content::tool_response(Some("call_1_b".to_string()), "extract_wisdom", json!("b")),
            double_call_message(2),
        ]);
        assert_eq!(state.tool_response_count(), 4);
        assert_eq!(react_tools_condition(&state), END);
    }

    #[test]
    fn test_ends_without_tool_calls() {
        let mut state = AgentState::new("hi", Some(5));
        state.apply(vec![Content::model("done")]);
        assert_eq!(react_tools_condition(&state), END);
    }
}
