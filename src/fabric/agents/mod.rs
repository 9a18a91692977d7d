// SPDX-License-Identifier: MIT

//! Agent module - the four Fabric agent graphs and their factory
//!
//! Every agent is the same two-node graph, an `assistant` step that asks the
//! model (with the Fabric tools bound) and a `tools` step that runs the
//! requested patterns. They differ only in prompt and edge topology:
//! - `RouterAgent` - single shot, `tools -> END`
//! - `ReActAgent`, `ReActIssueAgent`, `ReActPRAgent` - looping,
//!   `tools -> assistant`, stopped by a turn limit

mod prompts;
mod react;
mod router;

pub use prompts::{FABRIC_ASSISTANT_PROMPT, FABRIC_ISSUE_PROMPT, FABRIC_PR_PROMPT, NO_PATTERN_REPLY};
pub use react::{react_tools_condition, ReActAgent, ReActIssueAgent, ReActPRAgent};
pub use router::RouterAgent;

use std::error::Error;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::adk::agent::Agent;
use crate::adk::error::{FabricAgentError, GraphError};
use crate::adk::graph::prebuilt::{ToolNode, TOOLS_NODE};
use crate::adk::graph::{CompiledGraph, GraphState, HasMessages, Node, StateGraph, START};
use crate::adk::model::{BoundModel, Content, Part};
use crate::fabric::llms::LlmProvider;
use crate::fabric::tools::FabricTools;

pub const ASSISTANT_NODE: &str = "assistant";

/// Tool responses allowed before a ReAct agent is forced to stop
pub const DEFAULT_MAX_NUM_TURNS: u32 = 10;

/// Conversation plus the optional turn limit read by the ReAct guard
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AgentState {
    pub messages: Vec<Content>,
    pub max_num_turns: Option<u32>,
}

impl AgentState {
    pub fn new(input: impl Into<String>, max_num_turns: Option<u32>) -> Self {
        Self {
            messages: vec![Content::user(input)],
            max_num_turns,
        }
    }

    /// Tool messages seen so far
    pub fn tool_response_count(&self) -> usize {
        self.messages
            .iter()
            .map(Content::function_response_count)
            .sum()
    }
}

impl GraphState for AgentState {
    type Update = Vec<Content>;

    fn apply(&mut self, update: Self::Update) {
        self.messages.extend(update);
    }
}

impl HasMessages for AgentState {
    fn messages(&self) -> &[Content] {
        &self.messages
    }
}

pub type AgentGraph = CompiledGraph<AgentState>;

/// Contract shared by all agent types
pub trait BaseAgent: Send + Sync {
    fn name(&self) -> &'static str;

    /// Build and return the agent's graph
    fn build_graph(&self) -> Result<AgentGraph, FabricAgentError>;
}

/// Calls the bound model with the agent prompt prepended to the conversation
pub struct AssistantNode {
    llm: BoundModel,
    agent_msg: Content,
}

impl AssistantNode {
    pub fn new(llm: BoundModel, agent_msg: Content) -> Self {
        Self { llm, agent_msg }
    }
}

#[async_trait]
impl Node<AgentState> for AssistantNode {
    async fn run(&self, state: &AgentState) -> Result<Vec<Content>, GraphError> {
        let mut history = Vec::with_capacity(state.messages.len() + 1);
        history.push(self.agent_msg.clone());
        history.extend(state.messages.iter().cloned());

        let response = self
            .llm
            .invoke(&history)
            .await
            .map_err(|e| GraphError::node(ASSISTANT_NODE, e.to_string()))?;

        log::debug!(
            "Assistant replied with {} parts, {} tool calls",
            response.parts.len(),
            response.function_calls().len()
        );
        Ok(vec![response])
    }
}

/// Wire `START -> assistant`, `assistant -(route)-> tools | END`,
/// `tools -> tools_target`
pub(crate) fn build_tool_calling_graph(
    agent_name: &str,
    prompt: &str,
    llm_provider: &dyn LlmProvider,
    fabric_tools: &FabricTools,
    route: fn(&AgentState) -> String,
    tools_target: &str,
) -> Result<AgentGraph, FabricAgentError> {
    log::debug!("[{}] building graph...", agent_name);

    let llm = llm_provider.create_agent_llm()?;
    let tools = fabric_tools.get_fabric_tools();
    let llm_with_tools = llm.bind_tools(tools.clone());
    let agent_msg = llm.prompt_message(prompt);

    let mut builder = StateGraph::<AgentState>::new();
    builder
        .add_node(ASSISTANT_NODE, AssistantNode::new(llm_with_tools, agent_msg))?
        .add_node(TOOLS_NODE, ToolNode::new(tools))?;
    builder
        .add_edge(START, ASSISTANT_NODE)
        .add_conditional_edges(ASSISTANT_NODE, route, None)
        .add_edge(TOOLS_NODE, tools_target);

    Ok(builder.compile()?)
}

/// Keys accepted by the agent factory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AgentKind {
    Router,
    React,
    ReactIssue,
    ReactPr,
}

impl AgentKind {
    pub const ALL: [AgentKind; 4] = [
        AgentKind::Router,
        AgentKind::React,
        AgentKind::ReactIssue,
        AgentKind::ReactPr,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKind::Router => "router",
            AgentKind::React => "react",
            AgentKind::ReactIssue => "react_issue",
            AgentKind::ReactPr => "react_pr",
        }
    }

    fn instantiate(
        &self,
        llm_provider: Arc<dyn LlmProvider>,
        fabric_tools: Arc<FabricTools>,
    ) -> Box<dyn BaseAgent> {
        match self {
            AgentKind::Router => Box::new(RouterAgent::new(llm_provider, fabric_tools)),
            AgentKind::React => Box::new(ReActAgent::new(llm_provider, fabric_tools)),
            AgentKind::ReactIssue => Box::new(ReActIssueAgent::new(llm_provider, fabric_tools)),
            AgentKind::ReactPr => Box::new(ReActPRAgent::new(llm_provider, fabric_tools)),
        }
    }
}

impl FromStr for AgentKind {
    type Err = FabricAgentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AgentKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| FabricAgentError::UnknownAgentType(s.to_string()))
    }
}

impl fmt::Display for AgentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Factory mapping an agent type key to its compiled graph
pub struct AgentBuilder {
    agent_type: String,
    llm_provider: Arc<dyn LlmProvider>,
    fabric_tools: Arc<FabricTools>,
}

impl AgentBuilder {
    pub fn new(
        agent_type: impl Into<String>,
        llm_provider: Arc<dyn LlmProvider>,
        fabric_tools: Arc<FabricTools>,
    ) -> Self {
        Self {
            agent_type: agent_type.into(),
            llm_provider,
            fabric_tools,
        }
    }

    /// Select the agent implementation for the configured key
    pub fn agent(&self) -> Result<Box<dyn BaseAgent>, FabricAgentError> {
        let kind: AgentKind = self.agent_type.parse()?;
        Ok(kind.instantiate(self.llm_provider.clone(), self.fabric_tools.clone()))
    }

    /// Build and return the graph of the configured agent type
    pub fn build(&self) -> Result<AgentGraph, FabricAgentError> {
        let agent = self.agent()?;
        log::info!("Building agent '{}' ({})", self.agent_type, agent.name());
        agent.build_graph()
    }
}

/// Text a finished run hands back: the last message's text, or the tool
/// output when the run ended on the tools step
pub fn final_output(state: &AgentState) -> String {
    let Some(last) = state.messages.last() else {
        return String::new();
    };

    let text = last.text();
    if !text.is_empty() {
        return text;
    }

    last.parts
        .iter()
        .filter_map(|part| match part {
            Part::FunctionResponse { response, .. } => Some(match response {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            }),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Runs a compiled agent graph on one input
pub struct FabricAgent {
    name: String,
    graph: AgentGraph,
    max_num_turns: u32,
}

impl FabricAgent {
    /// The recursion limit is raised when needed so the turn guard, not the
    /// limit, ends long ReAct loops
    pub fn new(name: impl Into<String>, graph: AgentGraph, max_num_turns: u32) -> Self {
        let needed = 2 * max_num_turns as usize + 3;
        let graph = if needed > graph.recursion_limit() {
            graph.with_recursion_limit(needed)
        } else {
            graph
        };

        Self {
            name: name.into(),
            graph,
            max_num_turns,
        }
    }

    pub fn graph(&self) -> &AgentGraph {
        &self.graph
    }

    /// Run the graph and return the whole final state
    pub async fn invoke(&self, input: String) -> Result<AgentState, FabricAgentError> {
        let state = AgentState::new(input, Some(self.max_num_turns));
        let state = self.graph.invoke(state).await?;
        log::info!(
            "Agent {} finished with {} messages, {} tool responses",
            self.name,
            state.messages.len(),
            state.tool_response_count()
        );
        Ok(state)
    }
}

#[async_trait]
impl Agent for FabricAgent {
    fn name(&self) -> &str {
        &self.name
    }

    async fn run(&self, input: String) -> Result<String, Box<dyn Error + Send + Sync>> {
        let state = self.invoke(input).await?;
        Ok(final_output(&state))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::{ROLE_MODEL, ROLE_TOOL};
    use serde_json::json;

    #[test]
    fn test_agent_kind_round_trip() {
        for kind in AgentKind::ALL {
            assert_eq!(kind.as_str().parse::<AgentKind>().unwrap(), kind);
            assert_eq!(kind.to_string(), kind.as_str());
        }
    }

    #[test]
    fn test_agent_kind_unknown() {
        for key in ["", "React", "react-pr", "planner"] {
            match key.parse::<AgentKind>() {
                Err(FabricAgentError::UnknownAgentType(got)) => assert_eq!(got, key),
                other => panic!("Expected UnknownAgentType for {:?}, got {:?}", key, other),
            }
        }
    }

    #[test]
    fn test_tool_response_count() {
        let mut state = AgentState::new("hi", None);
        assert_eq!(state.tool_response_count(), 0);
        state.apply(vec![
            Content::tool_response(None, "a", json!("x")),
            Content::tool_response(None, "b", json!("y")),
        ]);
        assert_eq!(state.tool_response_count(), 2);
    }

    #[test]
    fn test_final_output_prefers_text() {
        let mut state = AgentState::new("hi", None);
        state.apply(vec![Content::model("final answer")]);
        assert_eq!(final_output(&state), "final answer");
    }

    #[test]
    fn test_final_output_from_tool_message() {
        let mut state = AgentState::new("hi", None);
        state.apply(vec![Content::new(
            ROLE_TOOL,
            vec![Part::FunctionResponse {
                id: Some("1".to_string()),
                name: "summarize".to_string(),
                response: json!("PATTERN OUTPUT"),
            }],
        )]);
        assert_eq!(final_output(&state), "PATTERN OUTPUT");
    }

    #[test]
    fn test_final_output_empty() {
        assert_eq!(final_output(&AgentState::default()), "");
        let mut state = AgentState::default();
        state.apply(vec![Content::new(ROLE_MODEL, vec![])]);
        assert_eq!(final_output(&state), "");
    }
}
