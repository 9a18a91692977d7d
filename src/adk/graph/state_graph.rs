// SPDX-License-Identifier: MIT

//! StateGraph - the graph builder
//!
//! Nodes are registered by name, edges connect them (or `START`/`END`),
//! and `compile` validates the wiring into a [`CompiledGraph`].

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

use super::compiled::CompiledGraph;
use super::constants::{is_reserved_name, DEFAULT_RECURSION_LIMIT, END, START};
use super::node::{FnNode, Node};
use super::state::GraphState;
use crate::adk::error::GraphError;

/// Routing function for conditional edges
pub type Router<S> = Arc<dyn Fn(&S) -> String + Send + Sync>;

/// Outgoing edge of a node
pub(crate) enum Edge<S> {
    /// Always go to the target
    Direct(String),
    /// Ask the router; map its answer through `path_map` when present
    Conditional {
        router: Router<S>,
        path_map: Option<HashMap<String, String>>,
    },
}

/// Graph builder
///
/// ```rust,no_run
/// use fabric_agent_rs::adk::graph::state::MessagesState;
/// use fabric_agent_rs::adk::graph::{StateGraph, END, START};
/// use fabric_agent_rs::adk::model::Content;
///
/// # async fn demo() -> Result<(), fabric_agent_rs::adk::error::GraphError> {
/// let mut builder = StateGraph::<MessagesState>::new();
/// builder.add_fn_node("echo", |state: MessagesState| async move {
///     let last = state.messages.last().map(|m| m.text()).unwrap_or_default();
///     Ok(vec![Content::model(last)])
/// })?;
/// builder.add_edge(START, "echo");
/// builder.add_edge("echo", END);
///
/// let graph = builder.compile()?;
/// let state = graph.invoke(MessagesState::new(vec![Content::user("hi")])).await?;
/// assert_eq!(state.messages.len(), 2);
/// # Ok(())
/// # }
/// ```
pub struct StateGraph<S: GraphState> {
    nodes: HashMap<String, Arc<dyn Node<S>>>,
    edges: HashMap<String, Edge<S>>,
    entry: Option<String>,
}

impl<S: GraphState> Default for StateGraph<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: GraphState> StateGraph<S> {
    pub fn new() -> Self {
        Self {
            nodes: HashMap::new(),
            edges: HashMap::new(),
            entry: None,
        }
    }

    /// Register a node under a unique, non-reserved name
    pub fn add_node(
        &mut self,
        name: impl Into<String>,
        node: impl Node<S> + 'static,
    ) -> Result<&mut Self, GraphError> {
        let name = name.into();

        if is_reserved_name(&name) {
            return Err(GraphError::ReservedNodeName(name));
        }
        if self.nodes.contains_key(&name) {
            return Err(GraphError::DuplicateNode(name));
        }

        self.nodes.insert(name, Arc::new(node));
        Ok(self)
    }

    /// Register an async closure as a node
    pub fn add_fn_node<F, Fut>(
        &mut self,
        name: impl Into<String>,
        func: F,
    ) -> Result<&mut Self, GraphError>
    where
        F: Fn(S) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<S::Update, GraphError>> + Send + 'static,
    {
        self.add_node(name, FnNode::new(func))
    }

    /// Add a fixed edge. An edge from `START` sets the entry point.
    pub fn add_edge(&mut self, from: impl Into<String>, to: impl Into<String>) -> &mut Self {
        let from = from.into();
        let to = to.into();

        if from == START {
            self.entry = Some(to);
        } else {
            self.edges.insert(from, Edge::Direct(to));
        }
        self
    }

    /// Add a routed edge. The router's answer names the next node (or `END`),
    /// or is a key into `path_map` when one is given.
    pub fn add_conditional_edges<R>(
        &mut self,
        from: impl Into<String>,
        router: R,
        path_map: Option<HashMap<String, String>>,
    ) -> &mut Self
    where
        R: Fn(&S) -> String + Send + Sync + 'static,
    {
        self.edges.insert(
            from.into(),
            Edge::Conditional {
                router: Arc::new(router),
                path_map,
            },
        );
        self
    }

    /// Validate the wiring and freeze the graph
    pub fn compile(self) -> Result<CompiledGraph<S>, GraphError> {
        let entry = self.entry.ok_or(GraphError::MissingEntryPoint)?;
        if !self.nodes.contains_key(&entry) {
            return Err(GraphError::NodeNotFound(entry));
        }

        let is_target = |name: &str| name == END || self.nodes.contains_key(name);

        for (from, edge) in &self.edges {
            if !self.nodes.contains_key(from) {
                return Err(GraphError::NodeNotFound(from.clone()));
            }
            match edge {
                Edge::Direct(to) => {
                    if !is_target(to) {
                        return Err(GraphError::NodeNotFound(to.clone()));
                    }
                }
                Edge::Conditional {
                    path_map: Some(map),
                    ..
                } => {
                    if let Some(bad) = map.values().find(|to| !is_target(to)) {
                        return Err(GraphError::NodeNotFound(bad.clone()));
                    }
                }
                Edge::Conditional { path_map: None, .. } => {}
            }
        }

        for name in self.nodes.keys() {
            if !self.edges.contains_key(name) {
                log::debug!("Node '{}' has no outgoing edge, it will end the run", name);
            }
        }

        Ok(CompiledGraph {
            nodes: self.nodes,
            edges: self.edges,
            entry,
            recursion_limit: DEFAULT_RECURSION_LIMIT,
        })
    }
}
