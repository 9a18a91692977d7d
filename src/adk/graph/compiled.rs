// SPDX-License-Identifier: MIT

//! Compiled graph - immutable and ready to invoke

use std::collections::HashMap;
use std::sync::Arc;

use super::constants::END;
use super::node::Node;
use super::state::GraphState;
use super::state_graph::Edge;
use crate::adk::error::GraphError;

/// Executable graph produced by [`super::StateGraph::compile`].
///
/// Runs from the entry node; after each node its update is applied and the
/// node's outgoing edge picks the next node. A node without an edge ends
/// the run, as does reaching `END`.
pub struct CompiledGraph<S: GraphState> {
    pub(super) nodes: HashMap<String, Arc<dyn Node<S>>>,
    pub(super) edges: HashMap<String, Edge<S>>,
    pub(super) entry: String,
    pub(super) recursion_limit: usize,
}

impl<S: GraphState> CompiledGraph<S> {
    /// Maximum node executions per `invoke`
    pub fn with_recursion_limit(mut self, limit: usize) -> Self {
        self.recursion_limit = limit;
        self
    }

    pub fn recursion_limit(&self) -> usize {
        self.recursion_limit
    }

    pub fn entry(&self) -> &str {
        &self.entry
    }

    /// Node names, sorted
    pub fn node_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.nodes.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Target of a fixed edge leaving `node`, if it has one
    pub fn direct_successor(&self, node: &str) -> Option<&str> {
        match self.edges.get(node) {
            Some(Edge::Direct(to)) => Some(to.as_str()),
            _ => None,
        }
    }

    /// Whether `node` leaves through a conditional edge
    pub fn is_conditional(&self, node: &str) -> bool {
        matches!(self.edges.get(node), Some(Edge::Conditional { .. }))
    }

    /// Run the graph to completion
    pub async fn invoke(&self, mut state: S) -> Result<S, GraphError> {
        let mut current = self.entry.clone();
        let mut steps = 0usize;

        while current != END {
            steps += 1;
            if steps > self.recursion_limit {
                log::error!(
                    "Graph exceeded recursion limit of {} at node '{}'",
                    self.recursion_limit,
                    current
                );
                return Err(GraphError::RecursionLimit(self.recursion_limit));
            }

            let node = self
                .nodes
                .get(&current)
                .ok_or_else(|| GraphError::NodeNotFound(current.clone()))?;

            log::debug!("Graph step {}: running node '{}'", steps, current);
            let update = node.run(&state).await?;
            state.apply(update);

            current = self.next_node(&current, &state)?;
        }

        log::debug!("Graph reached END after {} steps", steps);
        Ok(state)
    }

    fn next_node(&self, from: &str, state: &S) -> Result<String, GraphError> {
        match self.edges.get(from) {
            None => Ok(END.to_string()),
            Some(Edge::Direct(to)) => Ok(to.clone()),
            Some(Edge::Conditional { router, path_map }) => {
                let route = router(state);
                let target = match path_map {
                    Some(map) => map.get(&route).cloned(),
                    None => Some(route.clone()),
                };

                match target {
                    Some(t) if t == END || self.nodes.contains_key(&t) => {
                        log::debug!("Routed '{}' -> '{}'", from, t);
                        Ok(t)
                    }
                    _ => Err(GraphError::InvalidRoute {
                        from: from.to_string(),
                        route,
                    }),
                }
            }
        }
    }
}
