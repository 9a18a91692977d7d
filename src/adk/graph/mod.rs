// SPDX-License-Identifier: MIT

//! State graph runtime
//!
//! Build a graph of async nodes over a shared state with [`StateGraph`],
//! connect them with plain or conditional edges, then [`StateGraph::compile`]
//! it into a [`CompiledGraph`] and `invoke` it with an initial state.
//!
//! [`prebuilt`] carries the two pieces every tool-calling agent needs: a
//! [`prebuilt::ToolNode`] and the [`prebuilt::tools_condition`] router.

pub mod compiled;
pub mod constants;
pub mod node;
pub mod prebuilt;
pub mod state;
pub mod state_graph;

pub use compiled::CompiledGraph;
pub use constants::{END, START};
pub use node::{FnNode, Node};
pub use state::{GraphState, HasMessages};
pub use state_graph::StateGraph;
