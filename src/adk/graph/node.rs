// SPDX-License-Identifier: MIT

use super::state::GraphState;
use crate::adk::error::GraphError;
use async_trait::async_trait;
use std::future::Future;

/// One step in a graph: read the state, return an update for it.
#[async_trait]
pub trait Node<S: GraphState>: Send + Sync {
    async fn run(&self, state: &S) -> Result<S::Update, GraphError>;
}

/// Adapts an async closure `Fn(S) -> Future<Output = Result<S::Update, _>>`
/// into a [`Node`]. The closure receives its own clone of the state.
pub struct FnNode<F> {
    func: F,
}

impl<F> FnNode<F> {
    pub fn new(func: F) -> Self {
        Self { func }
    }
}

#[async_trait]
impl<S, F, Fut> Node<S> for FnNode<F>
where
    S: GraphState,
    F: Fn(S) -> Fut + Send + Sync,
    Fut: Future<Output = Result<S::Update, GraphError>> + Send + 'static,
{
    async fn run(&self, state: &S) -> Result<S::Update, GraphError> {
        (self.func)(state.clone()).await
    }
}
