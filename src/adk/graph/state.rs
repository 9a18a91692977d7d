// SPDX-License-Identifier: MIT

use crate::adk::model::Content;

/// State carried through a graph.
///
/// Nodes return an `Update`; the runtime folds it into the state with
/// `apply`, so each state type owns its reducer.
pub trait GraphState: Clone + Send + Sync + 'static {
    type Update: Send + 'static;

    fn apply(&mut self, update: Self::Update);
}

/// States that hold a conversation
pub trait HasMessages {
    fn messages(&self) -> &[Content];

    fn last_message(&self) -> Option<&Content> {
        self.messages().last()
    }
}

/// Plain conversation state; updates are appended
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MessagesState {
    pub messages: Vec<Content>,
}

impl MessagesState {
    pub fn new(messages: Vec<Content>) -> Self {
        Self { messages }
    }
}

impl GraphState for MessagesState {
    type Update = Vec<Content>;

    fn apply(&mut self, update: Self::Update) {
        self.messages.extend(update);
    }
}

impl HasMessages for MessagesState {
    fn messages(&self) -> &[Content] {
        &self.messages
    }
}
