// SPDX-License-Identifier: MIT

//! fabric-agent-rs
//!
//! Prompt-driven agents that run Fabric patterns as tools.
//!
//! - [adk] - agent development kit: models, tools, the state graph runtime
//! - [fabric] - Fabric tools, LLM provider, the four agent types and the action

pub mod adk;
pub mod fabric;
