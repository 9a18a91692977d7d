// SPDX-License-Identifier: MIT

//! Fabric agents
//!
//! Everything specific to running Fabric patterns through an LLM agent:
//! the pattern tools, the LLM provider, the four agent graphs, and the
//! file-in/file-out action that ties them together.

pub mod action;
pub mod agents;
pub mod config;
pub mod llms;
pub mod tools;
