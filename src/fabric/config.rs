// SPDX-License-Identifier: MIT

//! Action configuration
//!
//! Plain data assembled by the CLI (flags, `INPUT_*` env vars, `.env`) and
//! validated here before any model is contacted.

use std::path::PathBuf;

use crate::adk::error::FabricAgentError;
use crate::fabric::agents::AgentKind;
use crate::fabric::llms::LlmProviderKind;

/// Which provider and model serve one role (agent or Fabric patterns)
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    pub provider: LlmProviderKind,
    pub model: String,
    pub temperature: Option<f32>,
}

impl ModelSpec {
    pub fn new(provider: LlmProviderKind, model: impl Into<String>, temperature: Option<f32>) -> Self {
        Self {
            provider,
            model: model.into(),
            temperature,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LlmConfig {
    /// Model driving the agent graph
    pub agent: ModelSpec,
    /// Model executing Fabric patterns
    pub fabric: ModelSpec,
}

/// Restricts which Fabric patterns become tools
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PatternFilter {
    included: Vec<String>,
    excluded: Vec<String>,
}

impl PatternFilter {
    pub fn new(included: Vec<String>, excluded: Vec<String>) -> Result<Self, FabricAgentError> {
        if !included.is_empty() && !excluded.is_empty() {
            return Err(FabricAgentError::config(
                "fabric_patterns_included and fabric_patterns_excluded are mutually exclusive",
            ));
        }
        Ok(Self { included, excluded })
    }

    pub fn allows(&self, pattern: &str) -> bool {
        if !self.included.is_empty() {
            return self.included.iter().any(|p| p == pattern);
        }
        !self.excluded.iter().any(|p| p == pattern)
    }

    pub fn included(&self) -> &[String] {
        &self.included
    }
}

/// Split a comma-separated pattern list, dropping blanks
pub fn parse_pattern_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Debug, Clone)]
pub struct ActionConfig {
    pub input_file: PathBuf,
    pub output_file: PathBuf,
    pub agent_type: String,
    pub max_num_turns: u32,
    pub patterns_dir: PathBuf,
    pub pattern_filter: PatternFilter,
    pub llm: LlmConfig,
}

impl ActionConfig {
    /// Check everything that can be checked offline; returns the parsed agent kind
    pub fn validate(&self) -> Result<AgentKind, FabricAgentError> {
        let kind: AgentKind = self.agent_type.parse()?;

        if self.max_num_turns == 0 {
            return Err(FabricAgentError::config(
                "fabric_max_num_turns must be at least 1",
            ));
        }

        for (role, spec) in [("agent", &self.llm.agent), ("fabric", &self.llm.fabric)] {
            if spec.model.trim().is_empty() {
                return Err(FabricAgentError::config(format!("{}_model is empty", role)));
            }
            if let Some(t) = spec.temperature {
                if !(0.0..=2.0).contains(&t) {
                    return Err(FabricAgentError::config(format!(
                        "{}_temperature must be between 0 and 2, got {}",
                        role, t
                    )));
                }
            }
        }

        Ok(kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> ActionConfig {
        let spec = ModelSpec::new(LlmProviderKind::OpenAI, "gpt-4o", Some(0.0));
        ActionConfig {
            input_file: PathBuf::from("input.md"),
            output_file: PathBuf::from("output.md"),
            agent_type: "react".to_string(),
            max_num_turns: 10,
            patterns_dir: PathBuf::from("patterns"),
            pattern_filter: PatternFilter::default(),
            llm: LlmConfig {
                agent: spec.clone(),
                fabric: spec,
            },
        }
    }

    #[test]
    fn test_parse_pattern_list() {
        assert_eq!(
            parse_pattern_list(" summarize, extract_wisdom ,,"),
            vec!["summarize".to_string(), "extract_wisdom".to_string()]
        );
        assert!(parse_pattern_list("").is_empty());
    }

    #[test]
    fn test_filter_included() {
        let filter = PatternFilter::new(vec!["summarize".to_string()], vec![]).unwrap();
        assert!(filter.allows("summarize"));
        assert!(!filter.allows("extract_wisdom"));
    }

    #[test]
    fn test_filter_excluded() {
        let filter = PatternFilter::new(vec![], vec!["summarize".to_string()]).unwrap();
        assert!(!filter.allows("summarize"));
        assert!(filter.allows("extract_wisdom"));
        assert!(PatternFilter::default().allows("anything"));
    }

    #[test]
    fn test_filter_rejects_both_lists() {
        let result = PatternFilter::new(vec!["a".to_string()], vec!["b".to_string()]);
        assert!(matches!(result, Err(FabricAgentError::Config(_))));
    }

    #[test]
    fn test_validate_ok() {
        assert_eq!(config().validate().unwrap(), AgentKind::React);
    }

    #[test]
    fn test_validate_unknown_agent_type() {
        let mut cfg = config();
        cfg.agent_type = "planner".to_string();
        assert!(matches!(
            cfg.validate(),
            Err(FabricAgentError::UnknownAgentType(t)) if t == "planner"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_turns_and_bad_temperature() {
        let mut cfg = config();
        cfg.max_num_turns = 0;
        assert!(cfg.validate().is_err());

        let mut cfg = config();
        cfg.llm.fabric.temperature = Some(3.5);
        let err = cfg.validate().unwrap_err();
        assert!(err.to_string().contains("fabric_temperature"));
    }
}
