// SPDX-License-Identifier: MIT

//! Fabric tools
//!
//! A Fabric pattern is a directory holding a `system.md` prompt. Each
//! pattern becomes one tool: the tool sends the pattern prompt and the
//! caller's text to the Fabric LLM and returns the model's answer verbatim.

use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::{json, Value};
use std::error::Error;

use crate::adk::error::FabricAgentError;
use crate::adk::model::Content;
use crate::adk::tool::Tool;
use crate::fabric::config::PatternFilter;
use crate::fabric::llms::AgentLLM;

/// Providers cap the number of functions per request
pub const MAX_TOOLS: usize = 128;

const SYSTEM_PROMPT_FILE: &str = "system.md";

/// Arguments every Fabric tool accepts
#[derive(Debug, Deserialize, JsonSchema)]
pub struct FabricToolArgs {
    /// The text the pattern should be applied to
    pub input_text: String,
}

static FABRIC_TOOL_SCHEMA: Lazy<Value> = Lazy::new(|| {
    let mut schema = serde_json::to_value(schemars::schema_for!(FabricToolArgs))
        .unwrap_or_else(|_| json!({"type": "object"}));
    if let Value::Object(map) = &mut schema {
        map.remove("$schema");
    }
    schema
});

/// A pattern loaded from disk
#[derive(Debug, Clone, PartialEq)]
pub struct FabricPattern {
    pub name: String,
    pub description: String,
    pub system_prompt: String,
}

impl FabricPattern {
    pub fn new(name: impl Into<String>, system_prompt: impl Into<String>) -> Self {
        let name = name.into();
        let system_prompt = system_prompt.into();
        let description = describe(&name, &system_prompt);
        Self {
            name,
            description,
            system_prompt,
        }
    }

    /// Load `<dir>/system.md`; the directory name is the pattern name
    pub fn load(dir: &Path) -> Result<Self, FabricAgentError> {
        let name = dir
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| {
                FabricAgentError::config(format!("Invalid pattern directory: {}", dir.display()))
            })?;
        let system_prompt = fs::read_to_string(dir.join(SYSTEM_PROMPT_FILE))?;
        Ok(Self::new(name, system_prompt))
    }
}

/// Function names accepted by every provider: `[A-Za-z0-9_-]{1,64}`
pub fn is_valid_tool_name(name: &str) -> bool {
    !name.is_empty()
        && name.len() <= 64
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

/// First prose line under an `# IDENTITY` heading, else the first prose line
fn describe(name: &str, system_prompt: &str) -> String {
    let is_prose = |line: &&str| !line.is_empty() && !line.starts_with('#');

    let mut lines = system_prompt.lines().map(str::trim);
    let under_identity = lines
        .by_ref()
        .skip_while(|l| !(l.starts_with('#') && l.to_uppercase().contains("IDENTITY")))
        .skip(1)
        .find(is_prose);

    under_identity
        .or_else(|| system_prompt.lines().map(str::trim).find(is_prose))
        .map(str::to_string)
        .unwrap_or_else(|| format!("Fabric pattern {}", name))
}

/// Tool running one Fabric pattern on the Fabric LLM
pub struct FabricPatternTool {
    pattern: FabricPattern,
    llm: AgentLLM,
}

impl FabricPatternTool {
    pub fn new(pattern: FabricPattern, llm: AgentLLM) -> Self {
        Self { pattern, llm }
    }

    fn history(&self, input_text: String) -> Vec<Content> {
        vec![
            self.llm.prompt_message(self.pattern.system_prompt.clone()),
            Content::user(input_text),
        ]
    }
}

#[async_trait]
impl Tool for FabricPatternTool {
    fn name(&self) -> &str {
        &self.pattern.name
    }

    fn description(&self) -> &str {
        &self.pattern.description
    }

    fn schema(&self) -> &Value {
        &FABRIC_TOOL_SCHEMA
    }

    async fn execute(&self, input: Value) -> Result<Value, Box<dyn Error + Send + Sync>> {
        let args: FabricToolArgs = serde_json::from_value(input)?;
        log::info!(
            "Running fabric pattern '{}' on {} chars",
            self.pattern.name,
            args.input_text.len()
        );

        let history = self.history(args.input_text);
        let response = self
            .llm
            .model
            .generate_content(&history, Some(&self.llm.config), None)
            .await?;

        Ok(Value::String(response.text()))
    }
}

/// The tool set bound to every agent
pub struct FabricTools {
    tools: Vec<Arc<dyn Tool>>,
}

impl FabricTools {
    /// Use an explicit tool list
    pub fn from_tools(tools: Vec<Arc<dyn Tool>>) -> Self {
        Self { tools }
    }

    /// Load every pattern under `patterns_dir` that passes `filter`
    pub fn load(
        patterns_dir: &Path,
        llm: AgentLLM,
        filter: &PatternFilter,
    ) -> Result<Self, FabricAgentError> {
        if !patterns_dir.is_dir() {
            return Err(FabricAgentError::config(format!(
                "Fabric patterns directory not found: {}",
                patterns_dir.display()
            )));
        }

        let mut dirs: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(patterns_dir)? {
            match entry {
                Ok(entry) => dirs.push(entry.path()),
                Err(e) => log::warn!(
                    "Skipping unreadable entry in {}: {}",
                    patterns_dir.display(),
                    e
                ),
            }
        }
        dirs.retain(|path| path.join(SYSTEM_PROMPT_FILE).is_file());
        dirs.sort();

        let mut patterns = Vec::new();
        for dir in dirs {
            let name = match dir.file_name().and_then(OsStr::to_str) {
                Some(name) if is_valid_tool_name(name) => name,
                _ => {
                    log::warn!(
                        "Skipping pattern with invalid tool name: {}",
                        dir.display()
                    );
                    continue;
                }
            };
            if !filter.allows(name) {
                continue;
            }
            patterns.push(FabricPattern::load(&dir)?);
        }

        for wanted in filter.included() {
            if !patterns.iter().any(|p| &p.name == wanted) {
                log::warn!("Included pattern not found: {}", wanted);
            }
        }

        if patterns.is_empty() {
            return Err(FabricAgentError::config(format!(
                "No fabric patterns loaded from {}",
                patterns_dir.display()
            )));
        }

        if patterns.len() > MAX_TOOLS {
            log::warn!(
                "{} fabric patterns exceed the limit of {} tools, keeping the first {}",
                patterns.len(),
                MAX_TOOLS,
                MAX_TOOLS
            );
            patterns.truncate(MAX_TOOLS);
        }

        log::info!("Loaded {} fabric patterns", patterns.len());

        let tools = patterns
            .into_iter()
            .map(|p| Arc::new(FabricPatternTool::new(p, llm.clone())) as Arc<dyn Tool>)
            .collect();
        Ok(Self { tools })
    }

    pub fn get_fabric_tools(&self) -> Vec<Arc<dyn Tool>> {
        self.tools.clone()
    }

    pub fn names(&self) -> Vec<&str> {
        self.tools.iter().map(|t| t.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adk::model::{GenerationConfig, Model, ROLE_SYSTEM, ROLE_USER};
    use std::sync::Mutex;
    use tempfile::TempDir;

    /// Replies with the joined text of the history it was sent
    struct EchoModel {
        seen: Mutex<Vec<Vec<Content>>>,
    }

    #[async_trait]
    impl Model for EchoModel {
        async fn generate_content(
            &self,
            history: &[Content],
            _config: Option<&GenerationConfig>,
            tools: Option<&[Arc<dyn Tool>]>,
        ) -> Result<Content, Box<dyn Error + Send + Sync>> {
            assert!(tools.is_none());
            self.seen.lock().unwrap().push(history.to_vec());
            let joined: Vec<String> = history.iter().map(Content::text).collect();
            Ok(Content::model(joined.join(" | ")))
        }
    }

    fn echo_llm(use_system_message: bool) -> (Arc<EchoModel>, AgentLLM) {
        let model = Arc::new(EchoModel {
            seen: Mutex::new(vec![]),
        });
        let llm = AgentLLM::new(model.clone(), use_system_message, GenerationConfig::default());
        (model, llm)
    }

    fn write_pattern(root: &Path, name: &str, prompt: &str) {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(SYSTEM_PROMPT_FILE), prompt).unwrap();
    }

    #[test]
    fn test_describe_prefers_identity_section() {
        let prompt = "# IDENTITY and PURPOSE\n\nYou extract surprising ideas.\n\n# STEPS\n\n- Read";
        assert_eq!(describe("x", prompt), "You extract surprising ideas.");
    }

    #[test]
    fn test_describe_falls_back() {
        assert_eq!(describe("x", "# STEPS\n\nSummarize it."), "Summarize it.");
        assert_eq!(describe("x", "# ONLY HEADINGS"), "Fabric pattern x");
    }

    #[test]
    fn test_valid_tool_names() {
        assert!(is_valid_tool_name("extract_wisdom"));
        assert!(is_valid_tool_name("create-5-sentence-summary"));
        assert!(!is_valid_tool_name("has space"));
        assert!(!is_valid_tool_name(""));
        assert!(!is_valid_tool_name(&"a".repeat(65)));
    }

    #[test]
    fn test_schema_has_input_text() {
        let schema = &*FABRIC_TOOL_SCHEMA;
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["input_text"]["type"], "string");
        assert_eq!(schema["required"][0], "input_text");
        assert!(schema.get("$schema").is_none());
    }

    #[tokio::test]
    async fn test_pattern_tool_sends_prompt_and_input() {
        let (model, llm) = echo_llm(true);
        let tool = FabricPatternTool::new(FabricPattern::new("summarize", "SUMMARIZE"), llm);

        let result = tool
            .execute(json!({"input_text": "long text"}))
            .await
            .unwrap();
        assert_eq!(result, json!("SUMMARIZE | long text"));

        let seen = model.seen.lock().unwrap();
        assert_eq!(seen[0][0].role, ROLE_SYSTEM);
        assert_eq!(seen[0][1].role, ROLE_USER);
    }

    #[tokio::test]
    async fn test_pattern_tool_without_system_message() {
        let (model, llm) = echo_llm(false);
        let tool = FabricPatternTool::new(FabricPattern::new("summarize", "SUMMARIZE"), llm);
        tool.execute(json!({"input_text": "x"})).await.unwrap();
        assert_eq!(model.seen.lock().unwrap()[0][0].role, ROLE_USER);
    }

    #[tokio::test]
    async fn test_pattern_tool_rejects_bad_args() {
        let (_, llm) = echo_llm(true);
        let tool = FabricPatternTool::new(FabricPattern::new("summarize", "S"), llm);
        assert!(tool.execute(json!({"text": "wrong key"})).await.is_err());
    }

    #[test]
    fn test_load_sorted_and_filtered() {
        let dir = TempDir::new().unwrap();
        write_pattern(dir.path(), "summarize", "# IDENTITY\nSummarizes.");
        write_pattern(dir.path(), "extract_wisdom", "# IDENTITY\nExtracts wisdom.");
        write_pattern(dir.path(), "bad name", "# IDENTITY\nInvalid.");
        fs::create_dir_all(dir.path().join("no_prompt")).unwrap();

        let (_, llm) = echo_llm(true);
        let tools = FabricTools::load(dir.path(), llm.clone(), &PatternFilter::default()).unwrap();
        assert_eq!(tools.names(), vec!["extract_wisdom", "summarize"]);
        assert_eq!(tools.get_fabric_tools()[1].description(), "Summarizes.");

        let filter = PatternFilter::new(vec![], vec!["summarize".to_string()]).unwrap();
        let tools = FabricTools::load(dir.path(), llm, &filter).unwrap();
        assert_eq!(tools.names(), vec!["extract_wisdom"]);
    }

    #[test]
    fn test_load_errors() {
        let (_, llm) = echo_llm(true);
        let missing = FabricTools::load(
            Path::new("/definitely/not/here"),
            llm.clone(),
            &PatternFilter::default(),
        );
        assert!(matches!(missing, Err(FabricAgentError::Config(_))));

        let dir = TempDir::new().unwrap();
        write_pattern(dir.path(), "summarize", "S");
        let filter = PatternFilter::new(vec!["other".to_string()], vec![]).unwrap();
        let empty = FabricTools::load(dir.path(), llm, &filter);
        assert!(matches!(empty, Err(FabricAgentError::Config(_))));
    }

    #[cfg(target_os = "linux")]
    #[test]
    fn test_load_skips_non_utf8_pattern_dir() {
        use std::os::unix::ffi::OsStrExt;

        let dir = TempDir::new().unwrap();
        write_pattern(dir.path(), "summarize", "# IDENTITY\nSummarizes.");
        let bad = dir.path().join(OsStr::from_bytes(b"bad\xffname"));
        fs::create_dir_all(&bad).unwrap();
        fs::write(bad.join(SYSTEM_PROMPT_FILE), "Invalid.").unwrap();

        let (_, llm) = echo_llm(true);
        let tools = FabricTools::load(dir.path(), llm, &PatternFilter::default()).unwrap();
        assert_eq!(tools.names(), vec!["summarize"]);
    }

    #[test]
    fn test_load_truncates_to_max_tools() {
        let dir = TempDir::new().unwrap();
        for i in 0..(MAX_TOOLS + 2) {
            write_pattern(dir.path(), &format!("pattern_{:03}", i), "P");
        }
        let (_, llm) = echo_llm(true);
        let tools = FabricTools::load(dir.path(), llm, &PatternFilter::default()).unwrap();
        assert_eq!(tools.len(), MAX_TOOLS);
        assert_eq!(tools.names()[0], "pattern_000");
    }
}
