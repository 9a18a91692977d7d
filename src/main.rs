// SPDX-License-Identifier: MIT

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;

use fabric_agent_rs::fabric::action;
use fabric_agent_rs::fabric::config::{
    parse_pattern_list, ActionConfig, LlmConfig, ModelSpec, PatternFilter,
};
use fabric_agent_rs::fabric::llms::{ConfiguredLlmProvider, LlmProviderKind};

/// Run a Fabric pattern agent over an input file.
///
/// Every flag can also be set through its `INPUT_*` environment variable.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File holding the instruction and input text
    #[arg(long, env = "INPUT_INPUT_FILE")]
    input_file: PathBuf,

    /// Where the agent's answer is written
    #[arg(long, env = "INPUT_OUTPUT_FILE")]
    output_file: PathBuf,

    /// router, react, react_issue or react_pr
    #[arg(long, env = "INPUT_AGENT_TYPE", default_value = "router")]
    agent_type: String,

    #[arg(long, env = "INPUT_AGENT_PROVIDER", default_value = "openai")]
    agent_provider: LlmProviderKind,

    #[arg(long, env = "INPUT_AGENT_MODEL", default_value = "gpt-4o")]
    agent_model: String,

    #[arg(long, env = "INPUT_AGENT_TEMPERATURE", default_value_t = 0.0)]
    agent_temperature: f32,

    #[arg(long, env = "INPUT_FABRIC_PROVIDER", default_value = "openai")]
    fabric_provider: LlmProviderKind,

    #[arg(long, env = "INPUT_FABRIC_MODEL", default_value = "gpt-4o")]
    fabric_model: String,

    #[arg(long, env = "INPUT_FABRIC_TEMPERATURE", default_value_t = 0.0)]
    fabric_temperature: f32,

    /// Tool responses allowed before ReAct agents stop
    #[arg(long, env = "INPUT_FABRIC_MAX_NUM_TURNS", default_value_t = 10)]
    fabric_max_num_turns: u32,

    #[arg(long, env = "INPUT_FABRIC_PATTERNS_DIR", default_value = "prompts/fabric_patterns")]
    fabric_patterns_dir: PathBuf,

    /// Comma-separated patterns to load (all when empty)
    #[arg(long, env = "INPUT_FABRIC_PATTERNS_INCLUDED", default_value = "")]
    fabric_patterns_included: String,

    /// Comma-separated patterns to skip
    #[arg(long, env = "INPUT_FABRIC_PATTERNS_EXCLUDED", default_value = "")]
    fabric_patterns_excluded: String,

    #[arg(short, long, env = "INPUT_VERBOSE")]
    verbose: bool,

    #[arg(long, env = "INPUT_DEBUG")]
    debug: bool,
}

impl Args {
    fn into_config(self) -> anyhow::Result<ActionConfig> {
        let pattern_filter = PatternFilter::new(
            parse_pattern_list(&self.fabric_patterns_included),
            parse_pattern_list(&self.fabric_patterns_excluded),
        )?;

        Ok(ActionConfig {
            input_file: self.input_file,
            output_file: self.output_file,
            agent_type: self.agent_type,
            max_num_turns: self.fabric_max_num_turns,
            patterns_dir: self.fabric_patterns_dir,
            pattern_filter,
            llm: LlmConfig {
                agent: ModelSpec::new(
                    self.agent_provider,
                    self.agent_model,
                    Some(self.agent_temperature),
                ),
                fabric: ModelSpec::new(
                    self.fabric_provider,
                    self.fabric_model,
                    Some(self.fabric_temperature),
                ),
            },
        })
    }
}

fn init_logging(verbose: bool, debug: bool) {
    let mut builder = env_logger::Builder::from_default_env();
    if debug {
        builder.filter_level(log::LevelFilter::Debug);
    } else if verbose {
        builder.filter_level(log::LevelFilter::Info);
    }
    builder.init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();

    let args = Args::parse();
    init_logging(args.verbose, args.debug);

    let config = args.into_config()?;
    let provider = Arc::new(ConfiguredLlmProvider::new(config.llm.clone()));

    action::run(&config, provider)
        .await
        .with_context(|| format!("Fabric agent action failed ({})", config.agent_type))?;

    Ok(())
}
