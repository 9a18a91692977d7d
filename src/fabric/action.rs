// SPDX-License-Identifier: MIT

//! One action run: input file in, agent graph, output file out

use std::sync::Arc;

use crate::adk::agent::Agent;
use crate::adk::error::FabricAgentError;
use crate::fabric::agents::{AgentBuilder, FabricAgent};
use crate::fabric::config::ActionConfig;
use crate::fabric::llms::LlmProvider;
use crate::fabric::tools::FabricTools;

/// Run the configured agent over the input file and write its answer.
///
/// Returns the text written to `config.output_file`.
pub async fn run(
    config: &ActionConfig,
    provider: Arc<dyn LlmProvider>,
) -> Result<String, FabricAgentError> {
    let kind = config.validate()?;

    let input = tokio::fs::read_to_string(&config.input_file).await?;
    if input.trim().is_empty() {
        return Err(FabricAgentError::config(format!(
            "Input file is empty: {}",
            config.input_file.display()
        )));
    }

    let fabric_llm = provider.create_fabric_llm()?;
    let patterns_dir = config.patterns_dir.clone();
    let pattern_filter = config.pattern_filter.clone();
    // Pattern loading walks the directory with std::fs
    let fabric_tools = tokio::task::spawn_blocking(move || {
        FabricTools::load(&patterns_dir, fabric_llm, &pattern_filter)
    })
    .await
    .map_err(|e| FabricAgentError::other(format!("Pattern loading task failed: {}", e)))??;

    let graph = AgentBuilder::new(kind.as_str(), provider, Arc::new(fabric_tools)).build()?;
    let agent = FabricAgent::new(kind.as_str(), graph, config.max_num_turns);

    log::info!("Running {} agent on {}", agent.name(), config.input_file.display());
    let output = agent.run(input).await?;

    tokio::fs::write(&config.output_file, &output).await?;
    log::info!(
        "Wrote {} bytes to {}",
        output.len(),
        config.output_file.display()
    );

    Ok(output)
}
