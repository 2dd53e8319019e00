// Prompt-driven context: one paragraph describing the domain the taxonomy covers.

use anyhow::Result;
use tracing::info;

use super::traits::{Context, ContextStage, Resume};
use crate::llm::LlmOracle;

/// Default context stage backed by the oracle. Supports the `overview` method.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmContext;

impl ContextStage for LlmContext {
    fn contextualize(
        &self,
        resume: &Resume,
        oracle: &dyn LlmOracle,
        method: &str,
    ) -> Result<Context> {
        if method != "overview" {
            anyhow::bail!("Unknown context method {method:?} (expected \"overview\")");
        }
        if resume.topics.is_empty() {
            anyhow::bail!("Resume has no topics to contextualize");
        }

        let described = resume
            .topics
            .iter()
            .map(|t| format!("- {}: {}", t.category, t.summary))
            .collect::<Vec<_>>()
            .join("\n");

        let prompt = format!(
            "The following categories and descriptions were derived from a sample \
             of documents.\n\n{described}\n\n\
             In two or three sentences, describe the domain these documents come \
             from and what distinguishes the categories. Answer with the description only."
        );

        let response = oracle.query(&prompt)?;
        let description = response.trim();
        if description.is_empty() {
            anyhow::bail!("Context response was empty");
        }

        info!(method, chars = description.len(), "Context built");

        Ok(Context {
            method: method.to_string(),
            description: description.to_string(),
        })
    }
}
