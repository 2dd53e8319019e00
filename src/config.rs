use std::env;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::llm::openai::DEFAULT_BASE_URL;

/// Default chat model when TAXON_LLM_MODEL is unset.
pub const DEFAULT_MODEL: &str = "gpt-4o-mini";

/// Default per-request timeout for the LLM API, in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Central configuration loaded from environment variables.
///
/// All secrets come from env vars (never hardcoded). The .env file
/// is loaded automatically at startup via dotenvy. Pipeline stage settings
/// live in the pipeline configuration file, not here.
pub struct Config {
    /// Base URL of an OpenAI-compatible API (TAXON_LLM_URL)
    pub llm_url: String,
    /// Bearer token for the LLM API (TAXON_LLM_API_KEY). May be empty for
    /// local servers that don't check it.
    pub llm_api_key: String,
    /// Chat model name (TAXON_LLM_MODEL)
    pub llm_model: String,
    /// Per-request timeout (TAXON_LLM_TIMEOUT_SECS)
    pub llm_timeout: Duration,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        let timeout_secs = match env::var("TAXON_LLM_TIMEOUT_SECS") {
            Ok(raw) => raw
                .trim()
                .parse::<u64>()
                .with_context(|| format!("TAXON_LLM_TIMEOUT_SECS is not a number: {raw:?}"))?,
            Err(_) => DEFAULT_TIMEOUT_SECS,
        };

        Ok(Self {
            llm_url: env::var("TAXON_LLM_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string()),
            llm_api_key: env::var("TAXON_LLM_API_KEY").unwrap_or_default(),
            llm_model: env::var("TAXON_LLM_MODEL").unwrap_or_else(|_| DEFAULT_MODEL.to_string()),
            llm_timeout: Duration::from_secs(timeout_secs),
        })
    }

    /// Check that the LLM API is usable.
    /// The hosted default endpoint needs a key; custom endpoints may not.
    pub fn require_llm(&self) -> Result<()> {
        if self.llm_url.trim().is_empty() {
            anyhow::bail!(
                "TAXON_LLM_URL is empty. Set it to an OpenAI-compatible base URL\n\
                 (e.g. http://localhost:11434/v1) or unset it to use {DEFAULT_BASE_URL}."
            );
        }
        if self.llm_url.trim_end_matches('/') == DEFAULT_BASE_URL && self.llm_api_key.is_empty() {
            anyhow::bail!(
                "TAXON_LLM_API_KEY not set. Add it to your .env file, or point\n\
                 TAXON_LLM_URL at a local server that doesn't need one."
            );
        }
        Ok(())
    }
}
