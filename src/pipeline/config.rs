// Pipeline configuration — one (method, options) pair per stage.
//
// Loaded from JSON by the binary, or built in code. A pipeline keeps its
// configuration for its whole lifetime; nothing here is mutated by a run.

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::sampling::{SamplingParams, Strategy};

/// A stage's method tag and its keyword options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageConfig<M, O> {
    pub method: M,
    #[serde(default)]
    pub options: O,
}

impl<M, O> StageConfig<M, O> {
    pub fn new(method: M, options: O) -> Self {
        Self { method, options }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SamplingOptions {
    /// Points per cluster (total points for the random strategy)
    pub k: usize,
    #[serde(default = "default_n_clusters")]
    pub n_clusters: usize,
    /// Seed for clustering and random draws
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub random_state: Option<u64>,
}

impl Default for SamplingOptions {
    fn default() -> Self {
        Self {
            k: 1,
            n_clusters: default_n_clusters(),
            random_state: None,
        }
    }
}

fn default_n_clusters() -> usize {
    1
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaxonomyOptions {
    /// Maximum number of categories
    pub n_taxonomy: usize,
}

impl Default for TaxonomyOptions {
    fn default() -> Self {
        Self { n_taxonomy: 8 }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResumeOptions {
    /// Maximum number of categories to describe
    pub n_taxonomy: usize,
}

impl Default for ResumeOptions {
    fn default() -> Self {
        Self { n_taxonomy: 8 }
    }
}

/// The context stage takes no options.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextOptions {}

/// Full pipeline configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub sampling: StageConfig<Strategy, SamplingOptions>,
    pub taxonomy: StageConfig<String, TaxonomyOptions>,
    pub resume: StageConfig<String, ResumeOptions>,
    pub context: StageConfig<String, ContextOptions>,
    /// Reserved for a label predictor. Accepted and logged, never executed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub predictor: Option<StageConfig<String, serde_json::Value>>,
}

impl Default for PipelineConfig {
    /// A starter configuration: 4 clusters, 5 nearest documents each,
    /// direct taxonomy of up to 8 categories described one by one.
    fn default() -> Self {
        Self {
            sampling: StageConfig::new(
                Strategy::Nearest,
                SamplingOptions {
                    k: 5,
                    n_clusters: 4,
                    random_state: Some(42),
                },
            ),
            taxonomy: StageConfig::new("direct".to_string(), TaxonomyOptions::default()),
            resume: StageConfig::new("per_topic".to_string(), ResumeOptions::default()),
            context: StageConfig::new("overview".to_string(), ContextOptions::default()),
            predictor: None,
        }
    }
}

impl PipelineConfig {
    /// Load a configuration from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read pipeline config {}", path.display()))?;
        serde_json::from_str(&raw)
            .with_context(|| format!("Invalid pipeline config {}", path.display()))
    }

    /// Write the configuration as pretty-printed JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json + "\n")
            .with_context(|| format!("Failed to write pipeline config {}", path.display()))
    }

    /// Parameters for the sampling stage.
    pub fn sampling_params(&self) -> SamplingParams {
        let options = &self.sampling.options;
        SamplingParams {
            k: options.k,
            n_clusters: options.n_clusters,
            strategy: self.sampling.method,
            random_state: options.random_state,
        }
    }
}
