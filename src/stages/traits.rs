// Stage traits and the results they hand to each other.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::llm::LlmOracle;

/// Categories proposed for the sampled documents.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Taxonomy {
    /// Method tag that produced this taxonomy
    pub method: String,
    /// Category names, most prominent first
    pub categories: Vec<String>,
}

/// A description of one taxonomy category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSummary {
    pub category: String,
    pub summary: String,
}

/// Per-category descriptions built from a taxonomy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resume {
    pub method: String,
    pub topics: Vec<TopicSummary>,
}

/// A short description of the domain the categories cover.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    pub method: String,
    pub description: String,
}

/// Builds a taxonomy from the sampled documents.
pub trait TaxonomyStage: Send + Sync {
    fn build(
        &self,
        documents: &[String],
        oracle: &dyn LlmOracle,
        method: &str,
        n_taxonomy: usize,
    ) -> Result<Taxonomy>;
}

/// Describes each category of a taxonomy.
pub trait ResumeStage: Send + Sync {
    fn summarize(
        &self,
        taxonomy: &Taxonomy,
        oracle: &dyn LlmOracle,
        method: &str,
        n_taxonomy: usize,
    ) -> Result<Resume>;
}

/// Turns category descriptions into an overall context.
pub trait ContextStage: Send + Sync {
    fn contextualize(&self, resume: &Resume, oracle: &dyn LlmOracle, method: &str)
        -> Result<Context>;
}
