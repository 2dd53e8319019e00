// Prompt-driven category descriptions ("resume").
//
//   per_topic — one description prompt per category
//   combined  — one prompt for all categories, answered as `name: description`
//               lines

use anyhow::{Context as _, Result};
use tracing::info;

use super::prompt::{bulleted, split_labelled};
use super::traits::{Resume, ResumeStage, Taxonomy, TopicSummary};
use crate::llm::LlmOracle;

/// Default resume stage backed by the oracle.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmResume;

impl ResumeStage for LlmResume {
    fn summarize(
        &self,
        taxonomy: &Taxonomy,
        oracle: &dyn LlmOracle,
        method: &str,
        n_taxonomy: usize,
    ) -> Result<Resume> {
        if taxonomy.categories.is_empty() {
            anyhow::bail!("Taxonomy has no categories to describe");
        }
        if n_taxonomy == 0 {
            anyhow::bail!("n_taxonomy must be at least 1");
        }

        let limit = n_taxonomy.min(taxonomy.categories.len());
        let categories = &taxonomy.categories[..limit];

        let topics = match method {
            "per_topic" => per_topic(categories, &taxonomy.categories, oracle)?,
            "combined" => combined(categories, oracle)?,
            other => anyhow::bail!(
                "Unknown resume method {other:?} (expected \"per_topic\" or \"combined\")"
            ),
        };

        info!(method, topics = topics.len(), "Resume built");

        Ok(Resume {
            method: method.to_string(),
            topics,
        })
    }
}

fn per_topic(
    categories: &[String],
    all_categories: &[String],
    oracle: &dyn LlmOracle,
) -> Result<Vec<TopicSummary>> {
    let siblings = all_categories.join(", ");
    let mut topics = Vec::with_capacity(categories.len());

    for category in categories {
        let prompt = format!(
            "A document taxonomy contains these categories: {siblings}.\n\
             Write a one-paragraph description of the category \"{category}\" that \
             explains what belongs in it and how it differs from the others. \
             Answer with the description only."
        );
        let response = oracle
            .query(&prompt)
            .with_context(|| format!("Failed to describe category {category:?}"))?;

        let summary = response.trim();
        if summary.is_empty() {
            anyhow::bail!("Empty description for category {category:?}");
        }
        topics.push(TopicSummary {
            category: category.clone(),
            summary: summary.to_string(),
        });
    }

    Ok(topics)
}

fn combined(categories: &[String], oracle: &dyn LlmOracle) -> Result<Vec<TopicSummary>> {
    let prompt = format!(
        "Describe each of the following document categories in one sentence.\n\
         Answer with one line per category in the form `category: description` \
         and nothing else.\n\nCategories:\n{}",
        bulleted(categories)
    );
    let response = oracle.query(&prompt)?;

    let described: Vec<(String, String)> = response.lines().filter_map(split_labelled).collect();

    categories
        .iter()
        .map(|category| {
            described
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(category))
                .map(|(_, summary)| TopicSummary {
                    category: category.clone(),
                    summary: summary.clone(),
                })
                .ok_or_else(|| anyhow::anyhow!("Response did not describe category {category:?}"))
        })
        .collect()
}
