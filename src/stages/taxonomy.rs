// Prompt-driven taxonomy generation.
//
// Two methods:
//   direct    — one prompt over every sampled document, asking for up to
//               `n_taxonomy` category names
//   iterative — label each document on its own, then ask the oracle to merge
//               the labels into at most `n_taxonomy` categories
//
// `direct` is one call and works well for short documents; `iterative` costs
// one call per document plus one, and copes with samples too large to fit in
// a single prompt.

use anyhow::{Context as _, Result};
use tracing::{debug, info};

use super::prompt::{bulleted, first_item, numbered_documents, parse_list, MAX_DOCUMENT_CHARS};
use super::traits::{Taxonomy, TaxonomyStage};
use crate::llm::LlmOracle;
use crate::output::truncate_chars;

/// Default taxonomy stage backed by the oracle.
#[derive(Debug, Default, Clone, Copy)]
pub struct LlmTaxonomy;

impl TaxonomyStage for LlmTaxonomy {
    fn build(
        &self,
        documents: &[String],
        oracle: &dyn LlmOracle,
        method: &str,
        n_taxonomy: usize,
    ) -> Result<Taxonomy> {
        if documents.is_empty() {
            anyhow::bail!("No documents to build a taxonomy from");
        }
        if n_taxonomy == 0 {
            anyhow::bail!("n_taxonomy must be at least 1");
        }

        let mut categories = match method {
            "direct" => direct(documents, oracle, n_taxonomy)?,
            "iterative" => iterative(documents, oracle, n_taxonomy)?,
            other => anyhow::bail!(
                "Unknown taxonomy method {other:?} (expected \"direct\" or \"iterative\")"
            ),
        };

        if categories.is_empty() {
            anyhow::bail!("Taxonomy response contained no categories");
        }
        categories.truncate(n_taxonomy);

        info!(
            method,
            documents = documents.len(),
            categories = categories.len(),
            "Taxonomy built"
        );

        Ok(Taxonomy {
            method: method.to_string(),
            categories,
        })
    }
}

fn direct(documents: &[String], oracle: &dyn LlmOracle, n_taxonomy: usize) -> Result<Vec<String>> {
    let prompt = format!(
        "You are organising a collection of documents into categories.\n\
         Propose at most {n_taxonomy} short category names that together cover the \
         documents below. Answer with one category name per line and nothing else.\n\n\
         Documents:\n{}",
        numbered_documents(documents)
    );

    let response = oracle.query(&prompt)?;
    Ok(parse_list(&response))
}

fn iterative(
    documents: &[String],
    oracle: &dyn LlmOracle,
    n_taxonomy: usize,
) -> Result<Vec<String>> {
    let mut labels: Vec<String> = Vec::with_capacity(documents.len());

    for (i, doc) in documents.iter().enumerate() {
        let prompt = format!(
            "Give a short category name (at most five words) for the following \
             document. Answer with the category name only.\n\nDocument:\n{}",
            truncate_chars(doc.trim(), MAX_DOCUMENT_CHARS)
        );
        let response = oracle
            .query(&prompt)
            .with_context(|| format!("Failed to label document {}", i + 1))?;

        match first_item(&response) {
            Some(label) => {
                debug!(document = i + 1, label, "Labelled document");
                if !labels.iter().any(|l| l.eq_ignore_ascii_case(&label)) {
                    labels.push(label);
                }
            }
            None => debug!(document = i + 1, "Empty label, skipping"),
        }
    }

    if labels.is_empty() {
        anyhow::bail!("Every document label came back empty");
    }
    if labels.len() <= n_taxonomy {
        return Ok(labels);
    }

    let prompt = format!(
        "Merge the following candidate category names into at most {n_taxonomy} \
         categories. Answer with one category name per line and nothing else.\n\n\
         Candidates:\n{}",
        bulleted(&labels)
    );
    let response = oracle
        .query(&prompt)
        .context("Failed to consolidate document labels")?;
    Ok(parse_list(&response))
}
