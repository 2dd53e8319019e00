// The pipeline orchestrator: sample -> taxonomy -> resume -> context.
//
// Stages run strictly in sequence on the calling thread. Each run returns
// its own immutable record, so one Pipeline can be shared and run from
// several threads without the runs seeing each other's results. A failed
// run returns whatever it produced before the failure.

use chrono::{DateTime, TimeDelta, Utc};
use ndarray::ArrayView2;
use serde::{Serialize, Serializer};
use tracing::{info, warn};

use super::config::PipelineConfig;
use super::error::{PipelineError, RunFailure, Stage};
use crate::llm::LlmOracle;
use crate::sampling;
use crate::stages::{
    Context, ContextStage, LlmContext, LlmResume, LlmTaxonomy, Resume, ResumeStage, Taxonomy,
    TaxonomyStage,
};

/// Everything one successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    /// Sampled document indices, in sampling order (duplicates kept)
    pub samples: Vec<usize>,
    pub taxonomy: Taxonomy,
    pub resume: Resume,
    pub context: Context,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    /// `finished_at - started_at`
    #[serde(rename = "duration_ms", serialize_with = "serialize_millis")]
    pub duration: TimeDelta,
}

/// What a failed run got through before stopping.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PartialRun {
    pub samples: Option<Vec<usize>>,
    pub taxonomy: Option<Taxonomy>,
    pub resume: Option<Resume>,
    pub started_at: DateTime<Utc>,
}

impl PartialRun {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            ..Self::default()
        }
    }

    /// Wrap `error` into a failure carrying the results gathered so far.
    fn halt(&mut self, error: PipelineError) -> RunFailure {
        let stage = error.stage();
        warn!(stage = %stage, error = %error, "Pipeline halted");
        RunFailure {
            stage,
            error,
            partial: Box::new(std::mem::take(self)),
        }
    }
}

fn serialize_millis<S: Serializer>(duration: &TimeDelta, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_i64(duration.num_milliseconds())
}

/// Runs the configured stages over a document collection.
pub struct Pipeline {
    config: PipelineConfig,
    taxonomy: Box<dyn TaxonomyStage>,
    resume: Box<dyn ResumeStage>,
    context: Box<dyn ContextStage>,
}

impl Pipeline {
    /// A pipeline using the default prompt-driven stages.
    pub fn new(config: PipelineConfig) -> Self {
        Self::with_stages(
            config,
            Box::new(LlmTaxonomy),
            Box::new(LlmResume),
            Box::new(LlmContext),
        )
    }

    /// A pipeline with caller-supplied stage implementations.
    pub fn with_stages(
        config: PipelineConfig,
        taxonomy: Box<dyn TaxonomyStage>,
        resume: Box<dyn ResumeStage>,
        context: Box<dyn ContextStage>,
    ) -> Self {
        Self {
            config,
            taxonomy,
            resume,
            context,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Run every stage once over `documents`.
    ///
    /// `embeddings` row `i` must be the embedding of `documents[i]`. The
    /// oracle is called synchronously by each stage; its failures surface as
    /// `PipelineError::OracleFailure`.
    pub fn run(
        &self,
        embeddings: ArrayView2<'_, f64>,
        documents: &[String],
        oracle: &dyn LlmOracle,
    ) -> Result<PipelineRun, RunFailure> {
        let started_at = Utc::now();
        let mut partial = PartialRun::new(started_at);
        let config = &self.config;

        if embeddings.nrows() != documents.len() {
            return Err(partial.halt(PipelineError::DocumentCountMismatch {
                embeddings: embeddings.nrows(),
                documents: documents.len(),
            }));
        }

        if let Some(predictor) = &config.predictor {
            warn!(
                method = predictor.method,
                "Predictor stage is configured but not supported, skipping"
            );
        }

        // Sampling
        let samples = sampling::sample(embeddings, &config.sampling_params())
            .map_err(|e| partial.halt(e.into()))?;
        info!(
            strategy = %config.sampling.method,
            samples = samples.len(),
            "Sampling complete"
        );
        partial.samples = Some(samples.clone());

        let sampled_docs: Vec<String> = samples.iter().map(|&i| documents[i].clone()).collect();

        // Taxonomy
        let taxonomy = self
            .taxonomy
            .build(
                &sampled_docs,
                oracle,
                &config.taxonomy.method,
                config.taxonomy.options.n_taxonomy,
            )
            .map_err(|e| partial.halt(PipelineError::from_stage(Stage::Taxonomy, e)))?;
        partial.taxonomy = Some(taxonomy.clone());

        // Resume
        let resume = self
            .resume
            .summarize(
                &taxonomy,
                oracle,
                &config.resume.method,
                config.resume.options.n_taxonomy,
            )
            .map_err(|e| partial.halt(PipelineError::from_stage(Stage::Resume, e)))?;
        partial.resume = Some(resume.clone());

        // Context
        let context = self
            .context
            .contextualize(&resume, oracle, &config.context.method)
            .map_err(|e| partial.halt(PipelineError::from_stage(Stage::Context, e)))?;

        let finished_at = Utc::now();
        let duration = finished_at - started_at;

        info!(
            samples = samples.len(),
            categories = taxonomy.categories.len(),
            duration_ms = duration.num_milliseconds(),
            "Pipeline run complete"
        );

        Ok(PipelineRun {
            samples,
            taxonomy,
            resume,
            context,
            started_at,
            finished_at,
            duration,
        })
    }
}
