use std::fmt;

use thiserror::Error;

use super::run::PartialRun;
use crate::llm::OracleError;
use crate::sampling::SamplingError;

/// The pipeline's steps, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Sampling,
    Taxonomy,
    Resume,
    Context,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Sampling => "sampling",
            Stage::Taxonomy => "taxonomy",
            Stage::Resume => "resume",
            Stage::Context => "context",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a pipeline run stopped.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("embeddings have {embeddings} rows but {documents} documents were supplied")]
    DocumentCountMismatch { embeddings: usize, documents: usize },

    #[error("sampling failed: {0}")]
    Sampling(#[from] SamplingError),

    #[error("LLM oracle failed during the {stage} stage: {error:#}")]
    OracleFailure { stage: Stage, error: anyhow::Error },

    #[error("{stage} stage failed: {error:#}")]
    StageFailure { stage: Stage, error: anyhow::Error },
}

impl PipelineError {
    /// Classify an error returned by a stage implementation.
    ///
    /// Anything with an `OracleError` in its chain is an oracle failure,
    /// however much context the stage wrapped around it.
    pub fn from_stage(stage: Stage, error: anyhow::Error) -> Self {
        let from_oracle = error
            .chain()
            .any(|cause| cause.downcast_ref::<OracleError>().is_some());

        if from_oracle {
            PipelineError::OracleFailure { stage, error }
        } else {
            PipelineError::StageFailure { stage, error }
        }
    }

    /// The stage the error was raised in.
    pub fn stage(&self) -> Stage {
        match self {
            PipelineError::DocumentCountMismatch { .. } | PipelineError::Sampling(_) => {
                Stage::Sampling
            }
            PipelineError::OracleFailure { stage, .. } | PipelineError::StageFailure { stage, .. } => {
                *stage
            }
        }
    }

    pub fn is_oracle_failure(&self) -> bool {
        matches!(self, PipelineError::OracleFailure { .. })
    }
}

/// A failed run: the error plus everything produced before it.
#[derive(Error, Debug)]
#[error("pipeline halted at the {stage} stage")]
pub struct RunFailure {
    pub stage: Stage,
    #[source]
    pub error: PipelineError,
    pub partial: Box<PartialRun>,
}
