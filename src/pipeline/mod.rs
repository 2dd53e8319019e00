// Pipeline — sample documents, then build taxonomy, resume and context with the LLM.

pub mod config;
pub mod error;
pub mod run;

pub use config::{
    ContextOptions, PipelineConfig, ResumeOptions, SamplingOptions, StageConfig, TaxonomyOptions,
};
pub use error::{PipelineError, RunFailure, Stage};
pub use run::{PartialRun, Pipeline, PipelineRun};
