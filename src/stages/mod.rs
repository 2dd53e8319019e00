// Pipeline stages after sampling: taxonomy -> resume -> context.
//
// The orchestrator only knows the three stage traits. The Llm* types are the
// default prompt-driven implementations; swap in your own to change how a
// stage talks to the oracle without touching the pipeline.

pub mod context;
pub mod prompt;
pub mod resume;
pub mod taxonomy;
pub mod traits;

pub use context::LlmContext;
pub use resume::LlmResume;
pub use taxonomy::LlmTaxonomy;
pub use traits::{Context, ContextStage, Resume, ResumeStage, Taxonomy, TaxonomyStage, TopicSummary};
