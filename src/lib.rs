// Taxon: sample representative documents from an embedding space and build
// a taxonomy of them with an LLM.
//
// This is the library root. Each module corresponds to one part of the
// sampling -> taxonomy -> resume -> context pipeline.

pub mod config;
pub mod input;
pub mod llm;
pub mod output;
pub mod pipeline;
pub mod sampling;
pub mod stages;
