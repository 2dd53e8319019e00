// Sampling — pick representative document indices from an embedding space.
//
// Four strategies share one entry point (`sample`). Three of them cluster the
// embeddings with k-means first and then pick points relative to each
// centroid; the fourth draws uniformly at random. Every strategy consumes the
// same seeded generator, so a fixed `random_state` reproduces both the
// clustering and the random draws.

pub mod cluster;
pub mod error;
pub mod neighbors;
pub mod strategy;

pub use error::SamplingError;
pub use strategy::{sample, sample_with_rng, SampleRng, SamplingParams, SamplingStrategy, Strategy};
