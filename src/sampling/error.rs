use thiserror::Error;

/// Errors raised while selecting sample indices.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SamplingError {
    #[error("invalid sampling strategy {0:?} (expected nearest, furthest, random or random_in_cluster)")]
    InvalidStrategy(String),

    #[error("insufficient candidates: requested {requested} neighbours but only {available} points are available")]
    InsufficientCandidates { requested: usize, available: usize },

    #[error("embedding matrix is empty")]
    EmptyEmbeddings,

    #[error("invalid sampling parameter: {0}")]
    InvalidParameter(String),

    #[error("cluster {0} has no members to sample from")]
    EmptyCluster(usize),

    #[error("clustering failed: {0}")]
    Clustering(String),
}
