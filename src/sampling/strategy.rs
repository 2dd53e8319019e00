// Sampling strategies and the dispatch entry point.
//
// Each strategy is a unit struct implementing `SamplingStrategy`; the
// `Strategy` tag maps onto one of them. Adding a strategy means adding a tag
// variant and an implementation — `sample` itself never branches on the tag.

use std::fmt;
use std::str::FromStr;

use ndarray::ArrayView2;
use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256Plus;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::cluster;
use super::error::SamplingError;
use super::neighbors;

/// Generator threaded through clustering and random draws.
pub type SampleRng = Xoshiro256Plus;

/// Which point-selection policy to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Strategy {
    /// The `k` points closest to each cluster centroid
    Nearest,
    /// The `k` points just past each cluster's own population, most distant first
    Furthest,
    /// `k` points drawn uniformly with replacement, no clustering
    Random,
    /// `k` points drawn with replacement from each cluster's members
    RandomInCluster,
}

impl Strategy {
    pub const ALL: [Strategy; 4] = [
        Strategy::Nearest,
        Strategy::Furthest,
        Strategy::Random,
        Strategy::RandomInCluster,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Strategy::Nearest => "nearest",
            Strategy::Furthest => "furthest",
            Strategy::Random => "random",
            Strategy::RandomInCluster => "random_in_cluster",
        }
    }

    /// The implementation behind this tag.
    pub fn implementation(self) -> &'static dyn SamplingStrategy {
        match self {
            Strategy::Nearest => &NearestToCentroid,
            Strategy::Furthest => &ClusterBorder,
            Strategy::Random => &UniformRandom,
            Strategy::RandomInCluster => &RandomInCluster,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Strategy {
    type Err = SamplingError;

    /// Accepts the canonical names plus the short `k*` tags
    /// (`knear`, `kborder`, `krandom`, `krcluster`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nearest" | "knear" => Ok(Strategy::Nearest),
            "furthest" | "border" | "kborder" => Ok(Strategy::Furthest),
            "random" | "krandom" => Ok(Strategy::Random),
            "random_in_cluster" | "random-in-cluster" | "krcluster" => {
                Ok(Strategy::RandomInCluster)
            }
            _ => Err(SamplingError::InvalidStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for Strategy {
    type Error = SamplingError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Strategy> for String {
    fn from(strategy: Strategy) -> Self {
        strategy.as_str().to_string()
    }
}

/// Parameters for one `sample` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SamplingParams {
    /// Points per cluster (or in total, for `Strategy::Random`)
    pub k: usize,
    /// Number of k-means clusters; ignored by `Strategy::Random`
    pub n_clusters: usize,
    pub strategy: Strategy,
    /// Seed for clustering and random draws. `None` draws a fresh seed.
    pub random_state: Option<u64>,
}

impl SamplingParams {
    pub fn new(k: usize, n_clusters: usize, strategy: Strategy) -> Self {
        Self {
            k,
            n_clusters,
            strategy,
            random_state: None,
        }
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = Some(seed);
        self
    }
}

/// A point-selection policy over an embedding matrix.
pub trait SamplingStrategy: Send + Sync {
    /// Select sample indices. Every returned index is a valid row of `embeddings`.
    fn select(
        &self,
        embeddings: ArrayView2<'_, f64>,
        k: usize,
        n_clusters: usize,
        rng: &mut SampleRng,
    ) -> Result<Vec<usize>, SamplingError>;
}

/// Sample indices from `embeddings` according to `params`.
///
/// The generator is seeded from `params.random_state` when set, so repeated
/// calls with the same seed and inputs return the same indices for every
/// strategy.
pub fn sample(
    embeddings: ArrayView2<'_, f64>,
    params: &SamplingParams,
) -> Result<Vec<usize>, SamplingError> {
    let seed = params.random_state.unwrap_or_else(rand::random);
    debug!(seed, seeded = params.random_state.is_some(), "Seeding sampler");

    let mut rng = SampleRng::seed_from_u64(seed);
    sample_with_rng(
        embeddings,
        params.k,
        params.n_clusters,
        params.strategy,
        &mut rng,
    )
}

/// Like `sample`, with a caller-owned generator.
pub fn sample_with_rng(
    embeddings: ArrayView2<'_, f64>,
    k: usize,
    n_clusters: usize,
    strategy: Strategy,
    rng: &mut SampleRng,
) -> Result<Vec<usize>, SamplingError> {
    if embeddings.nrows() == 0 {
        return Err(SamplingError::EmptyEmbeddings);
    }
    if k == 0 {
        return Err(SamplingError::InvalidParameter(
            "k must be at least 1".to_string(),
        ));
    }

    let ids = strategy
        .implementation()
        .select(embeddings, k, n_clusters, rng)?;

    debug!(
        strategy = %strategy,
        k,
        n_clusters,
        selected = ids.len(),
        "Sampled embeddings"
    );

    Ok(ids)
}

/// Nearest-to-centroid: for each centroid, the `k` closest embeddings
/// overall (not only that cluster's members), in cluster order.
pub struct NearestToCentroid;

impl SamplingStrategy for NearestToCentroid {
    fn select(
        &self,
        embeddings: ArrayView2<'_, f64>,
        k: usize,
        n_clusters: usize,
        rng: &mut SampleRng,
    ) -> Result<Vec<usize>, SamplingError> {
        let clustering = cluster::kmeans(embeddings, n_clusters, rng)?;
        let hits = neighbors::k_nearest_batch(embeddings, clustering.centroids(), k)?;
        Ok(hits.into_iter().flatten().collect())
    }
}

/// Cluster border: for cluster `c` with `count_c` members, rank the
/// `count_c + k` embeddings nearest its centroid, reverse, keep `k`.
///
/// The window scales with the cluster's population, so the picks sit just
/// outside (or on the rim of) the cluster rather than at a fixed radius.
pub struct ClusterBorder;

impl SamplingStrategy for ClusterBorder {
    fn select(
        &self,
        embeddings: ArrayView2<'_, f64>,
        k: usize,
        n_clusters: usize,
        rng: &mut SampleRng,
    ) -> Result<Vec<usize>, SamplingError> {
        let clustering = cluster::kmeans(embeddings, n_clusters, rng)?;
        let counts = clustering.counts();

        let mut ids = Vec::with_capacity(n_clusters * k);
        for (label, count) in counts.into_iter().enumerate() {
            let mut window =
                neighbors::k_nearest(embeddings, clustering.centroid(label), count + k)?;
            window.reverse();
            window.truncate(k);
            ids.extend(window);
        }
        Ok(ids)
    }
}

/// `k` indices uniform over all rows, with replacement.
pub struct UniformRandom;

impl SamplingStrategy for UniformRandom {
    fn select(
        &self,
        embeddings: ArrayView2<'_, f64>,
        k: usize,
        _n_clusters: usize,
        rng: &mut SampleRng,
    ) -> Result<Vec<usize>, SamplingError> {
        let n = embeddings.nrows();
        Ok((0..k).map(|_| rng.gen_range(0..n)).collect())
    }
}

/// `k` indices per cluster, drawn with replacement from its own members.
pub struct RandomInCluster;

impl SamplingStrategy for RandomInCluster {
    fn select(
        &self,
        embeddings: ArrayView2<'_, f64>,
        k: usize,
        n_clusters: usize,
        rng: &mut SampleRng,
    ) -> Result<Vec<usize>, SamplingError> {
        let clustering = cluster::kmeans(embeddings, n_clusters, rng)?;

        let mut ids = Vec::with_capacity(n_clusters * k);
        for label in 0..clustering.n_clusters() {
            let members = clustering.members(label);
            if members.is_empty() {
                return Err(SamplingError::EmptyCluster(label));
            }
            ids.extend((0..k).map(|_| members[rng.gen_range(0..members.len())]));
        }
        Ok(ids)
    }
}
