// K-means clustering over an embedding matrix.
//
// Thin wrapper around linfa's KMeans: fits the model with a generator forked
// from the caller's, then predicts a label for every row. The result is a
// throwaway `Clustering` value; nothing is cached between sampling calls.

use linfa::traits::{Fit, PredictInplace};
use linfa::DatasetBase;
use linfa_clustering::KMeans;
use ndarray::{Array1, Array2, ArrayView1, ArrayView2, Axis};
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::error::SamplingError;
use super::strategy::SampleRng;

const KMEANS_MAX_ITERATIONS: u64 = 300;
const KMEANS_TOLERANCE: f64 = 1e-4;

/// Cluster labels for every embedding plus one centroid per cluster.
#[derive(Debug, Clone)]
pub struct Clustering {
    labels: Vec<usize>,
    centroids: Array2<f64>,
}

impl Clustering {
    pub fn n_clusters(&self) -> usize {
        self.centroids.nrows()
    }

    /// Cluster label of each embedding row, in row order.
    pub fn labels(&self) -> &[usize] {
        &self.labels
    }

    pub fn centroids(&self) -> ArrayView2<'_, f64> {
        self.centroids.view()
    }

    pub fn centroid(&self, label: usize) -> ArrayView1<'_, f64> {
        self.centroids.row(label)
    }

    /// Row indices assigned to `label`, ascending.
    pub fn members(&self, label: usize) -> Vec<usize> {
        self.labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of members per cluster, indexed by label. Empty clusters count 0.
    pub fn counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.n_clusters()];
        for &label in &self.labels {
            counts[label] += 1;
        }
        counts
    }
}

/// Partition `embeddings` into `n_clusters` groups with k-means.
///
/// Deterministic for a given generator state: the model's initialisation is
/// seeded from one draw of `rng`.
pub fn kmeans(
    embeddings: ArrayView2<'_, f64>,
    n_clusters: usize,
    rng: &mut SampleRng,
) -> Result<Clustering, SamplingError> {
    let n_samples = embeddings.nrows();
    if n_samples == 0 {
        return Err(SamplingError::EmptyEmbeddings);
    }
    if n_clusters == 0 {
        return Err(SamplingError::InvalidParameter(
            "n_clusters must be at least 1".to_string(),
        ));
    }
    if n_clusters > n_samples {
        return Err(SamplingError::Clustering(format!(
            "n_clusters ({n_clusters}) exceeds the number of embeddings ({n_samples})"
        )));
    }

    let records = embeddings.to_owned();
    let dataset = DatasetBase::from(records.clone());

    let model = KMeans::params_with_rng(n_clusters, SampleRng::seed_from_u64(rng.gen()))
        .max_n_iterations(KMEANS_MAX_ITERATIONS)
        .tolerance(KMEANS_TOLERANCE)
        .fit(&dataset)
        .map_err(|e| {
            SamplingError::Clustering(format!(
                "failed to cluster {n_samples} embeddings into {n_clusters} clusters: {e}"
            ))
        })?;

    let mut assignments = Array1::<usize>::zeros(n_samples);
    model.predict_inplace(&records, &mut assignments);

    // Centroids are the exact member means; linfa stops within tolerance.
    let labels = assignments.to_vec();
    let mut centroids = model.centroids().to_owned();
    for (label, mut centroid) in centroids.axis_iter_mut(Axis(0)).enumerate() {
        let members: Vec<usize> = labels
            .iter()
            .enumerate()
            .filter(|(_, &l)| l == label)
            .map(|(i, _)| i)
            .collect();
        if let Some(mean) = embeddings.select(Axis(0), &members).mean_axis(Axis(0)) {
            centroid.assign(&mean);
        }
    }

    let clustering = Clustering { labels, centroids };

    debug!(
        n_samples,
        n_clusters,
        sizes = ?clustering.counts(),
        "Fitted k-means"
    );

    Ok(clustering)
}
