// Exact nearest-neighbour search by Euclidean distance.
//
// A linear scan over the whole corpus: sampling queries a handful of
// centroids against at most a few thousand documents, so an index structure
// buys nothing. Ties are broken by row index so results are reproducible.

use std::cmp::Ordering;

use ndarray::{ArrayView1, ArrayView2};

use super::error::SamplingError;

/// Return the indices of the `k` corpus rows closest to `query`, nearest first.
///
/// Fails with `InsufficientCandidates` when `k` exceeds the corpus size.
pub fn k_nearest(
    corpus: ArrayView2<'_, f64>,
    query: ArrayView1<'_, f64>,
    k: usize,
) -> Result<Vec<usize>, SamplingError> {
    let available = corpus.nrows();
    if k > available {
        return Err(SamplingError::InsufficientCandidates {
            requested: k,
            available,
        });
    }
    if query.len() != corpus.ncols() {
        return Err(SamplingError::InvalidParameter(format!(
            "query has {} dimensions but the corpus has {}",
            query.len(),
            corpus.ncols()
        )));
    }

    let mut scored: Vec<(usize, f64)> = corpus
        .outer_iter()
        .enumerate()
        .map(|(i, row)| (i, squared_euclidean(row, query)))
        .collect();

    scored.sort_by(|a, b| {
        a.1.partial_cmp(&b.1)
            .unwrap_or(Ordering::Equal)
            .then(a.0.cmp(&b.0))
    });

    Ok(scored.into_iter().take(k).map(|(i, _)| i).collect())
}

/// Run `k_nearest` for every row of `queries`, preserving query order.
pub fn k_nearest_batch(
    corpus: ArrayView2<'_, f64>,
    queries: ArrayView2<'_, f64>,
    k: usize,
) -> Result<Vec<Vec<usize>>, SamplingError> {
    queries
        .outer_iter()
        .map(|query| k_nearest(corpus, query, k))
        .collect()
}

fn squared_euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y) * (x - y)).sum()
}
