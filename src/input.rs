// Input files for the binary: embeddings and documents as JSON.
//
// Embeddings: an array of equal-length number arrays, one per document.
// Documents:  an array of strings, in the same order.

use std::path::Path;

use anyhow::{Context, Result};
use ndarray::Array2;
use tracing::debug;

/// Load an embedding matrix from a JSON array of rows.
pub fn load_embeddings(path: &Path) -> Result<Array2<f64>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read embeddings {}", path.display()))?;
    let rows: Vec<Vec<f64>> = serde_json::from_str(&raw)
        .with_context(|| format!("Embeddings file {} is not an array of number arrays", path.display()))?;
    let matrix = rows_to_matrix(rows)
        .with_context(|| format!("Invalid embeddings in {}", path.display()))?;
    debug!(
        rows = matrix.nrows(),
        dim = matrix.ncols(),
        "Loaded embeddings"
    );
    Ok(matrix)
}

/// Load documents from a JSON array of strings.
pub fn load_documents(path: &Path) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read documents {}", path.display()))?;
    let documents: Vec<String> = serde_json::from_str(&raw)
        .with_context(|| format!("Documents file {} is not an array of strings", path.display()))?;
    debug!(count = documents.len(), "Loaded documents");
    Ok(documents)
}

/// Pack rows into a dense matrix. Every row must have the same, non-zero length.
pub fn rows_to_matrix(rows: Vec<Vec<f64>>) -> Result<Array2<f64>> {
    let n_rows = rows.len();
    if n_rows == 0 {
        anyhow::bail!("No embeddings found");
    }

    let dim = rows[0].len();
    if dim == 0 {
        anyhow::bail!("Embeddings have zero dimensions");
    }
    if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
        anyhow::bail!(
            "Row {} has {} dimensions but row 0 has {}",
            i,
            row.len(),
            dim
        );
    }

    let flat: Vec<f64> = rows.into_iter().flatten().collect();
    Array2::from_shape_vec((n_rows, dim), flat).context("Failed to build embedding matrix")
}
