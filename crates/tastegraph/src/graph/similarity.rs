//! Cosine similarity over feature vectors.

use crate::error::{Error, Result};
use crate::features::{FeatureMatrix, FeatureVector};

/// Cosine similarity between two equal-length vectors.
///
/// A zero vector is similar to nothing, itself included: the result is 0.0
/// rather than NaN.
pub fn cosine_similarity(a: &[f64], b: &[f64]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            found: b.len(),
        });
    }
    Ok(cosine_with_norms(a, b, norm(a), norm(b)))
}

/// Cosine similarity between two schema-bound vectors, aligning `b` to `a`'s schema first.
pub fn similarity(a: &FeatureVector, b: &FeatureVector) -> Result<f64> {
    let b_values = b.aligned_to(a.schema())?;
    cosine_similarity(a.values(), &b_values)
}

/// Symmetric all-pairs similarity of the rows of one matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct SimilarityMatrix {
    ids: Vec<String>,
    values: Vec<f64>,
}

impl SimilarityMatrix {
    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        self.values[i * self.ids.len() + j]
    }

    pub fn get_by_id(&self, u: &str, v: &str) -> Option<f64> {
        let i = self.ids.iter().position(|id| id == u)?;
        let j = self.ids.iter().position(|id| id == v)?;
        Some(self.get(i, j))
    }
}

/// Compute the N×N cosine similarity of every pair of rows.
///
/// Norms are computed once per row. The diagonal is 1.0 for non-zero rows
/// and 0.0 for zero rows.
pub fn pairwise_similarity(matrix: &FeatureMatrix) -> SimilarityMatrix {
    let n = matrix.len();
    let rows = matrix.rows();
    let norms: Vec<f64> = rows.iter().map(|r| norm(r)).collect();
    let mut values = vec![0.0; n * n];

    for i in 0..n {
        values[i * n + i] = if norms[i] > 0.0 { 1.0 } else { 0.0 };
        for j in (i + 1)..n {
            let sim = cosine_with_norms(&rows[i], &rows[j], norms[i], norms[j]);
            values[i * n + j] = sim;
            values[j * n + i] = sim;
        }
    }

    SimilarityMatrix {
        ids: matrix.ids().to_vec(),
        values,
    }
}

/// Score one external vector against every row of a matrix, in row order.
pub fn score_against(target: &FeatureVector, matrix: &FeatureMatrix) -> Result<Vec<f64>> {
    let target = target.aligned_to(matrix.schema())?;
    let target_norm = norm(&target);
    Ok(matrix
        .rows()
        .iter()
        .map(|row| cosine_with_norms(&target, row, target_norm, norm(row)))
        .collect())
}

fn norm(v: &[f64]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}

fn cosine_with_norms(a: &[f64], b: &[f64], norm_a: f64, norm_b: f64) -> f64 {
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    (dot / (norm_a * norm_b)).clamp(-1.0, 1.0)
}
