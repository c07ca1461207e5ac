//! L1 normalization of accumulated feature weights.

use crate::features::vector::FeatureMatrix;

/// Scale `values` so they sum to 1.
///
/// A row with no positive total weight becomes all-zero: downstream code
/// reads that as "insufficient signal", never as a unit vector.
pub fn l1_normalize(values: &[f64]) -> Vec<f64> {
    let total: f64 = values.iter().sum();
    if total <= 0.0 || !total.is_finite() {
        return vec![0.0; values.len()];
    }
    values.iter().map(|v| v / total).collect()
}

/// Normalize every row of a raw weight table by its own row sum.
pub fn normalize_rows(raw: &FeatureMatrix) -> FeatureMatrix {
    raw.map_rows(l1_normalize)
}
