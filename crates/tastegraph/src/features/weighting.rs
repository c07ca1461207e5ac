//! Reweighting applied to normalized profiles before similarity is computed.
//!
//! Genres go through a smoothed TF-IDF transform so that ubiquitous genres
//! (nearly everyone watches Action) stop dominating the cosine. Sources are
//! scaled by a constant emphasis so origin preferences stay visible next to
//! the L2-normalized genre block.

use crate::features::vector::FeatureMatrix;

/// Smoothed inverse document frequency per genre, in schema genre order.
///
/// `idf(g) = ln((1 + n) / (1 + df(g))) + 1`, where `df(g)` counts rows with a
/// non-zero weight on `g`.
pub fn genre_idf(matrix: &FeatureMatrix) -> Vec<f64> {
    let genres = matrix.schema().genre_range();
    let n = matrix.len() as f64;

    genres
        .map(|g| {
            let df = matrix.rows().iter().filter(|row| row[g] != 0.0).count() as f64;
            ((1.0 + n) / (1.0 + df)).ln() + 1.0
        })
        .collect()
}

/// Apply genre TF-IDF (L2-normalized per row) and source emphasis.
pub fn weight_for_similarity(normalized: &FeatureMatrix, source_emphasis: f64) -> FeatureMatrix {
    let schema = normalized.schema();
    let sources = schema.source_range();
    let genres = schema.genre_range();
    let idf = genre_idf(normalized);

    normalized.map_rows(|row| {
        let mut out = row.to_vec();

        for i in sources.clone() {
            out[i] *= source_emphasis;
        }

        for (offset, g) in genres.clone().enumerate() {
            out[g] *= idf[offset];
        }
        let norm = out[genres.clone()].iter().map(|v| v * v).sum::<f64>().sqrt();
        if norm > 0.0 {
            for v in &mut out[genres.clone()] {
                *v /= norm;
            }
        }

        out
    })
}
