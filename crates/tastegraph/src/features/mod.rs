//! Feature space, vectors, and the transforms applied before comparison.

pub mod normalize;
pub mod schema;
pub mod vector;
pub mod weighting;

pub use normalize::{l1_normalize, normalize_rows};
pub use schema::{feature_key, FeatureFamily, FeatureSchema};
pub use vector::{FeatureMatrix, FeatureVector};
pub use weighting::{genre_idf, weight_for_similarity};
