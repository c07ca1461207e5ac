//! Encode candidate works into the shared feature space.

use crate::error::Result;
use crate::features::{l1_normalize, FeatureMatrix, FeatureSchema, FeatureVector};
use crate::profile::SourceCategory;
use crate::recommend::work::Work;
use std::sync::Arc;
use tracing::{debug, info};

/// Encode one work: its source and every declared genre each receive the
/// work's full quality weight, then the vector is L1-normalized.
///
/// Categories outside the schema contribute nothing.
pub fn vectorize(work: &Work, schema: &Arc<FeatureSchema>) -> FeatureVector {
    let mut feats = vec![0.0; schema.dim()];
    let weight = work.quality_weight();

    let source = SourceCategory::from_publication_type(work.kind.as_deref().unwrap_or(""));
    if let Some(i) = schema.source_index(source.as_str()) {
        feats[i] = weight;
    }

    for genre in work.genre_list() {
        match schema.genre_index(&genre) {
            Some(i) => feats[i] = weight,
            None => debug!(work = %work.id, genre = %genre, "genre outside schema, dropped"),
        }
    }

    FeatureVector::from_parts(Arc::clone(schema), l1_normalize(&feats))
}

/// Encode every work, keeping input order.
pub fn vectorize_all(works: &[Work], schema: &Arc<FeatureSchema>) -> Result<FeatureMatrix> {
    let mut matrix = FeatureMatrix::new(Arc::clone(schema));
    for work in works {
        matrix.push_row(work.id.clone(), vectorize(work, schema).into_values())?;
    }
    info!(works = matrix.len(), "vectorized candidate works");
    Ok(matrix)
}
