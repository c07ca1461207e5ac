//! Community preference vectors and cosine ranking of candidate works.

use crate::error::{Error, Result};
use crate::features::{FeatureMatrix, FeatureVector};
use crate::graph::score_against;
use serde::Serialize;
use std::cmp::Ordering;
use std::sync::Arc;

/// One ranked candidate.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    pub work_id: String,
    pub score: f64,
}

/// Reject a zero-length result request.
pub fn validate_top_n(top_n: usize) -> Result<usize> {
    if top_n == 0 {
        return Err(Error::InvalidTopN);
    }
    Ok(top_n)
}

/// Feature-wise mean of the members' profile vectors.
///
/// An empty member list yields the zero vector; a member missing from
/// `profiles` is an error.
pub fn community_vector<S: AsRef<str>>(profiles: &FeatureMatrix, members: &[S]) -> Result<FeatureVector> {
    let positions = profiles.positions_of(members)?;
    FeatureVector::new(Arc::clone(profiles.schema()), profiles.mean_of(&positions))
}

/// Rank every candidate work by cosine similarity to the community vector.
///
/// The community vector is re-aligned to the works' feature order before
/// scoring; a different feature space is an error. Returns at most `top_n`
/// works by descending score, equal scores keeping input order.
pub fn recommend(
    community: &FeatureVector,
    works: &FeatureMatrix,
    top_n: usize,
) -> Result<Vec<Recommendation>> {
    let top_n = validate_top_n(top_n)?;
    let scores = score_against(community, works)?;

    let mut ranked: Vec<Recommendation> = works
        .ids()
        .iter()
        .zip(scores)
        .map(|(id, score)| Recommendation {
            work_id: id.clone(),
            score,
        })
        .collect();

    // `sort_by` is stable, so ties stay in input order.
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(top_n);
    Ok(ranked)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::FeatureSchema;

    fn schema() -> Arc<FeatureSchema> {
        Arc::new(FeatureSchema::new(1, vec!["Manga", "Manhwa"], vec!["Action", "Romance"]).unwrap())
    }

    fn works() -> FeatureMatrix {
        FeatureMatrix::from_rows(
            schema(),
            vec![
                ("romance".to_string(), vec![0.5, 0.0, 0.0, 0.5]),
                ("action".to_string(), vec![0.5, 0.0, 0.5, 0.0]),
                ("action-too".to_string(), vec![0.5, 0.0, 0.5, 0.0]),
                ("blank".to_string(), vec![0.0, 0.0, 0.0, 0.0]),
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_community_vector_mean() {
        let profiles = FeatureMatrix::from_rows(
            schema(),
            vec![
                ("u1".to_string(), vec![0.0, 0.0, 0.9, 0.1]),
                ("u2".to_string(), vec![0.0, 0.0, 0.85, 0.15]),
                ("u3".to_string(), vec![0.0, 0.0, 0.1, 0.9]),
            ],
        )
        .unwrap();
        let v = community_vector(&profiles, &["u1", "u2"]).unwrap();
        assert!((v.values()[2] - 0.875).abs() < 1e-12);
        assert!((v.values()[3] - 0.125).abs() < 1e-12);

        let empty: [&str; 0] = [];
        assert!(community_vector(&profiles, &empty).unwrap().is_zero());
        assert!(matches!(
            community_vector(&profiles, &["u9"]),
            Err(Error::UnknownEntity(_))
        ));
    }

    #[test]
    fn test_recommend_orders_and_keeps_ties_stable() {
        let target = FeatureVector::new(schema(), vec![0.0, 0.0, 0.9, 0.1]).unwrap();
        let recs = recommend(&target, &works(), 3).unwrap();
        let ids: Vec<&str> = recs.iter().map(|r| r.work_id.as_str()).collect();
        assert_eq!(ids, vec!["action", "action-too", "romance"]);
        assert_eq!(recs[0].score, recs[1].score);
    }

    #[test]
    fn test_recommend_top_n_larger_than_candidates() {
        let target = FeatureVector::new(schema(), vec![0.0, 0.0, 0.9, 0.1]).unwrap();
        let recs = recommend(&target, &works(), 50).unwrap();
        assert_eq!(recs.len(), 4);
        assert_eq!(recs[3].work_id, "blank");
        assert_eq!(recs[3].score, 0.0);
        assert!(recs.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[test]
    fn test_recommend_rejects_zero_top_n() {
        let target = FeatureVector::zeros(schema());
        assert!(matches!(recommend(&target, &works(), 0), Err(Error::InvalidTopN)));
    }

    #[test]
    fn test_recommend_realigns_feature_order() {
        let reordered =
            Arc::new(FeatureSchema::new(1, vec!["Manhwa", "Manga"], vec!["Romance", "Action"]).unwrap());
        // Action-heavy, expressed in the reordered space.
        let target = FeatureVector::new(reordered, vec![0.0, 0.0, 0.1, 0.9]).unwrap();
        let recs = recommend(&target, &works(), 1).unwrap();
        assert_eq!(recs[0].work_id, "action");
    }

    #[test]
    fn test_recommend_rejects_other_feature_space() {
        let other = Arc::new(FeatureSchema::new(1, vec!["Manga"], vec!["Action", "Drama", "Sports"]).unwrap());
        let target = FeatureVector::new(other, vec![0.0, 1.0, 0.0, 0.0]).unwrap();
        assert!(matches!(recommend(&target, &works(), 2), Err(Error::SchemaMismatch(_))));
    }
}
