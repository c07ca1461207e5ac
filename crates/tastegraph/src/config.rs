//! Pipeline parameters, validated before any computation starts.

use crate::error::{Error, Result};
use crate::graph::validate_threshold;
use crate::profile::builder::{default_source_weights, ProfilePolicy, DEFAULT_MIN_SCORE};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_THRESHOLD: f64 = 0.98;
pub const DEFAULT_TOP_N: usize = 5;
pub const DEFAULT_TOP_K: usize = 2;
pub const DEFAULT_SOURCE_EMPHASIS: f64 = 1.5;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum cosine similarity for two users to share an edge.
    pub threshold: f64,
    /// Recommendations returned per community.
    pub top_n: usize,
    /// Genres used in each community label.
    pub top_k: usize,
    /// Multiplier on source features before similarity is computed.
    pub source_emphasis: f64,
    /// Lowest rating counted when building profiles from history.
    pub min_score: f64,
    /// Per-source multipliers used when building profiles from history.
    pub source_weights: BTreeMap<String, f64>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
            top_n: DEFAULT_TOP_N,
            top_k: DEFAULT_TOP_K,
            source_emphasis: DEFAULT_SOURCE_EMPHASIS,
            min_score: DEFAULT_MIN_SCORE,
            source_weights: default_source_weights(),
        }
    }
}

impl PipelineConfig {
    pub fn validate(&self) -> Result<()> {
        validate_threshold(self.threshold)?;
        if self.top_n == 0 {
            return Err(Error::InvalidTopN);
        }
        if self.top_k == 0 {
            return Err(Error::InvalidTopK);
        }
        if !self.source_emphasis.is_finite() || self.source_emphasis < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "source_emphasis must be a non-negative number, got {}",
                self.source_emphasis
            )));
        }
        if !self.min_score.is_finite() {
            return Err(Error::InvalidConfig("min_score must be finite".into()));
        }
        for (source, weight) in &self.source_weights {
            if !weight.is_finite() || *weight < 0.0 {
                return Err(Error::InvalidConfig(format!(
                    "weight for source {source} must be a non-negative number, got {weight}"
                )));
            }
        }
        Ok(())
    }

    pub fn profile_policy(&self) -> ProfilePolicy {
        ProfilePolicy {
            min_score: self.min_score,
            source_weights: self.source_weights.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = PipelineConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.threshold, 0.98);
        assert_eq!(config.source_weights.get("Manhwa"), Some(&2.0));
    }

    #[test]
    fn test_rejects_bad_values() {
        let bad = [
            PipelineConfig { threshold: 1.2, ..Default::default() },
            PipelineConfig { threshold: f64::NAN, ..Default::default() },
            PipelineConfig { top_n: 0, ..Default::default() },
            PipelineConfig { top_k: 0, ..Default::default() },
            PipelineConfig { source_emphasis: -1.0, ..Default::default() },
        ];
        for config in bad {
            assert!(config.validate().is_err(), "{config:?}");
        }
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: PipelineConfig = serde_json::from_str(r#"{"threshold": 0.9, "top_n": 10}"#).unwrap();
        assert_eq!(config.threshold, 0.9);
        assert_eq!(config.top_n, 10);
        assert_eq!(config.top_k, DEFAULT_TOP_K);
        assert_eq!(config.source_emphasis, DEFAULT_SOURCE_EMPHASIS);
    }

    #[test]
    fn test_profile_policy() {
        let config = PipelineConfig { min_score: 8.0, ..Default::default() };
        let policy = config.profile_policy();
        assert_eq!(policy.min_score, 8.0);
        assert_eq!(policy.source_weight("Light Novel"), 1.8);
    }
}
