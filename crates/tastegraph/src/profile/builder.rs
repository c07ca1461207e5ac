//! Accumulate a user's rated history into a raw feature vector.
//!
//! Each call owns its accumulator and returns an immutable vector; nothing is
//! shared between users.

use crate::error::Result;
use crate::features::{FeatureMatrix, FeatureSchema, FeatureVector};
use crate::profile::source::SourceCategory;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use tracing::{debug, warn};

/// Lowest rating (on a 1–10 scale) that counts as a positive signal.
pub const DEFAULT_MIN_SCORE: f64 = 7.0;

/// One rated title from a user's completed list.
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub anime_id: String,
    pub score: Option<f64>,
}

impl HistoryEntry {
    pub fn new(anime_id: impl Into<String>, score: Option<f64>) -> Self {
        Self {
            anime_id: anime_id.into(),
            score,
        }
    }
}

/// Categorical data known about an anime.
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogueEntry {
    pub title: String,
    pub genres: Vec<String>,
    pub source: String,
}

impl CatalogueEntry {
    /// Build from a comma-joined genre list.
    pub fn from_joined(title: impl Into<String>, genres: &str, source: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            genres: split_genres(genres),
            source: source.into(),
        }
    }
}

pub type Catalogue = HashMap<String, CatalogueEntry>;

/// Rules for turning ratings into weights.
#[derive(Debug, Clone, PartialEq)]
pub struct ProfilePolicy {
    pub min_score: f64,
    /// Multiplier per source display name. Unlisted sources weigh 1.0.
    pub source_weights: BTreeMap<String, f64>,
}

impl ProfilePolicy {
    pub fn source_weight(&self, source: &str) -> f64 {
        self.source_weights.get(source).copied().unwrap_or(1.0)
    }
}

impl Default for ProfilePolicy {
    fn default() -> Self {
        Self {
            min_score: DEFAULT_MIN_SCORE,
            source_weights: default_source_weights(),
        }
    }
}

pub fn default_source_weights() -> BTreeMap<String, f64> {
    SourceCategory::ALL
        .iter()
        .map(|c| (c.as_str().to_string(), c.default_weight()))
        .collect()
}

/// Split a comma-joined genre string, dropping blanks and the "None" placeholder.
pub fn split_genres(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|g| !g.is_empty() && *g != "None")
        .map(String::from)
        .collect()
}

/// Build one user's raw profile.
///
/// Every qualifying rating adds its score to each of the title's genres and
/// to its classified source; the sum of qualifying scores is the divisor.
/// Source sums are then scaled by the policy's source weight. Returns `None`
/// when no rating qualifies.
pub fn build_profile(
    history: &[HistoryEntry],
    catalogue: &Catalogue,
    schema: &Arc<FeatureSchema>,
    policy: &ProfilePolicy,
) -> Option<FeatureVector> {
    let mut accumulated = vec![0.0; schema.dim()];
    let mut total = 0.0;

    for entry in history {
        let Some(score) = entry.score else { continue };
        if score <= 0.0 || score < policy.min_score {
            continue;
        }
        let Some(anime) = catalogue.get(&entry.anime_id) else {
            warn!(anime_id = %entry.anime_id, "rated title missing from catalogue");
            continue;
        };

        total += score;

        let source = SourceCategory::from_anime_source(&anime.source);
        if let Some(i) = schema.source_index(source.as_str()) {
            accumulated[i] += score;
        }
        for genre in &anime.genres {
            if let Some(i) = schema.genre_index(genre) {
                accumulated[i] += score;
            }
        }
    }

    if total == 0.0 {
        return None;
    }

    for i in schema.source_range() {
        let weight = schema
            .display_name(i)
            .map(|name| policy.source_weight(name))
            .unwrap_or(1.0);
        accumulated[i] *= weight;
    }
    for value in &mut accumulated {
        *value /= total;
    }

    Some(FeatureVector::from_parts(Arc::clone(schema), accumulated))
}

/// Build the raw user-feature table. Users without usable ratings are left out.
pub fn build_profiles(
    users: &[(String, Vec<HistoryEntry>)],
    catalogue: &Catalogue,
    schema: &Arc<FeatureSchema>,
    policy: &ProfilePolicy,
) -> Result<FeatureMatrix> {
    let mut table = FeatureMatrix::new(Arc::clone(schema));
    for (user, history) in users {
        match build_profile(history, catalogue, schema, policy) {
            Some(profile) => table.push_row(user.clone(), profile.into_values())?,
            None => debug!(user = %user, "no usable ratings, skipping profile"),
        }
    }
    Ok(table)
}
