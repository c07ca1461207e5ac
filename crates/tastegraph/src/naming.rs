//! Human-readable labels and summaries for detected communities.
//!
//! Two baselines are used and kept apart on purpose:
//! - [`rest_of_population_delta`] compares a community with everyone outside it
//!   and backs [`describe`];
//! - [`population_delta`] compares it with the whole corpus average and backs
//!   [`name`].

use crate::error::{Error, Result};
use crate::features::{FeatureMatrix, FeatureSchema};
use crate::graph::Community;
use serde::Serialize;
use std::collections::HashSet;
use std::ops::Range;
use tracing::debug;

/// Number of genres reported by [`describe`].
pub const DESCRIBED_GENRES: usize = 2;

pub const LABEL_SEPARATOR: &str = " / ";
pub const EMPTY_COMMUNITY_LABEL: &str = "Empty Community";
pub const NO_GENRE_LABEL: &str = "No Genre";

/// What sets a community apart from the rest of the population.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommunityDescription {
    pub dominant_source: String,
    pub dominant_genres: Vec<String>,
    pub member_count: usize,
}

/// Mean of the community's rows minus the mean of every row outside it.
///
/// When the community covers the whole population the baseline is zero.
pub fn rest_of_population_delta(population: &FeatureMatrix, community: &Community) -> Result<Vec<f64>> {
    let inside = population.positions_of(community.members())?;
    let inside_set: HashSet<usize> = inside.iter().copied().collect();
    let outside: Vec<usize> = (0..population.len()).filter(|p| !inside_set.contains(p)).collect();

    let mean_inside = population.mean_of(&inside);
    let mean_outside = population.mean_of(&outside);
    Ok(difference(&mean_inside, &mean_outside))
}

/// Mean of the community's rows minus the mean of the whole population.
pub fn population_delta(population: &FeatureMatrix, community: &Community) -> Result<Vec<f64>> {
    let inside = population.positions_of(community.members())?;
    let all: Vec<usize> = (0..population.len()).collect();
    Ok(difference(&population.mean_of(&inside), &population.mean_of(&all)))
}

/// Summarize a community: its most distinctive source and top genres
/// relative to the rest of the population.
pub fn describe(population: &FeatureMatrix, community: &Community) -> Result<CommunityDescription> {
    let schema = population.schema();
    let delta = rest_of_population_delta(population, community)?;

    let dominant_source = rank_by_delta(&delta, schema.source_range())
        .first()
        .and_then(|&i| schema.display_name(i))
        .unwrap_or_default()
        .to_string();

    let dominant_genres = rank_by_delta(&delta, schema.genre_range())
        .into_iter()
        .take(DESCRIBED_GENRES)
        .filter_map(|i| schema.display_name(i).map(String::from))
        .collect();

    Ok(CommunityDescription {
        dominant_source,
        dominant_genres,
        member_count: community.len(),
    })
}

/// Give each community a unique label built from its `top_k` most
/// over-represented genres relative to the population mean.
///
/// Communities are labelled in order. A label already taken is extended with
/// the next-ranked genre, one candidate at a time; if every extension is
/// taken too, a numeric suffix `(2)`, `(3)`, ... is appended.
pub fn name(population: &FeatureMatrix, communities: &[Community], top_k: usize) -> Result<Vec<String>> {
    if top_k == 0 {
        return Err(Error::InvalidTopK);
    }

    let schema = population.schema();
    let mut taken: HashSet<String> = HashSet::new();
    let mut labels = Vec::with_capacity(communities.len());

    for community in communities {
        let candidate = if community.is_empty() {
            EMPTY_COMMUNITY_LABEL.to_string()
        } else {
            let delta = population_delta(population, community)?;
            let ranked = genre_names(schema, &rank_by_delta(&delta, schema.genre_range()));
            extend_until_unique(&ranked, top_k, &taken)
        };

        let label = with_numeric_suffix(candidate, &taken);
        debug!(label = %label, members = community.len(), "named community");
        taken.insert(label.clone());
        labels.push(label);
    }

    Ok(labels)
}

fn extend_until_unique(ranked: &[String], top_k: usize, taken: &HashSet<String>) -> String {
    let chosen: Vec<&str> = ranked.iter().take(top_k).map(String::as_str).collect();
    if chosen.is_empty() {
        return NO_GENRE_LABEL.to_string();
    }

    let mut candidate = chosen.join(LABEL_SEPARATOR);
    for extra in ranked.iter().skip(top_k) {
        if !taken.contains(&candidate) {
            break;
        }
        let mut parts = chosen.clone();
        parts.push(extra);
        candidate = parts.join(LABEL_SEPARATOR);
    }
    candidate
}

fn with_numeric_suffix(candidate: String, taken: &HashSet<String>) -> String {
    if !taken.contains(&candidate) {
        return candidate;
    }
    let mut n = 2;
    loop {
        let label = format!("{candidate} ({n})");
        if !taken.contains(&label) {
            return label;
        }
        n += 1;
    }
}

/// Feature indices in `range`, by delta descending; ties keep declaration order.
fn rank_by_delta(delta: &[f64], range: Range<usize>) -> Vec<usize> {
    let mut ranked: Vec<usize> = range.collect();
    ranked.sort_by(|&a, &b| delta[b].partial_cmp(&delta[a]).unwrap_or(std::cmp::Ordering::Equal));
    ranked
}

fn genre_names(schema: &FeatureSchema, indices: &[usize]) -> Vec<String> {
    indices
        .iter()
        .filter_map(|&i| schema.display_name(i).map(String::from))
        .collect()
}

fn difference(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x - y).collect()
}
