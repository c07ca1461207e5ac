//! The versioned feature space shared by user profiles and candidate works.
//!
//! Every vector carries the schema it was built against. Comparing two
//! vectors goes through [`FeatureSchema::align`], never through column-name
//! matching at call sites.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::ops::Range;

pub const SOURCE_PREFIX: &str = "Source_";
pub const GENRE_PREFIX: &str = "Genre_";

pub const DEFAULT_SCHEMA_VERSION: u32 = 1;

pub const DEFAULT_SOURCES: &[&str] = &["Manga", "Light Novel", "Original", "Manhwa", "Other"];

pub const DEFAULT_GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "Comedy",
    "Drama",
    "Fantasy",
    "Sci-Fi",
    "Slice of Life",
    "Romance",
    "Supernatural",
    "Suspense",
    "Sports",
];

/// The two families of the feature space.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureFamily {
    /// Mutually exclusive origin category (Manga, Light Novel, ...).
    Source,
    /// Multi-valued genre tag.
    Genre,
}

impl FeatureFamily {
    pub fn prefix(self) -> &'static str {
        match self {
            FeatureFamily::Source => SOURCE_PREFIX,
            FeatureFamily::Genre => GENRE_PREFIX,
        }
    }
}

/// Ordered feature space: all sources in declaration order, then all genres.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSchema {
    version: u32,
    sources: Vec<String>,
    genres: Vec<String>,
}

impl FeatureSchema {
    /// Create a schema. Category names that collapse to the same feature key are rejected.
    pub fn new<S: Into<String>>(
        version: u32,
        sources: impl IntoIterator<Item = S>,
        genres: impl IntoIterator<Item = S>,
    ) -> Result<Self> {
        let schema = Self {
            version,
            sources: sources.into_iter().map(Into::into).collect(),
            genres: genres.into_iter().map(Into::into).collect(),
        };

        let mut seen = HashSet::new();
        for key in schema.keys() {
            if !seen.insert(key.clone()) {
                return Err(Error::InvalidConfig(format!("duplicate feature key {key}")));
            }
        }
        Ok(schema)
    }

    pub fn version(&self) -> u32 {
        self.version
    }

    pub fn sources(&self) -> &[String] {
        &self.sources
    }

    pub fn genres(&self) -> &[String] {
        &self.genres
    }

    pub fn dim(&self) -> usize {
        self.sources.len() + self.genres.len()
    }

    pub fn source_range(&self) -> Range<usize> {
        0..self.sources.len()
    }

    pub fn genre_range(&self) -> Range<usize> {
        self.sources.len()..self.dim()
    }

    pub fn family(&self, index: usize) -> Option<FeatureFamily> {
        if index < self.sources.len() {
            Some(FeatureFamily::Source)
        } else if index < self.dim() {
            Some(FeatureFamily::Genre)
        } else {
            None
        }
    }

    /// Human-readable category name at `index` (e.g. "Slice of Life").
    pub fn display_name(&self, index: usize) -> Option<&str> {
        if index < self.sources.len() {
            Some(&self.sources[index])
        } else {
            self.genres.get(index - self.sources.len()).map(String::as_str)
        }
    }

    /// Column key at `index` (e.g. "Genre_Slice_of_Life").
    pub fn key(&self, index: usize) -> Option<String> {
        let family = self.family(index)?;
        let name = self.display_name(index)?;
        Some(feature_key(family, name))
    }

    pub fn keys(&self) -> Vec<String> {
        (0..self.dim()).filter_map(|i| self.key(i)).collect()
    }

    pub fn index_of(&self, key: &str) -> Option<usize> {
        if let Some(name) = key.strip_prefix(SOURCE_PREFIX) {
            return self.source_index(name);
        }
        if let Some(name) = key.strip_prefix(GENRE_PREFIX) {
            return self.genre_index(name);
        }
        None
    }

    /// Look up a source by display name or underscored name.
    pub fn source_index(&self, name: &str) -> Option<usize> {
        let wanted = underscored(name);
        self.sources.iter().position(|s| underscored(s) == wanted)
    }

    /// Look up a genre by display name or underscored name.
    pub fn genre_index(&self, name: &str) -> Option<usize> {
        let wanted = underscored(name);
        self.genres
            .iter()
            .position(|g| underscored(g) == wanted)
            .map(|i| self.sources.len() + i)
    }

    /// Reorder `values`, expressed in `from`'s feature order, into this schema's order.
    ///
    /// Fails if the value count does not match `from`, or if the two schemas
    /// do not describe the same versioned set of features.
    pub fn align(&self, from: &FeatureSchema, values: &[f64]) -> Result<Vec<f64>> {
        if values.len() != from.dim() {
            return Err(Error::DimensionMismatch {
                expected: from.dim(),
                found: values.len(),
            });
        }
        if self == from {
            return Ok(values.to_vec());
        }
        if self.version != from.version {
            return Err(Error::SchemaMismatch(format!(
                "schema version {} cannot be compared with version {}",
                from.version, self.version
            )));
        }
        if self.dim() != from.dim() {
            return Err(Error::DimensionMismatch {
                expected: self.dim(),
                found: from.dim(),
            });
        }

        let mut aligned = Vec::with_capacity(self.dim());
        for key in self.keys() {
            let source_index = from
                .index_of(&key)
                .ok_or_else(|| Error::SchemaMismatch(format!("feature {key} is missing")))?;
            aligned.push(values[source_index]);
        }
        Ok(aligned)
    }
}

impl Default for FeatureSchema {
    fn default() -> Self {
        Self {
            version: DEFAULT_SCHEMA_VERSION,
            sources: DEFAULT_SOURCES.iter().map(|s| s.to_string()).collect(),
            genres: DEFAULT_GENRES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Build the column key for a category, e.g. `Source_Light_Novel`.
pub fn feature_key(family: FeatureFamily, name: &str) -> String {
    format!("{}{}", family.prefix(), underscored(name))
}

fn underscored(name: &str) -> String {
    name.trim().replace(' ', "_")
}
