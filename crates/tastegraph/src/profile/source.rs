//! Classify free-text source/type strings into source categories.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Origin category of a work. Names match the default schema's sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SourceCategory {
    Manga,
    LightNovel,
    Original,
    Manhwa,
    Other,
}

impl SourceCategory {
    pub const ALL: [SourceCategory; 5] = [
        SourceCategory::Manga,
        SourceCategory::LightNovel,
        SourceCategory::Original,
        SourceCategory::Manhwa,
        SourceCategory::Other,
    ];

    /// Classify the adaptation source of an anime ("Web manga", "Light novel", ...).
    pub fn from_anime_source(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return SourceCategory::Other;
        }

        // Web manga on the source site is predominantly Korean webtoons.
        if s.contains("web manga") || s.contains("webmanga") {
            return SourceCategory::Manhwa;
        }
        if s.contains("web novel") || s.contains("webnovel") {
            return SourceCategory::LightNovel;
        }
        if s.contains("light novel") || s.contains("novel") {
            return SourceCategory::LightNovel;
        }
        if s.contains("original") {
            return SourceCategory::Original;
        }
        if s.contains("manhwa") || s.contains("manhua") {
            return SourceCategory::Manhwa;
        }
        if s.contains("manga") {
            return SourceCategory::Manga;
        }

        SourceCategory::Other
    }

    /// Classify the publication type of a candidate work ("Manga", "Novel", "Manhua", ...).
    pub fn from_publication_type(raw: &str) -> Self {
        let s = raw.trim().to_lowercase();
        if s.is_empty() {
            return SourceCategory::Other;
        }

        if s.contains("light novel") || s.contains("novel") {
            return SourceCategory::LightNovel;
        }
        if s.contains("manhwa") || s.contains("manhua") {
            return SourceCategory::Manhwa;
        }
        if s.contains("manga") {
            return SourceCategory::Manga;
        }
        if s.contains("original") {
            return SourceCategory::Original;
        }

        SourceCategory::Other
    }

    /// Display name, as used in the feature schema.
    pub fn as_str(self) -> &'static str {
        match self {
            SourceCategory::Manga => "Manga",
            SourceCategory::LightNovel => "Light Novel",
            SourceCategory::Original => "Original",
            SourceCategory::Manhwa => "Manhwa",
            SourceCategory::Other => "Other",
        }
    }

    /// Multiplier applied to accumulated source scores when building a profile.
    pub fn default_weight(self) -> f64 {
        match self {
            SourceCategory::Manhwa => 2.0,
            SourceCategory::LightNovel => 1.8,
            SourceCategory::Original => 1.1,
            SourceCategory::Manga => 1.0,
            SourceCategory::Other => 0.8,
        }
    }
}

impl fmt::Display for SourceCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anime_sources() {
        assert_eq!(SourceCategory::from_anime_source("Manga"), SourceCategory::Manga);
        assert_eq!(SourceCategory::from_anime_source("4-koma manga"), SourceCategory::Manga);
        assert_eq!(SourceCategory::from_anime_source("Web manga"), SourceCategory::Manhwa);
        assert_eq!(SourceCategory::from_anime_source("Web novel"), SourceCategory::LightNovel);
        assert_eq!(SourceCategory::from_anime_source("Light novel"), SourceCategory::LightNovel);
        assert_eq!(SourceCategory::from_anime_source("Novel"), SourceCategory::LightNovel);
        assert_eq!(SourceCategory::from_anime_source("Original"), SourceCategory::Original);
        assert_eq!(SourceCategory::from_anime_source("Visual novel"), SourceCategory::LightNovel);
        assert_eq!(SourceCategory::from_anime_source("Game"), SourceCategory::Other);
        assert_eq!(SourceCategory::from_anime_source("  "), SourceCategory::Other);
    }

    #[test]
    fn test_publication_types() {
        assert_eq!(SourceCategory::from_publication_type("Manga"), SourceCategory::Manga);
        assert_eq!(SourceCategory::from_publication_type("Light Novel"), SourceCategory::LightNovel);
        assert_eq!(SourceCategory::from_publication_type("Novel"), SourceCategory::LightNovel);
        assert_eq!(SourceCategory::from_publication_type("Manhwa"), SourceCategory::Manhwa);
        assert_eq!(SourceCategory::from_publication_type("Manhua"), SourceCategory::Manhwa);
        assert_eq!(SourceCategory::from_publication_type("One-shot"), SourceCategory::Other);
        assert_eq!(SourceCategory::from_publication_type(""), SourceCategory::Other);
    }

    #[test]
    fn test_names_match_default_schema() {
        let schema = crate::features::FeatureSchema::default();
        for category in SourceCategory::ALL {
            assert!(schema.source_index(category.as_str()).is_some(), "{category}");
        }
    }
}
