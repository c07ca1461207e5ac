//! Candidate works: unadapted manga, light novels, and manhwa.

use crate::profile::builder::split_genres;
use serde::{Deserialize, Serialize};

/// Raw score assumed when a work has none (adult-only entries hide theirs).
pub const MISSING_SCORE: f64 = 1.0;

/// Upper end of the source site's rating scale.
pub const SCORE_SCALE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Work {
    pub id: String,
    pub title: String,
    pub score: Option<f64>,
    /// Publication type as listed by the source ("Manga", "Novel", "Manhwa", ...).
    pub kind: Option<String>,
    /// Comma-joined genre names.
    pub genres: String,
}

impl Work {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        score: Option<f64>,
        kind: Option<&str>,
        genres: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            score,
            kind: kind.map(String::from),
            genres: genres.into(),
        }
    }

    pub fn genre_list(&self) -> Vec<String> {
        split_genres(&self.genres)
    }

    /// The work's own score rescaled to [0, 1].
    pub fn quality_weight(&self) -> f64 {
        let raw = self.score.filter(|s| s.is_finite()).unwrap_or(MISSING_SCORE);
        (raw / SCORE_SCALE).clamp(0.0, 1.0)
    }
}
