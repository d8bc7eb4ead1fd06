use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use super::Genre;

/// TMDB movie identifier
pub type MovieId = u64;

/// A movie record as returned by the catalog
///
/// Listing and search endpoints fill `genre_ids`; the detail endpoint fills
/// `genres`, `runtime` and `tagline`. Fields that are absent are omitted when
/// the record is persisted so that a saved movie reads back unchanged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Movie {
    pub id: MovieId,
    pub title: String,
    #[serde(default)]
    pub overview: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default)]
    pub vote_average: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub runtime: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub poster_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tagline: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genre_ids: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub genres: Vec<Genre>,
}

impl Movie {
    /// Creates a movie with only the identifying fields set
    pub fn new(id: MovieId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            overview: String::new(),
            release_date: None,
            vote_average: 0.0,
            runtime: None,
            poster_path: None,
            tagline: None,
            genre_ids: Vec::new(),
            genres: Vec::new(),
        }
    }

    /// Year component of `release_date`, if it is a valid `YYYY-MM-DD` date
    pub fn release_year(&self) -> Option<i32> {
        self.release_date
            .as_deref()
            .and_then(|date| NaiveDate::parse_from_str(date, "%Y-%m-%d").ok())
            .map(|date| date.year())
    }

    /// Rating rounded to one decimal place, e.g. "7.3"
    pub fn rating_label(&self) -> String {
        format!("{:.1}", self.vote_average)
    }

    /// Runtime as hours and minutes, e.g. "2h 28m"
    pub fn runtime_label(&self) -> Option<String> {
        self.runtime
            .map(|minutes| format!("{}h {}m", minutes / 60, minutes % 60))
    }

    /// Genre ids in catalog order, whichever shape the record carries
    pub fn genre_id_list(&self) -> Vec<u32> {
        if self.genres.is_empty() {
            self.genre_ids.clone()
        } else {
            self.genres.iter().map(|g| g.id).collect()
        }
    }
}
