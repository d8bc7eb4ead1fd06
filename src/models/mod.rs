use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::str::FromStr;

use crate::error::AppError;

mod movie;

pub use movie::{Movie, MovieId};

/// A genre from the catalog taxonomy
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Genre {
    pub id: u32,
    pub name: String,
}

/// One page of a paged catalog response
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Page<T> {
    pub results: Vec<T>,
    #[serde(default = "first_page")]
    pub page: u32,
    #[serde(default = "first_page")]
    pub total_pages: u32,
    #[serde(default)]
    pub total_results: u32,
}

fn first_page() -> u32 {
    1
}

impl<T> Page<T> {
    /// Whether the catalog reports pages after this one
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// The four paged movie listings
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ListingKind {
    NowPlaying,
    Popular,
    TopRated,
    Upcoming,
}

impl ListingKind {
    pub fn as_path(&self) -> &'static str {
        match self {
            ListingKind::NowPlaying => "now_playing",
            ListingKind::Popular => "popular",
            ListingKind::TopRated => "top_rated",
            ListingKind::Upcoming => "upcoming",
        }
    }
}

impl Display for ListingKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_path())
    }
}

/// Sort orders accepted by the discovery endpoint
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
pub enum SortBy {
    #[default]
    #[serde(rename = "popularity.desc")]
    PopularityDesc,
    #[serde(rename = "popularity.asc")]
    PopularityAsc,
    #[serde(rename = "vote_average.desc")]
    RatingDesc,
    #[serde(rename = "vote_average.asc")]
    RatingAsc,
    #[serde(rename = "primary_release_date.desc")]
    ReleaseDateDesc,
    #[serde(rename = "primary_release_date.asc")]
    ReleaseDateAsc,
    #[serde(rename = "revenue.desc")]
    RevenueDesc,
    #[serde(rename = "title.asc")]
    TitleAsc,
}

impl SortBy {
    pub fn as_param(&self) -> &'static str {
        match self {
            SortBy::PopularityDesc => "popularity.desc",
            SortBy::PopularityAsc => "popularity.asc",
            SortBy::RatingDesc => "vote_average.desc",
            SortBy::RatingAsc => "vote_average.asc",
            SortBy::ReleaseDateDesc => "primary_release_date.desc",
            SortBy::ReleaseDateAsc => "primary_release_date.asc",
            SortBy::RevenueDesc => "revenue.desc",
            SortBy::TitleAsc => "title.asc",
        }
    }
}

/// Options for filtered discovery; unset fields fall back to catalog defaults
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DiscoverFilters {
    pub genre: Option<u32>,
    pub sort_by: Option<SortBy>,
    pub page: Option<u32>,
}

impl DiscoverFilters {
    pub fn genre(mut self, genre: u32) -> Self {
        self.genre = Some(genre);
        self
    }

    pub fn sort_by(mut self, sort_by: SortBy) -> Self {
        self.sort_by = Some(sort_by);
        self
    }

    pub fn page(mut self, page: u32) -> Self {
        self.page = Some(page);
        self
    }

    /// Query parameters with defaults applied
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("page", self.page.unwrap_or(1).to_string()),
            (
                "sort_by",
                self.sort_by.unwrap_or_default().as_param().to_string(),
            ),
        ];
        if let Some(genre) = self.genre {
            params.push(("with_genres", genre.to_string()));
        }
        params
    }
}

/// The two locally persisted collections
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum CollectionName {
    Favorites,
    Watchlist,
}

impl CollectionName {
    pub const ALL: [CollectionName; 2] = [CollectionName::Favorites, CollectionName::Watchlist];

    /// Key under which the collection is persisted
    pub fn storage_key(&self) -> &'static str {
        match self {
            CollectionName::Favorites => "favorites",
            CollectionName::Watchlist => "watchlist",
        }
    }
}

impl FromStr for CollectionName {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CollectionName::ALL
            .into_iter()
            .find(|name| name.storage_key() == s)
            .ok_or_else(|| AppError::InvalidInput(format!("Unknown collection: {}", s)))
    }
}

impl Display for CollectionName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.storage_key())
    }
}
