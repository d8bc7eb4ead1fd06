/// Movie catalog provider abstraction
///
/// All remote catalog access goes through [`CatalogProvider`]. Implementations
/// shape requests and unwrap responses; they hold no business logic and never
/// retry. A failed call surfaces its error to the caller.
use crate::{
    error::AppResult,
    models::{DiscoverFilters, Genre, ListingKind, Movie, MovieId, Page},
};

pub mod tmdb;

pub use tmdb::TmdbProvider;

/// Trait for remote movie catalogs
#[cfg_attr(test, mockall::automock)]
#[async_trait::async_trait]
pub trait CatalogProvider: Send + Sync {
    /// Weekly trending movies, ranked
    async fn get_trending(&self) -> AppResult<Page<Movie>>;

    /// One page of a curated listing (`page` starts at 1)
    async fn get_listing(&self, kind: ListingKind, page: u32) -> AppResult<Page<Movie>>;

    /// Full record for a single movie, including runtime, tagline and genres
    ///
    /// Fails with `NotFound` when the catalog has no such id.
    async fn get_detail(&self, id: MovieId) -> AppResult<Movie>;

    /// Free-text title search
    ///
    /// Callers must not pass a blank query; implementations reject it with
    /// `InvalidInput` without issuing a request.
    async fn search(&self, query: &str, page: u32) -> AppResult<Page<Movie>>;

    /// Genre taxonomy used to populate filters
    async fn get_genres(&self) -> AppResult<Vec<Genre>>;

    /// Filtered and sorted discovery
    async fn discover(&self, filters: &DiscoverFilters) -> AppResult<Page<Movie>>;

    /// Movies recommended from a given title
    async fn get_recommendations(&self, id: MovieId, page: u32) -> AppResult<Page<Movie>>;

    /// Provider name for logging and debugging
    fn name(&self) -> &'static str;
}
