/// TMDB (The Movie Database) provider
///
/// Endpoints used, all relative to the configured base URL (v3 API):
/// - `/trending/movie/week`
/// - `/movie/{now_playing|popular|top_rated|upcoming}`
/// - `/movie/{id}` and `/movie/{id}/recommendations`
/// - `/search/movie`
/// - `/genre/movie/list`
/// - `/discover/movie`
///
/// The API key travels as the `api_key` query parameter on every request.
use crate::{
    config::Config,
    error::{AppError, AppResult},
    models::{DiscoverFilters, Genre, ListingKind, Movie, MovieId, Page},
    services::providers::CatalogProvider,
};
use reqwest::{Client as HttpClient, StatusCode};
use serde::{de::DeserializeOwned, Deserialize};
use std::time::Duration;

const PROVIDER_NAME: &str = "tmdb";

#[derive(Debug, Deserialize)]
struct GenreListResponse {
    genres: Vec<Genre>,
}

#[derive(Clone)]
pub struct TmdbProvider {
    http_client: HttpClient,
    api_key: String,
    api_url: String,
}

impl TmdbProvider {
    /// Creates a provider whose requests give up after `timeout`
    pub fn new(api_key: String, api_url: String, timeout: Duration) -> AppResult<Self> {
        if api_key.trim().is_empty() {
            return Err(AppError::Config("TMDB API key is required".to_string()));
        }

        let http_client = HttpClient::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            http_client,
            api_key,
            api_url: api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn from_config(config: &Config) -> AppResult<Self> {
        Self::new(
            config.tmdb_api_key.clone(),
            config.tmdb_api_url.clone(),
            config.request_timeout(),
        )
    }

    fn validate_page(page: u32) -> AppResult<()> {
        if page == 0 {
            return Err(AppError::InvalidInput(
                "Page numbers start at 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Issues a GET and decodes the JSON body
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> AppResult<T> {
        let url = format!("{}{}", self.api_url, path);

        let response = self
            .http_client
            .get(&url)
            .query(&[("api_key", self.api_key.as_str())])
            .query(params)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AppError::Upstream {
                status: status.as_u16(),
                message: body,
            });
        }

        let response_text = response.text().await?;
        serde_json::from_str(&response_text).map_err(|e| {
            tracing::error!(
                error = %e,
                path = %path,
                provider = PROVIDER_NAME,
                "Failed to deserialize TMDB response"
            );
            AppError::Parse(format!("Failed to parse TMDB response for {}: {}", path, e))
        })
    }

    async fn get_page(&self, path: &str, params: &[(&str, String)]) -> AppResult<Page<Movie>> {
        let page: Page<Movie> = self.get_json(path, params).await?;
        tracing::debug!(
            path = %path,
            page = page.page,
            total_pages = page.total_pages,
            results = page.results.len(),
            provider = PROVIDER_NAME,
            "Page fetched"
        );
        Ok(page)
    }
}

/// A 404 on a per-movie path means the id does not exist
fn movie_not_found(error: AppError, id: MovieId) -> AppError {
    match error {
        AppError::Upstream { status, .. } if status == StatusCode::NOT_FOUND.as_u16() => {
            AppError::NotFound(format!("Movie {}", id))
        }
        other => other,
    }
}

#[async_trait::async_trait]
impl CatalogProvider for TmdbProvider {
    async fn get_trending(&self) -> AppResult<Page<Movie>> {
        self.get_page("/trending/movie/week", &[]).await
    }

    async fn get_listing(&self, kind: ListingKind, page: u32) -> AppResult<Page<Movie>> {
        Self::validate_page(page)?;
        let path = format!("/movie/{}", kind.as_path());
        self.get_page(&path, &[("page", page.to_string())]).await
    }

    async fn get_detail(&self, id: MovieId) -> AppResult<Movie> {
        let path = format!("/movie/{}", id);
        let movie: Movie = self
            .get_json(&path, &[])
            .await
            .map_err(|e| movie_not_found(e, id))?;

        tracing::info!(
            movie_id = id,
            title = %movie.title,
            provider = PROVIDER_NAME,
            "Detail fetched"
        );

        Ok(movie)
    }

    async fn search(&self, query: &str, page: u32) -> AppResult<Page<Movie>> {
        if query.trim().is_empty() {
            return Err(AppError::InvalidInput(
                "Search query cannot be empty".to_string(),
            ));
        }
        Self::validate_page(page)?;

        let results = self
            .get_page(
                "/search/movie",
                &[("query", query.to_string()), ("page", page.to_string())],
            )
            .await?;

        tracing::info!(
            query = %query,
            page,
            results = results.results.len(),
            provider = PROVIDER_NAME,
            "Title search completed"
        );

        Ok(results)
    }

    async fn get_genres(&self) -> AppResult<Vec<Genre>> {
        let response: GenreListResponse = self.get_json("/genre/movie/list", &[]).await?;
        Ok(response.genres)
    }

    async fn discover(&self, filters: &DiscoverFilters) -> AppResult<Page<Movie>> {
        if let Some(page) = filters.page {
            Self::validate_page(page)?;
        }
        self.get_page("/discover/movie", &filters.to_query()).await
    }

    async fn get_recommendations(&self, id: MovieId, page: u32) -> AppResult<Page<Movie>> {
        Self::validate_page(page)?;
        let path = format!("/movie/{}/recommendations", id);
        self.get_page(&path, &[("page", page.to_string())])
            .await
            .map_err(|e| movie_not_found(e, id))
    }

    fn name(&self) -> &'static str {
        PROVIDER_NAME
    }
}
