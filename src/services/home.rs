use std::sync::Arc;

use crate::{
    error::{AppError, AppResult},
    models::{ListingKind, Movie, Page},
    services::providers::CatalogProvider,
};

/// Number of movies kept per home section
pub const SECTION_SIZE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HomeSection {
    Trending,
    Popular,
    NowPlaying,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HomeSections {
    pub trending: Vec<Movie>,
    pub popular: Vec<Movie>,
    pub now_playing: Vec<Movie>,
}

/// Which sections a refresh replaced and which kept their previous contents
#[derive(Debug, Default)]
pub struct RefreshReport {
    pub updated: Vec<HomeSection>,
    pub failed: Vec<(HomeSection, AppError)>,
}

impl RefreshReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// The landing page's trending, popular and now-playing rows
pub struct HomeFeed {
    provider: Arc<dyn CatalogProvider>,
    sections: HomeSections,
}

impl HomeFeed {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            sections: HomeSections::default(),
        }
    }

    pub fn sections(&self) -> &HomeSections {
        &self.sections
    }

    /// Fetches all three sections concurrently
    ///
    /// A section whose request fails keeps what it showed before.
    pub async fn refresh(&mut self) -> RefreshReport {
        let (trending, popular, now_playing) = tokio::join!(
            self.provider.get_trending(),
            self.provider.get_listing(ListingKind::Popular, 1),
            self.provider.get_listing(ListingKind::NowPlaying, 1),
        );

        let mut report = RefreshReport::default();
        apply(
            &mut self.sections.trending,
            HomeSection::Trending,
            trending,
            &mut report,
        );
        apply(
            &mut self.sections.popular,
            HomeSection::Popular,
            popular,
            &mut report,
        );
        apply(
            &mut self.sections.now_playing,
            HomeSection::NowPlaying,
            now_playing,
            &mut report,
        );

        if !report.is_complete() {
            tracing::warn!(
                success_count = report.updated.len(),
                error_count = report.failed.len(),
                provider = self.provider.name(),
                "Partial home feed refresh failure"
            );
        }

        report
    }
}

fn apply(
    slot: &mut Vec<Movie>,
    section: HomeSection,
    result: AppResult<Page<Movie>>,
    report: &mut RefreshReport,
) {
    match result {
        Ok(page) => {
            *slot = page.results.into_iter().take(SECTION_SIZE).collect();
            report.updated.push(section);
        }
        Err(e) => {
            tracing::error!(section = ?section, error = %e, "Home section fetch failed");
            report.failed.push((section, e));
        }
    }
}
