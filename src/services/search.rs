use std::collections::HashSet;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::{
    error::AppResult,
    models::Movie,
    services::{debounce::Debounced, providers::CatalogProvider},
};

/// What a search screen currently shows
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchSnapshot {
    /// Query whose results are displayed
    pub query: Option<String>,
    pub results: Vec<Movie>,
    pub page: u32,
    pub total_pages: u32,
    /// A first-page request for a newer query is outstanding
    pub searching: bool,
    pub loading_more: bool,
    /// Message of the most recent failed request, cleared by the next success
    pub error: Option<String>,
}

impl SearchSnapshot {
    pub fn has_more(&self) -> bool {
        self.query.is_some() && self.page < self.total_pages
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Results replaced the displayed set
    Applied { results: usize },
    /// A newer query was issued before this one resolved
    Superseded,
    /// Blank input; the displayed set was cleared without a request
    Cleared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMoreOutcome {
    Appended { added: usize },
    /// Nothing to continue, last page reached, or a request is already running
    Skipped,
    Superseded,
}

#[derive(Default)]
struct SearchState {
    generation: u64,
    /// Generation a continuation request was issued under
    continuation: Option<u64>,
    snapshot: SearchSnapshot,
}

/// Search session with stale-response protection and "load more" paging
///
/// Every search bumps a generation counter; a response is applied only if
/// no newer search has started since it was issued. The state lock is never
/// held across an await.
pub struct SearchController {
    provider: Arc<dyn CatalogProvider>,
    state: Mutex<SearchState>,
}

impl SearchController {
    pub fn new(provider: Arc<dyn CatalogProvider>) -> Self {
        Self {
            provider,
            state: Mutex::new(SearchState::default()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, SearchState> {
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> SearchSnapshot {
        self.lock().snapshot.clone()
    }

    /// Runs a first-page search for `query`
    ///
    /// On failure the previously displayed results stay in place and the
    /// error is both recorded in the snapshot and returned.
    pub async fn search(&self, query: &str) -> AppResult<SearchOutcome> {
        let query = query.trim();

        let generation = {
            let mut state = self.lock();
            state.generation += 1;
            state.continuation = None;
            state.snapshot.loading_more = false;

            if query.is_empty() {
                state.snapshot = SearchSnapshot::default();
                return Ok(SearchOutcome::Cleared);
            }

            state.snapshot.searching = true;
            state.generation
        };

        let result = self.provider.search(query, 1).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(
                query = %query,
                generation,
                latest = state.generation,
                "Discarding superseded search response"
            );
            return Ok(SearchOutcome::Superseded);
        }

        let snapshot = &mut state.snapshot;
        snapshot.searching = false;

        match result {
            Ok(page) => {
                let mut seen = HashSet::new();
                let mut results = page.results;
                results.retain(|m| seen.insert(m.id));

                snapshot.query = Some(query.to_string());
                snapshot.page = page.page;
                snapshot.total_pages = page.total_pages;
                snapshot.error = None;
                snapshot.results = results;

                Ok(SearchOutcome::Applied {
                    results: snapshot.results.len(),
                })
            }
            Err(e) => {
                tracing::warn!(query = %query, error = %e, "Search failed, keeping previous results");
                snapshot.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Fetches the next page of the displayed query and appends it
    ///
    /// At most one continuation runs at a time; ids already displayed are
    /// skipped.
    pub async fn load_more(&self) -> AppResult<LoadMoreOutcome> {
        let (generation, query, next_page) = {
            let mut state = self.lock();
            let busy = state.continuation.is_some() || state.snapshot.searching;
            let exhausted = !state.snapshot.has_more();

            let query = match state.snapshot.query.clone() {
                Some(query) if !busy && !exhausted => query,
                _ => return Ok(LoadMoreOutcome::Skipped),
            };

            state.continuation = Some(state.generation);
            state.snapshot.loading_more = true;
            (state.generation, query, state.snapshot.page + 1)
        };

        let result = self.provider.search(&query, next_page).await;

        let mut state = self.lock();
        if state.generation != generation {
            tracing::debug!(
                query = %query,
                page = next_page,
                "Discarding continuation for superseded search"
            );
            return Ok(LoadMoreOutcome::Superseded);
        }

        state.continuation = None;
        let snapshot = &mut state.snapshot;
        snapshot.loading_more = false;

        match result {
            Ok(page) => {
                let mut seen: HashSet<_> = snapshot.results.iter().map(|m| m.id).collect();
                let before = snapshot.results.len();
                snapshot
                    .results
                    .extend(page.results.into_iter().filter(|m| seen.insert(m.id)));

                snapshot.page = page.page;
                snapshot.total_pages = page.total_pages;
                snapshot.error = None;

                Ok(LoadMoreOutcome::Appended {
                    added: snapshot.results.len() - before,
                })
            }
            Err(e) => {
                tracing::warn!(query = %query, page = next_page, error = %e, "Load more failed");
                snapshot.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    /// Runs one search per settled query until the input closes
    ///
    /// Each search is spawned so a newer query can start while an older one
    /// is still waiting on the network; the generation guard sorts out the
    /// responses.
    pub async fn drive(self: Arc<Self>, mut input: Debounced<String>) {
        while let Some(query) = input.next().await {
            let controller = Arc::clone(&self);
            tokio::spawn(async move {
                if let Err(e) = controller.search(&query).await {
                    tracing::debug!(query = %query, error = %e, "Debounced search failed");
                }
            });
        }
        tracing::debug!("Search input closed");
    }
}
