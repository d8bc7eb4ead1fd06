use std::collections::HashSet;
use std::sync::Arc;

use super::StorageAdapter;
use crate::error::{AppError, AppResult};
use crate::models::{CollectionName, Movie, MovieId};

/// Callback invoked after a mutation changed collection membership
pub type Listener = Box<dyn Fn(&CollectionChange) + Send + Sync>;

/// Handle returned by [`CollectionStore::subscribe`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Membership change delivered to listeners
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionChange {
    Added {
        collection: CollectionName,
        movie_id: MovieId,
    },
    Removed {
        collection: CollectionName,
        movie_id: MovieId,
    },
}

/// A durable write that failed after the in-memory change was applied
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub collection: CollectionName,
    pub message: String,
}

/// Result of an `add`/`remove`
///
/// The in-memory mutation always succeeds; `warning` is set when the
/// collection could not be written to storage afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MutationOutcome {
    /// Whether membership changed (false for duplicate adds and absent removes)
    pub changed: bool,
    pub warning: Option<PersistenceWarning>,
}

impl MutationOutcome {
    pub fn is_persisted(&self) -> bool {
        self.warning.is_none()
    }
}

/// Favorites and watchlist, kept in memory and written through to storage
pub struct CollectionStore {
    storage: Arc<dyn StorageAdapter>,
    favorites: Vec<Movie>,
    watchlist: Vec<Movie>,
    listeners: Vec<(SubscriptionId, Listener)>,
    next_subscription: u64,
}

impl CollectionStore {
    /// Loads both collections from storage
    ///
    /// Missing keys, unreadable storage, and malformed snapshots all yield an
    /// empty collection; the problem is logged and never returned.
    pub fn initialize(storage: Arc<dyn StorageAdapter>) -> Self {
        let favorites = Self::load(storage.as_ref(), CollectionName::Favorites);
        let watchlist = Self::load(storage.as_ref(), CollectionName::Watchlist);

        tracing::info!(
            favorites = favorites.len(),
            watchlist = watchlist.len(),
            "Collection store initialized"
        );

        Self {
            storage,
            favorites,
            watchlist,
            listeners: Vec::new(),
            next_subscription: 0,
        }
    }

    fn load(storage: &dyn StorageAdapter, name: CollectionName) -> Vec<Movie> {
        let raw = match storage.read(name.storage_key()) {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!(collection = %name, "No persisted snapshot, starting empty");
                return Vec::new();
            }
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Failed to read snapshot, starting empty");
                return Vec::new();
            }
        };

        match decode_snapshot(&raw) {
            Ok(movies) => movies,
            Err(e) => {
                tracing::warn!(collection = %name, error = %e, "Discarding malformed snapshot");
                Vec::new()
            }
        }
    }

    /// Appends `movie` unless a movie with the same id is already present
    pub fn add(&mut self, name: CollectionName, movie: Movie) -> MutationOutcome {
        let movie_id = movie.id;
        let items = self.items_mut(name);
        let changed = if items.iter().any(|m| m.id == movie_id) {
            false
        } else {
            items.push(movie);
            true
        };

        let warning = self.persist(name);
        if changed {
            tracing::debug!(collection = %name, movie_id, "Added to collection");
            self.notify(&CollectionChange::Added {
                collection: name,
                movie_id,
            });
        }

        MutationOutcome { changed, warning }
    }

    /// Removes the movie with `id`, if present
    pub fn remove(&mut self, name: CollectionName, id: MovieId) -> MutationOutcome {
        let items = self.items_mut(name);
        let before = items.len();
        items.retain(|m| m.id != id);
        let changed = items.len() != before;

        let warning = self.persist(name);
        if changed {
            tracing::debug!(collection = %name, movie_id = id, "Removed from collection");
            self.notify(&CollectionChange::Removed {
                collection: name,
                movie_id: id,
            });
        }

        MutationOutcome { changed, warning }
    }

    /// Removes `movie` if present, adds it otherwise
    ///
    /// Returns whether the movie is a member afterwards.
    pub fn toggle(&mut self, name: CollectionName, movie: Movie) -> (bool, MutationOutcome) {
        if self.contains(name, movie.id) {
            (false, self.remove(name, movie.id))
        } else {
            (true, self.add(name, movie))
        }
    }

    pub fn contains(&self, name: CollectionName, id: MovieId) -> bool {
        self.items(name).iter().any(|m| m.id == id)
    }

    /// Current members in insertion order
    pub fn list(&self, name: CollectionName) -> &[Movie] {
        self.items(name)
    }

    pub fn len(&self, name: CollectionName) -> usize {
        self.items(name).len()
    }

    pub fn is_empty(&self, name: CollectionName) -> bool {
        self.items(name).is_empty()
    }

    /// Registers a listener for membership changes
    pub fn subscribe<F>(&mut self, listener: F) -> SubscriptionId
    where
        F: Fn(&CollectionChange) + Send + Sync + 'static,
    {
        let id = SubscriptionId(self.next_subscription);
        self.next_subscription += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    /// Drops a listener; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(sid, _)| *sid != id);
        self.listeners.len() != before
    }

    fn items(&self, name: CollectionName) -> &Vec<Movie> {
        match name {
            CollectionName::Favorites => &self.favorites,
            CollectionName::Watchlist => &self.watchlist,
        }
    }

    fn items_mut(&mut self, name: CollectionName) -> &mut Vec<Movie> {
        match name {
            CollectionName::Favorites => &mut self.favorites,
            CollectionName::Watchlist => &mut self.watchlist,
        }
    }

    fn persist(&self, name: CollectionName) -> Option<PersistenceWarning> {
        let result = encode_snapshot(self.items(name))
            .and_then(|json| self.storage.write(name.storage_key(), &json));

        match result {
            Ok(()) => None,
            Err(e) => {
                tracing::warn!(
                    collection = %name,
                    error = %e,
                    "Failed to persist collection, keeping in-memory state"
                );
                Some(PersistenceWarning {
                    collection: name,
                    message: e.to_string(),
                })
            }
        }
    }

    fn notify(&self, change: &CollectionChange) {
        for (_, listener) in &self.listeners {
            listener(change);
        }
    }
}

/// Serializes a collection to its persisted JSON form
pub fn encode_snapshot(movies: &[Movie]) -> AppResult<String> {
    serde_json::to_string(movies)
        .map_err(|e| AppError::Persistence(format!("Snapshot serialization error: {}", e)))
}

/// Parses a persisted collection
///
/// Blank input is an empty collection. Repeated ids keep their first
/// occurrence.
pub fn decode_snapshot(raw: &str) -> AppResult<Vec<Movie>> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut movies: Vec<Movie> = serde_json::from_str(raw)
        .map_err(|e| AppError::Parse(format!("Snapshot deserialization error: {}", e)))?;

    let mut seen = HashSet::new();
    movies.retain(|m| seen.insert(m.id));
    Ok(movies)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryStorage;
    use crate::models::Genre;
    use std::sync::Mutex;

    fn movie(id: MovieId) -> Movie {
        Movie::new(id, format!("Movie {}", id))
    }

    fn detailed_movie() -> Movie {
        Movie {
            id: 155,
            title: "The Dark Knight".to_string(),
            overview: "Batman raises the stakes in his war on crime.".to_string(),
            release_date: Some("2008-07-16".to_string()),
            vote_average: 8.516,
            runtime: Some(152),
            poster_path: Some("/qJ2tW6WMUDux911r6m7haRef0WH.jpg".to_string()),
            tagline: Some("Welcome to a world without rules.".to_string()),
            genre_ids: vec![18, 28],
            genres: vec![
                Genre {
                    id: 18,
                    name: "Drama".to_string(),
                },
                Genre {
                    id: 28,
                    name: "Action".to_string(),
                },
            ],
        }
    }

    fn new_store() -> (Arc<MemoryStorage>, CollectionStore) {
        let storage = Arc::new(MemoryStorage::new());
        let store = CollectionStore::initialize(storage.clone());
        (storage, store)
    }

    fn ids(movies: &[Movie]) -> Vec<MovieId> {
        movies.iter().map(|m| m.id).collect()
    }

    #[test]
    fn test_initialize_with_missing_data() {
        let (_, store) = new_store();
        assert!(store.is_empty(CollectionName::Favorites));
        assert!(store.is_empty(CollectionName::Watchlist));
    }

    #[test]
    fn test_initialize_with_corrupt_data() {
        let storage = Arc::new(MemoryStorage::new());
        storage.seed("favorites", "{not json");
        storage.seed("watchlist", r#"[{"id":1,"title":"Kept"}]"#);

        let store = CollectionStore::initialize(storage);
        assert!(store.is_empty(CollectionName::Favorites));
        assert_eq!(ids(store.list(CollectionName::Watchlist)), vec![1]);
    }

    #[test]
    fn test_initialize_collapses_duplicate_ids() {
        let storage = Arc::new(MemoryStorage::new());
        storage.seed(
            "favorites",
            r#"[{"id":1,"title":"First"},{"id":2,"title":"B"},{"id":1,"title":"Again"}]"#,
        );

        let store = CollectionStore::initialize(storage);
        let favorites = store.list(CollectionName::Favorites);
        assert_eq!(ids(favorites), vec![1, 2]);
        assert_eq!(favorites[0].title, "First");
    }

    #[test]
    fn test_add_is_idempotent() {
        let (_, mut store) = new_store();

        let first = store.add(CollectionName::Favorites, movie(1));
        let second = store.add(CollectionName::Favorites, movie(1));

        assert!(first.changed);
        assert!(!second.changed);
        assert_eq!(ids(store.list(CollectionName::Favorites)), vec![1]);
    }

    #[test]
    fn test_remove_absent_is_noop() {
        let (_, mut store) = new_store();
        store.add(CollectionName::Watchlist, movie(1));

        let outcome = store.remove(CollectionName::Watchlist, 99);
        assert!(!outcome.changed);
        assert_eq!(ids(store.list(CollectionName::Watchlist)), vec![1]);
    }

    #[test]
    fn test_collections_are_independent() {
        let (_, mut store) = new_store();
        store.add(CollectionName::Favorites, movie(1));
        store.add(CollectionName::Watchlist, movie(1));
        store.remove(CollectionName::Favorites, 1);

        assert!(!store.contains(CollectionName::Favorites, 1));
        assert!(store.contains(CollectionName::Watchlist, 1));
    }

    #[test]
    fn test_every_mutation_writes_once() {
        let (storage, mut store) = new_store();

        store.add(CollectionName::Favorites, movie(1));
        store.add(CollectionName::Favorites, movie(1));
        store.remove(CollectionName::Favorites, 1);
        store.remove(CollectionName::Favorites, 1);

        assert_eq!(storage.write_count(), 4);
        assert_eq!(storage.get("favorites"), Some("[]".to_string()));
        assert_eq!(storage.get("watchlist"), None);
    }

    #[test]
    fn test_matches_reference_model() {
        let (storage, mut store) = new_store();
        let mut reference: Vec<MovieId> = Vec::new();

        // Small LCG so the sequence is deterministic
        let mut seed: u64 = 0x2545_f491;
        for _ in 0..500 {
            seed = seed.wrapping_mul(6364136223846793005).wrapping_add(1);
            let id = (seed >> 33) % 12;
            if (seed >> 20) % 3 == 0 {
                store.remove(CollectionName::Favorites, id);
                reference.retain(|r| *r != id);
            } else {
                store.add(CollectionName::Favorites, movie(id));
                if !reference.contains(&id) {
                    reference.push(id);
                }
            }
            assert_eq!(ids(store.list(CollectionName::Favorites)), reference);
        }

        let reloaded = CollectionStore::initialize(storage);
        assert_eq!(ids(reloaded.list(CollectionName::Favorites)), reference);
    }

    #[test]
    fn test_write_failure_keeps_in_memory_state() {
        let (storage, mut store) = new_store();
        storage.set_fail_writes(true);

        let outcome = store.add(CollectionName::Favorites, movie(42));

        assert!(outcome.changed);
        assert!(!outcome.is_persisted());
        let warning = outcome.warning.unwrap();
        assert_eq!(warning.collection, CollectionName::Favorites);
        assert!(warning.message.contains("quota exceeded"));
        assert!(store.contains(CollectionName::Favorites, 42));
        assert_eq!(storage.get("favorites"), None);
    }

    #[test]
    fn test_persistence_resumes_after_failure() {
        let (storage, mut store) = new_store();
        storage.set_fail_writes(true);
        store.add(CollectionName::Watchlist, movie(1));
        storage.set_fail_writes(false);

        let outcome = store.add(CollectionName::Watchlist, movie(2));
        assert!(outcome.is_persisted());

        let reloaded = CollectionStore::initialize(storage);
        assert_eq!(ids(reloaded.list(CollectionName::Watchlist)), vec![1, 2]);
    }

    #[test]
    fn test_snapshot_roundtrip_preserves_fields() {
        let movies = vec![detailed_movie(), movie(7)];
        let decoded = decode_snapshot(&encode_snapshot(&movies).unwrap()).unwrap();
        assert_eq!(decoded, movies);

        let empty = decode_snapshot(&encode_snapshot(&[]).unwrap()).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_decode_blank_snapshot() {
        assert!(decode_snapshot("").unwrap().is_empty());
        assert!(decode_snapshot("  \n").unwrap().is_empty());
        assert!(matches!(decode_snapshot("null"), Err(AppError::Parse(_))));
    }

    #[test]
    fn test_toggle() {
        let (_, mut store) = new_store();

        let (member, outcome) = store.toggle(CollectionName::Favorites, detailed_movie());
        assert!(member);
        assert!(outcome.changed);

        let (member, outcome) = store.toggle(CollectionName::Favorites, detailed_movie());
        assert!(!member);
        assert!(outcome.changed);
        assert!(store.is_empty(CollectionName::Favorites));
    }

    #[test]
    fn test_listeners_notified_on_change_only() {
        let (_, mut store) = new_store();
        let seen = Arc::new(Mutex::new(Vec::new()));

        let sink = seen.clone();
        let id = store.subscribe(move |change| sink.lock().unwrap().push(change.clone()));

        store.add(CollectionName::Favorites, movie(1));
        store.add(CollectionName::Favorites, movie(1));
        store.remove(CollectionName::Watchlist, 1);
        store.remove(CollectionName::Favorites, 1);

        assert_eq!(
            *seen.lock().unwrap(),
            vec![
                CollectionChange::Added {
                    collection: CollectionName::Favorites,
                    movie_id: 1
                },
                CollectionChange::Removed {
                    collection: CollectionName::Favorites,
                    movie_id: 1
                },
            ]
        );

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.add(CollectionName::Favorites, movie(2));
        assert_eq!(seen.lock().unwrap().len(), 2);
    }

    #[test]
    fn test_listener_notified_despite_write_failure() {
        let (storage, mut store) = new_store();
        storage.set_fail_writes(true);
        let count = Arc::new(Mutex::new(0));

        let sink = count.clone();
        store.subscribe(move |_| *sink.lock().unwrap() += 1);
        store.add(CollectionName::Watchlist, movie(3));

        assert_eq!(*count.lock().unwrap(), 1);
    }
}
