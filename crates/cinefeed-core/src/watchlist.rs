use cinefeed_models::Movie;
use std::collections::HashSet;
use tracing::{debug, info, warn};
use crate::store::KeyValueStore;

/// Store key holding the serialized watchlist
pub const WATCHLIST_KEY: &str = "watchlist";

/// Saved movies, unique by `id`, in insertion order.
///
/// Every change rewrites the whole list to the store. Storage problems are
/// logged and never surfaced; a list that cannot be read starts out empty.
pub struct Watchlist<S: KeyValueStore> {
    store: S,
    movies: Vec<Movie>,
}

impl<S: KeyValueStore> Watchlist<S> {
    pub fn load(store: S) -> Self {
        let movies = match store.get(WATCHLIST_KEY) {
            None => Vec::new(),
            Some(bytes) => match serde_json::from_slice::<Vec<Movie>>(&bytes) {
                Ok(stored) => {
                    let movies = unique_by_id(stored);
                    debug!("Loaded watchlist ({} movies)", movies.len());
                    movies
                }
                Err(e) => {
                    warn!("Stored watchlist is unreadable, starting empty: {}", e);
                    Vec::new()
                }
            },
        };
        Self { store, movies }
    }

    /// Returns false when a movie with the same id is already saved
    pub fn add(&mut self, movie: Movie) -> bool {
        if self.contains(movie.id) {
            return false;
        }
        info!("Added '{}' to watchlist", movie.title);
        self.movies.push(movie);
        self.persist();
        true
    }

    /// Returns false when the id was not saved
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.movies.len();
        self.movies.retain(|m| m.id != id);
        if self.movies.len() == before {
            return false;
        }
        info!("Removed movie {} from watchlist", id);
        self.persist();
        true
    }

    /// Add if absent, remove if present. Returns the new membership.
    pub fn toggle(&mut self, movie: Movie) -> bool {
        if self.remove(movie.id) {
            false
        } else {
            self.add(movie)
        }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.movies.iter().any(|m| m.id == id)
    }

    pub fn clear(&mut self) {
        self.movies.clear();
        self.persist();
    }

    pub fn movies(&self) -> &[Movie] {
        &self.movies
    }

    pub fn len(&self) -> usize {
        self.movies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.movies.is_empty()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn persist(&mut self) {
        let bytes = match serde_json::to_vec(&self.movies) {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Failed to serialize watchlist: {}", e);
                return;
            }
        };
        if let Err(e) = self.store.set(WATCHLIST_KEY, &bytes) {
            warn!("Failed to save watchlist: {:#}", e);
        }
    }
}

/// First occurrence of each id wins; later duplicates are dropped
fn unique_by_id(stored: Vec<Movie>) -> Vec<Movie> {
    let mut seen = HashSet::new();
    let total = stored.len();
    let movies: Vec<Movie> = stored.into_iter().filter(|m| seen.insert(m.id)).collect();
    if movies.len() < total {
        warn!("Dropped {} duplicate watchlist entries", total - movies.len());
    }
    movies
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, MemoryStore};
    use serde_json::json;
    use tempfile::TempDir;

    fn movie(id: i64, title: &str, vote_count: u64) -> Movie {
        serde_json::from_value(json!({
            "id": id,
            "title": title,
            "vote_average": 7.5,
            "vote_count": vote_count,
            "popularity": 3.0,
            "adult": false,
            "video": false,
            "release_date": "2001-06-15"
        }))
        .unwrap()
    }

    #[test]
    fn test_toggle_identity_by_id() {
        let mut watchlist = Watchlist::load(MemoryStore::new());

        assert!(watchlist.toggle(movie(1, "Lagaan", 100)));
        assert!(watchlist.contains(1));

        // Same id with drifted fields counts as present
        assert!(!watchlist.add(movie(1, "Lagaan", 250)));
        assert_eq!(watchlist.len(), 1);

        assert!(!watchlist.toggle(movie(1, "Lagaan", 250)));
        assert!(watchlist.is_empty());
    }

    #[test]
    fn test_insertion_order_and_remove() {
        let mut watchlist = Watchlist::load(MemoryStore::new());
        watchlist.add(movie(3, "C", 1));
        watchlist.add(movie(1, "A", 1));
        watchlist.add(movie(2, "B", 1));
        assert!(watchlist.remove(1));
        assert!(!watchlist.remove(1));
        let ids: Vec<i64> = watchlist.movies().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[test]
    fn test_every_mutation_persists() {
        let mut watchlist = Watchlist::load(MemoryStore::new());
        watchlist.add(movie(1, "A", 1));
        watchlist.add(movie(2, "B", 1));

        let saved: Vec<Movie> =
            serde_json::from_slice(&watchlist.store().get(WATCHLIST_KEY).unwrap()).unwrap();
        assert_eq!(saved.len(), 2);

        watchlist.clear();
        assert_eq!(watchlist.store().get(WATCHLIST_KEY).unwrap(), b"[]");
    }

    #[test]
    fn test_survives_reload_from_disk() {
        let dir = TempDir::new().unwrap();
        {
            let mut watchlist = Watchlist::load(FileStore::new(dir.path()).unwrap());
            watchlist.add(movie(550, "Fight Club", 26000));
            watchlist.add(movie(19404, "Dilwale Dulhania Le Jayenge", 4000));
        }

        let watchlist = Watchlist::load(FileStore::new(dir.path()).unwrap());
        assert_eq!(watchlist.len(), 2);
        assert_eq!(watchlist.movies()[1].title, "Dilwale Dulhania Le Jayenge");
        assert_eq!(watchlist.movies()[0].release_date.as_deref(), Some("2001-06-15"));
    }

    #[test]
    fn test_corrupt_data_loads_empty() {
        let mut store = MemoryStore::new();
        store.set(WATCHLIST_KEY, b"{not json").unwrap();
        let mut watchlist = Watchlist::load(store);
        assert!(watchlist.is_empty());

        // First write replaces the corrupt value
        watchlist.add(movie(1, "A", 1));
        let reloaded = Watchlist::load(watchlist.store().clone());
        assert_eq!(reloaded.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_in_store_collapse() {
        let mut store = MemoryStore::new();
        let stored = vec![movie(1, "Lagaan", 100), movie(2, "Swades", 80), movie(1, "Lagaan", 250)];
        store.set(WATCHLIST_KEY, &serde_json::to_vec(&stored).unwrap()).unwrap();

        let mut watchlist = Watchlist::load(store);
        assert_eq!(watchlist.len(), 2);
        let ids: Vec<i64> = watchlist.movies().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(watchlist.movies()[0].vote_count, 100);

        assert!(!watchlist.toggle(movie(1, "Lagaan", 100)));
        assert_eq!(watchlist.len(), 1);
    }
}
