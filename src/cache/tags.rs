use chrono::{DateTime, Utc};
use std::collections::HashMap;

use crate::models::{MovieId, Tag};

/// A populated cache value and when it was stored
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub value: T,
    pub populated_at: DateTime<Utc>,
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            populated_at: Utc::now(),
        }
    }
}

/// Page-lifetime cache of every tag the backend knows about
///
/// The generation counter is bumped on every invalidation. A fetch records the
/// generation it started under and `populate` refuses to store its result if an
/// invalidation happened in between.
#[derive(Debug, Default)]
pub struct AllTagsCache {
    entry: Option<CacheEntry<Vec<Tag>>>,
    generation: u64,
}

impl AllTagsCache {
    pub fn get(&self) -> Option<&[Tag]> {
        self.entry.as_ref().map(|e| e.value.as_slice())
    }

    pub fn entry(&self) -> Option<&CacheEntry<Vec<Tag>>> {
        self.entry.as_ref()
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Stores `tags` unless the cache was invalidated after `generation` was read
    pub fn populate(&mut self, generation: u64, tags: Vec<Tag>) -> bool {
        if generation != self.generation {
            return false;
        }
        self.entry = Some(CacheEntry::new(tags));
        true
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
        self.generation += 1;
    }

    /// Exact, case-sensitive lookup. `false` when the cache is empty.
    pub fn contains_name(&self, name: &str) -> bool {
        self.get()
            .map(|tags| tags.iter().any(|t| t.name == name))
            .unwrap_or(false)
    }
}

/// Per-movie cache of attached tag names, in backend order
///
/// Local mutations (`insert`, `remove`, `restore`) bump the movie's generation
/// so that a fetch issued before them cannot overwrite the newer local state.
#[derive(Debug, Default)]
pub struct MovieTagsCache {
    entries: HashMap<MovieId, CacheEntry<Vec<String>>>,
    generations: HashMap<MovieId, u64>,
}

impl MovieTagsCache {
    pub fn get(&self, movie_id: MovieId) -> Option<&[String]> {
        self.entries.get(&movie_id).map(|e| e.value.as_slice())
    }

    pub fn entry(&self, movie_id: MovieId) -> Option<&CacheEntry<Vec<String>>> {
        self.entries.get(&movie_id)
    }

    pub fn generation(&self, movie_id: MovieId) -> u64 {
        self.generations.get(&movie_id).copied().unwrap_or(0)
    }

    fn bump(&mut self, movie_id: MovieId) {
        *self.generations.entry(movie_id).or_insert(0) += 1;
    }

    /// Authoritative overwrite. Duplicate names are dropped, first one wins.
    pub fn populate(&mut self, movie_id: MovieId, generation: u64, names: Vec<String>) -> bool {
        if generation != self.generation(movie_id) {
            return false;
        }

        let mut unique: Vec<String> = Vec::with_capacity(names.len());
        for name in names {
            if !unique.contains(&name) {
                unique.push(name);
            }
        }

        self.entries.insert(movie_id, CacheEntry::new(unique));
        true
    }

    pub fn invalidate(&mut self, movie_id: MovieId) {
        self.entries.remove(&movie_id);
        self.bump(movie_id);
    }

    /// Appends `name` if the movie is cached and the name is not attached yet
    pub fn insert(&mut self, movie_id: MovieId, name: &str) -> bool {
        let Some(entry) = self.entries.get_mut(&movie_id) else {
            return false;
        };
        if entry.value.iter().any(|n| n == name) {
            return false;
        }
        entry.value.push(name.to_string());
        self.bump(movie_id);
        true
    }

    /// Removes `name` and returns the position it held
    pub fn remove(&mut self, movie_id: MovieId, name: &str) -> Option<usize> {
        let entry = self.entries.get_mut(&movie_id)?;
        let position = entry.value.iter().position(|n| n == name)?;
        entry.value.remove(position);
        self.bump(movie_id);
        Some(position)
    }

    /// Puts a removed name back where it was
    pub fn restore(&mut self, movie_id: MovieId, position: usize, name: &str) {
        let Some(entry) = self.entries.get_mut(&movie_id) else {
            return;
        };
        if entry.value.iter().any(|n| n == name) {
            return;
        }
        let position = position.min(entry.value.len());
        entry.value.insert(position, name.to_string());
        self.bump(movie_id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(names: &[&str]) -> Vec<Tag> {
        names.iter().map(|n| Tag::new(*n)).collect()
    }

    fn names(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_all_tags_populate_and_get() {
        let mut cache = AllTagsCache::default();
        assert!(cache.get().is_none());

        let generation = cache.generation();
        assert!(cache.populate(generation, tags(&["Action", "Drama"])));
        assert_eq!(cache.get().unwrap().len(), 2);
        assert!(cache.contains_name("Drama"));
        assert!(!cache.contains_name("drama"));
    }

    #[test]
    fn test_all_tags_stale_populate_is_discarded() {
        let mut cache = AllTagsCache::default();
        let generation = cache.generation();

        cache.invalidate();
        assert!(!cache.populate(generation, tags(&["Stale"])));
        assert!(cache.get().is_none());

        assert!(cache.populate(cache.generation(), tags(&["Fresh"])));
        assert!(cache.contains_name("Fresh"));
    }

    #[test]
    fn test_movie_tags_populate_deduplicates() {
        let mut cache = MovieTagsCache::default();
        let movie = MovieId(1);

        cache.populate(movie, 0, names(&["Drama", "Classic", "Drama"]));
        assert_eq!(cache.get(movie).unwrap(), &names(&["Drama", "Classic"])[..]);
    }

    #[test]
    fn test_movie_tags_insert_skips_duplicates_and_unknown_movies() {
        let mut cache = MovieTagsCache::default();
        let movie = MovieId(1);

        assert!(!cache.insert(movie, "Drama"));

        cache.populate(movie, 0, names(&["Drama"]));
        assert!(!cache.insert(movie, "Drama"));
        assert!(cache.insert(movie, "Classic"));
        assert_eq!(cache.get(movie).unwrap(), &names(&["Drama", "Classic"])[..]);
    }

    #[test]
    fn test_movie_tags_remove_and_restore_position() {
        let mut cache = MovieTagsCache::default();
        let movie = MovieId(9);
        cache.populate(movie, 0, names(&["Action", "Drama", "Classic"]));

        let position = cache.remove(movie, "Drama").unwrap();
        assert_eq!(position, 1);
        assert_eq!(cache.get(movie).unwrap(), &names(&["Action", "Classic"])[..]);

        cache.restore(movie, position, "Drama");
        assert_eq!(
            cache.get(movie).unwrap(),
            &names(&["Action", "Drama", "Classic"])[..]
        );
    }

    #[test]
    fn test_local_mutation_blocks_older_fetch() {
        let mut cache = MovieTagsCache::default();
        let movie = MovieId(3);
        cache.populate(movie, 0, names(&["Drama"]));

        let in_flight = cache.generation(movie);
        cache.remove(movie, "Drama");

        assert!(!cache.populate(movie, in_flight, names(&["Drama"])));
        assert!(cache.get(movie).unwrap().is_empty());
    }
}
