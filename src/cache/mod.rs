use std::collections::HashMap;
use std::fmt::Display;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::models::{MovieId, Tag};

mod macros;
pub mod tags;

pub use tags::{AllTagsCache, CacheEntry, MovieTagsCache};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKey {
    AllTags,
    MovieTags(MovieId),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::AllTags => write!(f, "tags:all"),
            CacheKey::MovieTags(id) => write!(f, "tags:movie:{}", id),
        }
    }
}

/// Both tag caches, mutated only through the engine that owns them
#[derive(Debug, Default)]
pub struct TagCachesInner {
    pub all_tags: AllTagsCache,
    pub movie_tags: MovieTagsCache,
}

impl TagCachesInner {
    pub fn generation(&self, key: &CacheKey) -> u64 {
        match key {
            CacheKey::AllTags => self.all_tags.generation(),
            CacheKey::MovieTags(id) => self.movie_tags.generation(*id),
        }
    }

    /// When the slot was last populated, if it holds a value
    pub fn populated_at(&self, key: &CacheKey) -> Option<DateTime<Utc>> {
        match key {
            CacheKey::AllTags => self.all_tags.entry().map(|e| e.populated_at),
            CacheKey::MovieTags(id) => self.movie_tags.entry(*id).map(|e| e.populated_at),
        }
    }
}

/// Value types that live in one of the tag cache slots
pub trait Cached: Clone {
    fn lookup(caches: &TagCachesInner, key: &CacheKey) -> Option<Self>;

    fn store(caches: &mut TagCachesInner, key: &CacheKey, generation: u64, value: Self) -> bool;
}

impl Cached for Vec<Tag> {
    fn lookup(caches: &TagCachesInner, key: &CacheKey) -> Option<Self> {
        match key {
            CacheKey::AllTags => caches.all_tags.get().map(<[Tag]>::to_vec),
            CacheKey::MovieTags(_) => None,
        }
    }

    fn store(caches: &mut TagCachesInner, key: &CacheKey, generation: u64, value: Self) -> bool {
        match key {
            CacheKey::AllTags => caches.all_tags.populate(generation, value),
            CacheKey::MovieTags(_) => false,
        }
    }
}

impl Cached for Vec<String> {
    fn lookup(caches: &TagCachesInner, key: &CacheKey) -> Option<Self> {
        match key {
            CacheKey::MovieTags(id) => caches.movie_tags.get(*id).map(<[String]>::to_vec),
            CacheKey::AllTags => None,
        }
    }

    fn store(caches: &mut TagCachesInner, key: &CacheKey, generation: u64, value: Self) -> bool {
        match key {
            CacheKey::MovieTags(id) => caches.movie_tags.populate(*id, generation, value),
            CacheKey::AllTags => false,
        }
    }
}

/// Shared handle to the tag caches
#[derive(Clone, Default)]
pub struct TagCaches {
    inner: Arc<RwLock<TagCachesInner>>,
    /// One population lock per slot, held across the backend fetch
    fills: Arc<Mutex<HashMap<CacheKey, Arc<AsyncMutex<()>>>>>,
}

impl TagCaches {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn read(&self) -> RwLockReadGuard<'_, TagCachesInner> {
        self.inner.read().await
    }

    pub async fn write(&self) -> RwLockWriteGuard<'_, TagCachesInner> {
        self.inner.write().await
    }

    /// Returns the cached value, if any, and the slot's current generation
    pub async fn lookup<T: Cached>(&self, key: &CacheKey) -> (Option<T>, u64) {
        let guard = self.inner.read().await;
        let value = T::lookup(&guard, key);
        if let Some(populated_at) = value.as_ref().and(guard.populated_at(key)) {
            tracing::trace!(
                cache = %key,
                age_ms = (Utc::now() - populated_at).num_milliseconds(),
                "Serving cached value"
            );
        }
        (value, guard.generation(key))
    }

    /// Waits until no other task is populating `key`
    ///
    /// Callers re-check the slot after acquiring the guard; a concurrent miss
    /// then finds the value stored by the fetch it waited on.
    pub async fn fill_guard(&self, key: &CacheKey) -> OwnedMutexGuard<()> {
        let slot = {
            let mut fills = match self.fills.lock() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            Arc::clone(fills.entry(*key).or_default())
        };
        slot.lock_owned().await
    }

    /// Stores a fetched value unless the slot changed since `generation`
    pub async fn store<T: Cached>(&self, key: &CacheKey, generation: u64, value: &T) -> bool {
        let mut guard = self.inner.write().await;
        let stored = T::store(&mut guard, key, generation, value.clone());
        if !stored {
            tracing::debug!(
                cache = %key,
                generation,
                current = guard.generation(key),
                "Discarded stale cache population"
            );
        }
        stored
    }

    pub async fn invalidate(&self, key: &CacheKey) {
        let mut guard = self.inner.write().await;
        match key {
            CacheKey::AllTags => guard.all_tags.invalidate(),
            CacheKey::MovieTags(id) => guard.movie_tags.invalidate(*id),
        }
        tracing::debug!(cache = %key, "Cache invalidated");
    }

    /// Snapshot of a movie's attached names
    pub async fn movie_tags(&self, movie_id: MovieId) -> Option<Vec<String>> {
        self.inner.read().await.movie_tags.get(movie_id).map(<[String]>::to_vec)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AppError, AppResult};

    #[test]
    fn test_cache_key_display_all_tags() {
        assert_eq!(format!("{}", CacheKey::AllTags), "tags:all");
    }

    #[test]
    fn test_cache_key_display_movie_tags() {
        let key = CacheKey::MovieTags(MovieId(42));
        assert_eq!(format!("{}", key), "tags:movie:42");
    }

    #[tokio::test]
    async fn test_cached_macro_populates_on_miss() {
        let caches = TagCaches::new();

        let first: AppResult<Vec<Tag>> = crate::cached!(caches, CacheKey::AllTags, async {
            Ok::<_, AppError>(vec![Tag::new("Action")])
        });
        assert_eq!(first.unwrap().len(), 1);

        let second: AppResult<Vec<Tag>> = crate::cached!(caches, CacheKey::AllTags, async {
            Err::<Vec<Tag>, _>(AppError::Internal("should not be called".to_string()))
        });
        assert_eq!(second.unwrap()[0].name, "Action");
    }

    #[tokio::test]
    async fn test_cached_macro_error_leaves_slot_empty() {
        let caches = TagCaches::new();
        let key = CacheKey::MovieTags(MovieId(5));

        let result: AppResult<Vec<String>> = crate::cached!(caches, key, async {
            Err::<Vec<String>, _>(AppError::ExternalApi("status 500".to_string()))
        });
        assert!(result.is_err());
        assert_eq!(caches.movie_tags(MovieId(5)).await, None);
    }

    #[tokio::test]
    async fn test_concurrent_miss_waits_for_inflight_fill() {
        let caches = TagCaches::new();
        let fill = caches.fill_guard(&CacheKey::AllTags).await;

        let waiter = {
            let caches = caches.clone();
            tokio::spawn(async move {
                let result: AppResult<Vec<Tag>> = crate::cached!(caches, CacheKey::AllTags, async {
                    Err::<Vec<Tag>, _>(AppError::Internal("should not be called".to_string()))
                });
                result
            })
        };
        tokio::task::yield_now().await;

        caches
            .store(&CacheKey::AllTags, 0, &vec![Tag::new("Action")])
            .await;
        drop(fill);

        let tags = waiter.await.unwrap().unwrap();
        assert_eq!(tags[0].name, "Action");
    }

    #[tokio::test]
    async fn test_invalidate_between_lookup_and_store() {
        let caches = TagCaches::new();
        let key = CacheKey::AllTags;

        let (hit, generation) = caches.lookup::<Vec<Tag>>(&key).await;
        assert!(hit.is_none());

        caches.invalidate(&key).await;
        assert!(!caches.store(&key, generation, &vec![Tag::new("Old")]).await);

        let (hit, _) = caches.lookup::<Vec<Tag>>(&key).await;
        assert!(hit.is_none());
    }
}
