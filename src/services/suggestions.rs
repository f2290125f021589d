//! Tag suggestion engine
//!
//! Owns the tag caches for one page session, ranks suggestions for a movie card
//! and keeps the caches in step with add/remove operations. All results are
//! pushed to a [`TagRenderer`]; the return values are for callers that want to
//! inspect them.
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::{
    api::{tag_counter_label, Notification, TagRenderer},
    cache::{CacheKey, TagCaches},
    cached,
    config::Config,
    error::{AppError, AppResult},
    models::{AttachedTag, MovieId, Suggestion, SuggestionSet, Tag, TagId},
    services::{
        backend::TagBackend,
        debounce::Debouncer,
        similarity::{are_tags_similar, SUGGESTION_SIMILARITY_THRESHOLD},
    },
};

const ADD_FAILED: &str = "Failed to add tag";
const REMOVE_FAILED: &str = "Failed to remove tag";

/// Ranks suggestions from already-loaded tag lists
///
/// Tags attached to the movie are never suggested. Substring hits keep the
/// order of `all_tags`. Without hits, a non-blank query yields near-duplicates
/// followed by an offer to create the query as a new tag.
pub fn rank_suggestions(
    movie_id: MovieId,
    query: &str,
    all_tags: &[Tag],
    attached: &[String],
    similarity_threshold: f64,
) -> SuggestionSet {
    let needle = query.to_lowercase();
    let unattached = || all_tags.iter().filter(move |t| !attached.contains(&t.name));

    let items: Vec<Suggestion> = unattached()
        .filter(|t| t.name.to_lowercase().contains(&needle))
        .cloned()
        .map(Suggestion::Existing)
        .collect();

    if !items.is_empty() {
        return SuggestionSet {
            movie_id,
            query: query.to_string(),
            items,
        };
    }

    let trimmed = query.trim();
    if trimmed.is_empty() {
        return SuggestionSet::empty(movie_id, query);
    }

    let mut items: Vec<Suggestion> = unattached()
        .filter(|t| are_tags_similar(&t.name, trimmed, similarity_threshold))
        .cloned()
        .map(Suggestion::Similar)
        .collect();

    if !attached.iter().any(|name| name == trimmed) {
        items.push(Suggestion::CreateNew {
            name: trimmed.to_string(),
        });
    }

    SuggestionSet {
        movie_id,
        query: query.to_string(),
        items,
    }
}

/// Suggestion, add and remove operations for movie cards
#[derive(Clone)]
pub struct TagSuggestionEngine {
    backend: Arc<dyn TagBackend>,
    renderer: Arc<dyn TagRenderer>,
    caches: TagCaches,
    /// Latest suggestion request issued per movie
    sequences: Arc<Mutex<HashMap<MovieId, u64>>>,
    similarity_threshold: f64,
}

impl TagSuggestionEngine {
    pub fn new(backend: Arc<dyn TagBackend>, renderer: Arc<dyn TagRenderer>) -> Self {
        Self {
            backend,
            renderer,
            caches: TagCaches::new(),
            sequences: Arc::new(Mutex::new(HashMap::new())),
            similarity_threshold: SUGGESTION_SIMILARITY_THRESHOLD,
        }
    }

    pub fn from_config(
        config: &Config,
        backend: Arc<dyn TagBackend>,
        renderer: Arc<dyn TagRenderer>,
    ) -> Self {
        Self::new(backend, renderer).with_similarity_threshold(config.similarity_threshold)
    }

    pub fn with_similarity_threshold(mut self, threshold: f64) -> Self {
        self.similarity_threshold = threshold;
        self
    }

    pub fn caches(&self) -> &TagCaches {
        &self.caches
    }

    fn sequences(&self) -> MutexGuard<'_, HashMap<MovieId, u64>> {
        match self.sequences.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn next_sequence(&self, movie_id: MovieId) -> u64 {
        let mut sequences = self.sequences();
        let seq = sequences.entry(movie_id).or_insert(0);
        *seq += 1;
        *seq
    }

    fn is_latest(&self, movie_id: MovieId, seq: u64) -> bool {
        self.sequences().get(&movie_id).copied() == Some(seq)
    }

    async fn all_tags(&self) -> AppResult<Vec<Tag>> {
        let backend = Arc::clone(&self.backend);
        cached!(self.caches, CacheKey::AllTags, async move {
            backend.list_all_tags().await
        })
    }

    async fn attached_names(&self, movie_id: MovieId) -> AppResult<Vec<String>> {
        let backend = Arc::clone(&self.backend);
        cached!(self.caches, CacheKey::MovieTags(movie_id), async move {
            let tags = backend.list_movie_tags(movie_id).await?;
            Ok::<_, AppError>(tags.into_iter().map(|t| t.name).collect::<Vec<String>>())
        })
    }

    /// Computes suggestions without rendering them
    ///
    /// Each cache is fetched at most once until it is invalidated, however many
    /// queries are asked for the same movie.
    pub async fn suggest(&self, movie_id: MovieId, query: &str) -> AppResult<SuggestionSet> {
        let all_tags = self.all_tags().await?;
        let attached = self.attached_names(movie_id).await?;

        Ok(rank_suggestions(
            movie_id,
            query,
            &all_tags,
            &attached,
            self.similarity_threshold,
        ))
    }

    /// Computes and renders suggestions for a movie card
    ///
    /// Returns `Ok(None)` when a newer request for the same movie was issued
    /// while this one was waiting on the backend; its result is dropped so the
    /// dropdown never regresses to an older query.
    pub async fn request_suggestions(
        &self,
        movie_id: MovieId,
        query: &str,
    ) -> AppResult<Option<SuggestionSet>> {
        let seq = self.next_sequence(movie_id);
        let result = self.suggest(movie_id, query).await;

        if !self.is_latest(movie_id, seq) {
            tracing::debug!(
                movie_id = %movie_id,
                seq,
                query = %query,
                "Dropping superseded suggestion result"
            );
            return Ok(None);
        }

        match result {
            Ok(suggestions) => {
                tracing::debug!(
                    movie_id = %movie_id,
                    query = %query,
                    suggestions = suggestions.items.len(),
                    "Suggestions ready"
                );
                self.renderer.render_suggestions(&suggestions);
                Ok(Some(suggestions))
            }
            Err(e) => {
                tracing::error!(error = %e, movie_id = %movie_id, "Error loading tag suggestions");
                Err(e)
            }
        }
    }

    /// Debouncer that feeds keystrokes of one card into `request_suggestions`
    pub fn suggestion_debouncer(&self, delay: Duration) -> Debouncer<(MovieId, String)> {
        let engine = self.clone();
        Debouncer::new(delay, move |(movie_id, query): (MovieId, String)| {
            let engine = engine.clone();
            async move {
                // Failures are already logged by request_suggestions
                let _ = engine.request_suggestions(movie_id, &query).await;
            }
        })
    }

    /// Attaches a tag to a movie, creating it on the backend if needed
    pub async fn add_tag(&self, movie_id: MovieId, tag_name: &str) -> AppResult<()> {
        let name = tag_name.trim();
        if name.is_empty() {
            return Err(AppError::InvalidInput("Tag name required".to_string()));
        }

        let response = match self.backend.add_tag(movie_id, name).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(error = %e, movie_id = %movie_id, tag = %name, "Error adding tag");
                self.renderer.notify(Notification::danger(ADD_FAILED));
                return Err(e);
            }
        };

        if !response.ok {
            let message = response.error.unwrap_or_else(|| ADD_FAILED.to_string());
            tracing::warn!(movie_id = %movie_id, tag = %name, error = %message, "Tag rejected");
            self.renderer.notify(Notification::danger(message.clone()));
            return Err(AppError::Rejected(message));
        }

        {
            let mut caches = self.caches.write().await;
            caches.movie_tags.insert(movie_id, name);

            if !caches.all_tags.contains_name(name) {
                caches.all_tags.invalidate();
                tracing::info!(tag = %name, "New tag created, all-tags cache invalidated");
            }
        }

        tracing::info!(movie_id = %movie_id, tag = %name, "Tag added");
        self.renderer
            .notify(Notification::success(format!("Tag \"{}\" added", name)));

        // The add already succeeded; a failed refresh is only logged
        let _ = self.refresh_movie_tags(movie_id).await;

        Ok(())
    }

    /// Detaches a tag from a movie
    ///
    /// The name leaves the cache before the backend is called. If the backend
    /// call fails the name is put back at its old position.
    pub async fn remove_tag(
        &self,
        movie_id: MovieId,
        tag_id: TagId,
        tag_name: &str,
    ) -> AppResult<()> {
        let position = self.caches.write().await.movie_tags.remove(movie_id, tag_name);

        let result = self.backend.remove_tag(movie_id, tag_id).await;

        match &result {
            Ok(()) => {
                tracing::info!(movie_id = %movie_id, tag = %tag_name, "Tag removed");
                self.renderer
                    .notify(Notification::success(format!("Tag \"{}\" removed", tag_name)));
            }
            Err(e) => {
                if let Some(position) = position {
                    self.caches
                        .write()
                        .await
                        .movie_tags
                        .restore(movie_id, position, tag_name);
                }
                tracing::error!(
                    error = %e,
                    movie_id = %movie_id,
                    tag = %tag_name,
                    "Error removing tag, optimistic removal rolled back"
                );
                self.renderer.notify(Notification::danger(REMOVE_FAILED));
            }
        }

        let _ = self.refresh_movie_tags(movie_id).await;

        result
    }

    /// Reloads a movie's attached tags and renders its chips
    ///
    /// The fetched list overwrites the cached names unless a local add or
    /// remove happened while the fetch was in flight.
    pub async fn refresh_movie_tags(&self, movie_id: MovieId) -> AppResult<Vec<AttachedTag>> {
        let key = CacheKey::MovieTags(movie_id);
        let generation = self.caches.read().await.generation(&key);

        let tags = self
            .backend
            .list_movie_tags(movie_id)
            .await
            .map_err(|e| {
                tracing::error!(error = %e, movie_id = %movie_id, "Error loading tags");
                e
            })?;

        let names: Vec<String> = tags.iter().map(|t| t.name.clone()).collect();
        self.caches.store(&key, generation, &names).await;

        self.renderer
            .render_tags(movie_id, &tags, &tag_counter_label(tags.len()));

        Ok(tags)
    }
}
