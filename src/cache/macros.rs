/// A macro to simplify read-through caching of backend listings.
///
/// This macro checks if a value is present in the tag caches.
/// If found, it returns the cached value.
/// If not found, it waits for any fetch already populating the slot and checks
/// again. On a second miss it records the cache generation, executes the
/// provided block to fetch the value, stores it (unless the slot was
/// invalidated meanwhile), and returns the fetched value.
///
/// # Arguments
/// * `$caches`: A `TagCaches` handle.
/// * `$key`: The `CacheKey` naming the slot. Its value type is inferred from the
///   surrounding expression and must implement `Cached`.
/// * `$block`: The future to await on a cache miss.
///
/// # Example
/// ```rust,ignore
/// let tags: Vec<Tag> = cached!(caches, CacheKey::AllTags, async move {
///     backend.list_all_tags().await
/// })?;
/// ```
#[macro_export]
macro_rules! cached {
    ($caches:expr, $key:expr, $block:expr) => {{
        let key: $crate::cache::CacheKey = $key;
        let (hit, _) = $caches.lookup(&key).await;
        match hit {
            Some(value) => {
                tracing::debug!(cache = %key, "Cache hit");
                Ok(value)
            }
            None => {
                let _fill = $caches.fill_guard(&key).await;
                let (hit, generation) = $caches.lookup(&key).await;
                match hit {
                    Some(value) => {
                        tracing::debug!(cache = %key, "Cache filled by concurrent fetch");
                        Ok(value)
                    }
                    None => {
                        tracing::debug!(cache = %key, generation, "Cache miss");
                        match $block.await {
                            Ok(value) => {
                                $caches.store(&key, generation, &value).await;
                                Ok(value)
                            }
                            Err(e) => Err(e),
                        }
                    }
                }
            }
        }
    }};
}
