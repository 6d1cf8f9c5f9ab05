use std::sync::Arc;

use newswire_core::{ContentGenerator, NewsError, NewsEvent, NewsItem, NewsStore};

use crate::cache::ReadCache;
use crate::client::ClientRegistry;

/// Coordinates admin mutations and the cached public read path.
///
/// Every mutation follows the same protocol: commit the store change, then
/// invalidate the listing cache, then broadcast to live clients, then return.
/// A store failure aborts before any side effect; a delivery failure never
/// reaches the caller.
pub struct NewsService {
    store: Arc<dyn NewsStore>,
    generator: Arc<dyn ContentGenerator>,
    cache: Arc<ReadCache>,
    registry: Arc<ClientRegistry>,
}

impl NewsService {
    pub fn new(
        store: Arc<dyn NewsStore>,
        generator: Arc<dyn ContentGenerator>,
        cache: Arc<ReadCache>,
        registry: Arc<ClientRegistry>,
    ) -> Self {
        Self {
            store,
            generator,
            cache,
            registry,
        }
    }

    /// Generate `count` fake news items. `count` must be at least 1.
    pub fn generate(&self, count: i64) -> Result<Vec<NewsItem>, NewsError> {
        if count < 1 {
            return Err(NewsError::InvalidCount(count));
        }

        let mut created = Vec::with_capacity(count as usize);
        for _ in 0..count {
            let item = self
                .store
                .create(&self.generator.headline(), &self.generator.body())?;
            created.push(item);
        }

        tracing::info!(count = created.len(), "generated news");
        self.after_mutation(&NewsEvent::created(created.clone()));
        Ok(created)
    }

    /// Delete one item. A missing id fails with NotFound and leaves the
    /// cache and clients untouched.
    pub fn delete_one(&self, id: i64) -> Result<(), NewsError> {
        self.store.delete_by_id(id)?;

        tracing::info!(news_id = id, "deleted news");
        self.after_mutation(&NewsEvent::NewsDeleted { news_id: id });
        Ok(())
    }

    /// Delete everything. An already-empty store is success with 0.
    pub fn delete_all(&self) -> Result<usize, NewsError> {
        let deleted = self.store.delete_all()?;

        tracing::info!(deleted, "deleted all news");
        self.after_mutation(&NewsEvent::AllNewsDeleted);
        Ok(deleted)
    }

    /// Full listing, newest first, served from the cache when fresh.
    pub fn list_all(&self) -> Result<Vec<NewsItem>, NewsError> {
        if let Some(payload) = self.cache.get() {
            return Ok(payload);
        }

        let payload = self.store.list_all_descending()?;
        self.cache.set(payload.clone());
        Ok(payload)
    }

    /// Single-item lookup; always bypasses the cache.
    pub fn get_by_id(&self, id: i64) -> Result<NewsItem, NewsError> {
        self.store.get_by_id(id)
    }

    /// Post-commit hook: invalidate the listing cache, then notify clients.
    /// Runs only after the store mutation committed, and always in that order.
    fn after_mutation(&self, event: &NewsEvent) {
        self.cache.invalidate();
        self.registry.broadcast(event);
    }
}
