//! Slug resolution through the in-process cache.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::domain::entities::LinkRecord;
use crate::domain::repositories::LinkRepository;
use crate::error::ResolveError;
use crate::infrastructure::cache::CacheService;

/// Resolves normalized slugs to link records.
///
/// The cache is consulted first; a miss falls through to the store and a found
/// record is written back. Absent slugs and store failures are never cached.
pub struct RedirectResolver {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl RedirectResolver {
    pub fn new(repository: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { repository, cache }
    }

    /// Resolves a slug to its record.
    ///
    /// # Errors
    ///
    /// - [`ResolveError::NotFound`] if the store has no row for the slug
    /// - [`ResolveError::Store`] if the store lookup failed
    pub async fn resolve(&self, slug: &str) -> Result<LinkRecord, ResolveError> {
        match self.cache.get(slug).await {
            Ok(Some(record)) => {
                metrics::counter!("resolution_cache_hits_total").increment(1);
                return Ok(record);
            }
            Ok(None) => {}
            Err(e) => {
                warn!(slug, error = %e, "Cache read failed, falling back to store");
            }
        }
        metrics::counter!("resolution_cache_misses_total").increment(1);

        // Captured before the store query so a concurrent invalidation wins.
        let generation = self.cache.generation();

        let record = self
            .repository
            .find_by_slug(slug)
            .await
            .map_err(|e| ResolveError::Store(e.to_string()))?
            .ok_or_else(|| ResolveError::NotFound(slug.to_string()))?;

        match self.cache.insert(&record, generation).await {
            Ok(true) => debug!(slug, "Resolution cached"),
            Ok(false) => debug!(slug, "Resolution not cached: slug invalidated meanwhile"),
            Err(e) => warn!(slug, error = %e, "Failed to cache resolution"),
        }

        Ok(record)
    }

    pub async fn cache_healthy(&self) -> bool {
        self.cache.health_check().await
    }

    pub fn cache_policy(&self) -> String {
        self.cache.describe()
    }

    pub async fn store_healthy(&self) -> bool {
        self.repository.ping().await.is_ok()
    }
}
