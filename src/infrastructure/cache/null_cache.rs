//! No-op cache implementation for disabled caching.

use super::service::{CacheResult, CacheService};
use crate::domain::entities::LinkRecord;
use async_trait::async_trait;
use tracing::debug;

/// A cache implementation that does nothing.
///
/// Used when `CACHE_POLICY=none` and by the admin CLI, which runs out of
/// process and has no cache to keep coherent. Every lookup goes to the store.
pub struct NullCache;

impl NullCache {
    /// Creates a new NullCache instance.
    pub fn new() -> Self {
        debug!("Using NullCache (caching disabled)");
        Self
    }
}

impl Default for NullCache {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CacheService for NullCache {
    async fn get(&self, _slug: &str) -> CacheResult<Option<LinkRecord>> {
        Ok(None)
    }

    fn generation(&self) -> u64 {
        0
    }

    async fn insert(&self, _record: &LinkRecord, _generation: u64) -> CacheResult<bool> {
        Ok(false)
    }

    async fn invalidate(&self, _slug: &str) -> CacheResult<()> {
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        "disabled".to_string()
    }
}
