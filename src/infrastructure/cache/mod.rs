//! Resolution cache for fast redirect lookups.
//!
//! Provides a [`CacheService`] trait with two implementations:
//! - [`MemoryCache`] - In-process cache with an LRU or TTL policy
//! - [`NullCache`] - No-op implementation for disabled caching

mod memory_cache;
mod null_cache;
mod service;

pub use memory_cache::MemoryCache;
pub use null_cache::NullCache;
pub use service::{CacheError, CacheResult, CacheService};

#[cfg(test)]
pub use service::MockCacheService;

use std::sync::Arc;

use crate::config::CachePolicy;

/// Builds the cache selected by the configured policy.
pub fn build_cache(policy: CachePolicy) -> Arc<dyn CacheService> {
    match policy {
        CachePolicy::Lru { capacity } => Arc::new(MemoryCache::lru(capacity)),
        CachePolicy::Ttl { ttl } => Arc::new(MemoryCache::ttl(ttl)),
        CachePolicy::Disabled => Arc::new(NullCache),
    }
}
