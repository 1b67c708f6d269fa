//! In-process resolution cache backed by Moka.

use std::time::Duration;

use async_trait::async_trait;
use moka::policy::EvictionPolicy;
use moka::sync::Cache;
use parking_lot::Mutex;
use tracing::{debug, trace};

use super::service::{CacheResult, CacheService};
use crate::domain::entities::LinkRecord;

/// Eviction policy of a [`MemoryCache`]. Exactly one is active per instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Policy {
    Lru { capacity: u64 },
    Ttl { ttl: Duration },
}

/// Thread-safe in-memory slug cache.
///
/// Built with either a fixed-capacity least-recently-used policy or a per-entry
/// time-to-live measured from insertion. Expired entries are never returned.
///
/// Inserts and invalidations are serialized on the generation lock; lookups
/// do not take it.
pub struct MemoryCache {
    entries: Cache<String, LinkRecord>,
    generation: Mutex<u64>,
    policy: Policy,
}

impl MemoryCache {
    /// Creates a cache holding at most `capacity` entries, evicting the least
    /// recently used one under pressure.
    pub fn lru(capacity: u64) -> Self {
        let entries = Cache::builder()
            .max_capacity(capacity)
            .eviction_policy(EvictionPolicy::lru())
            .build();

        Self {
            entries,
            generation: Mutex::new(0),
            policy: Policy::Lru { capacity },
        }
    }

    /// Creates a cache whose entries expire `ttl` after insertion.
    pub fn ttl(ttl: Duration) -> Self {
        let entries = Cache::builder().time_to_live(ttl).build();

        Self {
            entries,
            generation: Mutex::new(0),
            policy: Policy::Ttl { ttl },
        }
    }

    /// Approximate number of live entries after flushing pending maintenance.
    pub fn len(&self) -> u64 {
        self.entries.run_pending_tasks();
        self.entries.entry_count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl CacheService for MemoryCache {
    async fn get(&self, slug: &str) -> CacheResult<Option<LinkRecord>> {
        match self.entries.get(slug) {
            Some(record) => {
                debug!(slug, "Cache HIT");
                Ok(Some(record))
            }
            None => {
                debug!(slug, "Cache MISS");
                Ok(None)
            }
        }
    }

    fn generation(&self) -> u64 {
        *self.generation.lock()
    }

    async fn insert(&self, record: &LinkRecord, generation: u64) -> CacheResult<bool> {
        let current = self.generation.lock();
        if *current != generation {
            debug!(
                slug = %record.slug,
                seen = generation,
                current = *current,
                "Skipping cache fill: invalidated while loading"
            );
            return Ok(false);
        }

        self.entries.insert(record.slug.clone(), record.clone());
        trace!(slug = %record.slug, "Cache SET");
        Ok(true)
    }

    async fn invalidate(&self, slug: &str) -> CacheResult<()> {
        let mut current = self.generation.lock();
        self.entries.invalidate(slug);
        *current += 1;
        debug!(slug, generation = *current, "Cache INVALIDATE");
        Ok(())
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn describe(&self) -> String {
        match self.policy {
            Policy::Lru { capacity } => format!("lru (capacity {capacity})"),
            Policy::Ttl { ttl } => format!("ttl ({}s)", ttl.as_secs()),
        }
    }
}
