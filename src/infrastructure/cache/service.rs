//! Cache service trait and error types.

use async_trait::async_trait;

use crate::domain::entities::LinkRecord;

/// Errors that can occur during cache operations.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    ConnectionError(String),
    #[error("Cache operation error: {0}")]
    OperationError(String),
}

/// Result type for cache operations.
pub type CacheResult<T> = Result<T, CacheError>;

/// Resolution cache sitting in front of the link store.
///
/// Implementations must be thread-safe and shared by reference across request
/// tasks. Failures degrade to store lookups; they never fail a redirect.
///
/// # Invalidation generation
///
/// Every invalidation advances a generation counter. A reader captures
/// [`CacheService::generation`] before querying the store and passes it to
/// [`CacheService::insert`]; the insert is skipped if any invalidation ran in
/// between, so a record read before an acknowledged write can never land in
/// the cache after it.
///
/// # Implementations
///
/// - [`crate::infrastructure::cache::MemoryCache`] - In-process LRU or TTL cache
/// - [`crate::infrastructure::cache::NullCache`] - No-op implementation for disabled caching
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Looks up a slug.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(record))` on a live hit
    /// - `Ok(None)` on miss or expired entry
    async fn get(&self, slug: &str) -> CacheResult<Option<LinkRecord>>;

    /// Current invalidation generation.
    fn generation(&self) -> u64;

    /// Stores a record if no invalidation happened since `generation` was read.
    ///
    /// Returns `Ok(true)` if the record was stored.
    async fn insert(&self, record: &LinkRecord, generation: u64) -> CacheResult<bool>;

    /// Removes a slug. Removing an absent slug is a no-op.
    async fn invalidate(&self, slug: &str) -> CacheResult<()>;

    /// Checks if the cache backend is healthy.
    async fn health_check(&self) -> bool;

    /// Short human-readable description of the active policy.
    fn describe(&self) -> String;
}
