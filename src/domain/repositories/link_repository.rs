//! Repository trait for slug mappings and their history.

use crate::domain::entities::{LinkHistoryEntry, LinkMutation, LinkRecord, LinkUpsert};
use crate::error::AppError;
use async_trait::async_trait;

/// Repository interface for the durable slug table.
///
/// The store is the only authoritative copy of a mapping; every cache in the
/// service is a projection of it.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Exact, case-sensitive lookup by slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LinkRecord>, AppError>;

    /// Inserts the slug or updates its destination, and appends a history entry.
    ///
    /// Must be a single atomic operation in the store: concurrent writers to
    /// the same slug are serialized and always receive distinct versions.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn upsert(&self, upsert: LinkUpsert) -> Result<LinkMutation, AppError>;

    /// Deletes the slug and appends a `Deleted` history entry.
    ///
    /// Returns `Ok(None)` if the slug does not exist.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn delete(&self, slug: &str, actor: Option<String>)
    -> Result<Option<LinkMutation>, AppError>;

    /// Returns the most recent history entries for a slug, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors.
    async fn history(&self, slug: &str, limit: i64) -> Result<Vec<LinkHistoryEntry>, AppError>;

    /// Round-trips a trivial query; used by health checks.
    async fn ping(&self) -> Result<(), AppError>;
}
