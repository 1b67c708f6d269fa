//! Administrative operations on slug mappings.

use std::sync::{Arc, LazyLock};

use regex::Regex;
use serde_json::json;
use tracing::{info, warn};
use validator::{Validate, ValidationError};

use crate::domain::entities::{LinkHistoryEntry, LinkMutation, LinkRecord, LinkUpsert};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::destination::check_destination;
use crate::utils::slug::normalize_slug;

/// Slugs are path fragments: no whitespace, query or fragment delimiters.
static SLUG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[^\s?#]+$").unwrap());

/// Default number of history entries returned.
pub const DEFAULT_HISTORY_LIMIT: i64 = 10;

/// Validated input of [`AdminService::set_link`].
#[derive(Debug, Validate)]
struct LinkInput {
    #[validate(length(min = 1, max = 255))]
    #[validate(regex(path = *SLUG_REGEX, message = "Slug must not contain whitespace, '?' or '#'"))]
    slug: String,

    #[validate(length(min = 1, max = 2048))]
    #[validate(custom(function = validate_destination))]
    destination: String,

    #[validate(length(max = 1024))]
    notes: Option<String>,
}

fn validate_destination(destination: &str) -> Result<(), ValidationError> {
    check_destination(destination).map_err(|_| {
        ValidationError::new("destination").with_message("Invalid destination URL".into())
    })
}

/// Service behind the Slack commands and the admin CLI.
///
/// Every mutation invalidates the slug's cache entry before returning, so a
/// resolver sharing the same cache never serves the previous destination once
/// the write is acknowledged.
pub struct AdminService {
    repository: Arc<dyn LinkRepository>,
    cache: Arc<dyn CacheService>,
}

impl AdminService {
    pub fn new(repository: Arc<dyn LinkRepository>, cache: Arc<dyn CacheService>) -> Self {
        Self { repository, cache }
    }

    /// Creates the slug or points it at a new destination.
    ///
    /// The slug is normalized the same way request paths are. `notes = None`
    /// keeps the existing notes of an updated slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Validation`] for an invalid slug or destination.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn set_link(
        &self,
        slug: &str,
        destination: &str,
        notes: Option<String>,
        actor: Option<String>,
    ) -> Result<LinkMutation, AppError> {
        let input = LinkInput {
            slug: normalize_slug(slug.trim()),
            destination: destination.trim().to_string(),
            notes: notes.filter(|n| !n.trim().is_empty()),
        };
        input.validate()?;

        let mutation = self
            .repository
            .upsert(LinkUpsert {
                slug: input.slug,
                destination: input.destination,
                notes: input.notes,
                actor: actor.clone(),
            })
            .await?;

        self.invalidate(&mutation.record.slug).await;

        info!(
            slug = %mutation.record.slug,
            destination = %mutation.record.destination,
            action = %mutation.action,
            version = mutation.version,
            actor = actor.as_deref().unwrap_or("-"),
            "Link saved"
        );

        Ok(mutation)
    }

    /// Deletes a slug.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist.
    /// Returns [`AppError::Internal`] on database errors.
    pub async fn delete_link(
        &self,
        slug: &str,
        actor: Option<String>,
    ) -> Result<LinkMutation, AppError> {
        let slug = normalize_slug(slug.trim());

        let deleted = self.repository.delete(&slug, actor.clone()).await?;

        // Absent in the store may still mean cached here after an out-of-process delete.
        self.invalidate(&slug).await;

        let mutation =
            deleted.ok_or_else(|| AppError::not_found("Slug not found", json!({ "slug": slug })))?;

        info!(
            slug = %slug,
            version = mutation.version,
            actor = actor.as_deref().unwrap_or("-"),
            "Link deleted"
        );

        Ok(mutation)
    }

    /// Reads a slug straight from the store, bypassing the cache.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the slug does not exist.
    pub async fn get_link(&self, slug: &str) -> Result<LinkRecord, AppError> {
        let slug = normalize_slug(slug.trim());

        self.repository
            .find_by_slug(&slug)
            .await?
            .ok_or_else(|| AppError::not_found("Slug not found", json!({ "slug": slug })))
    }

    /// Most recent history entries of a slug, newest first.
    ///
    /// A slug that never existed has an empty history.
    pub async fn history(
        &self,
        slug: &str,
        limit: i64,
    ) -> Result<Vec<LinkHistoryEntry>, AppError> {
        if !(1..=100).contains(&limit) {
            return Err(AppError::bad_request(
                "Limit must be between 1 and 100",
                json!({ "limit": limit }),
            ));
        }

        let slug = normalize_slug(slug.trim());
        self.repository.history(&slug, limit).await
    }

    /// Best-effort invalidation; a failure never fails the write.
    async fn invalidate(&self, slug: &str) {
        if let Err(e) = self.cache.invalidate(slug).await {
            metrics::counter!("cache_invalidation_failures_total").increment(1);
            warn!(slug, error = %e, "Failed to invalidate cache after write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::HistoryAction;
    use crate::domain::repositories::MockLinkRepository;
    use crate::infrastructure::cache::{CacheError, MockCacheService};
    use chrono::Utc;

    fn record(slug: &str, destination: &str) -> LinkRecord {
        let now = Utc::now();
        LinkRecord::new(1, slug.to_string(), destination.to_string(), 0, None, now, now)
    }

    fn mutation(slug: &str, destination: &str, action: HistoryAction, version: i32) -> LinkMutation {
        LinkMutation {
            record: record(slug, destination),
            action,
            version,
        }
    }

    fn invalidating_cache(slug: &'static str) -> MockCacheService {
        let mut mock_cache = MockCacheService::new();
        mock_cache
            .expect_invalidate()
            .withf(move |s| s == slug)
            .times(1)
            .returning(|_| Ok(()));
        mock_cache
    }

    #[tokio::test]
    async fn test_set_link_creates_and_invalidates() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_upsert()
            .withf(|u| {
                u.slug == "docs"
                    && u.destination == "https://example.com/d"
                    && u.actor.as_deref() == Some("U1")
            })
            .times(1)
            .returning(|u| Ok(mutation(&u.slug, &u.destination, HistoryAction::Created, 1)));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(invalidating_cache("docs")));

        let result = service
            .set_link("/docs/", "https://example.com/d", None, Some("U1".to_string()))
            .await
            .unwrap();

        assert_eq!(result.action, HistoryAction::Created);
        assert_eq!(result.version, 1);
    }

    #[tokio::test]
    async fn test_set_link_update_reports_updated() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_upsert()
            .times(1)
            .returning(|u| Ok(mutation(&u.slug, &u.destination, HistoryAction::Updated, 4)));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(invalidating_cache("docs")));

        let result = service
            .set_link("docs", "https://example.com/new", None, None)
            .await
            .unwrap();

        assert_eq!(result.action, HistoryAction::Updated);
        assert_eq!(result.record.destination, "https://example.com/new");
    }

    #[tokio::test]
    async fn test_set_link_accepts_schemeless_destination() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_upsert()
            .withf(|u| u.destination == "example.com/path")
            .times(1)
            .returning(|u| Ok(mutation(&u.slug, &u.destination, HistoryAction::Created, 1)));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(invalidating_cache("x")));

        assert!(service.set_link("x", "example.com/path", None, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_link_accepts_relative_destination() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_upsert()
            .withf(|u| u.destination == "/other/path")
            .times(1)
            .returning(|u| Ok(mutation(&u.slug, &u.destination, HistoryAction::Created, 1)));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(invalidating_cache("rel")));

        assert!(service.set_link("rel", "/other/path", None, None).await.is_ok());
    }

    #[tokio::test]
    async fn test_set_link_rejects_invalid_input() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_upsert().times(0);
        let mut mock_cache = MockCacheService::new();
        mock_cache.expect_invalidate().times(0);

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let cases = [
            ("docs", ""),
            ("docs", "exa mple.com"),
            ("docs", "//evil.example/x"),
            ("docs", "/\\evil.example"),
            ("my docs", "https://example.com"),
            ("docs?x=1", "https://example.com"),
        ];

        for (slug, destination) in cases {
            let result = service.set_link(slug, destination, None, None).await;
            assert!(
                matches!(result, Err(AppError::Validation { .. })),
                "expected validation error for ({slug}, {destination})"
            );
        }
    }

    #[tokio::test]
    async fn test_set_link_survives_invalidation_failure() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_upsert()
            .times(1)
            .returning(|u| Ok(mutation(&u.slug, &u.destination, HistoryAction::Updated, 2)));

        let mut mock_cache = MockCacheService::new();
        mock_cache
            .expect_invalidate()
            .times(1)
            .returning(|_| Err(CacheError::OperationError("lock poisoned".to_string())));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let result = service
            .set_link("docs", "https://example.com", None, None)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_set_link_store_error_skips_invalidation() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_upsert()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let mut mock_cache = MockCacheService::new();
        mock_cache.expect_invalidate().times(0);

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let result = service
            .set_link("docs", "https://example.com", None, None)
            .await;

        assert!(matches!(result, Err(AppError::Internal { .. })));
    }

    #[tokio::test]
    async fn test_delete_link_success() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_delete()
            .withf(|slug, actor| slug == "docs" && actor.as_deref() == Some("U1"))
            .times(1)
            .returning(|slug, _| {
                Ok(Some(mutation(slug, "https://example.com", HistoryAction::Deleted, 3)))
            });

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(invalidating_cache("docs")));

        let result = service
            .delete_link("/docs", Some("U1".to_string()))
            .await
            .unwrap();

        assert_eq!(result.action, HistoryAction::Deleted);
        assert_eq!(result.version, 3);
    }

    #[tokio::test]
    async fn test_delete_link_not_found_still_invalidates() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_delete()
            .times(1)
            .returning(|_, _| Ok(None));

        let service =
            AdminService::new(Arc::new(mock_repo), Arc::new(invalidating_cache("missing")));

        let result = service.delete_link("missing", None).await;

        assert!(matches!(result, Err(AppError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_get_link_bypasses_cache() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_find_by_slug()
            .withf(|slug| slug == "/")
            .times(1)
            .returning(|slug| Ok(Some(record(slug, "https://home.example.com"))));

        let mut mock_cache = MockCacheService::new();
        mock_cache.expect_get().times(0);

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(mock_cache));

        let link = service.get_link("").await.unwrap();
        assert_eq!(link.destination, "https://home.example.com");
    }

    #[tokio::test]
    async fn test_get_link_not_found() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_find_by_slug().returning(|_| Ok(None));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(MockCacheService::new()));

        assert!(matches!(
            service.get_link("nope").await,
            Err(AppError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_history_limit_bounds() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_history()
            .withf(|slug, limit| slug == "docs" && *limit == 5)
            .times(1)
            .returning(|_, _| Ok(vec![]));

        let service = AdminService::new(Arc::new(mock_repo), Arc::new(MockCacheService::new()));

        assert!(service.history("docs", 5).await.unwrap().is_empty());
        assert!(matches!(
            service.history("docs", 0).await,
            Err(AppError::Validation { .. })
        ));
        assert!(matches!(
            service.history("docs", 101).await,
            Err(AppError::Validation { .. })
        ));
    }
}
