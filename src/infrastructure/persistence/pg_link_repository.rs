//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::json;
use sqlx::{PgPool, Postgres, Transaction};
use std::sync::Arc;

use crate::domain::entities::{
    HistoryAction, LinkHistoryEntry, LinkMutation, LinkRecord, LinkUpsert,
};
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;

/// PostgreSQL repository for slug mappings.
///
/// Mutations run in a single transaction: the per-slug version row in
/// `slug_versions` is bumped first, which row-locks the slug and serializes
/// concurrent writers before the link row and history entry are written.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }

    /// Atomically assigns the next history version for a slug.
    async fn next_version(
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
    ) -> Result<i32, AppError> {
        let version: i32 = sqlx::query_scalar(
            r#"
            INSERT INTO slug_versions (slug, version)
            VALUES ($1, 1)
            ON CONFLICT (slug) DO UPDATE SET version = slug_versions.version + 1
            RETURNING version
            "#,
        )
        .bind(slug)
        .fetch_one(&mut **tx)
        .await?;

        Ok(version)
    }

    async fn append_history(
        tx: &mut Transaction<'_, Postgres>,
        slug: &str,
        version: i32,
        action: HistoryAction,
        destination: &str,
        actor: Option<&str>,
    ) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO link_history (slug, version, action, destination, actor)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(slug)
        .bind(version)
        .bind(action.as_str())
        .bind(destination)
        .bind(actor)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

#[derive(sqlx::FromRow)]
struct LinkRow {
    id: i64,
    slug: String,
    destination: String,
    clicks: i64,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<LinkRow> for LinkRecord {
    fn from(r: LinkRow) -> Self {
        LinkRecord::new(
            r.id,
            r.slug,
            r.destination,
            r.clicks,
            r.notes,
            r.created_at,
            r.updated_at,
        )
    }
}

#[derive(sqlx::FromRow)]
struct UpsertRow {
    #[sqlx(flatten)]
    link: LinkRow,
    inserted: bool,
}

#[derive(sqlx::FromRow)]
struct HistoryRow {
    slug: String,
    version: i32,
    action: String,
    destination: String,
    actor: Option<String>,
    changed_at: DateTime<Utc>,
}

impl TryFrom<HistoryRow> for LinkHistoryEntry {
    type Error = AppError;

    fn try_from(r: HistoryRow) -> Result<Self, Self::Error> {
        let action = r.action.parse::<HistoryAction>().map_err(|e| {
            AppError::internal("Corrupt history row", json!({ "reason": e }))
        })?;

        Ok(LinkHistoryEntry {
            slug: r.slug,
            version: r.version,
            action,
            destination: r.destination,
            actor: r.actor,
            changed_at: r.changed_at,
        })
    }
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn find_by_slug(&self, slug: &str) -> Result<Option<LinkRecord>, AppError> {
        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            SELECT id, slug, destination, clicks, notes, created_at, updated_at
            FROM links
            WHERE slug = $1
            "#,
        )
        .bind(slug)
        .fetch_optional(self.pool.as_ref())
        .await?;

        Ok(row.map(LinkRecord::from))
    }

    async fn upsert(&self, upsert: LinkUpsert) -> Result<LinkMutation, AppError> {
        let mut tx = self.pool.begin().await?;

        let version = Self::next_version(&mut tx, &upsert.slug).await?;

        // `xmax = 0` holds only for a freshly inserted tuple.
        let row = sqlx::query_as::<_, UpsertRow>(
            r#"
            INSERT INTO links (slug, destination, notes)
            VALUES ($1, $2, $3)
            ON CONFLICT (slug) DO UPDATE
                SET destination = EXCLUDED.destination,
                    notes = COALESCE(EXCLUDED.notes, links.notes),
                    updated_at = NOW()
            RETURNING id, slug, destination, clicks, notes, created_at, updated_at,
                      (xmax = 0) AS inserted
            "#,
        )
        .bind(&upsert.slug)
        .bind(&upsert.destination)
        .bind(&upsert.notes)
        .fetch_one(&mut *tx)
        .await?;

        let action = if row.inserted {
            HistoryAction::Created
        } else {
            HistoryAction::Updated
        };

        Self::append_history(
            &mut tx,
            &upsert.slug,
            version,
            action,
            &upsert.destination,
            upsert.actor.as_deref(),
        )
        .await?;

        tx.commit().await?;

        Ok(LinkMutation {
            record: row.link.into(),
            action,
            version,
        })
    }

    async fn delete(
        &self,
        slug: &str,
        actor: Option<String>,
    ) -> Result<Option<LinkMutation>, AppError> {
        let mut tx = self.pool.begin().await?;

        let row = sqlx::query_as::<_, LinkRow>(
            r#"
            DELETE FROM links
            WHERE slug = $1
            RETURNING id, slug, destination, clicks, notes, created_at, updated_at
            "#,
        )
        .bind(slug)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = row else {
            tx.rollback().await?;
            return Ok(None);
        };

        let version = Self::next_version(&mut tx, slug).await?;
        Self::append_history(
            &mut tx,
            slug,
            version,
            HistoryAction::Deleted,
            &row.destination,
            actor.as_deref(),
        )
        .await?;

        tx.commit().await?;

        Ok(Some(LinkMutation {
            record: row.into(),
            action: HistoryAction::Deleted,
            version,
        }))
    }

    async fn history(&self, slug: &str, limit: i64) -> Result<Vec<LinkHistoryEntry>, AppError> {
        let rows = sqlx::query_as::<_, HistoryRow>(
            r#"
            SELECT slug, version, action, destination, actor, changed_at
            FROM link_history
            WHERE slug = $1
            ORDER BY version DESC
            LIMIT $2
            "#,
        )
        .bind(slug)
        .bind(limit)
        .fetch_all(self.pool.as_ref())
        .await?;

        rows.into_iter().map(LinkHistoryEntry::try_from).collect()
    }

    async fn ping(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await?;
        Ok(())
    }
}
