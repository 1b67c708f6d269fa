//! PostgreSQL implementation of access log repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::sync::Arc;

use crate::domain::entities::NewAccessLog;
use crate::domain::repositories::AccessLogRepository;
use crate::error::AppError;

/// PostgreSQL repository for access logs and click counters.
pub struct PgAccessLogRepository {
    pool: Arc<PgPool>,
}

impl PgAccessLogRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccessLogRepository for PgAccessLogRepository {
    async fn record(&self, entry: NewAccessLog) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO access_logs (timestamp, client_ip, user_agent, bot, link_id, slug, url)
            VALUES ($1, $2, $3, $4, (SELECT id FROM links WHERE id = $5), $6, $7)
            "#,
        )
        .bind(entry.timestamp)
        .bind(&entry.client_ip)
        .bind(&entry.user_agent)
        .bind(entry.bot)
        .bind(entry.link_id)
        .bind(&entry.slug)
        .bind(&entry.url)
        .execute(&mut *tx)
        .await?;

        sqlx::query("UPDATE links SET clicks = clicks + 1 WHERE id = $1")
            .bind(entry.link_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(())
    }
}
