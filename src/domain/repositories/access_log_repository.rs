//! Repository trait for access logging.

use crate::domain::entities::NewAccessLog;
use crate::error::AppError;
use async_trait::async_trait;

/// Persists resolved accesses.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AccessLogRepository: Send + Sync {
    /// Inserts the log row and increments the link's click counter.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on database errors. Callers retry.
    async fn record(&self, entry: NewAccessLog) -> Result<(), AppError>;
}
