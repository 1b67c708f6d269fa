//! Access log entity written for every resolved redirect.

use chrono::{DateTime, Utc};

/// Input data for recording one access.
///
/// `link_id` references the resolved link; the writer also bumps that link's
/// click counter in the same transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewAccessLog {
    pub timestamp: DateTime<Utc>,
    pub link_id: i64,
    pub slug: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub bot: bool,
    pub url: Option<String>,
}
