//! Access event model for asynchronous access logging.

use chrono::{DateTime, Utc};

use crate::domain::entities::NewAccessLog;

/// An in-memory record of one resolved redirect.
///
/// Created by the redirect handler after resolution succeeds and sent to the
/// access worker through a bounded channel, so the redirect response never
/// waits on the log write.
#[derive(Debug, Clone)]
pub struct AccessEvent {
    pub timestamp: DateTime<Utc>,
    pub link_id: i64,
    pub slug: String,
    pub client_ip: Option<String>,
    pub user_agent: Option<String>,
    pub bot: bool,
    pub url: Option<String>,
}

impl AccessEvent {
    /// Creates a new access event stamped with the current time.
    pub fn new(
        link_id: i64,
        slug: String,
        client_ip: Option<String>,
        user_agent: Option<&str>,
        bot: bool,
        url: Option<String>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            link_id,
            slug,
            client_ip,
            user_agent: user_agent.map(|s| s.to_string()),
            bot,
            url,
        }
    }
}

impl From<AccessEvent> for NewAccessLog {
    fn from(ev: AccessEvent) -> Self {
        NewAccessLog {
            timestamp: ev.timestamp,
            link_id: ev.link_id,
            slug: ev.slug,
            client_ip: ev.client_ip,
            user_agent: ev.user_agent,
            bot: ev.bot,
            url: ev.url,
        }
    }
}
