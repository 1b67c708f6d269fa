//! Link entities: the slug mapping and its audit trail.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// A slug mapping resolved by the redirector.
///
/// `destination` is stored exactly as the administrator entered it and is
/// never percent-decoded on the read path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkRecord {
    pub id: i64,
    pub slug: String,
    pub destination: String,
    /// Incremented only by the access log writer.
    pub clicks: i64,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl LinkRecord {
    /// Creates a new LinkRecord instance.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: i64,
        slug: String,
        destination: String,
        clicks: i64,
        notes: Option<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            slug,
            destination,
            clicks,
            notes,
            created_at,
            updated_at,
        }
    }
}

/// Input for the update-or-insert administrative operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkUpsert {
    pub slug: String,
    pub destination: String,
    /// `None` keeps the existing notes on update.
    pub notes: Option<String>,
    /// Who performed the change (Slack user id, CLI user, ...).
    pub actor: Option<String>,
}

/// Kind of mutation recorded in the history table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum HistoryAction {
    Created,
    Updated,
    Deleted,
}

impl HistoryAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryAction::Created => "Created",
            HistoryAction::Updated => "Updated",
            HistoryAction::Deleted => "Deleted",
        }
    }
}

impl fmt::Display for HistoryAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HistoryAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Created" => Ok(HistoryAction::Created),
            "Updated" => Ok(HistoryAction::Updated),
            "Deleted" => Ok(HistoryAction::Deleted),
            other => Err(format!("unknown history action '{other}'")),
        }
    }
}

/// Result of a committed mutation: the affected record plus its history entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMutation {
    pub record: LinkRecord,
    pub action: HistoryAction,
    pub version: i32,
}

/// One row of a slug's version history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkHistoryEntry {
    pub slug: String,
    pub version: i32,
    pub action: HistoryAction,
    pub destination: String,
    pub actor: Option<String>,
    pub changed_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_link_record_creation() {
        let now = Utc::now();
        let record = LinkRecord::new(
            1,
            "docs".to_string(),
            "https://example.com/d".to_string(),
            0,
            None,
            now,
            now,
        );

        assert_eq!(record.id, 1);
        assert_eq!(record.slug, "docs");
        assert_eq!(record.destination, "https://example.com/d");
        assert_eq!(record.clicks, 0);
        assert!(record.notes.is_none());
    }

    #[test]
    fn test_history_action_round_trip() {
        for action in [
            HistoryAction::Created,
            HistoryAction::Updated,
            HistoryAction::Deleted,
        ] {
            assert_eq!(action.as_str().parse::<HistoryAction>(), Ok(action));
        }
    }

    #[test]
    fn test_history_action_rejects_unknown() {
        assert!("Renamed".parse::<HistoryAction>().is_err());
        assert!("created".parse::<HistoryAction>().is_err());
    }
}
