//! DTOs for the Slack slash command endpoint.

use serde::{Deserialize, Serialize};

/// Form body Slack posts for a slash command.
///
/// Only the fields the service reads are declared; Slack sends more.
#[derive(Debug, Deserialize)]
pub struct SlashCommand {
    #[serde(default)]
    pub command: String,
    #[serde(default)]
    pub text: String,
    pub user_id: String,
    #[serde(default)]
    pub user_name: Option<String>,
    #[serde(default)]
    pub team_id: Option<String>,
}

/// Message returned synchronously to Slack.
#[serde_with::skip_serializing_none]
#[derive(Debug, Serialize)]
pub struct SlackResponse {
    pub response_type: &'static str,
    pub text: String,
    pub mrkdwn: Option<bool>,
}

impl SlackResponse {
    /// A reply visible only to the user who ran the command.
    pub fn ephemeral(text: impl Into<String>) -> Self {
        Self {
            response_type: "ephemeral",
            text: text.into(),
            mrkdwn: Some(true),
        }
    }
}

/// Administrative command parsed from the slash command text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AdminCommand {
    Set {
        slug: String,
        destination: String,
        notes: Option<String>,
    },
    Delete {
        slug: String,
    },
    Info {
        slug: String,
    },
    History {
        slug: String,
    },
    Help,
}

pub const USAGE: &str = "Usage:\n\
    • `set <slug> <destination> [notes…]` create or update a link\n\
    • `delete <slug>` remove a link\n\
    • `info <slug>` show a link\n\
    • `history <slug>` show recent changes\n\
    • `help` show this message";

impl AdminCommand {
    /// Parses `text` into a command.
    ///
    /// # Errors
    ///
    /// Returns a user-facing message for unknown subcommands or missing
    /// arguments.
    pub fn parse(text: &str) -> Result<Self, String> {
        let mut words = text.split_whitespace();

        let Some(subcommand) = words.next() else {
            return Ok(AdminCommand::Help);
        };

        match subcommand.to_ascii_lowercase().as_str() {
            "set" | "add" | "update" => {
                let (Some(slug), Some(destination)) = (words.next(), words.next()) else {
                    return Err("`set` needs a slug and a destination".to_string());
                };
                let notes = words.collect::<Vec<_>>().join(" ");

                Ok(AdminCommand::Set {
                    slug: slug.to_string(),
                    destination: strip_slack_link(destination).to_string(),
                    notes: (!notes.is_empty()).then_some(notes),
                })
            }
            "delete" | "remove" | "rm" => Ok(AdminCommand::Delete {
                slug: single_slug("delete", words.next())?,
            }),
            "info" | "show" => Ok(AdminCommand::Info {
                slug: single_slug("info", words.next())?,
            }),
            "history" | "log" => Ok(AdminCommand::History {
                slug: single_slug("history", words.next())?,
            }),
            "help" => Ok(AdminCommand::Help),
            other => Err(format!("Unknown command `{other}`")),
        }
    }
}

fn single_slug(subcommand: &str, word: Option<&str>) -> Result<String, String> {
    word.map(str::to_string)
        .ok_or_else(|| format!("`{subcommand}` needs a slug"))
}

/// Slack auto-links URLs as `<https://x|x>` or `<https://x>`.
fn strip_slack_link(word: &str) -> &str {
    word.strip_prefix('<')
        .and_then(|w| w.strip_suffix('>'))
        .map(|w| w.split('|').next().unwrap_or(w))
        .unwrap_or(word)
}
