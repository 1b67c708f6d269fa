//! Handler for Slack slash commands.

use axum::{Form, Json, extract::State};
use tracing::{info, warn};

use crate::api::dto::slack::{AdminCommand, SlackResponse, SlashCommand, USAGE};
use crate::application::services::admin_service::DEFAULT_HISTORY_LIMIT;
use crate::domain::entities::{HistoryAction, LinkHistoryEntry};
use crate::error::AppError;
use crate::state::AppState;

/// Runs an administrative command sent from Slack.
///
/// # Endpoint
///
/// `POST /slack/commands`
///
/// # Authentication
///
/// The request signature is checked by
/// [`crate::api::middleware::slack_signature`] before this handler runs. The
/// caller must additionally be listed in `ADMIN_USER_IDS`.
///
/// # Response
///
/// Always 200 with an ephemeral message; failures are reported in the text so
/// Slack shows them to the caller.
pub async fn slack_command_handler(
    State(state): State<AppState>,
    Form(payload): Form<SlashCommand>,
) -> Json<SlackResponse> {
    if !state.config.admin_user_ids.contains(&payload.user_id) {
        warn!(
            user_id = %payload.user_id,
            command = %payload.command,
            "Rejected slash command from non-admin"
        );
        return Json(SlackResponse::ephemeral(
            ":no_entry: You are not allowed to manage links.",
        ));
    }

    let command = match AdminCommand::parse(&payload.text) {
        Ok(command) => command,
        Err(message) => return Json(SlackResponse::ephemeral(format!("{message}\n\n{USAGE}"))),
    };

    info!(user_id = %payload.user_id, ?command, "Running slash command");

    let actor = Some(payload.user_id.clone());
    let text = match command {
        AdminCommand::Set {
            slug,
            destination,
            notes,
        } => match state
            .admin_service
            .set_link(&slug, &destination, notes, actor)
            .await
        {
            Ok(mutation) => {
                let verb = match mutation.action {
                    HistoryAction::Created => "Created",
                    _ => "Updated",
                };
                format!(
                    ":white_check_mark: {verb} `{}` → {} (version {})",
                    mutation.record.slug, mutation.record.destination, mutation.version
                )
            }
            Err(e) => failure("set", &slug, &e),
        },
        AdminCommand::Delete { slug } => {
            match state.admin_service.delete_link(&slug, actor).await {
                Ok(mutation) => format!(
                    ":wastebasket: Deleted `{}` (version {})",
                    mutation.record.slug, mutation.version
                ),
                Err(e) => failure("delete", &slug, &e),
            }
        }
        AdminCommand::Info { slug } => match state.admin_service.get_link(&slug).await {
            Ok(link) => {
                let mut text = format!(
                    "`{}` → {}\nClicks: {}\nUpdated: {}",
                    link.slug,
                    link.destination,
                    link.clicks,
                    link.updated_at.format("%Y-%m-%d %H:%M UTC")
                );
                if let Some(notes) = link.notes {
                    text.push_str(&format!("\nNotes: {notes}"));
                }
                text
            }
            Err(e) => failure("look up", &slug, &e),
        },
        AdminCommand::History { slug } => {
            match state
                .admin_service
                .history(&slug, DEFAULT_HISTORY_LIMIT)
                .await
            {
                Ok(entries) if entries.is_empty() => format!("No history for `{slug}`"),
                Ok(entries) => format_history(&slug, &entries),
                Err(e) => failure("load history of", &slug, &e),
            }
        }
        AdminCommand::Help => USAGE.to_string(),
    };

    Json(SlackResponse::ephemeral(text))
}

fn failure(operation: &str, slug: &str, error: &AppError) -> String {
    match error {
        AppError::NotFound { .. } => format!(":warning: `{slug}` does not exist"),
        AppError::Validation { .. } => {
            format!(":warning: Could not {operation} `{slug}`: {error}")
        }
        _ => format!(":x: Could not {operation} `{slug}`, please try again later"),
    }
}

fn format_history(slug: &str, entries: &[LinkHistoryEntry]) -> String {
    let mut text = format!("History of `{slug}`:");
    for entry in entries {
        let actor = entry
            .actor
            .as_deref()
            .map(|a| format!(" by <@{a}>"))
            .unwrap_or_default();
        text.push_str(&format!(
            "\n• v{} {} {} {}{}",
            entry.version,
            entry.action,
            entry.changed_at.format("%Y-%m-%d %H:%M"),
            entry.destination,
            actor
        ));
    }
    text
}
