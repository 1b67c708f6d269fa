//! CLI administration tool for slug-redirector.
//!
//! Manages slug mappings and performs database checks without going through
//! Slack.
//!
//! # Usage
//!
//! ```bash
//! # Create or update a slug
//! cargo run --bin admin -- link set docs https://example.com/docs --notes "Team docs"
//!
//! # Show a slug
//! cargo run --bin admin -- link show docs
//!
//! # Show recent changes of a slug
//! cargo run --bin admin -- link history docs --limit 20
//!
//! # Delete a slug
//! cargo run --bin admin -- link delete docs
//!
//! # Check database connection
//! cargo run --bin admin -- db check
//! ```
//!
//! # Environment Variables
//!
//! - `DATABASE_URL` or `DB_HOST`/`DB_PORT`/`DB_USER`/`DB_PASSWORD`/`DB_NAME`
//!
//! # Caching
//!
//! The CLI runs in its own process and writes straight to the store. Running
//! servers keep serving their cached destination for a changed slug until the
//! entry is evicted or expires.

use slug_redirector::application::services::AdminService;
use slug_redirector::application::services::admin_service::DEFAULT_HISTORY_LIMIT;
use slug_redirector::config::Config;
use slug_redirector::domain::entities::{HistoryAction, LinkHistoryEntry, LinkRecord};
use slug_redirector::infrastructure::cache::NullCache;
use slug_redirector::infrastructure::persistence::PgLinkRepository;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use sqlx::PgPool;
use std::sync::Arc;

/// CLI tool for managing slug-redirector.
#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Top-level command groups.
#[derive(Subcommand)]
enum Commands {
    /// Manage slug mappings
    Link {
        #[command(subcommand)]
        action: LinkAction,
    },

    /// Database operations
    Db {
        #[command(subcommand)]
        action: DbAction,
    },
}

/// Slug management subcommands.
#[derive(Subcommand)]
enum LinkAction {
    /// Create a slug or point it at a new destination
    Set {
        slug: String,
        destination: String,

        /// Free-form notes stored with the link
        #[arg(short, long)]
        notes: Option<String>,

        /// Recorded in the history (defaults to $USER)
        #[arg(short, long)]
        actor: Option<String>,
    },

    /// Delete a slug
    Delete {
        slug: String,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show a slug as stored in the database
    Show { slug: String },

    /// Show the most recent changes of a slug
    History {
        slug: String,

        #[arg(short, long, default_value_t = DEFAULT_HISTORY_LIMIT)]
        limit: i64,
    },
}

/// Database operation subcommands.
#[derive(Subcommand)]
enum DbAction {
    /// Check database connection
    Check,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let database_url = Config::load_database_url()?;

    let pool = PgPool::connect(&database_url)
        .await
        .context("Failed to connect to database")?;

    match cli.command {
        Commands::Link { action } => handle_link_action(action, &pool).await?,
        Commands::Db { action } => handle_db_action(action, &pool).await?,
    }

    Ok(())
}

/// Dispatches slug management commands.
async fn handle_link_action(action: LinkAction, pool: &PgPool) -> Result<()> {
    let repository = Arc::new(PgLinkRepository::new(Arc::new(pool.clone())));
    let service = AdminService::new(repository, Arc::new(NullCache::new()));

    match action {
        LinkAction::Set {
            slug,
            destination,
            notes,
            actor,
        } => set_link(&service, slug, destination, notes, actor).await?,
        LinkAction::Delete { slug, yes } => delete_link(&service, slug, yes).await?,
        LinkAction::Show { slug } => show_link(&service, slug).await?,
        LinkAction::History { slug, limit } => show_history(&service, slug, limit).await?,
    }

    Ok(())
}

async fn set_link(
    service: &AdminService,
    slug: String,
    destination: String,
    notes: Option<String>,
    actor: Option<String>,
) -> Result<()> {
    let actor = actor.or_else(|| std::env::var("USER").ok());

    let mutation = service
        .set_link(&slug, &destination, notes, actor)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to set link: {}", e))?;

    let verb = match mutation.action {
        HistoryAction::Created => "created",
        _ => "updated",
    };

    println!();
    println!(
        "{} {}",
        "✅ Link".green().bold(),
        format!("{verb} (version {})", mutation.version).green().bold()
    );
    print_link(&mutation.record);
    print_cache_notice();

    Ok(())
}

/// Deletes a slug with confirmation prompt (default: No).
async fn delete_link(service: &AdminService, slug: String, skip_confirm: bool) -> Result<()> {
    println!("{}", "🗑️  Delete Link".bright_blue().bold());
    println!();

    let link = service
        .get_link(&slug)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;
    print_link(&link);

    if !skip_confirm {
        let confirmed = Confirm::new()
            .with_prompt("Delete this link?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "❌ Cancelled".red());
            return Ok(());
        }
    }

    let actor = std::env::var("USER").ok();
    service
        .delete_link(&slug, actor)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to delete link: {}", e))?;

    println!();
    println!("{}", "✅ Link deleted".green().bold());
    print_cache_notice();

    Ok(())
}

async fn show_link(service: &AdminService, slug: String) -> Result<()> {
    let link = service
        .get_link(&slug)
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    println!();
    print_link(&link);

    Ok(())
}

/// Prints the history of a slug, newest first.
///
/// # Output Format
///
/// ```text
///   Ver  Action   Changed           Actor        Destination
///   ─────────────────────────────────────────────────────────────────────
///   3    Updated  2024-06-01 10:30  U012AB3CD    https://example.com/new
/// ```
async fn show_history(service: &AdminService, slug: String, limit: i64) -> Result<()> {
    println!("{}", "📜 Link History".bright_blue().bold());
    println!();

    let entries = service
        .history(&slug, limit)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load history: {}", e))?;

    if entries.is_empty() {
        println!("{}", "  No history found".yellow());
        return Ok(());
    }

    println!(
        "  {:<4} {:<8} {:<17} {:<12} {}",
        "Ver".bright_white().bold(),
        "Action".bright_white().bold(),
        "Changed".bright_white().bold(),
        "Actor".bright_white().bold(),
        "Destination".bright_white().bold()
    );
    println!("  {}", "─".repeat(75).bright_black());

    for entry in &entries {
        print_history_row(entry);
    }

    println!();

    Ok(())
}

fn print_history_row(entry: &LinkHistoryEntry) {
    let action = match entry.action {
        HistoryAction::Created => entry.action.as_str().green(),
        HistoryAction::Updated => entry.action.as_str().yellow(),
        HistoryAction::Deleted => entry.action.as_str().red(),
    };

    println!(
        "  {:<4} {:<8} {:<17} {:<12} {}",
        entry.version.to_string().bright_black(),
        action,
        entry
            .changed_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black(),
        entry.actor.as_deref().unwrap_or("-").cyan(),
        entry.destination
    );
}

fn print_link(link: &LinkRecord) {
    println!("  Slug:        {}", link.slug.cyan());
    println!("  Destination: {}", link.destination.bright_white());
    println!("  Clicks:      {}", link.clicks.to_string().bright_green());
    if let Some(notes) = &link.notes {
        println!("  Notes:       {}", notes);
    }
    println!(
        "  Updated:     {}",
        link.updated_at
            .format("%Y-%m-%d %H:%M")
            .to_string()
            .bright_black()
    );
    println!();
}

fn print_cache_notice() {
    println!(
        "{}",
        "⚠️  Running servers pick this up when their cached entry is evicted or expires."
            .yellow()
    );
    println!();
}

/// Handles database diagnostic commands.
async fn handle_db_action(action: DbAction, pool: &PgPool) -> Result<()> {
    match action {
        DbAction::Check => {
            println!("{}", "🔍 Checking database connection...".bright_blue());

            sqlx::query("SELECT 1").fetch_one(pool).await?;

            println!("{}", "✅ Database connection OK".green().bold());
        }
    }

    Ok(())
}
