//! Share link administration commands.

use chrono::Utc;
use clap::{Args, Subcommand};
use serde::Serialize;
use tabled::Tabled;

use kb_core::config::AppConfig;
use kb_core::error::AppError;
use kb_core::types::{ArticleId, PageRequest, ShareLinkId};
use kb_entity::share::{LinkState, ShareLink, ShareLinkFilter};

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for share commands
#[derive(Debug, Args)]
pub struct ShareArgs {
    /// Share subcommand
    #[command(subcommand)]
    pub command: ShareCommand,
}

/// Share subcommands
#[derive(Debug, Subcommand)]
pub enum ShareCommand {
    /// List share links, newest first
    List {
        /// Only links of this article
        #[arg(long)]
        article_id: Option<ArticleId>,
        /// Only links valid right now
        #[arg(long)]
        active_only: bool,
        /// Page number
        #[arg(long, default_value_t = 1)]
        page: u64,
        /// Links per page
        #[arg(long, default_value_t = 25)]
        per_page: u64,
    },
    /// Deactivate links by ID
    Deactivate {
        /// Link IDs
        #[arg(required = true)]
        ids: Vec<ShareLinkId>,
        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
    /// Delete links that have expired, with their view records
    Cleanup,
}

/// Share link display row
#[derive(Debug, Serialize, Tabled)]
struct ShareLinkRow {
    /// Link ID
    id: String,
    /// Token preview
    token: String,
    /// Target
    target: String,
    /// State
    state: String,
    /// Views
    views: u64,
    /// Created
    created: String,
    /// Expires
    expires: String,
}

impl ShareLinkRow {
    fn new(link: &ShareLink, now: chrono::DateTime<Utc>) -> Self {
        let state = match link.state_at(now) {
            LinkState::Valid => "valid",
            LinkState::Expired => "expired",
            LinkState::Inactive => "inactive",
        };
        Self {
            id: link.id.to_string(),
            token: link.token_preview(),
            target: link.target.to_string(),
            state: state.to_string(),
            views: link.view_count,
            created: link.created_at.format("%Y-%m-%d %H:%M").to_string(),
            expires: link.expires_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute share commands
pub async fn execute(
    args: &ShareArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;

    let result = run(args, &services, format).await;
    services.stores.close().await;
    result
}

async fn run(args: &ShareArgs, services: &Services, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        ShareCommand::List {
            article_id,
            active_only,
            page,
            per_page,
        } => {
            let filter = ShareLinkFilter {
                article_id: *article_id,
                active_only: *active_only,
            };
            let links = services
                .links
                .list_links(&filter, &PageRequest::new(*page, *per_page))
                .await?;

            let now = Utc::now();
            let rows: Vec<ShareLinkRow> = links
                .items
                .iter()
                .map(|link| ShareLinkRow::new(link, now))
                .collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!(
                    "Page {}/{} ({} links)",
                    links.page, links.total_pages, links.total_items
                );
            }
        }
        ShareCommand::Deactivate { ids, force } => {
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!("Deactivate {} share link(s)?", ids.len()))
                    .default(false)
                    .interact()
                    .map_err(|e| AppError::internal(format!("Input error: {e}")))?;

                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }

            let count = services.links.deactivate_all(ids).await?;
            output::print_success(&format!("Deactivated {count} of {} link(s)", ids.len()));
        }
        ShareCommand::Cleanup => {
            let removed = services.links.cleanup_expired().await?;
            output::print_success(&format!("Removed {removed} expired link(s)"));
        }
    }

    Ok(())
}
