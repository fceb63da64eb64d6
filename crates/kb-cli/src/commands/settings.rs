//! Share settings commands.

use clap::{Args, Subcommand};

use kb_core::config::AppConfig;
use kb_core::error::AppError;
use kb_entity::share::{ShareSettings, UpdateShareSettings};

use super::Services;
use crate::output::{self, OutputFormat};

/// Arguments for settings commands
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Settings subcommand
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the current share settings
    Show,
    /// Change one or more share settings
    Set {
        /// Default link lifetime in hours (1 to 8760)
        #[arg(long)]
        expiry_hours: Option<u32>,
        /// Valid links allowed per shared item
        #[arg(long)]
        max_shares_per_item: Option<u32>,
        /// Whether visitors must be signed in
        #[arg(long)]
        require_auth: Option<bool>,
        /// Whether views are counted and logged
        #[arg(long)]
        track_views: Option<bool>,
    },
}

/// Execute settings commands
pub async fn execute(
    args: &SettingsArgs,
    config: &AppConfig,
    format: OutputFormat,
) -> Result<(), AppError> {
    let services = Services::open(config).await?;

    let result = match &args.command {
        SettingsCommand::Show => services.settings.get().await,
        SettingsCommand::Set {
            expiry_hours,
            max_shares_per_item,
            require_auth,
            track_views,
        } => {
            let update = UpdateShareSettings {
                expiry_hours: *expiry_hours,
                max_shares_per_item: *max_shares_per_item,
                require_auth: *require_auth,
                track_views: *track_views,
            };
            if update.is_empty() {
                output::print_warning("Nothing to change.");
                services.settings.get().await
            } else {
                services.settings.update(update).await
            }
        }
    };
    services.stores.close().await;

    print_settings(&result?, format);
    Ok(())
}

fn print_settings(settings: &ShareSettings, format: OutputFormat) {
    match format {
        OutputFormat::Json => output::print_json(settings),
        OutputFormat::Table => {
            println!("Share settings:");
            output::print_kv("Expiry (hours)", &settings.expiry_hours.to_string());
            output::print_kv(
                "Max links per item",
                &settings.max_shares_per_item.to_string(),
            );
            output::print_kv("Require sign-in", &settings.require_auth.to_string());
            output::print_kv("Track views", &settings.track_views.to_string());
            output::print_kv("Updated", &settings.updated_at.to_rfc3339());
        }
    }
}
