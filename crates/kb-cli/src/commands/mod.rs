//! CLI command definitions and dispatch.

pub mod migrate;
pub mod settings;
pub mod share;
pub mod token;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use kb_cache::CacheManager;
use kb_core::config::AppConfig;
use kb_core::error::AppError;
use kb_database::Stores;
use kb_service::{SecureTokenGenerator, ShareLinkService, ShareSettingsService};

use crate::output::OutputFormat;

/// Knowledge base operator tooling
#[derive(Debug, Parser)]
#[command(name = "kb", version, about, long_about = None)]
pub struct Cli {
    /// Path to the base configuration file
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: String,

    /// Environment overlay to apply on top of the base file
    #[arg(short, long, env = "KB_ENV", default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Share link administration
    Share(share::ShareArgs),
    /// Share settings
    Settings(settings::SettingsArgs),
    /// Bearer token minting
    Token(token::TokenArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), AppError> {
        let config = AppConfig::load(&self.config, &self.env)?;
        match &self.command {
            Commands::Share(args) => share::execute(args, &config, self.format).await,
            Commands::Settings(args) => settings::execute(args, &config, self.format).await,
            Commands::Token(args) => token::execute(args, &config, self.format),
            Commands::Migrate(args) => migrate::execute(args, &config).await,
        }
    }
}

/// Services the share and settings commands operate on.
#[derive(Debug)]
pub struct Services {
    /// Open store backend
    pub stores: Stores,
    /// Share settings
    pub settings: Arc<ShareSettingsService>,
    /// Share links
    pub links: Arc<ShareLinkService>,
}

impl Services {
    /// Connect to the configured backend and wire the share services.
    pub async fn open(config: &AppConfig) -> Result<Self, AppError> {
        let stores = Stores::connect(&config.database).await?;
        let cache = Arc::new(CacheManager::new(&config.cache)?);
        let settings = Arc::new(ShareSettingsService::new(
            Arc::clone(&stores.share_settings),
            cache,
        ));
        let links = Arc::new(ShareLinkService::new(
            Arc::clone(&stores.share_links),
            Arc::clone(&stores.articles),
            Arc::clone(&settings),
            Arc::new(SecureTokenGenerator),
            config.share.public_base_url.clone(),
        ));
        Ok(Self {
            stores,
            settings,
            links,
        })
    }
}
