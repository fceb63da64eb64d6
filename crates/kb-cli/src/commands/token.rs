//! Bearer token minting for operators and integrations.

use clap::{Args, Subcommand, ValueEnum};
use serde_json::json;

use kb_auth::JwtEncoder;
use kb_core::config::AppConfig;
use kb_core::error::AppError;
use kb_core::types::UserId;
use kb_entity::user::{AuthenticatedUser, UserRole};

use crate::output::{self, OutputFormat};

/// Arguments for token commands
#[derive(Debug, Args)]
pub struct TokenArgs {
    /// Token subcommand
    #[command(subcommand)]
    pub command: TokenCommand,
}

/// Role to embed in the token
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum RoleArg {
    /// Administrator
    Admin,
    /// Content editor
    Editor,
    /// Reader
    Reader,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Admin => UserRole::Admin,
            RoleArg::Editor => UserRole::Editor,
            RoleArg::Reader => UserRole::Reader,
        }
    }
}

/// Token subcommands
#[derive(Debug, Subcommand)]
pub enum TokenCommand {
    /// Issue an access token signed with the configured secret
    Issue {
        /// Username to embed
        #[arg(long)]
        username: String,
        /// Role to embed
        #[arg(long, value_enum, default_value = "reader")]
        role: RoleArg,
        /// Existing user ID; a new one is generated when absent
        #[arg(long)]
        user_id: Option<UserId>,
    },
}

/// Execute token commands
pub fn execute(args: &TokenArgs, config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    match &args.command {
        TokenCommand::Issue {
            username,
            role,
            user_id,
        } => {
            let user = AuthenticatedUser {
                user_id: user_id.unwrap_or_default(),
                username: username.clone(),
                role: (*role).into(),
            };
            let issued = JwtEncoder::new(&config.auth).issue(&user)?;

            match format {
                OutputFormat::Json => output::print_json(&json!({
                    "token": issued.token,
                    "expires_at": issued.expires_at,
                    "user_id": user.user_id,
                    "role": user.role,
                })),
                OutputFormat::Table => {
                    output::print_kv("User ID", &user.user_id.to_string());
                    output::print_kv("Role", user.role.as_str());
                    output::print_kv("Expires", &issued.expires_at.to_rfc3339());
                    println!("{}", issued.token);
                }
            }
        }
    }
    Ok(())
}
