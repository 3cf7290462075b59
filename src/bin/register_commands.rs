//! Registers the bot's slash commands with Discord.
//!
//! Run whenever a command is added, changed or removed. Set `GUILD_ID` to
//! register into a single server instantly; leave it unset to register
//! globally.

use badge_bot::config::RegistrarConfig;
use badge_bot::registrar;
use dotenvy::dotenv;
use poise::serenity_prelude as serenity;
use std::process::ExitCode;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    dotenv().ok();

    // Fail before touching the network when a credential is missing.
    let config = match RegistrarConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!("ERROR: {e}");
            return ExitCode::FAILURE;
        }
    };

    let http = serenity::Http::new(&config.token);

    match registrar::deploy(&http, config.application_id, &config.scope).await {
        Ok(_) => {
            info!("Deployment complete!");
            ExitCode::SUCCESS
        }
        Err(e) => {
            registrar::report_failure(&e);
            ExitCode::FAILURE
        }
    }
}
