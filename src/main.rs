use badge_bot::bot;
use badge_bot::config::BotConfig;
use badge_bot::errors::Result;
use dotenvy::dotenv;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Panics in event tasks are logged, never fatal
    bot::install_panic_hook();

    // 3. Load .env file (non-fatal, env vars can be set externally)
    dotenv().ok();
    info!("Attempted to load .env file.");

    // 4. The token is the only configuration the runtime needs
    let config = BotConfig::from_env()
        .inspect_err(|e| error!("Critical error loading configuration: {}", e))?;

    // 5. Run the bot until the gateway connection ends
    bot::run_bot(config).await
}
