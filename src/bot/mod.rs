//! Bot layer - gateway connection, event routing and the error supervisor.
//!
//! poise provides the framework plumbing (setup on first Ready, event fan-out,
//! error callbacks), while slash commands are routed through our own
//! [`DispatchTable`] in [`dispatch::dispatch`]. serenity runs every gateway
//! event in its own task, so each interaction owns its response lifecycle.

/// Dispatch core for slash command interactions
pub mod dispatch;
/// Interaction capability handed to command handlers
pub mod interaction;

use crate::commands::DispatchTable;
use crate::config::{BotConfig, TOKEN_VAR};
use crate::errors::{Error, Result};
use chrono::Local;
use interaction::SlashInteraction;
use poise::serenity_prelude as serenity;
use tracing::{debug, error, info, instrument, warn};

/// Activity shown under the bot's name.
pub const PRESENCE_ACTIVITY: &str = "slash commands";

/// Shared data available to every event.
#[derive(Debug)]
pub struct BotData {
    /// Read-only command routing, built once before the first event
    pub commands: DispatchTable,
}

impl BotData {
    /// Creates the shared data around a finished dispatch table.
    #[must_use]
    pub const fn new(commands: DispatchTable) -> Self {
        Self { commands }
    }
}

/// poise framework context for this bot's data and error types.
pub type FrameworkContext<'a> = poise::FrameworkContext<'a, BotData, Error>;

/// Returns the interaction when it is a chat-input (slash) command.
///
/// Components, modals, autocomplete and context-menu commands are not ours.
#[must_use]
pub fn slash_command(interaction: &serenity::Interaction) -> Option<&serenity::CommandInteraction> {
    let command = interaction.as_command()?;
    is_slash_command(interaction.kind(), command.data.kind).then_some(command)
}

/// Whether an interaction of `kind` carrying a command of `command_kind` is
/// dispatched to a handler.
#[must_use]
pub fn is_slash_command(kind: serenity::InteractionType, command_kind: serenity::CommandType) -> bool {
    kind == serenity::InteractionType::Command && command_kind == serenity::CommandType::ChatInput
}

async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    framework: FrameworkContext<'_>,
    data: &BotData,
) -> Result<()> {
    match event {
        serenity::FullEvent::InteractionCreate { interaction } => {
            let Some(command) = slash_command(interaction) else {
                return Ok(());
            };
            let shard_manager = framework.shard_manager();
            let mut interaction = SlashInteraction::new(ctx, &shard_manager, command)?;
            let outcome = dispatch::dispatch(&data.commands, &mut interaction).await?;
            debug!(?outcome, command = %command.data.name, "Interaction finished");
        }
        serenity::FullEvent::Resume { .. } => {
            info!("Gateway session resumed");
        }
        _ => {}
    }
    Ok(())
}

/// Logs the readiness summary and sets the bot's presence.
fn on_ready(ctx: &serenity::Context, ready: &serenity::Ready) {
    info!("Discord bot started successfully");
    info!(user = %ready.user.tag(), "Logged in");
    info!(guilds = ready.guilds.len(), "Servers");
    info!(users = ctx.cache.user_count(), "Users");
    info!(at = %Local::now().format("%Y-%m-%d %H:%M:%S"), "Ready");

    ctx.set_presence(
        Some(serenity::ActivityData::playing(PRESENCE_ACTIVITY)),
        serenity::OnlineStatus::Online,
    );
}

// Errors are logged and the bot keeps running; nothing here ends the process.
async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to finish bot setup: {:?}", error);
        }
        poise::FrameworkError::EventHandler { error, event, .. } => {
            error!(
                event = event.snake_case_name(),
                "Unhandled error while processing event: {:?}", error
            );
        }
        // Slash commands are routed by the dispatch table, not by poise.
        poise::FrameworkError::UnknownInteraction { .. } => {}
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

/// Routes panics through tracing.
///
/// serenity runs each event in its own task, so a panicking handler takes down
/// only that task and the bot keeps serving.
pub fn install_panic_hook() {
    std::panic::set_hook(Box::new(|panic| {
        error!("[UNCAUGHT PANIC] {panic}");
    }));
}

/// Connects to Discord and serves slash commands until the connection ends.
///
/// Returns an error when the client cannot be built or the gateway rejects the
/// login.
#[instrument(skip(config))]
pub async fn run_bot(config: BotConfig) -> Result<()> {
    let commands = DispatchTable::default();
    let names = commands.names();
    info!(count = names.len(), commands = ?names, "Dispatch table built");

    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            event_handler: |ctx, event, framework, data| {
                Box::pin(event_handler(ctx, event, framework, data))
            },
            on_error: |error| Box::pin(on_error(error)),
            ..Default::default()
        })
        .setup(move |ctx, ready, _framework| {
            Box::pin(async move {
                on_ready(ctx, ready);
                Ok(BotData::new(commands))
            })
        })
        .build();

    // Slash commands only need guild events.
    let intents = serenity::GatewayIntents::GUILDS;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(&config.token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    if let Err(why) = client.start().await {
        error!("[FATAL] Failed to log in to Discord: {:?}", why);
        warn!("Please check {TOKEN_VAR} in the .env file");
        return Err(why.into());
    }
    Ok(())
}
