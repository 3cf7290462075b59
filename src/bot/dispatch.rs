//! Dispatch core: routes one slash command interaction to its handler.

use crate::bot::interaction::{Interaction, Visibility};
use crate::commands::DispatchTable;
use crate::errors::Result;
use tracing::{error, info, warn};

/// Ephemeral notice for names missing from the dispatch table.
pub const UNKNOWN_COMMAND_MESSAGE: &str = "This command is not recognized.";
/// Ephemeral notice when a handler gives up.
pub const HANDLER_FAILED_MESSAGE: &str =
    "There was an error executing this command. Please try again later.";

/// What happened to a dispatched interaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DispatchOutcome {
    /// The handler ran to completion
    Handled,
    /// No command is registered under the invoked name
    Unknown,
    /// The handler failed and the user was sent [`HANDLER_FAILED_MESSAGE`]
    Failed,
}

/// Looks up the invoked command and runs it.
///
/// A handler error never escapes: it is logged and the user receives
/// [`HANDLER_FAILED_MESSAGE`], as a follow-up when a response already exists
/// and as a fresh reply otherwise. An `Err` is returned only when that notice
/// (or the unknown-command notice) could not be delivered.
pub async fn dispatch<I: Interaction>(
    table: &DispatchTable,
    interaction: &mut I,
) -> Result<DispatchOutcome> {
    let Some(command) = table.get(interaction.command_name()) else {
        warn!(
            command = interaction.command_name(),
            "[dispatch] unknown command"
        );
        interaction
            .reply(UNKNOWN_COMMAND_MESSAGE, Visibility::Ephemeral)
            .await?;
        return Ok(DispatchOutcome::Unknown);
    };

    info!(
        user = %interaction.invoker().tag,
        command = command.name(),
        "[dispatch] /{} invoked",
        command.name()
    );

    match command.execute(interaction).await {
        Ok(()) => Ok(DispatchOutcome::Handled),
        Err(e) => {
            error!(command = command.name(), error = ?e, "[dispatch] command execution failed");
            if interaction.reply_state().is_acknowledged() {
                interaction
                    .follow_up(HANDLER_FAILED_MESSAGE, Visibility::Ephemeral)
                    .await?;
            } else {
                interaction
                    .reply(HANDLER_FAILED_MESSAGE, Visibility::Ephemeral)
                    .await?;
            }
            Ok(DispatchOutcome::Failed)
        }
    }
}
