//! `/ping` - health check reporting gateway heartbeat and API round-trip latency.

use crate::bot::interaction::{Interaction, Visibility};
use crate::errors::Result;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// Shown to the user when the command fails part-way.
pub const ERROR_MESSAGE: &str = "An error occurred while executing this command.";

/// Latencies reported back to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latency {
    /// Last heartbeat round trip, unknown until the first heartbeat ACK
    pub websocket: Option<Duration>,
    /// Time from starting the deferral until the response is finalized
    pub api: Duration,
}

impl Latency {
    /// Renders the reply content.
    #[must_use]
    pub fn render(&self) -> String {
        let websocket = self
            .websocket
            .map_or_else(|| "N/A".to_string(), |ws| format!("{}ms", ws.as_millis()));
        format!(
            "🏓 Pong!\n\n**WebSocket Ping:** {websocket}\n**API Latency:** {}ms",
            self.api.as_millis()
        )
    }
}

/// Runs `/ping`.
///
/// Failures are answered here first: an outstanding deferral is edited with
/// [`ERROR_MESSAGE`], otherwise a fresh ephemeral reply is sent. Only a failure
/// of that fallback reaches the caller.
pub async fn run<I: Interaction>(interaction: &mut I) -> Result<()> {
    match measure_and_reply(interaction).await {
        Ok(latency) => {
            info!(
                user = %interaction.invoker().tag,
                websocket = ?latency.websocket,
                api = ?latency.api,
                "[ping] executed"
            );
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "[ping] command failed");
            if interaction.reply_state().is_acknowledged() {
                interaction.edit_reply(ERROR_MESSAGE).await
            } else {
                interaction.reply(ERROR_MESSAGE, Visibility::Ephemeral).await
            }
        }
    }
}

async fn measure_and_reply<I: Interaction>(interaction: &mut I) -> Result<Latency> {
    let websocket = interaction.heartbeat_latency().await;

    let sent = Instant::now();
    interaction.defer().await?;
    let latency = Latency {
        websocket,
        api: sent.elapsed(),
    };

    interaction.edit_reply(&latency.render()).await?;
    Ok(latency)
}
