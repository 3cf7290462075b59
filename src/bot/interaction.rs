//! The interaction capability handed to command handlers.
//!
//! Handlers never touch serenity types directly. They talk to an
//! [`Interaction`], which the live bot backs with [`SlashInteraction`] and the
//! tests back with a scripted fake.

use crate::errors::{Error, Result};
use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// How far an interaction's response has progressed.
///
/// Moves forward only: `None` → `Deferred` or `Replied`, and `Deferred` →
/// `Replied` once the deferred response is edited.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyState {
    /// Nothing sent yet
    #[default]
    None,
    /// A "thinking..." placeholder is showing
    Deferred,
    /// A response has been sent
    Replied,
}

impl ReplyState {
    /// Whether a response (or placeholder) already exists, so further
    /// messages must be follow-ups.
    #[must_use]
    pub const fn is_acknowledged(self) -> bool {
        !matches!(self, Self::None)
    }
}

/// Who can see a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Everyone in the channel
    Public,
    /// Only the invoking user
    Ephemeral,
}

/// The invoking user, as far as the handlers care.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerProfile {
    /// Unique username
    pub username: String,
    /// Global display name, falling back to the username
    pub display_name: String,
    /// Username with discriminator where one still exists
    pub tag: String,
    /// Snowflake ID
    pub id: u64,
    /// Whether the account is a bot
    pub bot: bool,
    /// Avatar URL, or the default avatar when none is set
    pub avatar_url: String,
    /// When the account was created
    pub created_at: DateTime<Utc>,
}

impl InvokerProfile {
    /// Builds a profile from a serenity user.
    pub fn from_user(user: &serenity::User) -> Result<Self> {
        Ok(Self {
            username: user.name.clone(),
            display_name: user.global_name.clone().unwrap_or_else(|| user.name.clone()),
            tag: user.tag(),
            id: user.id.get(),
            bot: user.bot,
            avatar_url: user.face(),
            created_at: snowflake_created_at(user.id.get())?,
        })
    }
}

/// Discord epoch (2015-01-01T00:00:00Z) in Unix milliseconds.
pub const DISCORD_EPOCH_MS: u64 = 1_420_070_400_000;

/// Creation instant encoded in the top 42 bits of a snowflake, to the
/// millisecond.
pub fn snowflake_created_at(id: u64) -> Result<DateTime<Utc>> {
    i64::try_from((id >> 22) + DISCORD_EPOCH_MS)
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .ok_or(Error::InvalidSnowflake { id })
}

/// One slash command invocation and its response lifecycle.
///
/// Transmit methods update [`Interaction::reply_state`] only when Discord
/// accepted the message.
pub trait Interaction: Send {
    /// Name of the invoked command.
    fn command_name(&self) -> &str;

    /// The user who invoked the command.
    fn invoker(&self) -> &InvokerProfile;

    /// When the invoker joined the guild, if the command ran inside one.
    fn member_joined_at(&self) -> Option<DateTime<Utc>>;

    /// Current response progress.
    fn reply_state(&self) -> ReplyState;

    /// Last measured gateway heartbeat round trip for the shard that
    /// delivered this interaction.
    fn heartbeat_latency(&self) -> impl Future<Output = Option<Duration>> + Send;

    /// Sends the initial response.
    fn reply(
        &mut self,
        content: &str,
        visibility: Visibility,
    ) -> impl Future<Output = Result<()>> + Send;

    /// Acknowledges the interaction with a placeholder to be edited later.
    fn defer(&mut self) -> impl Future<Output = Result<()>> + Send;

    /// Replaces the content of the initial (possibly deferred) response.
    fn edit_reply(&mut self, content: &str) -> impl Future<Output = Result<()>> + Send;

    /// Sends an additional message after the initial response.
    fn follow_up(
        &mut self,
        content: &str,
        visibility: Visibility,
    ) -> impl Future<Output = Result<()>> + Send;
}

/// [`Interaction`] backed by a live serenity command interaction.
pub struct SlashInteraction<'a> {
    ctx: &'a serenity::Context,
    shard_manager: &'a Arc<serenity::ShardManager>,
    command: &'a serenity::CommandInteraction,
    invoker: InvokerProfile,
    state: ReplyState,
}

impl<'a> SlashInteraction<'a> {
    /// Wraps a freshly received command interaction.
    pub fn new(
        ctx: &'a serenity::Context,
        shard_manager: &'a Arc<serenity::ShardManager>,
        command: &'a serenity::CommandInteraction,
    ) -> Result<Self> {
        Ok(Self {
            ctx,
            shard_manager,
            command,
            invoker: InvokerProfile::from_user(&command.user)?,
            state: ReplyState::None,
        })
    }
}

impl Interaction for SlashInteraction<'_> {
    fn command_name(&self) -> &str {
        &self.command.data.name
    }

    fn invoker(&self) -> &InvokerProfile {
        &self.invoker
    }

    fn member_joined_at(&self) -> Option<DateTime<Utc>> {
        self.command
            .member
            .as_ref()
            .and_then(|member| member.joined_at)
            .and_then(to_utc)
    }

    fn reply_state(&self) -> ReplyState {
        self.state
    }

    async fn heartbeat_latency(&self) -> Option<Duration> {
        let runners = self.shard_manager.runners.lock().await;
        runners
            .get(&self.ctx.shard_id)
            .and_then(|runner| runner.latency)
    }

    async fn reply(&mut self, content: &str, visibility: Visibility) -> Result<()> {
        let message = serenity::CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(visibility == Visibility::Ephemeral);
        self.command
            .create_response(
                &self.ctx.http,
                serenity::CreateInteractionResponse::Message(message),
            )
            .await?;
        self.state = ReplyState::Replied;
        Ok(())
    }

    async fn defer(&mut self) -> Result<()> {
        self.command.defer(&self.ctx.http).await?;
        self.state = ReplyState::Deferred;
        Ok(())
    }

    async fn edit_reply(&mut self, content: &str) -> Result<()> {
        self.command
            .edit_response(
                &self.ctx.http,
                serenity::EditInteractionResponse::new().content(content),
            )
            .await?;
        self.state = ReplyState::Replied;
        Ok(())
    }

    async fn follow_up(&mut self, content: &str, visibility: Visibility) -> Result<()> {
        self.command
            .create_followup(
                &self.ctx.http,
                serenity::CreateInteractionResponseFollowup::new()
                    .content(content)
                    .ephemeral(visibility == Visibility::Ephemeral),
            )
            .await?;
        Ok(())
    }
}

// Join dates are only shown as calendar days, so whole seconds are enough.
fn to_utc(timestamp: serenity::Timestamp) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(timestamp.unix_timestamp(), 0)
}
