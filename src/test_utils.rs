//! Shared test utilities for the bot.
//!
//! [`MockInteraction`] stands in for a live Discord interaction and records
//! every message that would have been sent. Transmit failures can be scripted
//! per operation to drive the error paths. [`RecordingPublisher`] does the same
//! for the registrar's command submission.

use crate::{
    bot::interaction::{Interaction, InvokerProfile, ReplyState, Visibility},
    commands::CommandDescriptor,
    errors::Result,
    registrar::{CommandPublisher, Endpoint},
};
use chrono::{DateTime, TimeZone, Utc};
use poise::serenity_prelude as serenity;
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

/// A message the mock accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    /// Initial response
    Reply {
        /// Message text
        content: String,
        /// Who can see it
        visibility: Visibility,
    },
    /// Deferral placeholder
    Defer,
    /// Edit of the initial response
    Edit(String),
    /// Follow-up message
    FollowUp {
        /// Message text
        content: String,
        /// Who can see it
        visibility: Visibility,
    },
}

/// Transmit operations that can be made to fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    /// [`Interaction::reply`]
    Reply,
    /// [`Interaction::defer`]
    Defer,
    /// [`Interaction::edit_reply`]
    Edit,
    /// [`Interaction::follow_up`]
    FollowUp,
}

/// The profile every mock interaction is invoked by unless overridden.
///
/// # Defaults
/// * username: `tester`, display name: `Test User`
/// * created: 2015-05-13 00:00 UTC, not a bot, default avatar
pub fn test_profile() -> InvokerProfile {
    InvokerProfile {
        username: "tester".to_string(),
        display_name: "Test User".to_string(),
        tag: "tester".to_string(),
        id: 80_351_110_224_678_912,
        bot: false,
        avatar_url: "https://cdn.discordapp.com/embed/avatars/0.png".to_string(),
        created_at: Utc
            .with_ymd_and_hms(2015, 5, 13, 0, 0, 0)
            .single()
            .unwrap_or_default(),
    }
}

/// Scripted [`Interaction`] that records what the handlers send.
#[derive(Debug)]
pub struct MockInteraction {
    /// Invoked command name
    pub command_name: String,
    /// Invoking user
    pub invoker: InvokerProfile,
    /// Guild join instant, `None` outside a guild
    pub joined_at: Option<DateTime<Utc>>,
    /// Heartbeat latency reported to `/ping`
    pub latency: Option<Duration>,
    /// Current reply state
    pub state: ReplyState,
    /// Messages accepted so far, in order
    pub sent: Vec<Sent>,
    /// Every transmit attempt, successful or not
    pub attempts: Vec<MockOp>,
    failures: HashMap<MockOp, usize>,
}

impl MockInteraction {
    /// A DM-context interaction for `command_name` by [`test_profile`].
    pub fn new(command_name: &str) -> Self {
        Self {
            command_name: command_name.to_string(),
            invoker: test_profile(),
            joined_at: None,
            latency: Some(Duration::from_millis(50)),
            state: ReplyState::None,
            sent: Vec::new(),
            attempts: Vec::new(),
            failures: HashMap::new(),
        }
    }

    /// Places the interaction inside a guild the invoker joined at `joined_at`.
    #[must_use]
    pub fn in_guild(mut self, joined_at: DateTime<Utc>) -> Self {
        self.joined_at = Some(joined_at);
        self
    }

    /// Overrides the reported heartbeat latency.
    #[must_use]
    pub fn with_latency(mut self, latency: Option<Duration>) -> Self {
        self.latency = latency;
        self
    }

    /// Makes the next `times` attempts of `op` fail.
    #[must_use]
    pub fn failing(mut self, op: MockOp, times: usize) -> Self {
        self.failures.insert(op, times);
        self
    }

    fn attempt(&mut self, op: MockOp) -> Result<()> {
        self.attempts.push(op);
        match self.failures.get_mut(&op) {
            Some(remaining) if *remaining > 0 => {
                *remaining -= 1;
                Err(serenity::Error::Other("simulated transport failure").into())
            }
            _ => Ok(()),
        }
    }
}

impl Interaction for MockInteraction {
    fn command_name(&self) -> &str {
        &self.command_name
    }

    fn invoker(&self) -> &InvokerProfile {
        &self.invoker
    }

    fn member_joined_at(&self) -> Option<DateTime<Utc>> {
        self.joined_at
    }

    fn reply_state(&self) -> ReplyState {
        self.state
    }

    async fn heartbeat_latency(&self) -> Option<Duration> {
        self.latency
    }

    async fn reply(&mut self, content: &str, visibility: Visibility) -> Result<()> {
        self.attempt(MockOp::Reply)?;
        self.sent.push(Sent::Reply {
            content: content.to_string(),
            visibility,
        });
        self.state = ReplyState::Replied;
        Ok(())
    }

    async fn defer(&mut self) -> Result<()> {
        self.attempt(MockOp::Defer)?;
        self.sent.push(Sent::Defer);
        self.state = ReplyState::Deferred;
        Ok(())
    }

    async fn edit_reply(&mut self, content: &str) -> Result<()> {
        self.attempt(MockOp::Edit)?;
        self.sent.push(Sent::Edit(content.to_string()));
        self.state = ReplyState::Replied;
        Ok(())
    }

    async fn follow_up(&mut self, content: &str, visibility: Visibility) -> Result<()> {
        self.attempt(MockOp::FollowUp)?;
        self.sent.push(Sent::FollowUp {
            content: content.to_string(),
            visibility,
        });
        Ok(())
    }
}

/// [`CommandPublisher`] that records each submission instead of calling Discord.
#[derive(Debug, Default)]
pub struct RecordingPublisher {
    /// Every `(endpoint, body)` submitted, in order
    pub calls: Mutex<Vec<(Endpoint, Vec<CommandDescriptor>)>>,
    /// When set, every submission fails with this message
    pub fail_with: Option<&'static str>,
}

impl RecordingPublisher {
    /// A publisher whose submissions all fail.
    pub fn failing(message: &'static str) -> Self {
        Self {
            calls: Mutex::default(),
            fail_with: Some(message),
        }
    }

    /// Snapshot of the recorded submissions.
    pub fn calls(&self) -> Vec<(Endpoint, Vec<CommandDescriptor>)> {
        self.calls
            .lock()
            .map(|calls| calls.clone())
            .unwrap_or_default()
    }
}

impl CommandPublisher for RecordingPublisher {
    async fn replace_all(
        &self,
        endpoint: &Endpoint,
        commands: &[CommandDescriptor],
    ) -> Result<usize> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((*endpoint, commands.to_vec()));
        }
        match self.fail_with {
            Some(message) => Err(serenity::Error::Other(message).into()),
            None => Ok(commands.len()),
        }
    }
}
