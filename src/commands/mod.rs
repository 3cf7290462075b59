//! Shared command registry.
//!
//! Both the registrar and the running bot derive their view of the command set
//! from [`BotCommand::ALL`], so the registered slash commands and the dispatch
//! table cannot drift apart.

pub mod ping;
pub mod userinfo;

use crate::bot::interaction::Interaction;
use crate::errors::Result;
use serde::Serialize;
use std::collections::HashMap;

/// A slash command as submitted to Discord's command registry.
///
/// Serialized as-is into the bulk-overwrite request body. None of the bot's
/// commands take options.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommandDescriptor {
    /// Command name, unique within a scope
    pub name: &'static str,
    /// Description shown in the Discord client
    pub description: &'static str,
}

/// Every command this bot implements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BotCommand {
    /// `/ping` - health check with gateway and API latency
    Ping,
    /// `/userinfo` - profile summary for the invoking user
    UserInfo,
}

impl BotCommand {
    /// The full command set, in registration order.
    pub const ALL: [Self; 2] = [Self::Ping, Self::UserInfo];

    /// Name the command is registered and dispatched under.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Ping => "ping",
            Self::UserInfo => "userinfo",
        }
    }

    /// Description registered alongside the name.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Ping => "Replies with Pong! and bot latency",
            Self::UserInfo => "Displays information about you or a specified user",
        }
    }

    /// Wire descriptor for this command.
    #[must_use]
    pub const fn descriptor(self) -> CommandDescriptor {
        CommandDescriptor {
            name: self.name(),
            description: self.description(),
        }
    }

    /// Runs the command against one interaction.
    pub async fn execute<I: Interaction>(self, interaction: &mut I) -> Result<()> {
        match self {
            Self::Ping => ping::run(interaction).await,
            Self::UserInfo => userinfo::run(interaction).await,
        }
    }
}

/// Descriptors for every command, ready to submit to Discord.
#[must_use]
pub fn descriptors() -> Vec<CommandDescriptor> {
    BotCommand::ALL.iter().map(|command| command.descriptor()).collect()
}

/// Read-only name → command lookup used by the dispatch core.
///
/// Built once at startup; there is no way to add or remove entries afterwards.
#[derive(Debug, Clone)]
pub struct DispatchTable {
    commands: HashMap<&'static str, BotCommand>,
}

impl DispatchTable {
    /// Builds a table holding only the given commands.
    #[must_use]
    pub fn from_commands(commands: &[BotCommand]) -> Self {
        Self {
            commands: commands.iter().map(|command| (command.name(), *command)).collect(),
        }
    }

    /// Finds the command registered under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<BotCommand> {
        self.commands.get(name).copied()
    }

    /// Dispatchable command names, sorted.
    #[must_use]
    pub fn names(&self) -> Vec<&'static str> {
        let mut names: Vec<_> = self.commands.keys().copied().collect();
        names.sort_unstable();
        names
    }
}

/// The full table, built from [`BotCommand::ALL`].
impl Default for DispatchTable {
    fn default() -> Self {
        Self::from_commands(&BotCommand::ALL)
    }
}
