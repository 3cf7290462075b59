//! Environment configuration for both binaries.
//!
//! Credentials come from the process environment (optionally seeded from a
//! `.env` file by `dotenvy`). Every loader has a `from_lookup` form that takes
//! the variable source as a closure, so parsing can be exercised without
//! touching the real environment.

use crate::errors::{Error, Result};
use crate::registrar::DeploymentScope;
use poise::serenity_prelude as serenity;
use std::num::NonZeroU64;

/// Bot token, shared by the runtime and the registrar.
pub const TOKEN_VAR: &str = "DISCORD_TOKEN";
/// Application (client) ID the commands are registered under.
pub const CLIENT_ID_VAR: &str = "CLIENT_ID";
/// Optional guild to register into instead of the global scope.
pub const GUILD_ID_VAR: &str = "GUILD_ID";

/// Settings for the long-lived bot process.
#[derive(Debug, Clone)]
pub struct BotConfig {
    /// Bot token used to open the gateway connection
    pub token: String,
}

impl BotConfig {
    /// Loads the runtime configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Loads the runtime configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Self {
            token: required(&lookup, TOKEN_VAR)?,
        })
    }
}

/// Settings for the one-shot command registrar.
#[derive(Debug, Clone)]
pub struct RegistrarConfig {
    /// Bot token used to authenticate the registration call
    pub token: String,
    /// Application the commands belong to
    pub application_id: serenity::ApplicationId,
    /// Where the commands are registered
    pub scope: DeploymentScope,
}

impl RegistrarConfig {
    /// Loads the registrar configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Loads the registrar configuration from an arbitrary variable source.
    ///
    /// The token is checked before the client ID, matching the order the
    /// variables are documented in.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let token = required(&lookup, TOKEN_VAR)?;
        let client_id = required(&lookup, CLIENT_ID_VAR)?;
        let application_id = serenity::ApplicationId::new(parse_id(CLIENT_ID_VAR, &client_id)?.get());

        let scope = match optional(&lookup, GUILD_ID_VAR) {
            Some(raw) => DeploymentScope::Guild(serenity::GuildId::new(parse_id(GUILD_ID_VAR, &raw)?.get())),
            None => DeploymentScope::Global,
        };

        Ok(Self {
            token,
            application_id,
            scope,
        })
    }
}

fn env_lookup(var: &str) -> Option<String> {
    std::env::var(var).ok()
}

fn optional(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Option<String> {
    lookup(var)
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn required(lookup: &impl Fn(&str) -> Option<String>, var: &'static str) -> Result<String> {
    optional(lookup, var).ok_or(Error::MissingCredential { var })
}

fn parse_id(var: &'static str, raw: &str) -> Result<NonZeroU64> {
    raw.parse::<NonZeroU64>().map_err(|_| Error::InvalidId {
        var,
        value: raw.to_string(),
    })
}
