//! Slash command registration.
//!
//! Submits the full command list to Discord in one bulk-overwrite call.
//! Anything registered earlier but missing from the list is removed by Discord,
//! so a run always leaves exactly [`commands::descriptors`] registered in the
//! chosen scope.

use crate::commands::{self, CommandDescriptor};
use crate::config::{CLIENT_ID_VAR, GUILD_ID_VAR, TOKEN_VAR};
use crate::errors::{Error, Result};
use poise::serenity_prelude as serenity;
use std::future::Future;
use tracing::{error, info, warn};

/// Discord JSON error code for "Missing Access".
const MISSING_ACCESS_CODE: isize = 50001;

/// Where commands are registered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeploymentScope {
    /// One guild; updates show up immediately. Meant for testing.
    Guild(serenity::GuildId),
    /// Every guild the application is in; propagation can take up to an hour.
    Global,
}

impl DeploymentScope {
    fn label(self) -> &'static str {
        match self {
            Self::Guild(_) => "Guild-Specific (Test Mode)",
            Self::Global => "Global (Production Mode)",
        }
    }

    /// The bulk-overwrite endpoint holding this scope's commands.
    #[must_use]
    pub const fn endpoint(self, application_id: serenity::ApplicationId) -> Endpoint {
        match self {
            Self::Guild(guild_id) => Endpoint::GuildCommands {
                application_id,
                guild_id,
            },
            Self::Global => Endpoint::GlobalCommands { application_id },
        }
    }
}

/// A Discord REST endpoint that replaces a whole command set on `PUT`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endpoint {
    /// `/applications/{application_id}/guilds/{guild_id}/commands`
    GuildCommands {
        /// Owning application
        application_id: serenity::ApplicationId,
        /// Guild the commands are visible in
        guild_id: serenity::GuildId,
    },
    /// `/applications/{application_id}/commands`
    GlobalCommands {
        /// Owning application
        application_id: serenity::ApplicationId,
    },
}

impl Endpoint {
    /// Request path relative to the API base.
    #[must_use]
    pub fn path(self) -> String {
        match self {
            Self::GuildCommands {
                application_id,
                guild_id,
            } => format!("/applications/{application_id}/guilds/{guild_id}/commands"),
            Self::GlobalCommands { application_id } => {
                format!("/applications/{application_id}/commands")
            }
        }
    }
}

/// Something that can replace the registered command set behind an endpoint.
pub trait CommandPublisher: Sync {
    /// Replaces every command registered at `endpoint` with `commands` and
    /// returns how many commands Discord now holds there.
    fn replace_all(
        &self,
        endpoint: &Endpoint,
        commands: &[CommandDescriptor],
    ) -> impl Future<Output = Result<usize>> + Send;
}

impl CommandPublisher for serenity::Http {
    async fn replace_all(
        &self,
        endpoint: &Endpoint,
        commands: &[CommandDescriptor],
    ) -> Result<usize> {
        let registered = match *endpoint {
            Endpoint::GuildCommands {
                application_id,
                guild_id,
            } => {
                self.set_application_id(application_id);
                self.create_guild_commands(guild_id, &commands).await?
            }
            Endpoint::GlobalCommands { application_id } => {
                self.set_application_id(application_id);
                self.create_global_commands(&commands).await?
            }
        };
        Ok(registered.len())
    }
}

/// Submits every command to `scope` of `application_id` through `publisher`,
/// logging progress.
///
/// Exactly one submission is made, whatever the scope.
pub async fn deploy<P: CommandPublisher>(
    publisher: &P,
    application_id: serenity::ApplicationId,
    scope: &DeploymentScope,
) -> Result<usize> {
    let descriptors = commands::descriptors();

    info!("Starting slash command deployment");
    info!(count = descriptors.len(), "Commands to deploy");
    for descriptor in &descriptors {
        info!("  - /{}", descriptor.name);
    }

    info!(scope = scope.label(), "Deployment type");
    match scope {
        DeploymentScope::Guild(guild_id) => {
            info!(guild_id = guild_id.get(), "Target guild");
            info!("Commands will be available immediately");
        }
        DeploymentScope::Global => {
            warn!("Global commands may take up to 1 hour to update");
            info!("Tip: set {GUILD_ID_VAR} for instant testing");
        }
    }

    let endpoint = scope.endpoint(application_id);
    info!(endpoint = %endpoint.path(), "Deploying commands...");
    let registered = publisher.replace_all(&endpoint, &descriptors).await?;

    info!(registered, "Commands deployed successfully");
    if matches!(scope, DeploymentScope::Global) {
        info!("Commands will be available globally within 1 hour");
    }
    log_next_steps();
    Ok(registered)
}

fn log_next_steps() {
    info!("Next steps:");
    info!("  1. Start the bot: cargo run --bin badge-bot");
    info!("  2. Open your Discord server and type / to see the commands");
    info!("  3. Use /ping or /userinfo");
    info!("Active Developer badge:");
    info!("  - Use any command in your server, then wait 24 hours");
    info!("  - Check https://discord.com/developers/active-developer");
}

/// Why a registration call failed, as far as the operator can act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RegistrationFailure {
    /// The bot is not a member of the target guild
    MissingAccess,
    /// Discord rejected the token
    InvalidToken,
    /// The bot lacks the permissions for the call
    Forbidden,
    /// Anything else, including transport errors
    Other,
}

impl RegistrationFailure {
    /// Classifies a failed submission.
    #[must_use]
    pub fn classify(error: &Error) -> Self {
        let Error::Framework(inner) = error else {
            return Self::Other;
        };
        match inner.as_ref() {
            serenity::Error::Http(serenity::HttpError::UnsuccessfulRequest(response)) => {
                Self::from_response(response.status_code.as_u16(), response.error.code)
            }
            _ => Self::Other,
        }
    }

    /// Classifies an HTTP status and Discord JSON error code.
    #[must_use]
    pub const fn from_response(status: u16, code: isize) -> Self {
        if code == MISSING_ACCESS_CODE {
            Self::MissingAccess
        } else if status == 401 {
            Self::InvalidToken
        } else if status == 403 {
            Self::Forbidden
        } else {
            Self::Other
        }
    }

    /// Operator-facing lines explaining how to fix the failure.
    #[must_use]
    pub fn remediation(self) -> Vec<String> {
        match self {
            Self::MissingAccess => vec![
                "Missing Access: the bot is not in the specified guild".to_string(),
                "Solution: invite the bot to your server first".to_string(),
            ],
            Self::InvalidToken => vec![
                format!("Invalid Token: check {TOKEN_VAR} in .env"),
                "Solution: get a new token from the Discord Developer Portal".to_string(),
            ],
            Self::Forbidden => vec![
                "Forbidden: the bot lacks the necessary permissions".to_string(),
                "Solution: check bot permissions in the Discord Developer Portal".to_string(),
            ],
            Self::Other => vec![
                "Troubleshooting:".to_string(),
                format!("  1. Verify {TOKEN_VAR} in .env is correct"),
                format!("  2. Verify {CLIENT_ID_VAR} in .env is correct"),
                format!("  3. Check the bot is invited to the guild (if using {GUILD_ID_VAR})"),
                "  4. Ensure the bot has the necessary permissions".to_string(),
            ],
        }
    }
}

/// Logs a failed deployment with remediation hints.
pub fn report_failure(error: &Error) {
    error!("DEPLOYMENT FAILED");
    error!(error = ?error, "Error details");
    for line in RegistrationFailure::classify(error).remediation() {
        error!("{line}");
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::RecordingPublisher;

    fn app() -> serenity::ApplicationId {
        serenity::ApplicationId::new(42)
    }

    #[test]
    fn test_global_scope_maps_to_application_commands() {
        let endpoint = DeploymentScope::Global.endpoint(app());

        assert_eq!(endpoint, Endpoint::GlobalCommands { application_id: app() });
        assert_eq!(endpoint.path(), "/applications/42/commands");
    }

    #[test]
    fn test_guild_scope_maps_to_guild_commands() {
        let guild_id = serenity::GuildId::new(1234);
        let endpoint = DeploymentScope::Guild(guild_id).endpoint(app());

        assert_eq!(
            endpoint,
            Endpoint::GuildCommands {
                application_id: app(),
                guild_id,
            }
        );
        assert_eq!(endpoint.path(), "/applications/42/guilds/1234/commands");
    }

    #[tokio::test]
    async fn test_global_deploy_submits_once() {
        let publisher = RecordingPublisher::default();

        let registered = deploy(&publisher, app(), &DeploymentScope::Global)
            .await
            .unwrap();

        assert_eq!(registered, 2);
        let calls = publisher.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0.path(), "/applications/42/commands");
        assert_eq!(calls[0].1, commands::descriptors());
    }

    #[tokio::test]
    async fn test_guild_deploy_targets_guild_with_same_body() {
        let publisher = RecordingPublisher::default();
        let scope = DeploymentScope::Guild(serenity::GuildId::new(1234));

        deploy(&publisher, app(), &scope).await.unwrap();
        deploy(&publisher, app(), &DeploymentScope::Global).await.unwrap();

        let calls = publisher.calls();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].0, scope.endpoint(app()));
        assert_eq!(calls[0].0.path(), "/applications/42/guilds/1234/commands");
        assert_eq!(calls[1].0.path(), "/applications/42/commands");
        assert_eq!(calls[0].1, calls[1].1);
        assert_eq!(
            calls[0].1.iter().map(|d| d.name).collect::<Vec<_>>(),
            vec!["ping", "userinfo"]
        );
    }

    #[tokio::test]
    async fn test_failed_submission_propagates() {
        let publisher = RecordingPublisher::failing("connection reset");

        let err = deploy(&publisher, app(), &DeploymentScope::Global)
            .await
            .unwrap_err();

        assert_eq!(publisher.calls().len(), 1);
        assert_eq!(RegistrationFailure::classify(&err), RegistrationFailure::Other);
    }

    #[test]
    fn test_classify_responses() {
        assert_eq!(
            RegistrationFailure::from_response(403, 50001),
            RegistrationFailure::MissingAccess
        );
        assert_eq!(
            RegistrationFailure::from_response(401, 0),
            RegistrationFailure::InvalidToken
        );
        assert_eq!(
            RegistrationFailure::from_response(403, 50013),
            RegistrationFailure::Forbidden
        );
        assert_eq!(
            RegistrationFailure::from_response(500, 0),
            RegistrationFailure::Other
        );
    }

    #[test]
    fn test_non_http_errors_are_other() {
        let err = Error::MissingCredential { var: TOKEN_VAR };
        assert_eq!(RegistrationFailure::classify(&err), RegistrationFailure::Other);
    }

    #[test]
    fn test_remediation_mentions_the_right_fix() {
        assert!(RegistrationFailure::MissingAccess.remediation()[1].contains("invite the bot"));
        assert!(RegistrationFailure::InvalidToken.remediation()[0].contains(TOKEN_VAR));
        assert!(
            RegistrationFailure::Other
                .remediation()
                .iter()
                .any(|line| line.contains(CLIENT_ID_VAR))
        );
    }
}
