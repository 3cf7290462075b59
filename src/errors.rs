//! Unified error types and result handling.

use poise::serenity_prelude as serenity;
use thiserror::Error;

/// Every failure the bot and the registrar can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// A required environment variable is absent or empty.
    #[error("Missing required credential: {var} is not set")]
    MissingCredential {
        /// Name of the environment variable that was missing
        var: &'static str,
    },

    /// An ID variable did not hold a non-zero Discord snowflake.
    #[error("Invalid {var}: `{value}` is not a valid Discord ID")]
    InvalidId {
        /// Name of the environment variable
        var: &'static str,
        /// The rejected value
        value: String,
    },

    /// A user ID whose timestamp bits fall outside the representable range.
    #[error("Snowflake {id} does not encode a valid creation time")]
    InvalidSnowflake {
        /// The offending ID
        id: u64,
    },

    /// Anything raised by serenity or poise, including HTTP responses.
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<serenity::Error>),
}

impl From<serenity::Error> for Error {
    fn from(value: serenity::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
