//! `/userinfo` - profile summary for the invoking user.

use crate::bot::interaction::{Interaction, InvokerProfile, Visibility};
use crate::errors::Result;
use chrono::{DateTime, Utc};
use tracing::{error, info};

/// Shown to the user when the profile could not be sent.
pub const ERROR_MESSAGE: &str = "An error occurred while fetching user information.";

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;
const DATE_FORMAT: &str = "%B %-d, %Y";

/// Whole days between account creation and `now`, rounded down.
#[must_use]
pub fn account_age_days(created_at: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    (now - created_at).num_milliseconds().div_euclid(MILLIS_PER_DAY)
}

/// Long-form date, e.g. `March 5, 2021`.
#[must_use]
pub fn format_date(instant: DateTime<Utc>) -> String {
    instant.format(DATE_FORMAT).to_string()
}

/// Builds the reply content.
#[must_use]
pub fn render(
    profile: &InvokerProfile,
    joined_at: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
) -> String {
    let joined = joined_at.map_or_else(|| "N/A".to_string(), format_date);
    [
        "👤 **User Information**".to_string(),
        String::new(),
        format!("**Username:** {}", profile.username),
        format!("**Display Name:** {}", profile.display_name),
        format!("**User ID:** {}", profile.id),
        format!("**Account Created:** {}", format_date(profile.created_at)),
        format!(
            "**Account Age:** {} days",
            account_age_days(profile.created_at, now)
        ),
        format!("**Joined Server:** {joined}"),
        format!("**Bot Account:** {}", if profile.bot { "Yes" } else { "No" }),
        String::new(),
        format!("**Avatar URL:** [Click here]({})", profile.avatar_url),
    ]
    .join("\n")
}

/// Runs `/userinfo`, answering with a public reply.
///
/// On failure an ephemeral [`ERROR_MESSAGE`] is sent; only a failure of that
/// fallback reaches the caller.
pub async fn run<I: Interaction>(interaction: &mut I) -> Result<()> {
    let content = render(
        interaction.invoker(),
        interaction.member_joined_at(),
        Utc::now(),
    );

    match interaction.reply(&content, Visibility::Public).await {
        Ok(()) => {
            let invoker = interaction.invoker();
            info!(user = %invoker.tag, user_id = invoker.id, "[userinfo] executed");
            Ok(())
        }
        Err(e) => {
            error!(error = ?e, "[userinfo] command failed");
            interaction.reply(ERROR_MESSAGE, Visibility::Ephemeral).await
        }
    }
}
