//! Embed builders shared by all commands.

use chrono::{DateTime, Utc};
use poise::serenity_prelude as serenity;

/// Accent colour for regular embeds.
pub const PRIMARY_COLOUR: u32 = 0x005F_9EA0;
/// Accent colour for error embeds.
pub const ERROR_COLOUR: u32 = 0x00ED_4245;

/// Standard embed with the primary colour.
#[must_use]
pub fn main_embed(title: impl Into<String>) -> serenity::CreateEmbed {
    serenity::CreateEmbed::new()
        .title(title)
        .colour(PRIMARY_COLOUR)
}

/// Error embed; `description` may be empty.
#[must_use]
pub fn error_embed(
    title: impl Into<String>,
    description: impl Into<String>,
) -> serenity::CreateEmbed {
    let description = description.into();
    let embed = serenity::CreateEmbed::new()
        .title(title)
        .colour(ERROR_COLOUR);
    if description.is_empty() {
        embed
    } else {
        embed.description(description)
    }
}

/// Discord relative timestamp markup, e.g. "5 minutes ago".
#[must_use]
pub fn relative_timestamp(at: DateTime<Utc>) -> String {
    format!("<t:{}:R>", at.timestamp())
}

/// Mention markup for a raw user ID.
#[must_use]
pub fn mention(user_id: u64) -> String {
    format!("<@{user_id}>")
}
