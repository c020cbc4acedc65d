//! Rotating presence status.
//!
//! Every tick the bot shows the next line as "Listening to ...". Guild and user counts are
//! re-read from the cache each time the list runs out.

use crate::bot::stats::VERSION;
use poise::serenity_prelude as serenity;
use std::time::Duration;
use tracing::info;

/// Lines shown after "Listening to".
#[must_use]
pub fn presence_lines(version: &str, guilds: usize, users: usize) -> Vec<String> {
    vec![
        format!("version {version}"),
        format!("humans in {guilds} Servers!"),
        format!("{users} users!"),
        "Slash Commands!".to_string(),
    ]
}

/// Cycles the presence forever. Spawn once per process.
pub async fn rotate_presence(ctx: serenity::Context, interval: Duration) {
    info!("Status handler has started.");
    let mut ticker = tokio::time::interval(interval.max(Duration::from_secs(1)));
    let mut lines = Vec::new().into_iter();

    loop {
        ticker.tick().await;

        let line = match lines.next() {
            Some(line) => line,
            None => {
                let guilds = ctx.cache.guild_count();
                let users = ctx.cache.user_count();
                lines = presence_lines(VERSION, guilds, users).into_iter();
                lines.next().unwrap_or_default()
            }
        };

        ctx.set_activity(Some(serenity::ActivityData::listening(line)));
    }
}
