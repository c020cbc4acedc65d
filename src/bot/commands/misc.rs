//! Miscellaneous commands about the bot itself.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, embeds, stats::VERSION},
        core::account,
        errors::{Error, Result},
    };
    use std::time::Instant;
    use tracing::warn;

    /// Miscellaneous commands about the bot.
    #[poise::command(slash_command, subcommands("status"), subcommand_required)]
    pub async fn misc(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Shows version, latency, uptime and reach of the bot.
    #[poise::command(slash_command)]
    pub async fn status(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.defer().await?;

        let db_timer = Instant::now();
        let probe = account::get_account(&ctx.data().database, &ctx.author().id.to_string()).await;
        let db_latency = match probe {
            Ok(_) => format!("`{} ms`", db_timer.elapsed().as_millis()),
            Err(e) => {
                warn!("Database latency probe failed: {}", e);
                "`DB not connected`".to_string()
            }
        };

        let bot_latency = ctx.ping().await;
        let bot_latency = if bot_latency.is_zero() {
            "`Unknown`".to_string()
        } else {
            format!("`{} ms`", bot_latency.as_millis())
        };

        let stats = &ctx.data().stats;
        let (thumbnail, guilds, users) = {
            let cache = ctx.cache();
            (cache.current_user().face(), cache.guild_count(), cache.user_count())
        };

        let status_embed = embeds::main_embed("Nivara's Status")
            .thumbnail(thumbnail)
            .field("Version", format!("`{VERSION}`"), false)
            .field("Bot Latency", bot_latency, false)
            .field("Database Latency", db_latency, false)
            .field("Online Since", embeds::relative_timestamp(stats.started_at()), false)
            .field(
                "Last Reconnect",
                embeds::relative_timestamp(stats.last_connect().await),
                false,
            )
            .field("Present In", format!("`{guilds}` guilds"), false)
            .field("Watching Over", format!("`{users}` users"), false);

        ctx.send(poise::CreateReply::default().embed(status_embed))
            .await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
