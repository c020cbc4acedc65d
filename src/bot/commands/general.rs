//! General Discord commands - ping, help, and other utility commands.
//! This module contains simple commands that don't require database operations
//! and provide basic bot functionality and user assistance.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::BotData,
        errors::{Error, Result},
    };

    /// Responds with "Pong!" to test bot connectivity.
    #[poise::command(slash_command)]
    pub async fn ping(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        ctx.say("Pong!").await?;
        Ok(())
    }

    /// Displays help information about available commands.
    #[poise::command(slash_command)]
    pub async fn help(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let help_text = "**Nivara RPG Help**\n\
        Here is a summary of all available commands.\n\n\
        **Games**\n\
        • `/games mine` - Dig through an endless mine with the arrow buttons.\n\
        • `/games twisted-roulette open` - Open a Twisted Roulette lobby in this server.\n\
        • `/games twisted-roulette join` / `leave` - Join or leave the open lobby.\n\
        • `/games twisted-roulette start` - Start the game early (2+ players).\n\
        • `/games twisted-roulette fire <target>` - Pull the trigger on your turn.\n\
        • `/games twisted-roulette info` - Show players and whose turn it is.\n\n\
        **Account**\n\
        • `/account create` - Create an account to collect EXP.\n\
        • `/account profile [user]` - Show EXP and wins.\n\
        • `/account leaderboard` - Top players by EXP.\n\
        • `/account delete` - Delete your account.\n\n\
        **Utility**\n\
        • `/misc status` - Bot version, latency and uptime.\n\
        • `/ping` - Checks if the bot is responsive.\n\
        • `/help` - Shows this help message.";

        ctx.say(help_text).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
