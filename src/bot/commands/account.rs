//! Account Discord commands - create, profile, delete and leaderboard.
//!
//! These commands are thin wrappers over [`crate::core::account`]; missing or duplicate
//! accounts surface as user-facing errors through the framework error hook.

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use crate::{
        bot::{BotData, embeds},
        core::account,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use std::fmt::Write;

    const LEADERBOARD_SIZE: u64 = 10;

    /// Parent command for managing your Nivara account.
    #[poise::command(
        slash_command,
        subcommands(
            "account_create",
            "account_profile",
            "account_delete",
            "account_leaderboard"
        ),
        subcommand_required
    )]
    pub async fn account(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Creates an account so your game rewards are saved.
    #[poise::command(slash_command, rename = "create")]
    pub async fn account_create(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        account::create_account(&ctx.data().database, &user_id).await?;

        let embed = embeds::main_embed("Account created")
            .description("Welcome to Nivara! EXP from games will now be saved to your account.");
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows EXP and wins for you or another user.
    #[poise::command(slash_command, rename = "profile")]
    pub async fn account_profile(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "User to look up (defaults to you)"] user: Option<serenity::User>,
    ) -> Result<()> {
        let user = user.as_ref().unwrap_or_else(|| ctx.author());
        let profile = account::require_account(&ctx.data().database, &user.id.to_string()).await?;

        let embed = embeds::main_embed(format!("{}'s Profile", user.name))
            .thumbnail(user.face())
            .field("EXP", format!("`{}`", profile.exp), true)
            .field("Roulette Wins", format!("`{}`", profile.roulette_wins), true)
            .field(
                "Member Since",
                embeds::relative_timestamp(profile.created_at),
                false,
            );
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Permanently deletes your account and all its EXP.
    #[poise::command(slash_command, rename = "delete")]
    pub async fn account_delete(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let user_id = ctx.author().id.to_string();
        account::delete_account(&ctx.data().database, &user_id).await?;

        let reply = poise::CreateReply::default()
            .embed(
                embeds::main_embed("Account deleted")
                    .description("Your account is gone. Farewell!"),
            )
            .ephemeral(true);
        ctx.send(reply).await?;
        Ok(())
    }

    /// Shows the players with the most EXP.
    #[poise::command(slash_command, rename = "leaderboard")]
    pub async fn account_leaderboard(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let top = account::leaderboard(&ctx.data().database, LEADERBOARD_SIZE).await?;

        let mut description = String::new();
        if top.is_empty() {
            description.push_str("Nobody has an account yet. Be the first with `/account create`!");
        }
        for (rank, entry) in top.iter().enumerate() {
            writeln!(
                &mut description,
                "**{}.** <@{}> - `{}` EXP, `{}` wins",
                rank + 1,
                entry.id,
                entry.exp,
                entry.roulette_wins
            )?;
        }

        let embed = embeds::main_embed("🏆 Leaderboard").description(description);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;
