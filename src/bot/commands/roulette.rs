//! Twisted Roulette Discord commands.
//!
//! All game state lives in the shared [`RouletteRegistry`]; these commands only translate
//! between Discord and the registry. Opening a lobby also spawns the countdown task that
//! starts or cancels it.

use crate::{
    bot::{BotData, embeds},
    core::{
        registry::{AutoStart, GuildKey, RouletteRegistry},
        roulette::{CHAMBERS, GameError, MIN_PLAYERS, Phase, PlayerId, RouletteSession, Shot},
    },
    errors::Error,
};
use poise::serenity_prelude as serenity;
use std::{fmt::Write, sync::Arc, time::Duration};
use tracing::{error, info};

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{guild_key, lobby_embed, roster, shot_description, spawn_countdown};
    use crate::{
        bot::{BotData, embeds},
        core::{account, narration, roulette::RouletteSession},
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::{error, info};

    /// Play the twisted roulette with your friends!
    #[poise::command(
        slash_command,
        guild_only,
        rename = "twisted-roulette",
        subcommands(
            "roulette_open",
            "roulette_join",
            "roulette_leave",
            "roulette_start",
            "roulette_fire",
            "roulette_info"
        ),
        subcommand_required
    )]
    pub async fn twisted_roulette(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Opens a lobby in this server. You join automatically.
    #[poise::command(slash_command, guild_only, rename = "open")]
    pub async fn roulette_open(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let guild = guild_key(ctx)?;
        let data = ctx.data();
        let host = ctx.author().id.get();

        let session = RouletteSession::new(host, data.config.roulette.max_players);
        let max_players = session.max_players();
        let generation = data.roulette.open(guild, session)?;
        let countdown = data.config.roulette.countdown();
        info!(guild, host, generation, "Roulette lobby opened");

        spawn_countdown(
            ctx.serenity_context().clone(),
            ctx.channel_id(),
            data.roulette.clone(),
            guild,
            generation,
            countdown,
        );

        let starts_at = chrono::Utc::now()
            + chrono::Duration::from_std(countdown).unwrap_or_else(|_| chrono::Duration::zero());
        let embed = lobby_embed(host, max_players, &embeds::relative_timestamp(starts_at));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Joins the lobby in this server.
    #[poise::command(slash_command, guild_only, rename = "join")]
    pub async fn roulette_join(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let guild = guild_key(ctx)?;
        let player = ctx.author().id.get();
        let count = ctx.data().roulette.join(guild, player).await?;

        let embed = embeds::main_embed("Joined Twisted Roulette").description(format!(
            "{} took a seat. `{count}` players are waiting.",
            embeds::mention(player)
        ));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Leaves the lobby before the game starts.
    #[poise::command(slash_command, guild_only, rename = "leave")]
    pub async fn roulette_leave(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let guild = guild_key(ctx)?;
        let player = ctx.author().id.get();
        let departure = ctx.data().roulette.leave(guild, player).await?;

        let description = if departure.closed {
            format!("{} left and the lobby closed.", embeds::mention(player))
        } else {
            format!(
                "{} left. `{}` players are waiting.",
                embeds::mention(player),
                departure.remaining
            )
        };
        let embed = embeds::main_embed("Left Twisted Roulette").description(description);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Starts the game now instead of waiting for the countdown.
    #[poise::command(slash_command, guild_only, rename = "start")]
    pub async fn roulette_start(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let guild = guild_key(ctx)?;
        let data = ctx.data();
        let first = data.roulette.start(guild, ctx.author().id.get()).await?;
        let session = data.roulette.snapshot(guild).await?;

        let embed = embeds::main_embed("Twisted Roulette has begun!").description(format!(
            "{}\n\n{} goes first.",
            roster(session.players()),
            embeds::mention(first)
        ));
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Pulls the trigger on another player, or yourself for an extra turn.
    #[poise::command(slash_command, guild_only, rename = "fire")]
    pub async fn roulette_fire(
        ctx: poise::Context<'_, BotData, Error>,
        #[description = "Who to aim at"] target: serenity::User,
    ) -> Result<()> {
        let guild = guild_key(ctx)?;
        let data = ctx.data();
        let shot = data
            .roulette
            .fire(guild, ctx.author().id.get(), target.id.get())
            .await?;

        let line = {
            let mut rng = rand::rng();
            narration::describe_shot(
                &shot,
                &embeds::mention(shot.actor),
                &embeds::mention(shot.target),
                &mut rng,
            )
        };

        let mut reward = None;
        if let Some(winner) = shot.winner {
            let win_exp = data.config.roulette.win_exp;
            match account::record_roulette_win(&data.database, &winner.to_string(), win_exp).await
            {
                Ok(credited) => {
                    info!(guild, winner, credited = credited.is_some(), "Roulette game won");
                    reward = credited.map(|_| win_exp);
                }
                Err(e) => error!(guild, winner, "Failed to record roulette win: {}", e),
            }
        }
        let description = shot_description(&shot, &line, reward)?;

        let title = if shot.hit { "💥 BANG!" } else { "*click*" };
        let embed = embeds::main_embed(title).description(description);
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }

    /// Shows the state of this server's game.
    #[poise::command(slash_command, guild_only, rename = "info")]
    pub async fn roulette_info(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let guild = guild_key(ctx)?;
        let session = ctx.data().roulette.snapshot(guild).await?;
        let embed = super::info_embed(&session)?;
        ctx.send(poise::CreateReply::default().embed(embed)).await?;
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

fn guild_key(ctx: poise::Context<'_, BotData, Error>) -> Result<GuildKey, GameError> {
    ctx.guild_id()
        .map(serenity::GuildId::get)
        .ok_or(GameError::NoActiveGame)
}

fn roster(players: &[PlayerId]) -> String {
    players
        .iter()
        .map(|&player| embeds::mention(player))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Narration, chamber and outcome of a shot. `reward` is the EXP credited to the winner.
fn shot_description(
    shot: &Shot,
    line: &str,
    reward: Option<u32>,
) -> Result<String, std::fmt::Error> {
    let mut description = format!("{line}\n\n*Chamber `{}` of {CHAMBERS}.*", shot.chamber);
    if let Some(winner) = shot.winner {
        write!(
            &mut description,
            "\n\n🏆 {} is the last one standing!",
            embeds::mention(winner)
        )?;
        if let Some(exp) = reward {
            write!(&mut description, " `+{exp}` EXP")?;
        }
    } else if let Some(next) = shot.next_turn {
        write!(&mut description, "\n\nIt's {}'s turn.", embeds::mention(next))?;
    }
    Ok(description)
}

fn lobby_embed(host: PlayerId, max_players: usize, starts: &str) -> serenity::CreateEmbed {
    embeds::main_embed("🔫 Twisted Roulette").description(format!(
        "{} opened a lobby for up to `{max_players}` players.\n\
         Use `/games twisted-roulette join` to take a seat.\n\n\
         The game starts {starts}, or sooner with `/games twisted-roulette start`.",
        embeds::mention(host)
    ))
}

fn info_embed(session: &RouletteSession) -> Result<serenity::CreateEmbed, std::fmt::Error> {
    let current = session.current_player();
    let mut alive = String::new();
    for &player in session.players() {
        let marker = if current == Some(player) { " 👈" } else { "" };
        writeln!(&mut alive, "{}{marker}", embeds::mention(player))?;
    }

    let dead = if session.dead().is_empty() {
        "Nobody yet".to_string()
    } else {
        roster(session.dead())
    };

    let status = match session.phase() {
        Phase::Lobby => "Waiting for players",
        Phase::InProgress => "In progress",
        Phase::Finished { .. } => "Finished",
        Phase::Cancelled => "Cancelled",
    };

    Ok(embeds::main_embed("🔫 Twisted Roulette")
        .field("Status", status, true)
        .field(
            "Players",
            format!("`{}/{}`", session.players().len(), session.max_players()),
            true,
        )
        .field("Host", embeds::mention(session.host()), true)
        .field("Alive", alive, false)
        .field("Dead", dead, false))
}

/// Announces whatever the lobby countdown decides in the lobby's channel.
fn spawn_countdown(
    ctx: serenity::Context,
    channel: serenity::ChannelId,
    registry: Arc<RouletteRegistry>,
    guild: GuildKey,
    generation: u64,
    countdown: Duration,
) {
    tokio::spawn(async move {
        let embed = match registry.auto_start_after(guild, generation, countdown).await {
            AutoStart::Started { first, players } => {
                info!(guild, generation, "Roulette countdown started the game");
                embeds::main_embed("Twisted Roulette has begun!").description(format!(
                    "{}\n\n{} goes first.",
                    roster(&players),
                    embeds::mention(first)
                ))
            }
            AutoStart::Cancelled { players } => embeds::error_embed(
                "Twisted Roulette cancelled",
                format!(
                    "Not enough players joined ({}/{MIN_PLAYERS}). Open a new lobby to try again.",
                    players.len()
                ),
            ),
            AutoStart::Skipped => return,
        };

        if let Err(e) = channel
            .send_message(&ctx, serenity::CreateMessage::new().embed(embed))
            .await
        {
            error!("Failed to announce roulette countdown in {}: {:?}", channel, e);
        }
    });
}
