//! Game Discord commands - the `games` group and the mine.
//!
//! The mine is a single-player session owned by this command invocation. Button presses are
//! collected one at a time until the player stops pressing for the configured timeout, after
//! which the buttons are disabled and any EXP earned is credited.

use crate::{
    core::{
        account,
        mine::{Direction, MineSession, Tile},
    },
    errors::Result,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;

// Inner module to suppress missing_docs warnings for poise macro-generated code
mod inner {
    #![allow(missing_docs)]

    use super::{credit_mine_exp, direction_from_custom_id, mine_buttons, mine_message};
    use crate::{
        bot::{BotData, commands::roulette::twisted_roulette, embeds},
        core::mine::MineSession,
        errors::{Error, Result},
    };
    use poise::serenity_prelude as serenity;
    use tracing::{debug, info, warn};

    /// Fun games to play with your friends!
    #[poise::command(
        slash_command,
        guild_only,
        subcommands("mine", "twisted_roulette"),
        subcommand_required
    )]
    pub async fn games(_ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        Ok(())
    }

    /// Dig through an endless mine.
    #[poise::command(slash_command)]
    pub async fn mine(ctx: poise::Context<'_, BotData, Error>) -> Result<()> {
        let config = ctx.data().config.mine.clone();
        let author_id = ctx.author().id;
        let ctx_id = ctx.id();
        let mut session = MineSession::new();

        let reply = ctx
            .send(
                poise::CreateReply::default()
                    .content(mine_message(&mut session))
                    .components(mine_buttons(ctx_id, false)),
            )
            .await?;

        let prefix = format!("{ctx_id}:");
        while let Some(press) = serenity::ComponentInteractionCollector::new(ctx.serenity_context())
            .filter({
                let prefix = prefix.clone();
                move |press| press.data.custom_id.starts_with(&prefix)
            })
            .timeout(config.timeout())
            .await
        {
            if press.user.id != author_id {
                let response = serenity::CreateInteractionResponseMessage::new()
                    .embed(embeds::error_embed("This game is not for you.", ""))
                    .ephemeral(true);
                if let Err(e) = press
                    .create_response(
                        ctx.serenity_context(),
                        serenity::CreateInteractionResponse::Message(response),
                    )
                    .await
                {
                    warn!("Failed to turn away mine button press from {}: {}", press.user.id, e);
                }
                continue;
            }

            let Some(direction) = direction_from_custom_id(ctx_id, &press.data.custom_id) else {
                continue;
            };
            let report = session.move_player(direction);
            debug!(?report, "Mine move");

            let response = serenity::CreateInteractionResponseMessage::new()
                .content(mine_message(&mut session));
            if let Err(e) = press
                .create_response(
                    ctx.serenity_context(),
                    serenity::CreateInteractionResponse::UpdateMessage(response),
                )
                .await
            {
                warn!("Failed to update mine message: {}", e);
            }
        }

        if let Err(e) = reply
            .edit(
                ctx,
                poise::CreateReply::default()
                    .content(mine_message(&mut session))
                    .components(mine_buttons(ctx_id, true)),
            )
            .await
        {
            warn!("Failed to disable mine buttons: {}", e);
        }

        let credited = credit_mine_exp(
            &ctx.data().database,
            &author_id.to_string(),
            &session,
            config.exp_per_ore,
        )
        .await?;
        info!(user = %author_id, credited, "Mine session ended");
        Ok(())
    }
}

// Re-export all commands
pub use inner::*;

/// Map, inventory and move counter shown in the mine message.
fn mine_message(session: &mut MineSession) -> String {
    let map = session.render_viewport();
    let mined: Vec<String> = session
        .inventory()
        .iter()
        .map(|(tile, count)| format!("{} x{count}", tile.emoji()))
        .collect();
    let mined = if mined.is_empty() {
        Tile::Empty.name().to_string()
    } else {
        mined.join(" ")
    };

    format!("{map}\nMoves: `{}` | Mined: {mined}", session.moves())
}

/// Credits the EXP a finished session earned and returns how much was credited.
///
/// Players without an account, or who mined nothing, get nothing.
async fn credit_mine_exp(
    db: &DatabaseConnection,
    user_id: &str,
    session: &MineSession,
    exp_per_ore: u32,
) -> Result<u32> {
    let exp = u32::try_from(session.exp_earned(exp_per_ore)).unwrap_or(u32::MAX);
    if exp == 0 {
        return Ok(0);
    }
    let credited = account::add_exp(db, user_id, exp).await?;
    Ok(if credited.is_some() { exp } else { 0 })
}

fn custom_id(ctx_id: u64, direction: Direction) -> String {
    format!("{ctx_id}:{}", direction.as_str())
}

fn direction_from_custom_id(ctx_id: u64, custom_id: &str) -> Option<Direction> {
    custom_id
        .strip_prefix(&format!("{ctx_id}:"))
        .and_then(Direction::parse)
}

fn mine_buttons(ctx_id: u64, disabled: bool) -> Vec<serenity::CreateActionRow> {
    let buttons = Direction::ALL
        .into_iter()
        .map(|direction| {
            serenity::CreateButton::new(custom_id(ctx_id, direction))
                .emoji(direction.emoji())
                .style(serenity::ButtonStyle::Primary)
                .disabled(disabled)
        })
        .collect();
    vec![serenity::CreateActionRow::Buttons(buttons)]
}
