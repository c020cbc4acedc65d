//! Framework error hook.
//!
//! Expected conditions (game rule violations, account problems) are shown to the user as an
//! ephemeral error embed. Anything else is logged, answered with a generic apology and, when
//! a logging channel is configured, reported there with the command and author.

use crate::{
    bot::{BotData, embeds},
    errors::Error,
};
use poise::serenity_prelude as serenity;
use tracing::error;

/// Handles every error the poise framework surfaces.
pub async fn on_error(error: poise::FrameworkError<'_, BotData, Error>) {
    match error {
        poise::FrameworkError::Setup { error, .. } => {
            error!("Failed to start bot: {:?}", error);
        }
        poise::FrameworkError::Command { error, ctx, .. } => {
            if error.is_user_facing() {
                let reply = poise::CreateReply::default()
                    .embed(embeds::error_embed("Whoops!", error.to_string()))
                    .ephemeral(true);
                if let Err(e) = ctx.send(reply).await {
                    error!("Failed to send error message: {}", e);
                }
                return;
            }

            error!("Error in command `{}`: {:?}", ctx.command().qualified_name, error);
            let reply = poise::CreateReply::default().embed(embeds::error_embed(
                "Sorry :(",
                "An unexpected error has occurred. The developers have been notified of this.",
            ));
            if let Err(e) = ctx.send(reply).await {
                error!("Failed to send error message: {}", e);
            }

            if let Some(channel_id) = ctx.data().config.logging_channel_id {
                report_error(ctx, channel_id, &error).await;
            }
        }
        error => {
            if let Err(e) = poise::builtins::on_error(error).await {
                error!("Error while handling error: {}", e);
            }
        }
    }
}

async fn report_error(
    ctx: poise::Context<'_, BotData, Error>,
    channel_id: u64,
    error: &Error,
) {
    let author = ctx.author();
    let description = format!(
        "```\nError caused by-\nAuthor Name: {}\nAuthor ID: {}\n\nCause-\n{:?}```",
        author.name, author.id, error
    );
    let message = serenity::CreateMessage::new().embed(embeds::error_embed(
        format!("Error in command: {}", ctx.command().qualified_name),
        description,
    ));

    if let Err(e) = serenity::ChannelId::new(channel_id)
        .send_message(ctx.serenity_context(), message)
        .await
    {
        error!("Failed to report error to logging channel {}: {}", channel_id, e);
    }
}
