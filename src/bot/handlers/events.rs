//! Gateway event handler.

use crate::{
    bot::{BotData, handlers::presence},
    errors::Error,
};
use poise::serenity_prelude as serenity;
use tracing::{info, warn};

/// Tracks (re)connections and starts the presence loop on the first `Ready`.
pub async fn event_handler(
    ctx: &serenity::Context,
    event: &serenity::FullEvent,
    _framework: poise::FrameworkContext<'_, BotData, Error>,
    data: &BotData,
) -> Result<(), Error> {
    match event {
        serenity::FullEvent::Ready { data_about_bot } => {
            info!(
                "{} is connected to {} guilds",
                data_about_bot.user.name,
                data_about_bot.guilds.len()
            );
            data.stats.mark_connected(chrono::Utc::now()).await;

            if data.stats.claim_presence_loop() {
                let interval = data.config.status.interval();
                tokio::spawn(presence::rotate_presence(ctx.clone(), interval));
            }
        }
        serenity::FullEvent::Resume { .. } => {
            warn!("Gateway session resumed");
            data.stats.mark_connected(chrono::Utc::now()).await;
        }
        _ => {}
    }
    Ok(())
}
