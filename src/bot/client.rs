//! Discord client and poise framework setup.

use crate::{
    bot::{BotData, commands, handlers},
    config::settings::BotConfig,
    errors::Result,
};
use poise::serenity_prelude as serenity;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::{error, info, instrument};

/// Every command the bot registers.
#[must_use]
pub fn all_commands() -> Vec<poise::Command<BotData, crate::errors::Error>> {
    vec![
        commands::ping(),
        commands::help(),
        commands::misc(),
        commands::account(),
        commands::games(),
    ]
}

/// Builds the framework, connects to the gateway and runs until the client stops.
#[instrument(skip(token, config, database))]
pub async fn run_bot(
    token: String,
    config: Arc<BotConfig>,
    database: DatabaseConnection,
) -> Result<()> {
    let framework = poise::Framework::builder()
        .options(poise::FrameworkOptions {
            commands: all_commands(),
            on_error: |error| Box::pin(handlers::errors::on_error(error)),
            event_handler: |ctx, event, framework, data| {
                Box::pin(handlers::events::event_handler(ctx, event, framework, data))
            },
            ..Default::default()
        })
        .setup(move |ctx, ready, framework| {
            Box::pin(async move {
                info!("Logged in as {}", ready.user.name);
                if let Some(guild_id) = config.dev_guild_id {
                    let guild_id = serenity::GuildId::new(guild_id);
                    poise::builtins::register_in_guild(ctx, &framework.options().commands, guild_id)
                        .await?;
                    info!("Registered commands in guild {}", guild_id);
                } else {
                    info!("Registering commands globally...");
                    poise::builtins::register_globally(ctx, &framework.options().commands).await?;
                }
                Ok(BotData::new(database, config))
            })
        })
        .build();

    let intents = serenity::GatewayIntents::GUILDS | serenity::GatewayIntents::GUILD_MEMBERS;

    info!("Setting up Serenity client for Poise framework...");
    let mut client = serenity::ClientBuilder::new(token, intents)
        .framework(framework)
        .await
        .inspect_err(|e| error!("Error creating client: {:?}", e))?;

    info!("Starting bot client...");
    client
        .start()
        .await
        .inspect_err(|e| error!("Client error: {:?}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_tree() {
        let commands = all_commands();
        let names: Vec<&str> = commands.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["ping", "help", "misc", "account", "games"]);

        let games = &commands[4].subcommands;
        let roulette_subs: Vec<&str> = games
            .iter()
            .filter(|c| c.name == "twisted-roulette")
            .flat_map(|c| c.subcommands.iter().map(|s| s.name.as_str()))
            .collect();
        assert_eq!(
            roulette_subs,
            vec!["open", "join", "leave", "start", "fire", "info"]
        );
        assert!(games.iter().any(|c| c.name == "mine"));
    }

    #[test]
    fn test_commands_are_slash_only() {
        for command in all_commands() {
            assert!(command.slash_action.is_some() || !command.subcommands.is_empty());
            assert!(command.prefix_action.is_none(), "{} has a prefix form", command.name);
        }
    }
}
