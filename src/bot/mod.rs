//! Bot layer - Discord-specific interface and command handlers
//!
//! This module provides the Discord interface for Nivara RPG, including all slash
//! commands, gateway event handlers, the framework error hook, and bot context management.

/// Discord client and poise framework setup
pub mod client;
/// Discord command implementations (games, accounts, status, general)
pub mod commands;
/// Embed builders shared by all commands
pub mod embeds;
/// Discord event and error handlers
pub mod handlers;
/// Runtime statistics shown by `/misc status`
pub mod stats;

use crate::{config::settings::BotConfig, core::registry::RouletteRegistry};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

pub use stats::BotStats;

/// Shared data available to all bot commands.
/// This structure holds the database connection, the loaded settings, the active
/// Twisted Roulette sessions, and runtime statistics.
pub struct BotData {
    /// Database connection for all database operations
    pub database: DatabaseConnection,
    /// Settings loaded from config.toml
    pub config: Arc<BotConfig>,
    /// Active Twisted Roulette sessions, one per guild
    pub roulette: Arc<RouletteRegistry>,
    /// Uptime and reconnect tracking
    pub stats: BotStats,
}

impl BotData {
    /// Creates a new `BotData` instance with an empty session registry.
    #[must_use]
    pub fn new(database: DatabaseConnection, config: Arc<BotConfig>) -> Self {
        Self {
            database,
            config,
            roulette: Arc::new(RouletteRegistry::new()),
            stats: BotStats::new(),
        }
    }
}

pub use commands::*;
pub use handlers::*;
