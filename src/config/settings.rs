//! Bot settings loading from config.toml
//!
//! Every field has a default, so an empty or missing file yields a working bot. Secrets
//! (the bot token, the database URL) come from the environment instead.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::{path::Path, time::Duration};
use tracing::warn;

/// Environment variable naming an alternative config file.
pub const CONFIG_PATH_VAR: &str = "NIVARA_CONFIG";
/// Config file used when [`CONFIG_PATH_VAR`] is not set.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BotConfig {
    /// Twisted Roulette settings
    pub roulette: RouletteConfig,
    /// Mine settings
    pub mine: MineConfig,
    /// Presence rotation settings
    pub status: StatusConfig,
    /// Channel that receives reports of unexpected errors
    pub logging_channel_id: Option<u64>,
    /// Register commands in this guild only (instant updates during development)
    pub dev_guild_id: Option<u64>,
}

/// Twisted Roulette settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RouletteConfig {
    /// Seconds a lobby stays open before it starts or is cancelled
    pub countdown_secs: u64,
    /// Lobby capacity, clamped into 2..=8
    pub max_players: usize,
    /// EXP credited to the winner's account
    pub win_exp: u32,
}

impl Default for RouletteConfig {
    fn default() -> Self {
        Self {
            countdown_secs: 60,
            max_players: 8,
            win_exp: 50,
        }
    }
}

impl RouletteConfig {
    /// Lobby countdown as a [`Duration`].
    #[must_use]
    pub const fn countdown(&self) -> Duration {
        Duration::from_secs(self.countdown_secs)
    }
}

/// Mine settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct MineConfig {
    /// Seconds without a button press before the game closes
    pub timeout_secs: u64,
    /// EXP per point of ore value mined
    pub exp_per_ore: u32,
}

impl Default for MineConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 300,
            exp_per_ore: 1,
        }
    }
}

impl MineConfig {
    /// Inactivity timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Presence rotation settings
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct StatusConfig {
    /// Seconds between presence updates
    pub interval_secs: u64,
}

impl Default for StatusConfig {
    fn default() -> Self {
        Self { interval_secs: 30 }
    }
}

impl StatusConfig {
    /// Rotation interval as a [`Duration`].
    #[must_use]
    pub const fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }
}

/// Loads bot settings from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<BotConfig> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.as_ref().display()),
    })?;

    parse_config(&contents)
}

/// Parses bot settings from TOML text.
pub fn parse_config(contents: &str) -> Result<BotConfig> {
    toml::from_str(contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads settings from `$NIVARA_CONFIG` or `./config.toml`.
///
/// A missing file falls back to defaults; a file that exists but does not parse is an error.
pub fn load_default_config() -> Result<BotConfig> {
    let path = std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        warn!("Config file {} not found, using defaults", path);
        return Ok(BotConfig::default());
    }
    load_config(path)
}
