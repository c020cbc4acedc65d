//! Unified error types for Nivara RPG.
//!
//! Game engines report their own recoverable [`GameError`] values; everything that can go
//! wrong around them (configuration, database, Discord) is folded into [`Error`].

use crate::core::roulette::GameError;
use thiserror::Error;

/// Crate-wide error type.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description of the problem
        message: String,
    },

    /// Any `SeaORM` failure
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// Missing or malformed environment variable
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// A game rule rejected the action; shown to the user as-is
    #[error("{0}")]
    Game(#[from] GameError),

    /// No account exists for the given Discord user
    #[error("No account found for user {user_id}. Use `/account create` first.")]
    AccountNotFound {
        /// Discord user ID that was looked up
        user_id: String,
    },

    /// An account already exists for the given Discord user
    #[error("You already have an account.")]
    AccountExists {
        /// Discord user ID that was inserted twice
        user_id: String,
    },

    /// Formatting into a `String` failed
    #[error("Formatting error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework failure
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// Whether the error is an expected, user-facing condition rather than a fault.
    #[must_use]
    pub const fn is_user_facing(&self) -> bool {
        matches!(
            self,
            Self::Game(_) | Self::AccountNotFound { .. } | Self::AccountExists { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_game_errors_are_user_facing() {
        let err: Error = GameError::NotYourTurn.into();
        assert!(err.is_user_facing());
        assert_eq!(err.to_string(), GameError::NotYourTurn.to_string());
    }

    #[test]
    fn test_config_error_is_not_user_facing() {
        let err = Error::Config {
            message: "bad".to_string(),
        };
        assert!(!err.is_user_facing());
    }
}
