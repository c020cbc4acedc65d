//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Account management commands
pub mod account;

/// Minigame commands (mine and the Twisted Roulette group)
pub mod games;

/// General utility commands
pub mod general;

/// Bot status commands
pub mod misc;

/// Twisted Roulette commands
pub mod roulette;

// Export commands
pub use account::*;
pub use games::*;
pub use general::*;
pub use misc::*;
