//! Core game and account logic.
//!
//! Nothing in here talks to Discord. The roulette and mine rules are plain state machines
//! that the command layer drives; accounts go straight to the database.

/// Player accounts and EXP
pub mod account;
/// The endless mine grid
pub mod mine;
/// Flavour text for roulette shots
pub mod narration;
/// Per-server roulette sessions
pub mod registry;
/// Twisted Roulette rules
pub mod roulette;
