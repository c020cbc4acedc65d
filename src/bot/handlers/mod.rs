//! Discord interaction handlers
//!
//! This module provides handlers for gateway events, framework errors, and the rotating
//! presence status.

/// Framework error hook
pub mod errors;
/// Gateway event handler
pub mod events;
/// Rotating "Listening to ..." status
pub mod presence;
