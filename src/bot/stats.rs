//! Runtime statistics for the status command and presence rotation.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Bot version reported by `/misc status`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Process start and gateway connection times.
#[derive(Debug)]
pub struct BotStats {
    started_at: DateTime<Utc>,
    last_connect: RwLock<DateTime<Utc>>,
    presence_running: AtomicBool,
}

impl BotStats {
    /// Starts the clock.
    #[must_use]
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            last_connect: RwLock::new(now),
            presence_running: AtomicBool::new(false),
        }
    }

    /// When the process started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// When the gateway last connected or resumed.
    pub async fn last_connect(&self) -> DateTime<Utc> {
        *self.last_connect.read().await
    }

    /// Records a gateway (re)connection.
    pub async fn mark_connected(&self, at: DateTime<Utc>) {
        *self.last_connect.write().await = at;
    }

    /// Returns `true` exactly once, for whoever should start the presence loop.
    pub fn claim_presence_loop(&self) -> bool {
        !self.presence_running.swap(true, Ordering::SeqCst)
    }
}

impl Default for BotStats {
    fn default() -> Self {
        Self::new()
    }
}
