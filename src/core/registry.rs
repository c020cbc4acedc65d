//! Per-server Twisted Roulette session registry.
//!
//! Sessions live in a concurrent map keyed by guild ID. Every slot owns its own async mutex,
//! so a join/leave/start/fire is a single critical section for that guild while other guilds
//! proceed in parallel. Sessions that reach a terminal phase are removed inside the same
//! critical section that ended them.
//!
//! Each slot carries a generation number. The lobby countdown remembers the generation it was
//! scheduled for and does nothing if that session is gone or has been replaced.

use crate::core::roulette::{GameError, Phase, PlayerId, RouletteSession, Shot};
use dashmap::{DashMap, mapref::entry::Entry};
use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument};

/// Discord guild ID scoping a session.
pub type GuildKey = u64;

#[derive(Debug)]
struct SessionSlot {
    generation: u64,
    session: Mutex<RouletteSession>,
}

/// What the lobby countdown did when it fired.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoStart {
    /// Enough players joined; the game is running
    Started {
        /// Player holding the first turn
        first: PlayerId,
        /// Roster in turn order
        players: Vec<PlayerId>,
    },
    /// Too few players joined; the session was destroyed
    Cancelled {
        /// Players who were waiting in the lobby
        players: Vec<PlayerId>,
    },
    /// The session was already started, finished or replaced
    Skipped,
}

/// Outcome of a lobby departure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Departure {
    /// Players still in the lobby
    pub remaining: usize,
    /// Whether the lobby was closed because it emptied
    pub closed: bool,
}

/// Registry of active sessions, one per guild.
#[derive(Debug, Default)]
pub struct RouletteRegistry {
    sessions: DashMap<GuildKey, Arc<SessionSlot>>,
    next_generation: AtomicU64,
}

impl RouletteRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of guilds with a live session.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    /// Whether the guild has a live session.
    #[must_use]
    pub fn is_active(&self, guild: GuildKey) -> bool {
        self.sessions.contains_key(&guild)
    }

    /// Registers a new lobby for the guild and returns its generation.
    ///
    /// Fails with [`GameError::GameInProgress`] if the guild already has a session.
    #[instrument(skip(self, session), fields(host = session.host()))]
    pub fn open(&self, guild: GuildKey, session: RouletteSession) -> Result<u64, GameError> {
        match self.sessions.entry(guild) {
            Entry::Occupied(_) => Err(GameError::GameInProgress),
            Entry::Vacant(vacant) => {
                let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
                vacant.insert(Arc::new(SessionSlot {
                    generation,
                    session: Mutex::new(session),
                }));
                info!(generation, "Opened Twisted Roulette lobby");
                Ok(generation)
            }
        }
    }

    /// Runs `action` with exclusive access to the guild's session.
    ///
    /// If the action leaves the session finished or cancelled, the session is removed before
    /// the lock is released.
    pub async fn with_session<T, F>(&self, guild: GuildKey, action: F) -> Result<T, GameError>
    where
        F: FnOnce(&mut RouletteSession) -> Result<T, GameError>,
    {
        let slot = self.slot(guild).ok_or(GameError::NoActiveGame)?;
        let mut session = slot.session.lock().await;
        if session.phase().is_terminal() {
            return Err(GameError::NoActiveGame);
        }

        let result = action(&mut session);

        if session.phase().is_terminal() {
            self.remove_generation(guild, slot.generation);
            debug!(guild, phase = ?session.phase(), "Removed finished session");
        }
        result
    }

    /// Adds a player to the guild's lobby.
    pub async fn join(&self, guild: GuildKey, player: PlayerId) -> Result<usize, GameError> {
        self.with_session(guild, |session| session.join(player)).await
    }

    /// Removes a player from the guild's lobby, closing it when it empties.
    pub async fn leave(&self, guild: GuildKey, player: PlayerId) -> Result<Departure, GameError> {
        self.with_session(guild, |session| {
            let remaining = session.leave(player)?;
            Ok(Departure {
                remaining,
                closed: session.phase() == Phase::Cancelled,
            })
        })
        .await
    }

    /// Starts the guild's game on behalf of a joined player and returns who goes first.
    pub async fn start(&self, guild: GuildKey, caller: PlayerId) -> Result<PlayerId, GameError> {
        self.with_session(guild, |session| {
            if !session.players().contains(&caller) {
                return Err(GameError::NotAJoinedPlayer);
            }
            session.start()
        })
        .await
    }

    /// `actor` fires at `target` in the guild's game.
    pub async fn fire(
        &self,
        guild: GuildKey,
        actor: PlayerId,
        target: PlayerId,
    ) -> Result<Shot, GameError> {
        self.with_session(guild, |session| session.fire(actor, target)).await
    }

    /// Copy of the guild's current session state.
    pub async fn snapshot(&self, guild: GuildKey) -> Result<RouletteSession, GameError> {
        self.with_session(guild, |session| Ok(session.clone())).await
    }

    /// Resolves the lobby countdown for the given session generation.
    ///
    /// Starts the game when enough players joined, otherwise destroys the session.
    #[instrument(skip(self))]
    pub async fn auto_start(&self, guild: GuildKey, generation: u64) -> AutoStart {
        let Some(slot) = self.slot(guild) else {
            return AutoStart::Skipped;
        };
        if slot.generation != generation {
            return AutoStart::Skipped;
        }

        let mut session = slot.session.lock().await;
        if session.phase() != Phase::Lobby {
            return AutoStart::Skipped;
        }

        let players = session.players().to_vec();
        if let Ok(first) = session.start() {
            info!(players = players.len(), "Lobby countdown started the game");
            AutoStart::Started { first, players }
        } else {
            session.cancel();
            self.remove_generation(guild, generation);
            info!(players = players.len(), "Lobby countdown cancelled the game");
            AutoStart::Cancelled { players }
        }
    }

    /// Waits out the lobby countdown and then resolves it.
    pub async fn auto_start_after(
        &self,
        guild: GuildKey,
        generation: u64,
        countdown: Duration,
    ) -> AutoStart {
        tokio::time::sleep(countdown).await;
        self.auto_start(guild, generation).await
    }

    fn slot(&self, guild: GuildKey) -> Option<Arc<SessionSlot>> {
        self.sessions
            .get(&guild)
            .map(|entry| Arc::clone(entry.value()))
    }

    fn remove_generation(&self, guild: GuildKey, generation: u64) {
        self.sessions
            .remove_if(&guild, |_, slot| slot.generation == generation);
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::roulette::{Chamber, MAX_PLAYERS};
    use rand::{SeedableRng, rngs::StdRng};

    const GUILD: GuildKey = 500;
    const OTHER_GUILD: GuildKey = 501;
    const A: PlayerId = 1;
    const B: PlayerId = 2;
    const C: PlayerId = 3;

    fn session(host: PlayerId, loaded: u8) -> RouletteSession {
        RouletteSession::with_rng(host, MAX_PLAYERS, StdRng::seed_from_u64(11))
            .with_chamber(Chamber::new(loaded))
    }

    async fn running(registry: &RouletteRegistry, players: &[PlayerId], loaded: u8) {
        registry.open(GUILD, session(players[0], loaded)).unwrap();
        for &p in &players[1..] {
            registry.join(GUILD, p).await.unwrap();
        }
        registry.start(GUILD, players[0]).await.unwrap();
    }

    #[tokio::test]
    async fn test_one_session_per_guild() {
        let registry = RouletteRegistry::new();
        registry.open(GUILD, session(A, 3)).unwrap();
        assert_eq!(
            registry.open(GUILD, session(B, 3)),
            Err(GameError::GameInProgress)
        );
        registry.open(OTHER_GUILD, session(B, 3)).unwrap();
        assert_eq!(registry.active_count(), 2);
    }

    #[tokio::test]
    async fn test_guilds_are_independent() {
        let registry = RouletteRegistry::new();
        registry.open(GUILD, session(A, 3)).unwrap();
        registry.open(OTHER_GUILD, session(C, 3)).unwrap();

        registry.join(GUILD, B).await.unwrap();
        assert_eq!(registry.join(OTHER_GUILD, B).await.unwrap(), 2);

        let first = registry.snapshot(GUILD).await.unwrap();
        let second = registry.snapshot(OTHER_GUILD).await.unwrap();
        assert_eq!(first.players(), &[A, B]);
        assert_eq!(second.players(), &[C, B]);
    }

    #[tokio::test]
    async fn test_missing_session_reports_no_active_game() {
        let registry = RouletteRegistry::new();
        assert_eq!(registry.join(GUILD, A).await, Err(GameError::NoActiveGame));
        assert_eq!(registry.fire(GUILD, A, B).await, Err(GameError::NoActiveGame));
    }

    #[tokio::test]
    async fn test_start_requires_joined_caller() {
        let registry = RouletteRegistry::new();
        registry.open(GUILD, session(A, 3)).unwrap();
        registry.join(GUILD, B).await.unwrap();
        assert_eq!(
            registry.start(GUILD, C).await,
            Err(GameError::NotAJoinedPlayer)
        );
        assert_eq!(registry.start(GUILD, B).await, Ok(A));
    }

    #[tokio::test]
    async fn test_last_leave_closes_lobby() {
        let registry = RouletteRegistry::new();
        registry.open(GUILD, session(A, 3)).unwrap();
        registry.join(GUILD, B).await.unwrap();

        let departure = registry.leave(GUILD, A).await.unwrap();
        assert_eq!(departure, Departure { remaining: 1, closed: false });
        let departure = registry.leave(GUILD, B).await.unwrap();
        assert_eq!(departure, Departure { remaining: 0, closed: true });
        assert!(!registry.is_active(GUILD));
    }

    #[tokio::test]
    async fn test_finished_game_is_removed() {
        let registry = RouletteRegistry::new();
        running(&registry, &[A, B], 2).await;

        let shot = registry.fire(GUILD, A, B).await.unwrap();
        assert_eq!(shot.winner, Some(A));
        assert!(!registry.is_active(GUILD));

        // A fresh game can be opened right away
        registry.open(GUILD, session(B, 3)).unwrap();
    }

    #[tokio::test]
    async fn test_failed_action_leaves_state_intact() {
        let registry = RouletteRegistry::new();
        running(&registry, &[A, B, C], 4).await;

        assert_eq!(registry.fire(GUILD, B, C).await, Err(GameError::NotYourTurn));
        assert_eq!(registry.join(GUILD, 9).await, Err(GameError::GameAlreadyStarted));

        let snapshot = registry.snapshot(GUILD).await.unwrap();
        assert_eq!(snapshot.players(), &[A, B, C]);
        assert_eq!(snapshot.current_player(), Some(A));
        assert_eq!(snapshot.chamber().position(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_double_fire_only_one_succeeds() {
        for _ in 0..50 {
            let registry = Arc::new(RouletteRegistry::new());
            running(&registry, &[A, B, C], 5).await;

            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let registry = Arc::clone(&registry);
                    tokio::spawn(async move { registry.fire(GUILD, A, B).await })
                })
                .collect();

            let mut results = Vec::new();
            for handle in handles {
                results.push(handle.await.unwrap());
            }

            assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
            assert!(results.contains(&Err(GameError::NotYourTurn)));

            let snapshot = registry.snapshot(GUILD).await.unwrap();
            assert_eq!(snapshot.chamber().position(), 2);
            assert_eq!(snapshot.current_player(), Some(B));
        }
    }

    #[tokio::test]
    async fn test_auto_start_with_enough_players() {
        let registry = RouletteRegistry::new();
        let generation = registry.open(GUILD, session(A, 3)).unwrap();
        registry.join(GUILD, B).await.unwrap();

        let outcome = registry.auto_start(GUILD, generation).await;
        assert_eq!(
            outcome,
            AutoStart::Started {
                first: A,
                players: vec![A, B]
            }
        );
        let snapshot = registry.snapshot(GUILD).await.unwrap();
        assert_eq!(snapshot.phase(), Phase::InProgress);
    }

    #[tokio::test]
    async fn test_auto_start_cancels_lonely_lobby() {
        let registry = RouletteRegistry::new();
        let generation = registry.open(GUILD, session(A, 3)).unwrap();

        let outcome = registry.auto_start(GUILD, generation).await;
        assert_eq!(outcome, AutoStart::Cancelled { players: vec![A] });
        assert!(!registry.is_active(GUILD));
    }

    #[tokio::test]
    async fn test_auto_start_skips_started_game() {
        let registry = RouletteRegistry::new();
        let generation = registry.open(GUILD, session(A, 3)).unwrap();
        registry.join(GUILD, B).await.unwrap();
        registry.start(GUILD, A).await.unwrap();

        assert_eq!(registry.auto_start(GUILD, generation).await, AutoStart::Skipped);
    }

    #[tokio::test]
    async fn test_stale_countdown_ignores_replacement_session() {
        let registry = RouletteRegistry::new();
        let old = registry.open(GUILD, session(A, 3)).unwrap();
        registry.leave(GUILD, A).await.unwrap();

        let new = registry.open(GUILD, session(B, 3)).unwrap();
        assert_ne!(old, new);

        assert_eq!(registry.auto_start(GUILD, old).await, AutoStart::Skipped);
        let snapshot = registry.snapshot(GUILD).await.unwrap();
        assert_eq!(snapshot.phase(), Phase::Lobby);
        assert_eq!(snapshot.players(), &[B]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_countdown_waits_for_window() {
        let registry = Arc::new(RouletteRegistry::new());
        let generation = registry.open(GUILD, session(A, 3)).unwrap();

        let countdown = {
            let registry = Arc::clone(&registry);
            tokio::spawn(async move {
                registry
                    .auto_start_after(GUILD, generation, Duration::from_secs(60))
                    .await
            })
        };

        tokio::time::sleep(Duration::from_secs(30)).await;
        registry.join(GUILD, B).await.unwrap();
        assert_eq!(
            registry.snapshot(GUILD).await.unwrap().phase(),
            Phase::Lobby
        );

        let outcome = countdown.await.unwrap();
        assert!(matches!(outcome, AutoStart::Started { first: A, .. }));
    }
}
