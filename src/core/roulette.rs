//! Twisted Roulette turn engine.
//!
//! A session holds the ordered roster of living players, the dead list, the turn pointer and a
//! six-chamber cylinder with exactly one loaded chamber. The cylinder rotates one step per shot
//! and the loaded chamber only moves after a hit, so a run of misses makes the next shot more
//! likely to be lethal. This module is pure state; locking and lifetime live in
//! [`crate::core::registry`].

use rand::{Rng, SeedableRng, rngs::StdRng};
use thiserror::Error;

/// Discord user ID of a participant.
pub type PlayerId = u64;

/// Number of chambers in the cylinder.
pub const CHAMBERS: u8 = 6;
/// Fewest players a game can start with.
pub const MIN_PLAYERS: usize = 2;
/// Largest roster a lobby accepts.
pub const MAX_PLAYERS: usize = 8;

/// Expected, recoverable rule violations. The session is unchanged after any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GameError {
    /// The player is already in the roster
    #[error("You have already joined this game.")]
    AlreadyJoined,
    /// Join, leave or start was attempted after the game began
    #[error("The game has already started.")]
    GameAlreadyStarted,
    /// The lobby is at capacity
    #[error("The game is full.")]
    RosterFull,
    /// The caller is not in the roster
    #[error("You haven't joined this game.")]
    NotAJoinedPlayer,
    /// Someone other than the current player tried to fire
    #[error("It's not your turn.")]
    NotYourTurn,
    /// The target never joined this game
    #[error("That user isn't part of this game.")]
    NotAParticipant,
    /// The target has already been eliminated
    #[error("That player is already dead.")]
    TargetAlreadyDead,
    /// Fewer than two players were in the lobby at start
    #[error("At least 2 players are needed to start the game.")]
    InsufficientPlayers,
    /// A shot was attempted while the lobby was still open
    #[error("The game hasn't started yet.")]
    GameNotStarted,
    /// No session exists for this server
    #[error("There is no Twisted Roulette game running in this server.")]
    NoActiveGame,
    /// A second session was opened in a server that already has one
    #[error("A Twisted Roulette game is already running in this server.")]
    GameInProgress,
}

/// Lifecycle of a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Join and leave are allowed
    Lobby,
    /// Turn loop is running
    InProgress,
    /// One player is left standing
    Finished {
        /// The surviving player
        winner: PlayerId,
    },
    /// The lobby closed without a game
    Cancelled,
}

impl Phase {
    /// Finished and cancelled sessions accept no further actions.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Finished { .. } | Self::Cancelled)
    }
}

/// Rotating six-chamber cylinder with a single loaded chamber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chamber {
    position: u8,
    loaded: u8,
}

impl Chamber {
    /// Creates a cylinder resting at chamber 1 with the given chamber loaded.
    ///
    /// Out-of-range values are clamped into `1..=6`.
    #[must_use]
    pub fn new(loaded: u8) -> Self {
        Self {
            position: 1,
            loaded: loaded.clamp(1, CHAMBERS),
        }
    }

    /// Creates a cylinder with a uniformly drawn loaded chamber.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::new(rng.random_range(1..=CHAMBERS))
    }

    /// Current rotation position in `1..=6`.
    #[must_use]
    pub const fn position(&self) -> u8 {
        self.position
    }

    /// Loaded chamber in `1..=6`.
    #[must_use]
    pub const fn loaded(&self) -> u8 {
        self.loaded
    }

    /// Rotates one step (6 wraps to 1) and reports whether the new position is loaded.
    pub const fn advance(&mut self) -> bool {
        self.position = self.position % CHAMBERS + 1;
        self.position == self.loaded
    }

    /// Draws a fresh loaded chamber. The rotation position is kept.
    pub fn reload<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.loaded = rng.random_range(1..=CHAMBERS);
    }
}

/// Result of a single trigger pull.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shot {
    /// Player who pulled the trigger
    pub actor: PlayerId,
    /// Player the gun was pointed at
    pub target: PlayerId,
    /// Chamber position the shot landed on
    pub chamber: u8,
    /// Whether the chamber was loaded
    pub hit: bool,
    /// Set when this shot ended the game
    pub winner: Option<PlayerId>,
    /// Player who acts next, `None` once the game is over
    pub next_turn: Option<PlayerId>,
}

impl Shot {
    /// Whether the actor aimed at themself.
    #[must_use]
    pub const fn is_self_target(&self) -> bool {
        self.actor == self.target
    }

    /// Surviving a shot at yourself keeps the turn.
    #[must_use]
    pub const fn grants_extra_shot(&self) -> bool {
        !self.hit && self.is_self_target()
    }
}

/// State of one Twisted Roulette game.
#[derive(Debug, Clone)]
pub struct RouletteSession {
    host: PlayerId,
    players: Vec<PlayerId>,
    dead: Vec<PlayerId>,
    turn: usize,
    chamber: Chamber,
    phase: Phase,
    max_players: usize,
    rng: StdRng,
}

impl RouletteSession {
    /// Opens a lobby with `host` as its first player.
    #[must_use]
    pub fn new(host: PlayerId, max_players: usize) -> Self {
        Self::with_rng(host, max_players, StdRng::from_os_rng())
    }

    /// Opens a lobby drawing all chamber positions from `rng`.
    ///
    /// `max_players` is clamped into `2..=8`.
    #[must_use]
    pub fn with_rng(host: PlayerId, max_players: usize, mut rng: StdRng) -> Self {
        let chamber = Chamber::random(&mut rng);
        Self {
            host,
            players: vec![host],
            dead: Vec::new(),
            turn: 0,
            chamber,
            phase: Phase::Lobby,
            max_players: max_players.clamp(MIN_PLAYERS, MAX_PLAYERS),
            rng,
        }
    }

    /// Replaces the cylinder, e.g. to fix the loaded chamber.
    #[must_use]
    pub fn with_chamber(mut self, chamber: Chamber) -> Self {
        self.chamber = chamber;
        self
    }

    /// Player who opened the lobby.
    #[must_use]
    pub const fn host(&self) -> PlayerId {
        self.host
    }

    /// Living players in join order.
    #[must_use]
    pub fn players(&self) -> &[PlayerId] {
        &self.players
    }

    /// Eliminated players in order of death.
    #[must_use]
    pub fn dead(&self) -> &[PlayerId] {
        &self.dead
    }

    /// Index into [`Self::players`] of the player whose turn it is.
    #[must_use]
    pub const fn current_turn_index(&self) -> usize {
        self.turn
    }

    /// Player whose turn it is, only while the game is running.
    #[must_use]
    pub fn current_player(&self) -> Option<PlayerId> {
        match self.phase {
            Phase::InProgress => self.players.get(self.turn).copied(),
            _ => None,
        }
    }

    /// The cylinder.
    #[must_use]
    pub const fn chamber(&self) -> Chamber {
        self.chamber
    }

    /// Current lifecycle phase.
    #[must_use]
    pub const fn phase(&self) -> Phase {
        self.phase
    }

    /// Lobby capacity.
    #[must_use]
    pub const fn max_players(&self) -> usize {
        self.max_players
    }

    /// Whether the player joined at any point, dead or alive.
    #[must_use]
    pub fn is_participant(&self, player: PlayerId) -> bool {
        self.players.contains(&player) || self.dead.contains(&player)
    }

    /// Adds a player to the lobby and returns the new roster size.
    pub fn join(&mut self, player: PlayerId) -> Result<usize, GameError> {
        if self.is_participant(player) {
            return Err(GameError::AlreadyJoined);
        }
        if self.phase != Phase::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        if self.players.len() >= self.max_players {
            return Err(GameError::RosterFull);
        }
        self.players.push(player);
        Ok(self.players.len())
    }

    /// Removes a player from the lobby. The lobby is cancelled once nobody is left.
    pub fn leave(&mut self, player: PlayerId) -> Result<usize, GameError> {
        let Some(index) = self.players.iter().position(|&p| p == player) else {
            return Err(GameError::NotAJoinedPlayer);
        };
        if self.phase != Phase::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        self.players.remove(index);
        if self.players.is_empty() {
            self.phase = Phase::Cancelled;
        }
        Ok(self.players.len())
    }

    /// Closes the lobby and hands the first turn to the first player who joined.
    pub fn start(&mut self) -> Result<PlayerId, GameError> {
        if self.phase != Phase::Lobby {
            return Err(GameError::GameAlreadyStarted);
        }
        let Some(&first) = self.players.first() else {
            return Err(GameError::InsufficientPlayers);
        };
        if self.players.len() < MIN_PLAYERS {
            return Err(GameError::InsufficientPlayers);
        }
        self.phase = Phase::InProgress;
        self.turn = 0;
        Ok(first)
    }

    /// Marks the session as cancelled.
    pub const fn cancel(&mut self) {
        self.phase = Phase::Cancelled;
    }

    /// `actor` pulls the trigger at `target`.
    ///
    /// On a hit the target is eliminated, the cylinder is reloaded and the turn pointer is
    /// clamped back into the shrunk roster. On a miss the turn passes to the next player,
    /// unless the actor aimed at themself.
    pub fn fire(&mut self, actor: PlayerId, target: PlayerId) -> Result<Shot, GameError> {
        match self.phase {
            Phase::Lobby => return Err(GameError::GameNotStarted),
            Phase::Finished { .. } | Phase::Cancelled => return Err(GameError::NoActiveGame),
            Phase::InProgress => {}
        }
        if self.current_player() != Some(actor) {
            return Err(GameError::NotYourTurn);
        }
        if self.dead.contains(&target) {
            return Err(GameError::TargetAlreadyDead);
        }
        if !self.players.contains(&target) {
            return Err(GameError::NotAParticipant);
        }

        let hit = self.chamber.advance();
        if hit {
            self.eliminate(target);
            self.chamber.reload(&mut self.rng);
            if let [winner] = self.players.as_slice() {
                self.phase = Phase::Finished { winner: *winner };
            }
        } else if actor != target {
            self.turn = (self.turn + 1) % self.players.len();
        }

        let winner = match self.phase {
            Phase::Finished { winner } => Some(winner),
            _ => None,
        };

        Ok(Shot {
            actor,
            target,
            chamber: self.chamber.position(),
            hit,
            winner,
            next_turn: self.current_player(),
        })
    }

    fn eliminate(&mut self, target: PlayerId) {
        if let Some(index) = self.players.iter().position(|&p| p == target) {
            self.players.remove(index);
            self.dead.push(target);
        }
        if self.turn >= self.players.len() {
            self.turn = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    const A: PlayerId = 1;
    const B: PlayerId = 2;
    const C: PlayerId = 3;

    fn seeded(seed: u64) -> StdRng {
        StdRng::seed_from_u64(seed)
    }

    fn lobby(players: &[PlayerId]) -> RouletteSession {
        let mut session = RouletteSession::with_rng(players[0], MAX_PLAYERS, seeded(7));
        for &p in &players[1..] {
            session.join(p).unwrap();
        }
        session
    }

    fn started(players: &[PlayerId], loaded: u8) -> RouletteSession {
        let mut session = lobby(players).with_chamber(Chamber::new(loaded));
        session.start().unwrap();
        session
    }

    #[test]
    fn test_join_preserves_order_until_full() {
        let mut session = RouletteSession::with_rng(100, MAX_PLAYERS, seeded(1));
        for (i, p) in (101..108).enumerate() {
            assert_eq!(session.join(p).unwrap(), i + 2);
        }
        assert_eq!(session.players(), &(100..108).collect::<Vec<_>>()[..]);
        assert_eq!(session.join(200), Err(GameError::RosterFull));
        assert_eq!(session.players().len(), MAX_PLAYERS);
    }

    #[test]
    fn test_duplicate_join_rejected() {
        let mut session = lobby(&[A, B]);
        assert_eq!(session.join(B), Err(GameError::AlreadyJoined));
        assert_eq!(session.join(A), Err(GameError::AlreadyJoined));
        assert_eq!(session.players(), &[A, B]);
    }

    #[test]
    fn test_join_and_leave_rejected_after_start() {
        let mut session = started(&[A, B], 4);
        assert_eq!(session.join(C), Err(GameError::GameAlreadyStarted));
        assert_eq!(session.leave(A), Err(GameError::GameAlreadyStarted));
        assert_eq!(session.leave(C), Err(GameError::NotAJoinedPlayer));
        assert_eq!(session.players(), &[A, B]);
    }

    #[test]
    fn test_leave_last_player_cancels() {
        let mut session = lobby(&[A, B]);
        assert_eq!(session.leave(A).unwrap(), 1);
        assert_eq!(session.players(), &[B]);
        assert_eq!(session.phase(), Phase::Lobby);
        assert_eq!(session.leave(B).unwrap(), 0);
        assert_eq!(session.phase(), Phase::Cancelled);
    }

    #[test]
    fn test_start_requires_two_players() {
        let mut session = lobby(&[A]);
        assert_eq!(session.start(), Err(GameError::InsufficientPlayers));
        assert_eq!(session.phase(), Phase::Lobby);
        session.join(B).unwrap();
        assert_eq!(session.start(), Ok(A));
        assert_eq!(session.current_turn_index(), 0);
        assert_eq!(session.start(), Err(GameError::GameAlreadyStarted));
    }

    #[test]
    fn test_fire_before_start_rejected() {
        let mut session = lobby(&[A, B]);
        assert_eq!(session.fire(A, B), Err(GameError::GameNotStarted));
    }

    #[test]
    fn test_fire_out_of_turn_does_not_mutate() {
        let mut session = started(&[A, B, C], 3);
        let before_chamber = session.chamber();
        assert_eq!(session.fire(B, C), Err(GameError::NotYourTurn));
        assert_eq!(session.fire(99, C), Err(GameError::NotYourTurn));
        assert_eq!(session.chamber(), before_chamber);
        assert_eq!(session.current_turn_index(), 0);
        assert_eq!(session.players(), &[A, B, C]);
    }

    #[test]
    fn test_fire_at_stranger_rejected() {
        let mut session = started(&[A, B], 3);
        assert_eq!(session.fire(A, 42), Err(GameError::NotAParticipant));
        assert_eq!(session.chamber().position(), 1);
    }

    #[test]
    fn test_three_player_scenario() {
        let mut session = started(&[A, B, C], 3);
        assert_eq!(session.current_player(), Some(A));
        assert_eq!(session.chamber().position(), 1);

        let shot = session.fire(A, B).unwrap();
        assert!(!shot.hit);
        assert_eq!(shot.chamber, 2);
        assert_eq!(session.current_turn_index(), 1);
        assert_eq!(shot.next_turn, Some(B));

        let shot = session.fire(B, C).unwrap();
        assert!(shot.hit);
        assert_eq!(shot.chamber, 3);
        assert_eq!(session.players(), &[A, B]);
        assert_eq!(session.dead(), &[C]);
        assert!((1..=CHAMBERS).contains(&session.chamber().loaded()));
        assert!(session.current_turn_index() <= 1);
        assert_eq!(shot.winner, None);

        let current = session.current_player().unwrap();
        assert_eq!(session.fire(current, C), Err(GameError::TargetAlreadyDead));
    }

    #[test]
    fn test_miss_advances_turn_with_wraparound() {
        let mut session = started(&[A, B, C], 1);
        session.fire(A, B).unwrap();
        session.fire(B, C).unwrap();
        assert_eq!(session.current_player(), Some(C));
        session.fire(C, A).unwrap();
        assert_eq!(session.current_turn_index(), 0);
        assert_eq!(session.players(), &[A, B, C]);
    }

    #[test]
    fn test_self_target_miss_keeps_turn() {
        let mut session = started(&[A, B], 5);
        let shot = session.fire(A, A).unwrap();
        assert!(shot.grants_extra_shot());
        assert_eq!(session.current_player(), Some(A));
        let shot = session.fire(A, A).unwrap();
        assert!(shot.grants_extra_shot());
        assert_eq!(session.current_turn_index(), 0);
    }

    #[test]
    fn test_self_target_hit_removes_firer() {
        let mut session = started(&[A, B, C], 2);
        let shot = session.fire(A, A).unwrap();
        assert!(shot.hit);
        assert!(!shot.grants_extra_shot());
        assert_eq!(session.players(), &[B, C]);
        assert_eq!(session.dead(), &[A]);
        assert_eq!(session.current_player(), Some(B));
    }

    #[test]
    fn test_hit_on_last_index_wraps_turn() {
        let mut session = started(&[A, B, C], 3);
        session.fire(A, B).unwrap();
        // Chamber 3 is loaded, so B shoots themself
        assert!(session.fire(B, B).unwrap().hit);
        assert_eq!(session.players(), &[A, C]);
        assert_eq!(session.current_player(), Some(C));
    }

    #[test]
    fn test_last_survivor_wins() {
        let mut session = started(&[A, B], 2);
        let shot = session.fire(A, B).unwrap();
        assert!(shot.hit);
        assert_eq!(shot.winner, Some(A));
        assert_eq!(shot.next_turn, None);
        assert_eq!(session.phase(), Phase::Finished { winner: A });
        assert_eq!(session.fire(A, A), Err(GameError::NoActiveGame));
    }

    #[test]
    fn test_chamber_wraps_six_to_one() {
        let mut chamber = Chamber::new(1);
        let hits: Vec<bool> = (0..6).map(|_| chamber.advance()).collect();
        assert_eq!(chamber.position(), 1);
        assert_eq!(hits, vec![false, false, false, false, false, true]);
    }

    #[test]
    fn test_shots_until_hit_determined_by_loaded_chamber() {
        for loaded in 1..=CHAMBERS {
            let mut chamber = Chamber::new(loaded);
            let shots = (1..=CHAMBERS).find(|_| chamber.advance()).unwrap();
            let expected = if loaded == 1 { CHAMBERS } else { loaded - 1 };
            assert_eq!(shots, expected, "loaded chamber {loaded}");
        }
    }

    #[test]
    fn test_never_more_than_five_misses_in_a_row() {
        // An independent 1/6 trial would produce runs of six or more misses
        // within a few thousand shots; a sequential cylinder never does.
        let mut rng = seeded(99);
        let mut chamber = Chamber::random(&mut rng);
        let mut longest = 0;
        for _ in 0..2000 {
            let mut misses = 0;
            while !chamber.advance() {
                misses += 1;
            }
            longest = longest.max(misses);
            chamber.reload(&mut rng);
        }
        assert!(longest <= 5, "longest run of misses was {longest}");
        assert_eq!(longest, 5);
    }

    #[test]
    fn test_hit_probability_rises_after_misses() {
        // Given k misses since loading, the next shot hits with probability 1/(6-k).
        let mut rng = seeded(5);
        let mut attempts = [0u32; 6];
        let mut hits = [0u32; 6];
        for _ in 0..30_000 {
            let mut chamber = Chamber::random(&mut rng);
            for misses in 0..6 {
                attempts[misses] += 1;
                if chamber.advance() {
                    hits[misses] += 1;
                    break;
                }
            }
        }
        let rates: Vec<f64> = (0..6)
            .map(|k| f64::from(hits[k]) / f64::from(attempts[k]))
            .collect();
        assert!(rates[0] < 0.2);
        assert!(rates[4] > 0.4);
        assert!((rates[5] - 1.0).abs() < f64::EPSILON);
        assert!(rates.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_reload_draws_in_range() {
        let mut rng = seeded(3);
        let mut chamber = Chamber::new(4);
        for _ in 0..200 {
            chamber.reload(&mut rng);
            assert!((1..=CHAMBERS).contains(&chamber.loaded()));
        }
    }

    #[test]
    fn test_max_players_clamped() {
        let session = RouletteSession::with_rng(A, 20, seeded(1));
        assert_eq!(session.max_players(), MAX_PLAYERS);
        let session = RouletteSession::with_rng(A, 0, seeded(1));
        assert_eq!(session.max_players(), MIN_PLAYERS);
    }
}
