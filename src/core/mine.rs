//! Mine exploration engine.
//!
//! The map is an unbounded sparse grid. Cells are drawn from a weighted ore table the first
//! time anything looks at them and remembered afterwards. The player moves one cell at a time;
//! whatever was in the destination cell is mined into the inventory and replaced by the
//! player tile, and the cell left behind becomes empty.

use rand::{Rng, SeedableRng, rngs::StdRng};
use std::{
    collections::{BTreeMap, HashMap},
    fmt,
};

/// Side length of the rendered window.
pub const VIEWPORT_SIZE: usize = 5;
#[allow(clippy::cast_possible_wrap)]
const HALF: i64 = (VIEWPORT_SIZE / 2) as i64;
/// Where new sessions place the player.
pub const START: Coord = Coord::new(10, 10);

/// Generation weights for the six ore kinds. They sum to [`TOTAL_WEIGHT`].
pub const ORE_WEIGHTS: [(Tile, u32); 6] = [
    (Tile::Stone, 50),
    (Tile::Coal, 20),
    (Tile::Iron, 12),
    (Tile::Gold, 8),
    (Tile::Emerald, 6),
    (Tile::Diamond, 4),
];
/// Sum of [`ORE_WEIGHTS`].
pub const TOTAL_WEIGHT: u32 = 100;

/// Contents of a grid cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Tile {
    /// Already mined out
    Empty,
    /// The player's position
    Player,
    /// Common filler
    Stone,
    /// Coal ore
    Coal,
    /// Iron ore
    Iron,
    /// Gold ore
    Gold,
    /// Emerald ore
    Emerald,
    /// Diamond ore
    Diamond,
}

impl Tile {
    /// Emoji used when rendering the map.
    #[must_use]
    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Empty => "⬛",
            Self::Player => "😃",
            Self::Stone => "🪨",
            Self::Coal => "⚫",
            Self::Iron => "⚪",
            Self::Gold => "🟨",
            Self::Emerald => "🟩",
            Self::Diamond => "💎",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Empty => "Empty",
            Self::Player => "Player",
            Self::Stone => "Stone",
            Self::Coal => "Coal",
            Self::Iron => "Iron",
            Self::Gold => "Gold",
            Self::Emerald => "Emerald",
            Self::Diamond => "Diamond",
        }
    }

    /// Whether the tile is one of the generated ore kinds.
    #[must_use]
    pub const fn is_ore(self) -> bool {
        !matches!(self, Self::Empty | Self::Player)
    }

    /// EXP multiplier for mining one of these.
    #[must_use]
    pub const fn value(self) -> u32 {
        match self {
            Self::Empty | Self::Player => 0,
            Self::Stone => 1,
            Self::Coal => 2,
            Self::Iron => 3,
            Self::Gold => 5,
            Self::Emerald => 8,
            Self::Diamond => 10,
        }
    }
}

/// Integer grid position. `y` grows upwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Coord {
    /// Column
    pub x: i64,
    /// Row
    pub y: i64,
}

impl Coord {
    /// Creates a coordinate.
    #[must_use]
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// Neighbouring cell in `direction`.
    #[must_use]
    pub const fn step(self, direction: Direction) -> Self {
        let (dx, dy) = direction.offset();
        Self::new(self.x + dx, self.y + dy)
    }
}

/// One of the four movement buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    /// `y + 1`
    Up,
    /// `y - 1`
    Down,
    /// `x - 1`
    Left,
    /// `x + 1`
    Right,
}

impl Direction {
    /// Button order.
    pub const ALL: [Self; 4] = [Self::Up, Self::Down, Self::Left, Self::Right];

    /// Unit step as `(dx, dy)`.
    #[must_use]
    pub const fn offset(self) -> (i64, i64) {
        match self {
            Self::Up => (0, 1),
            Self::Down => (0, -1),
            Self::Left => (-1, 0),
            Self::Right => (1, 0),
        }
    }

    /// Button emoji.
    #[must_use]
    pub const fn emoji(self) -> char {
        match self {
            Self::Up => '⬆',
            Self::Down => '⬇',
            Self::Left => '⬅',
            Self::Right => '➡',
        }
    }

    /// Stable identifier used in component custom IDs.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
            Self::Left => "left",
            Self::Right => "right",
        }
    }

    /// Inverse of [`Self::as_str`].
    #[must_use]
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|d| d.as_str() == value)
    }
}

/// Draws an ore kind from [`ORE_WEIGHTS`].
pub fn draw_tile<R: Rng + ?Sized>(rng: &mut R) -> Tile {
    let mut roll = rng.random_range(0..TOTAL_WEIGHT);
    for (tile, weight) in ORE_WEIGHTS {
        if roll < weight {
            return tile;
        }
        roll -= weight;
    }
    Tile::Stone
}

/// What a single move did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MoveReport {
    /// Cell the player left (now empty)
    pub from: Coord,
    /// Cell the player entered
    pub to: Coord,
    /// What occupied `to` before the player overwrote it
    pub mined: Tile,
}

/// Rendered 5x5 window, top row first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    rows: [[Tile; VIEWPORT_SIZE]; VIEWPORT_SIZE],
}

impl Viewport {
    /// Rows from `cursor.y + 2` down to `cursor.y - 2`, each left to right.
    #[must_use]
    pub const fn rows(&self) -> &[[Tile; VIEWPORT_SIZE]; VIEWPORT_SIZE] {
        &self.rows
    }

    /// Tile at the centre of the window.
    #[must_use]
    pub const fn center(&self) -> Tile {
        self.rows[VIEWPORT_SIZE / 2][VIEWPORT_SIZE / 2]
    }
}

impl fmt::Display for Viewport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for row in &self.rows {
            for tile in row {
                f.write_str(tile.emoji())?;
            }
            f.write_str("\n")?;
        }
        Ok(())
    }
}

/// One player's mine.
#[derive(Debug, Clone)]
pub struct MineSession<R = StdRng> {
    tiles: HashMap<Coord, Tile>,
    cursor: Coord,
    inventory: BTreeMap<Tile, u32>,
    moves: u32,
    rng: R,
}

impl MineSession<StdRng> {
    /// Creates a session at [`START`] seeded from the OS.
    #[must_use]
    pub fn new() -> Self {
        Self::with_rng(START, StdRng::from_os_rng())
    }
}

impl Default for MineSession<StdRng> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: Rng> MineSession<R> {
    /// Creates a session with the player at `start`.
    pub fn with_rng(start: Coord, rng: R) -> Self {
        let mut tiles = HashMap::new();
        tiles.insert(start, Tile::Player);
        Self {
            tiles,
            cursor: start,
            inventory: BTreeMap::new(),
            moves: 0,
            rng,
        }
    }

    /// Player position.
    #[must_use]
    pub const fn cursor(&self) -> Coord {
        self.cursor
    }

    /// Looks at a cell without generating it.
    #[must_use]
    pub fn peek(&self, coord: Coord) -> Option<Tile> {
        self.tiles.get(&coord).copied()
    }

    /// Number of cells generated so far.
    #[must_use]
    pub fn explored(&self) -> usize {
        self.tiles.len()
    }

    /// Mined ore counts.
    #[must_use]
    pub const fn inventory(&self) -> &BTreeMap<Tile, u32> {
        &self.inventory
    }

    /// Number of moves made.
    #[must_use]
    pub const fn moves(&self) -> u32 {
        self.moves
    }

    /// EXP earned from everything mined so far.
    #[must_use]
    pub fn exp_earned(&self, exp_per_ore: u32) -> u64 {
        self.inventory
            .iter()
            .map(|(tile, &count)| u64::from(tile.value()) * u64::from(count))
            .sum::<u64>()
            * u64::from(exp_per_ore)
    }

    /// Returns the tile at `coord`, drawing and remembering it on first access.
    pub fn generate_tile(&mut self, coord: Coord) -> Tile {
        *self
            .tiles
            .entry(coord)
            .or_insert_with(|| draw_tile(&mut self.rng))
    }

    /// Moves the player one cell, mining whatever was there.
    pub fn move_player(&mut self, direction: Direction) -> MoveReport {
        let from = self.cursor;
        let to = from.step(direction);
        let mined = self.generate_tile(to);

        self.tiles.insert(from, Tile::Empty);
        self.tiles.insert(to, Tile::Player);
        self.cursor = to;
        self.moves += 1;

        if mined.is_ore() {
            *self.inventory.entry(mined).or_insert(0) += 1;
        }

        MoveReport { from, to, mined }
    }

    /// Renders the 5x5 window around the player, generating unseen cells.
    pub fn render_viewport(&mut self) -> Viewport {
        let mut rows = [[Tile::Empty; VIEWPORT_SIZE]; VIEWPORT_SIZE];
        let Coord { x, y } = self.cursor;
        for (dy, row) in (-HALF..=HALF).rev().zip(rows.iter_mut()) {
            for (dx, cell) in (-HALF..=HALF).zip(row.iter_mut()) {
                *cell = self.generate_tile(Coord::new(x + dx, y + dy));
            }
        }
        Viewport { rows }
    }
}
