use std::fmt;
use std::ops::{Add, Sub};

/// Unique identifier for a unit tracked in the roster.
///
/// The core never owns unit lifetime; a `UnitId` is a non-owning handle
/// resolved against [`UnitsState`](crate::state::UnitsState) on every use,
/// so a unit removed mid-action surfaces as a lookup miss rather than a
/// dangling reference.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct UnitId(pub u16);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Discrete tile coordinate in the 3D battle grid.
///
/// `z` counts map levels upward from ground level 0.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    pub x: i32,
    pub y: i32,
    pub z: i32,
}

impl Position {
    pub const ORIGIN: Self = Self { x: 0, y: 0, z: 0 };

    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// Chebyshev distance on the lateral plane, ignoring level changes.
    /// One octile step covers one unit of this metric, which makes it the
    /// natural admissible estimate for routes on a single level.
    pub fn lateral_distance(self, other: Self) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }

    /// Level difference in tiles, always non-negative.
    pub fn level_distance(self, other: Self) -> i32 {
        (self.z - other.z).abs()
    }
}

impl Default for Position {
    fn default() -> Self {
        Self::ORIGIN
    }
}

impl Add for Position {
    type Output = Position;
    fn add(self, rhs: Position) -> Position {
        Position::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Position {
    type Output = Position;
    fn sub(self, rhs: Position) -> Position {
        Position::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.x, self.y, self.z)
    }
}

/// One movement step on the octile grid: eight lateral compass directions
/// plus the two vertical transitions.
///
/// Lateral directions double as unit facings; `Up`/`Down` never do.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, strum::Display, strum::EnumIter,
)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Direction {
    North,
    NorthEast,
    East,
    SouthEast,
    South,
    SouthWest,
    West,
    NorthWest,
    Up,
    Down,
}

impl Direction {
    /// The eight lateral directions, clockwise from north. This order is
    /// part of the engine's determinism contract: neighbor expansion and
    /// facing rotation both walk it in sequence.
    pub const LATERAL: [Direction; 8] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// All ten step directions in expansion order: lateral ring first,
    /// then up, then down.
    pub const ALL: [Direction; 10] = [
        Direction::North,
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::South,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
        Direction::Up,
        Direction::Down,
    ];

    /// Tile offset covered by one step in this direction.
    pub const fn delta(self) -> Position {
        match self {
            Direction::North => Position::new(0, 1, 0),
            Direction::NorthEast => Position::new(1, 1, 0),
            Direction::East => Position::new(1, 0, 0),
            Direction::SouthEast => Position::new(1, -1, 0),
            Direction::South => Position::new(0, -1, 0),
            Direction::SouthWest => Position::new(-1, -1, 0),
            Direction::West => Position::new(-1, 0, 0),
            Direction::NorthWest => Position::new(-1, 1, 0),
            Direction::Up => Position::new(0, 0, 1),
            Direction::Down => Position::new(0, 0, -1),
        }
    }

    pub const fn is_diagonal(self) -> bool {
        matches!(
            self,
            Direction::NorthEast
                | Direction::SouthEast
                | Direction::SouthWest
                | Direction::NorthWest
        )
    }

    pub const fn is_vertical(self) -> bool {
        matches!(self, Direction::Up | Direction::Down)
    }

    pub const fn reverse(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::South => Direction::North,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
        }
    }

    /// The two orthogonal components flanking a diagonal step, or `None`
    /// for orthogonal and vertical directions. Used by the corner-cutting
    /// rule in the cost model.
    pub const fn flanks(self) -> Option<(Direction, Direction)> {
        match self {
            Direction::NorthEast => Some((Direction::North, Direction::East)),
            Direction::SouthEast => Some((Direction::South, Direction::East)),
            Direction::SouthWest => Some((Direction::South, Direction::West)),
            Direction::NorthWest => Some((Direction::North, Direction::West)),
            _ => None,
        }
    }

    /// Index into the clockwise lateral ring. Only valid for lateral
    /// directions.
    pub(crate) fn lateral_index(self) -> Option<usize> {
        Self::LATERAL.iter().position(|&d| d == self)
    }

    /// Rotates one 45° facing step toward `target`, taking the shorter way
    /// around the ring; clockwise wins a tie. Returns `self` when already
    /// facing the target. Both directions must be lateral.
    pub fn rotate_toward(self, target: Direction) -> Direction {
        let (Some(from), Some(to)) = (self.lateral_index(), target.lateral_index()) else {
            return self;
        };
        if from == to {
            return self;
        }
        let clockwise = (to + 8 - from) % 8;
        let step = if clockwise <= 4 { 1 } else { 7 };
        Self::LATERAL[(from + step) % 8]
    }

    /// Lateral direction pointing from `from` toward `to`, by dominant
    /// axis. Returns `None` when the two positions share a column.
    pub fn toward(from: Position, to: Position) -> Option<Direction> {
        let dx = (to.x - from.x).signum();
        let dy = (to.y - from.y).signum();
        Self::LATERAL
            .iter()
            .copied()
            .find(|d| d.delta().x == dx && d.delta().y == dy && (dx, dy) != (0, 0))
    }
}
