//! Direction and axis types for face and rotation handling.

use serde::{Deserialize, Serialize};

/// The six cardinal directions / face directions.
///
/// Declaration order is the order faces are visited when compiling an
/// element, so it is part of the output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "bottom")]
    Down,
    Up,
    North,
    South,
    West,
    East,
}

impl Direction {
    /// All six directions in order.
    pub const ALL: [Direction; 6] = [
        Direction::Down,
        Direction::Up,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
    ];

    /// Get the offset for this direction.
    pub fn offset(&self) -> (i32, i32, i32) {
        match self {
            Direction::Down => (0, -1, 0),
            Direction::Up => (0, 1, 0),
            Direction::North => (0, 0, -1),
            Direction::South => (0, 0, 1),
            Direction::West => (-1, 0, 0),
            Direction::East => (1, 0, 0),
        }
    }

    /// Get the opposite direction.
    pub fn opposite(&self) -> Direction {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::West => Direction::East,
            Direction::East => Direction::West,
        }
    }

    /// Get the axis this direction is on.
    pub fn axis(&self) -> Axis {
        match self {
            Direction::Down | Direction::Up => Axis::Y,
            Direction::North | Direction::South => Axis::Z,
            Direction::West | Direction::East => Axis::X,
        }
    }

    /// Parse from string (case-insensitive). `bottom` is accepted for `down`.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "down" | "bottom" => Some(Direction::Down),
            "up" => Some(Direction::Up),
            "north" => Some(Direction::North),
            "south" => Some(Direction::South),
            "west" => Some(Direction::West),
            "east" => Some(Direction::East),
            _ => None,
        }
    }

    /// Rotate this direction by X rotation (around X axis, in 90-degree increments).
    /// Looking from +X towards origin, positive rotation goes Up -> North -> Down -> South.
    pub fn rotate_x(self, degrees: i32) -> Direction {
        let steps = ((degrees / 90) % 4 + 4) % 4;
        let mut dir = self;
        for _ in 0..steps {
            dir = match dir {
                Direction::Up => Direction::North,
                Direction::North => Direction::Down,
                Direction::Down => Direction::South,
                Direction::South => Direction::Up,
                Direction::East => Direction::East,
                Direction::West => Direction::West,
            };
        }
        dir
    }

    /// Rotate this direction by Y rotation (around Y axis, in 90-degree increments).
    /// Looking from +Y (above), positive rotation goes North -> East -> South -> West.
    pub fn rotate_y(self, degrees: i32) -> Direction {
        let steps = ((degrees / 90) % 4 + 4) % 4;
        let mut dir = self;
        for _ in 0..steps {
            dir = match dir {
                Direction::North => Direction::East,
                Direction::East => Direction::South,
                Direction::South => Direction::West,
                Direction::West => Direction::North,
                Direction::Up => Direction::Up,
                Direction::Down => Direction::Down,
            };
        }
        dir
    }

    /// The cull bucket a face pointing this way falls into.
    pub fn to_cull(self) -> CullDirection {
        match self {
            Direction::Down => CullDirection::Down,
            Direction::Up => CullDirection::Up,
            Direction::North => CullDirection::North,
            Direction::South => CullDirection::South,
            Direction::West => CullDirection::West,
            Direction::East => CullDirection::East,
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Direction::Down => write!(f, "down"),
            Direction::Up => write!(f, "up"),
            Direction::North => write!(f, "north"),
            Direction::South => write!(f, "south"),
            Direction::West => write!(f, "west"),
            Direction::East => write!(f, "east"),
        }
    }
}

/// The three axes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    /// Parse from string (case-insensitive).
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "x" => Some(Axis::X),
            "y" => Some(Axis::Y),
            "z" => Some(Axis::Z),
            _ => None,
        }
    }
}

impl std::fmt::Display for Axis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Axis::X => write!(f, "x"),
            Axis::Y => write!(f, "y"),
            Axis::Z => write!(f, "z"),
        }
    }
}

/// Bucket tag for compiled vertices.
///
/// `None` holds geometry that is never culled. The discriminants double as
/// bucket indices: bit `i` of a cull-flag mask gates the bucket with
/// index `i + 1`, so the mask order is up, down, south, north, east, west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum CullDirection {
    #[default]
    None = 0,
    Up = 1,
    Down = 2,
    South = 3,
    North = 4,
    East = 5,
    West = 6,
}

impl CullDirection {
    /// All seven buckets in index order.
    pub const ALL: [CullDirection; 7] = [
        CullDirection::None,
        CullDirection::Up,
        CullDirection::Down,
        CullDirection::South,
        CullDirection::North,
        CullDirection::East,
        CullDirection::West,
    ];

    /// The six directional buckets in cull-flag bit order.
    pub const DIRECTIONAL: [CullDirection; 6] = [
        CullDirection::Up,
        CullDirection::Down,
        CullDirection::South,
        CullDirection::North,
        CullDirection::East,
        CullDirection::West,
    ];

    /// Bucket index (0 for `None`).
    pub fn index(self) -> usize {
        self as usize
    }

    /// Bit in a cull-flag mask gating this bucket, `None` has no bit.
    pub fn flag(self) -> Option<u8> {
        match self {
            CullDirection::None => None,
            dir => Some(1 << (dir.index() - 1)),
        }
    }

    /// The face direction this bucket corresponds to.
    pub fn to_direction(self) -> Option<Direction> {
        match self {
            CullDirection::None => None,
            CullDirection::Up => Some(Direction::Up),
            CullDirection::Down => Some(Direction::Down),
            CullDirection::South => Some(Direction::South),
            CullDirection::North => Some(Direction::North),
            CullDirection::East => Some(Direction::East),
            CullDirection::West => Some(Direction::West),
        }
    }

    /// Parse a `cullface` value. Unknown names yield `None`.
    pub fn from_name(s: &str) -> CullDirection {
        Direction::from_str(s)
            .map(Direction::to_cull)
            .unwrap_or(CullDirection::None)
    }
}
