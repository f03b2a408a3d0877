use serde::{Deserialize, Serialize};

/// A cell coordinate. Signed so that positions just outside the board
/// (a head that ran off the edge) are representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub const fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// The neighbouring cell `steps` cells away in `direction`.
    pub fn step(self, direction: Direction, steps: i32) -> Self {
        let (dr, dc) = direction.delta();
        Self {
            row: self.row + dr * steps,
            column: self.column + dc * steps,
        }
    }

    /// Euclidean distance in cell units.
    pub fn distance_to(self, other: Position) -> f64 {
        let dr = f64::from(self.row - other.row);
        let dc = f64::from(self.column - other.column);
        (dr * dr + dc * dc).sqrt()
    }

    /// Manhattan distance to a possibly fractional point.
    pub fn manhattan_to(self, row: f64, column: f64) -> f64 {
        (f64::from(self.row) - row).abs() + (f64::from(self.column) - column).abs()
    }
}

/// One of the four cardinal directions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];

    /// Row and column delta of a single step.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (-1, 0),
            Direction::Down => (1, 0),
            Direction::Left => (0, -1),
            Direction::Right => (0, 1),
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Direction of a single orthogonal step from `from` to `to`, if any.
    pub fn between(from: Position, to: Position) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|d| from.step(*d, 1) == to)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "up" => Some(Direction::Up),
            "down" => Some(Direction::Down),
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}
