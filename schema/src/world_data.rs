use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A single overworld tile.
///
/// Layouts are written one character per tile: `T` (tree, blocked),
/// `P` (path, open) and `G` (tall grass, may trigger an encounter).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
pub enum TileKind {
    #[strum(serialize = "T")]
    Blocked,
    #[strum(serialize = "P")]
    Open,
    #[strum(serialize = "G")]
    Trigger,
}

impl TileKind {
    pub fn is_walkable(self) -> bool {
        !matches!(self, TileKind::Blocked)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Grid delta as `(dx, dy)`; `y` grows downwards.
    pub fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up => (0, -1),
            Direction::Down => (0, 1),
            Direction::Left => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}
