use crate::errors::ConfigError;
use schema::{Direction, TileKind};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: usize,
    pub y: usize,
}

impl Position {
    pub fn new(x: usize, y: usize) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Rectangular route map, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileGrid {
    width: usize,
    height: usize,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Parses one string per row, one tile character per column.
    pub fn parse<S: AsRef<str>>(rows: &[S]) -> Result<Self, ConfigError> {
        let width = rows.first().map(|row| row.as_ref().chars().count()).unwrap_or(0);
        if width == 0 {
            return Err(ConfigError::EmptyLayout);
        }

        let mut tiles = Vec::with_capacity(width * rows.len());
        for (y, row) in rows.iter().enumerate() {
            let row = row.as_ref();
            let found = row.chars().count();
            if found != width {
                return Err(ConfigError::RaggedLayout {
                    row: y,
                    found,
                    expected: width,
                });
            }
            for (x, tile) in row.chars().enumerate() {
                let kind = TileKind::from_str(tile.encode_utf8(&mut [0; 4]))
                    .map_err(|_| ConfigError::UnknownTile { tile, x, y })?;
                tiles.push(kind);
            }
        }

        Ok(Self {
            width,
            height: rows.len(),
            tiles,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn tile(&self, position: Position) -> Option<TileKind> {
        if position.x >= self.width || position.y >= self.height {
            return None;
        }
        self.tiles.get(position.y * self.width + position.x).copied()
    }

    /// The neighbouring position in `direction`, if it is inside the grid.
    pub fn neighbour(&self, position: Position, direction: Direction) -> Option<Position> {
        let (dx, dy) = direction.delta();
        let x = position.x.checked_add_signed(dx as isize)?;
        let y = position.y.checked_add_signed(dy as isize)?;
        if x < self.width && y < self.height {
            Some(Position { x, y })
        } else {
            None
        }
    }

    /// Where a step in `direction` lands, or `None` if it leaves the grid or
    /// hits a blocked tile.
    pub fn try_move(&self, position: Position, direction: Direction) -> Option<(Position, TileKind)> {
        let next = self.neighbour(position, direction)?;
        let tile = self.tile(next)?;
        tile.is_walkable().then_some((next, tile))
    }

    pub fn rows(&self) -> impl Iterator<Item = &[TileKind]> {
        self.tiles.chunks(self.width)
    }
}
