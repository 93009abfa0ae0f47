pub mod encounter;
pub mod grid;

pub use encounter::{encounter_fires, MoveOutcome, Overworld};
pub use grid::{Position, TileGrid};
