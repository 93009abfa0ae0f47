use crate::overworld::grid::{Position, TileGrid};
use crate::rng::TurnRng;
use schema::{Direction, TileKind};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Number of frames in the walking animation.
const STEP_FRAMES: u8 = 3;

/// Decides whether landing on `tile` starts an encounter.
///
/// Only trigger tiles consume a draw.
pub fn encounter_fires(tile: TileKind, probability: f64, rng: &mut TurnRng) -> bool {
    match tile {
        TileKind::Trigger => rng.chance(probability, "encounter check"),
        TileKind::Open | TileKind::Blocked => false,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MoveOutcome {
    /// The destination was blocked or outside the route; nothing changed.
    Blocked { position: Position },
    Moved {
        position: Position,
        tile: TileKind,
        encounter: bool,
    },
}

impl MoveOutcome {
    pub fn position(&self) -> Position {
        match self {
            MoveOutcome::Blocked { position } | MoveOutcome::Moved { position, .. } => *position,
        }
    }

    pub fn encounter_fired(&self) -> bool {
        matches!(self, MoveOutcome::Moved { encounter: true, .. })
    }
}

/// The player's walk across one route.
#[derive(Debug, Clone)]
pub struct Overworld {
    grid: TileGrid,
    position: Position,
    facing: Direction,
    step_index: u8,
    encounter_probability: f64,
    encounter_pending: bool,
}

impl Overworld {
    /// `start` must be a walkable tile of `grid`; the probability is clamped
    /// into `[0, 1]` here and never re-checked.
    pub fn new(grid: TileGrid, start: Position, encounter_probability: f64) -> Self {
        let encounter_probability = if encounter_probability.is_nan() {
            0.0
        } else {
            encounter_probability.clamp(0.0, 1.0)
        };
        Self {
            grid,
            position: start,
            facing: Direction::Down,
            step_index: 0,
            encounter_probability,
            encounter_pending: false,
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn facing(&self) -> Direction {
        self.facing
    }

    pub fn step_index(&self) -> u8 {
        self.step_index
    }

    pub fn encounter_probability(&self) -> f64 {
        self.encounter_probability
    }

    pub fn encounter_pending(&self) -> bool {
        self.encounter_pending
    }

    /// Attempts one step. A fired encounter stays pending, suppressing further
    /// draws, until [`Overworld::clear_pending`] is called.
    pub fn try_move(&mut self, direction: Direction, rng: &mut TurnRng) -> MoveOutcome {
        let Some((position, tile)) = self.grid.try_move(self.position, direction) else {
            debug!(from = %self.position, ?direction, "move blocked");
            return MoveOutcome::Blocked {
                position: self.position,
            };
        };

        self.position = position;
        self.facing = direction;
        self.step_index = (self.step_index + 1) % STEP_FRAMES;

        let encounter = !self.encounter_pending
            && encounter_fires(tile, self.encounter_probability, rng);
        if encounter {
            self.encounter_pending = true;
            info!(at = %position, "wild encounter triggered");
        }

        MoveOutcome::Moved {
            position,
            tile,
            encounter,
        }
    }

    /// Called once the encounter has ended or been abandoned.
    pub fn clear_pending(&mut self) {
        self.encounter_pending = false;
    }
}
