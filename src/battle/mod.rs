pub mod calculators;
pub mod catch;
pub mod engine;
pub mod state;

pub use engine::{BattleSession, PlayerAction};
pub use state::{BattleEvent, BattleOutcome, BattlePhase, EventBus, Side};

#[cfg(test)]
mod tests;
