//! Pokemon Encounter Engine
//!
//! Walk a tile route, trip a random wild encounter in the tall grass, and
//! fight, flee or capture in a phase-gated, turn-based battle. Species, move
//! and encounter data come from a pluggable provider; chosen and caught
//! Pokemon go to a pluggable store.

// --- MODULE DECLARATIONS ---
pub mod battle;
pub mod combatant;
pub mod config;
pub mod errors;
pub mod interface;
pub mod overworld;
pub mod provider;
pub mod rng;
pub mod session;
pub mod store;

// --- PUBLIC API RE-EXPORTS ---

// --- From the `schema` crate ---
pub use schema::{
    CaughtRecord, ChosenSnapshot, Direction, EncounterArea, EncounterSlot, MoveRecord,
    PokemonType, SpriteSet, StatsRecord, TileKind,
};

// --- From this crate's modules (`src/`) ---

// Battle engine and its vocabulary.
pub use battle::engine::{BattleSession, PlayerAction};
pub use battle::state::{BattleEvent, BattleOutcome, BattlePhase, EventBus, Side};
pub use combatant::Combatant;

// Overworld walk.
pub use overworld::{MoveOutcome, Overworld, Position, TileGrid};

// Game flow.
pub use config::GameConfig;
pub use session::{
    Cue, GameSession, PersistenceNote, Screen, SessionUpdate, Theme, MAX_WALK_STEPS,
};

// Collaborators.
pub use provider::{BundledProvider, CachingProvider, DataProvider, StaticProvider};
pub use rng::TurnRng;
pub use store::{FileStore, MemoryStore, PersistenceStore, PlayerId};

// Crate-specific error and result types.
pub use errors::{
    ConfigError, GameError, GameResult, InvalidTransition, LookupError, LookupResult,
    PersistenceError, PersistenceResult,
};
