use crate::battle::state::BattlePhase;
use crate::store::PlayerId;
use thiserror::Error;

/// Main error type for the encounter engine
#[derive(Debug, Error)]
pub enum GameError {
    /// Error related to data provider lookups
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),
    /// Error related to the persistence store
    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),
    /// Error related to loading or validating configuration
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
    /// A battle action arrived outside the phase that accepts it
    #[error("Battle error: {0}")]
    Transition(#[from] InvalidTransition),
    /// A command was issued on a screen that cannot handle it
    #[error("Invalid command: {0}")]
    InvalidCommand(String),
}

/// Errors raised by a data provider.
///
/// The battle engine never propagates these into a turn; it applies the
/// documented defaults instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// The species name or dex number is unknown to the provider
    #[error("Species not found: {0}")]
    SpeciesNotFound(String),
    /// The move name is unknown to the provider
    #[error("Move not found: {0}")]
    MoveNotFound(String),
    /// The encounter area is unknown to the provider
    #[error("Encounter area not found: {0}")]
    AreaNotFound(String),
    /// Provider data could not be decoded
    #[error("Malformed provider data: {0}")]
    MalformedData(String),
    /// The provider could not be reached
    #[error("Provider unavailable: {0}")]
    Unavailable(String),
}

/// Errors raised by a persistence store.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// No chosen Pokemon has been saved for this player
    #[error("No chosen Pokemon stored for player {0}")]
    NotFound(PlayerId),
    /// The underlying storage failed
    #[error("Storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// A stored record could not be encoded or decoded
    #[error("Stored record is corrupt: {0}")]
    Codec(#[from] postcard::Error),
}

impl PersistenceError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, PersistenceError::NotFound(_))
    }
}

/// Errors raised while loading or validating a `GameConfig`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),
    #[error("Route layout is empty")]
    EmptyLayout,
    #[error("Route row {row} has {found} tiles, expected {expected}")]
    RaggedLayout {
        row: usize,
        found: usize,
        expected: usize,
    },
    #[error("Unknown tile '{tile}' at ({x}, {y})")]
    UnknownTile { tile: char, x: usize, y: usize },
    #[error("Start position ({x}, {y}) is outside the route or blocked")]
    InvalidStart { x: usize, y: usize },
}

/// A battle action was issued outside the phase that accepts it.
///
/// The battle state is left untouched; callers treat this as a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("{action} is not accepted while the battle is {phase:?}")]
pub struct InvalidTransition {
    pub action: &'static str,
    pub phase: BattlePhase,
}

/// Type alias for Results using GameError
pub type GameResult<T> = Result<T, GameError>;

/// Type alias for Results using LookupError
pub type LookupResult<T> = Result<T, LookupError>;

/// Type alias for Results using PersistenceError
pub type PersistenceResult<T> = Result<T, PersistenceError>;
