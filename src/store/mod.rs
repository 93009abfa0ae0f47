//! Persistence for the chosen Pokemon and the caught list, keyed by player.

pub mod file;
pub mod memory;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::errors::PersistenceResult;
use schema::{CaughtRecord, ChosenSnapshot};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PlayerId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// Everything stored for one player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRecord {
    pub chosen: Option<ChosenSnapshot>,
    pub caught: Vec<CaughtRecord>,
}

pub trait PersistenceStore {
    /// Replaces the player's chosen Pokemon.
    fn save_chosen(&self, player: &PlayerId, snapshot: &ChosenSnapshot) -> PersistenceResult<()>;

    /// Fails with `PersistenceError::NotFound` if nothing has been chosen yet.
    fn load_chosen(&self, player: &PlayerId) -> PersistenceResult<ChosenSnapshot>;

    fn append_caught(&self, player: &PlayerId, record: &CaughtRecord) -> PersistenceResult<()>;

    /// Caught Pokemon in capture order. Empty for unknown players.
    fn list_caught(&self, player: &PlayerId) -> PersistenceResult<Vec<CaughtRecord>>;

    fn count_caught(&self, player: &PlayerId) -> PersistenceResult<usize> {
        Ok(self.list_caught(player)?.len())
    }

    fn clear_caught(&self, player: &PlayerId) -> PersistenceResult<()>;
}

impl<S: PersistenceStore + ?Sized> PersistenceStore for Arc<S> {
    fn save_chosen(&self, player: &PlayerId, snapshot: &ChosenSnapshot) -> PersistenceResult<()> {
        (**self).save_chosen(player, snapshot)
    }

    fn load_chosen(&self, player: &PlayerId) -> PersistenceResult<ChosenSnapshot> {
        (**self).load_chosen(player)
    }

    fn append_caught(&self, player: &PlayerId, record: &CaughtRecord) -> PersistenceResult<()> {
        (**self).append_caught(player, record)
    }

    fn list_caught(&self, player: &PlayerId) -> PersistenceResult<Vec<CaughtRecord>> {
        (**self).list_caught(player)
    }

    fn count_caught(&self, player: &PlayerId) -> PersistenceResult<usize> {
        (**self).count_caught(player)
    }

    fn clear_caught(&self, player: &PlayerId) -> PersistenceResult<()> {
        (**self).clear_caught(player)
    }
}

impl<S: PersistenceStore + ?Sized> PersistenceStore for Box<S> {
    fn save_chosen(&self, player: &PlayerId, snapshot: &ChosenSnapshot) -> PersistenceResult<()> {
        (**self).save_chosen(player, snapshot)
    }

    fn load_chosen(&self, player: &PlayerId) -> PersistenceResult<ChosenSnapshot> {
        (**self).load_chosen(player)
    }

    fn append_caught(&self, player: &PlayerId, record: &CaughtRecord) -> PersistenceResult<()> {
        (**self).append_caught(player, record)
    }

    fn list_caught(&self, player: &PlayerId) -> PersistenceResult<Vec<CaughtRecord>> {
        (**self).list_caught(player)
    }

    fn count_caught(&self, player: &PlayerId) -> PersistenceResult<usize> {
        (**self).count_caught(player)
    }

    fn clear_caught(&self, player: &PlayerId) -> PersistenceResult<()> {
        (**self).clear_caught(player)
    }
}
