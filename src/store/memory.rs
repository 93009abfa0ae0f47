use crate::errors::{PersistenceError, PersistenceResult};
use crate::store::{PersistenceStore, PlayerId, PlayerRecord};
use schema::{CaughtRecord, ChosenSnapshot};
use std::collections::HashMap;
use std::sync::RwLock;

/// Process-local store; contents vanish with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    players: RwLock<HashMap<PlayerId, PlayerRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PersistenceStore for MemoryStore {
    fn save_chosen(&self, player: &PlayerId, snapshot: &ChosenSnapshot) -> PersistenceResult<()> {
        let mut players = self.players.write().unwrap_or_else(|e| e.into_inner());
        players.entry(player.clone()).or_default().chosen = Some(snapshot.clone());
        Ok(())
    }

    fn load_chosen(&self, player: &PlayerId) -> PersistenceResult<ChosenSnapshot> {
        let players = self.players.read().unwrap_or_else(|e| e.into_inner());
        players
            .get(player)
            .and_then(|record| record.chosen.clone())
            .ok_or_else(|| PersistenceError::NotFound(player.clone()))
    }

    fn append_caught(&self, player: &PlayerId, record: &CaughtRecord) -> PersistenceResult<()> {
        let mut players = self.players.write().unwrap_or_else(|e| e.into_inner());
        players.entry(player.clone()).or_default().caught.push(record.clone());
        Ok(())
    }

    fn list_caught(&self, player: &PlayerId) -> PersistenceResult<Vec<CaughtRecord>> {
        let players = self.players.read().unwrap_or_else(|e| e.into_inner());
        Ok(players
            .get(player)
            .map(|record| record.caught.clone())
            .unwrap_or_default())
    }

    fn clear_caught(&self, player: &PlayerId) -> PersistenceResult<()> {
        let mut players = self.players.write().unwrap_or_else(|e| e.into_inner());
        if let Some(record) = players.get_mut(player) {
            record.caught.clear();
        }
        Ok(())
    }
}
