use crate::errors::{LookupError, LookupResult};
use crate::provider::{lookup_key, DataProvider};
use schema::{EncounterArea, StatsRecord};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory provider. Every lookup is counted, and the whole provider can be
/// switched offline to simulate an unreachable backend.
#[derive(Debug, Default)]
pub struct StaticProvider {
    species: HashMap<String, StatsRecord>,
    moves: HashMap<String, Option<u16>>,
    areas: HashMap<String, EncounterArea>,
    offline: AtomicBool,
    stats_lookups: AtomicUsize,
    move_lookups: AtomicUsize,
}

impl StaticProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_species(mut self, stats: StatsRecord) -> Self {
        self.species.insert(lookup_key(&stats.name), stats);
        self
    }

    pub fn with_move(mut self, name: &str, power: Option<u16>) -> Self {
        self.moves.insert(lookup_key(name), power);
        self
    }

    pub fn with_area(mut self, area: EncounterArea) -> Self {
        self.areas.insert(lookup_key(&area.name), area);
        self
    }

    /// While offline, every lookup fails with `LookupError::Unavailable`.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn stats_lookups(&self) -> usize {
        self.stats_lookups.load(Ordering::SeqCst)
    }

    pub fn move_lookups(&self) -> usize {
        self.move_lookups.load(Ordering::SeqCst)
    }

    fn check_online(&self) -> LookupResult<()> {
        if self.offline.load(Ordering::SeqCst) {
            Err(LookupError::Unavailable("static provider is offline".to_string()))
        } else {
            Ok(())
        }
    }
}

impl DataProvider for StaticProvider {
    fn stats(&self, id_or_name: &str) -> LookupResult<StatsRecord> {
        self.stats_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        let key = lookup_key(id_or_name);
        let found = match key.parse::<u16>() {
            Ok(id) => self.species.values().find(|s| s.id == id),
            Err(_) => self.species.get(&key),
        };
        found
            .cloned()
            .ok_or_else(|| LookupError::SpeciesNotFound(id_or_name.to_string()))
    }

    fn move_power(&self, move_name: &str) -> LookupResult<Option<u16>> {
        self.move_lookups.fetch_add(1, Ordering::SeqCst);
        self.check_online()?;
        self.moves
            .get(&lookup_key(move_name))
            .copied()
            .ok_or_else(|| LookupError::MoveNotFound(move_name.to_string()))
    }

    fn encounter_area(&self, area: &str) -> LookupResult<EncounterArea> {
        self.check_online()?;
        self.areas
            .get(&lookup_key(area))
            .cloned()
            .ok_or_else(|| LookupError::AreaNotFound(area.to_string()))
    }

    fn roster(&self) -> LookupResult<Vec<String>> {
        self.check_online()?;
        let mut species: Vec<&StatsRecord> = self.species.values().collect();
        species.sort_by_key(|s| s.id);
        Ok(species.into_iter().map(|s| s.name.clone()).collect())
    }
}
