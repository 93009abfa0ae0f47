use crate::errors::{LookupError, LookupResult};
use crate::provider::{lookup_key, DataProvider};
use schema::{EncounterArea, StatsRecord};

// SPECIES_BY_NAME, SPECIES_BY_ID, MOVE_POWER, AREAS and ROSTER, generated by
// build.rs from data/pokedex.ron.
include!(concat!(env!("OUT_DIR"), "/pokedex_tables.rs"));

/// Offline provider backed by the Pokedex compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BundledProvider;

impl BundledProvider {
    pub fn new() -> Self {
        Self
    }

    pub fn species_count(&self) -> usize {
        SPECIES_BY_NAME.len()
    }
}

impl DataProvider for BundledProvider {
    fn stats(&self, id_or_name: &str) -> LookupResult<StatsRecord> {
        let key = lookup_key(id_or_name);
        let name: &str = match key.parse::<u16>() {
            Ok(id) => SPECIES_BY_ID
                .get(&id)
                .copied()
                .ok_or_else(|| LookupError::SpeciesNotFound(id_or_name.to_string()))?,
            Err(_) => key.as_str(),
        };

        let blob = SPECIES_BY_NAME
            .get(name)
            .ok_or_else(|| LookupError::SpeciesNotFound(id_or_name.to_string()))?;
        postcard::from_bytes(blob)
            .map_err(|e| LookupError::MalformedData(format!("species '{}': {}", name, e)))
    }

    fn move_power(&self, move_name: &str) -> LookupResult<Option<u16>> {
        let key = lookup_key(move_name);
        MOVE_POWER
            .get(key.as_str())
            .copied()
            .ok_or_else(|| LookupError::MoveNotFound(move_name.to_string()))
    }

    fn encounter_area(&self, area: &str) -> LookupResult<EncounterArea> {
        let key = lookup_key(area);
        let blob = AREAS
            .get(key.as_str())
            .ok_or_else(|| LookupError::AreaNotFound(area.to_string()))?;
        postcard::from_bytes(blob)
            .map_err(|e| LookupError::MalformedData(format!("area '{}': {}", key, e)))
    }

    fn roster(&self) -> LookupResult<Vec<String>> {
        Ok(ROSTER.iter().map(|name| name.to_string()).collect())
    }
}
