use crate::PokemonType;
use serde::{Deserialize, Serialize};

/// Stats answer returned by a data provider for one species.
///
/// `moves` is the species' full move pool; callers sample the moveset they
/// actually battle with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsRecord {
    pub id: u16,
    pub name: String,
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub moves: Vec<String>,
    pub types: Vec<PokemonType>,
    pub sprites: SpriteSet,
    pub audio: String,
}

/// Front/back sprite locations for a species. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpriteSet {
    pub front: String,
    pub back: String,
}

/// A move as known to the data provider. Status moves carry no power.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRecord {
    pub name: String,
    pub power: Option<u16>,
}

/// One wild species that can appear in an encounter area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterSlot {
    pub species: String,
    /// Encounter chance in percent, as published for the area.
    pub chance: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncounterArea {
    pub name: String,
    pub slots: Vec<EncounterSlot>,
}

impl EncounterArea {
    /// Per-step encounter probability for the area.
    ///
    /// Taken from the first slot's published chance; an area without slots
    /// never triggers encounters.
    pub fn encounter_rate(&self) -> f64 {
        self.slots
            .first()
            .map(|slot| f64::from(slot.chance) / 100.0)
            .unwrap_or(0.0)
    }
}

/// Source format of `data/pokedex.ron`, compiled into lookup tables by the
/// build script.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PokedexSource {
    pub species: Vec<StatsRecord>,
    pub moves: Vec<MoveRecord>,
    pub areas: Vec<EncounterArea>,
}
