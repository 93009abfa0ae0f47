use crate::{PokemonType, StatsRecord};
use serde::{Deserialize, Serialize};

/// The player's chosen Pokemon as held by the persistence store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChosenSnapshot {
    pub id: u16,
    pub name: String,
    pub hp: u16,
    pub attack: u16,
    pub defense: u16,
    pub moves: Vec<String>,
    pub types: Vec<PokemonType>,
    pub sprite_front: String,
    pub sprite_back: String,
    pub audio: String,
}

impl ChosenSnapshot {
    /// Builds a snapshot from a provider answer and the moveset picked for it.
    pub fn from_stats(stats: &StatsRecord, moves: Vec<String>) -> Self {
        Self {
            id: stats.id,
            name: stats.name.clone(),
            hp: stats.hp,
            attack: stats.attack,
            defense: stats.defense,
            moves,
            types: stats.types.clone(),
            sprite_front: stats.sprites.front.clone(),
            sprite_back: stats.sprites.back.clone(),
            audio: stats.audio.clone(),
        }
    }
}

/// A wild Pokemon captured during a battle.
///
/// `hp` records the opponent's scaled maximum HP at the time of capture, not
/// its base stat.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaughtRecord {
    pub name: String,
    pub hp: u32,
    pub attack: u16,
    pub defense: u16,
    pub moves: Vec<String>,
    pub types: Vec<PokemonType>,
    pub sprite_front: String,
    pub audio: String,
}
