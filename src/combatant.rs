use schema::{CaughtRecord, ChosenSnapshot, PokemonType, StatsRecord};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Percent of base HP gained per level.
const HP_GROWTH_PERCENT_PER_LEVEL: u32 = 3;

/// Scaled maximum HP for a combatant: `floor(base_hp * (1 + 0.03 * level))`.
///
/// Computed in integer percent so round numbers stay exact.
pub fn scaled_max_hp(base_hp: u16, level: u8) -> u32 {
    u32::from(base_hp) * (100 + HP_GROWTH_PERCENT_PER_LEVEL * u32::from(level)) / 100
}

/// Front/back sprite identifiers. Opaque to the engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sprites {
    pub front: String,
    pub back: String,
}

/// One side's active creature in a battle.
///
/// `max_hp` is fixed at construction; `current_hp` only changes through
/// [`Combatant::take_damage`] and always stays in `0..=max_hp`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Combatant {
    pub display_name: String,
    pub level: u8,
    pub base_hp: u16,
    current_hp: u32,
    max_hp: u32,
    pub attack: u16,
    pub defense: u16,
    pub moves: Vec<String>,
    pub types: Vec<PokemonType>,
    pub audio_cue: String,
    pub sprites: Sprites,
}

impl Combatant {
    pub fn new(
        display_name: impl Into<String>,
        level: u8,
        base_hp: u16,
        attack: u16,
        defense: u16,
        moves: Vec<String>,
    ) -> Self {
        let max_hp = scaled_max_hp(base_hp, level);
        Self {
            display_name: display_name.into(),
            level,
            base_hp,
            current_hp: max_hp,
            max_hp,
            attack,
            defense,
            moves,
            types: Vec::new(),
            audio_cue: String::new(),
            sprites: Sprites::default(),
        }
    }

    /// Builds the wild opponent from a provider answer and its sampled moveset.
    pub fn from_stats(stats: &StatsRecord, moves: Vec<String>, level: u8) -> Self {
        let mut combatant = Self::new(
            display_name(&stats.name),
            level,
            stats.hp,
            stats.attack,
            stats.defense,
            moves,
        );
        combatant.types = stats.types.clone();
        combatant.audio_cue = stats.audio.clone();
        combatant.sprites = Sprites {
            front: stats.sprites.front.clone(),
            back: stats.sprites.back.clone(),
        };
        combatant
    }

    /// Builds the player's side from the stored chosen Pokemon.
    pub fn from_snapshot(snapshot: &ChosenSnapshot, level: u8) -> Self {
        let mut combatant = Self::new(
            display_name(&snapshot.name),
            level,
            snapshot.hp,
            snapshot.attack,
            snapshot.defense,
            snapshot.moves.clone(),
        );
        combatant.types = snapshot.types.clone();
        combatant.audio_cue = snapshot.audio.clone();
        combatant.sprites = Sprites {
            front: snapshot.sprite_front.clone(),
            back: snapshot.sprite_back.clone(),
        };
        combatant
    }

    /// The record written to the store when this combatant is captured.
    pub fn to_caught_record(&self) -> CaughtRecord {
        CaughtRecord {
            name: self.display_name.clone(),
            hp: self.max_hp,
            attack: self.attack,
            defense: self.defense,
            moves: self.moves.clone(),
            types: self.types.clone(),
            sprite_front: self.sprites.front.clone(),
            audio: self.audio_cue.clone(),
        }
    }

    pub fn current_hp(&self) -> u32 {
        self.current_hp
    }

    pub fn max_hp(&self) -> u32 {
        self.max_hp
    }

    pub fn is_fainted(&self) -> bool {
        self.current_hp == 0
    }

    /// Fraction of HP remaining, in `[0, 1]`.
    pub fn hp_ratio(&self) -> f64 {
        if self.max_hp == 0 {
            return 0.0;
        }
        f64::from(self.current_hp) / f64::from(self.max_hp)
    }

    /// Applies damage, clamping at zero. Returns the HP actually lost.
    pub fn take_damage(&mut self, damage: u32) -> u32 {
        let lost = damage.min(self.current_hp);
        self.current_hp -= lost;
        lost
    }

    /// Overrides current HP, clamped to `0..=max_hp`.
    pub fn set_hp(&mut self, hp: u32) {
        self.current_hp = hp.min(self.max_hp);
    }
}

impl fmt::Display for Combatant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} Lv.{} (HP: {}/{})",
            self.display_name, self.level, self.current_hp, self.max_hp
        )?;
        if f.alternate() {
            writeln!(f)?;
            writeln!(f, "  Attack: {}  Defense: {}", self.attack, self.defense)?;
            if !self.types.is_empty() {
                let types: Vec<String> = self.types.iter().map(|t| t.to_string()).collect();
                writeln!(f, "  Types: {}", types.join(", "))?;
            }
            let moves: Vec<String> = self.moves.iter().map(|m| format_move_name(m)).collect();
            write!(f, "  Moves: {}", moves.join(", "))?;
        }
        Ok(())
    }
}

/// Title-cases a provider species name: `"mr-mime"` -> `"Mr Mime"`.
pub fn display_name(name: &str) -> String {
    title_case(name)
}

/// Formats a provider move name for display: `"quick-attack"` -> `"Quick Attack"`.
pub fn format_move_name(name: &str) -> String {
    title_case(name)
}

fn title_case(name: &str) -> String {
    name.split(['-', '_', ' '])
        .filter(|word| !word.is_empty())
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(|c| c.to_lowercase()))
                    .collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
