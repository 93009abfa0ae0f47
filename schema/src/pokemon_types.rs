use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Elemental types as reported by the data provider.
///
/// Parsing is case-insensitive so provider strings such as `"grass"` map
/// directly onto a variant; display uses the lowercase provider spelling.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString,
)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum PokemonType {
    Normal,
    Fighting,
    Flying,
    Poison,
    Ground,
    Rock,
    Bug,
    Ghost,
    Steel,
    Fire,
    Water,
    Grass,
    Electric,
    Psychic,
    Ice,
    Dragon,
    Dark,
    Fairy,
}
