// Pokemon Encounter Schema - Shared record definitions
// This crate contains the records exchanged with the data provider and the
// persistence store. It is shared between the main pokemon-encounter crate and
// its build script, so the bundled pokedex can be postcard-encoded at compile time.

// Re-export the main types
pub use battle_data::*;
pub use pokemon_types::*;
pub use species_data::*;
pub use world_data::*;

pub mod battle_data;
pub mod pokemon_types;
pub mod species_data;
pub mod world_data;
