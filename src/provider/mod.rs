//! Pokemon data providers.
//!
//! The battle engine and session only see [`DataProvider`]; lookups fail with
//! [`LookupError`](crate::errors::LookupError) and callers apply their own
//! defaults.

pub mod bundled;
pub mod cache;
pub mod memory;

pub use bundled::BundledProvider;
pub use cache::CachingProvider;
pub use memory::StaticProvider;

use crate::errors::LookupResult;
use schema::{EncounterArea, StatsRecord};
use std::sync::Arc;

pub trait DataProvider {
    /// Stats for a species, by lowercase name or national dex number.
    fn stats(&self, id_or_name: &str) -> LookupResult<StatsRecord>;

    /// Base power of a move. `Ok(None)` means the move exists but has no power.
    fn move_power(&self, move_name: &str) -> LookupResult<Option<u16>>;

    fn encounter_area(&self, area: &str) -> LookupResult<EncounterArea>;

    /// Species names that may be offered as starters.
    fn roster(&self) -> LookupResult<Vec<String>>;
}

impl<P: DataProvider + ?Sized> DataProvider for Arc<P> {
    fn stats(&self, id_or_name: &str) -> LookupResult<StatsRecord> {
        (**self).stats(id_or_name)
    }

    fn move_power(&self, move_name: &str) -> LookupResult<Option<u16>> {
        (**self).move_power(move_name)
    }

    fn encounter_area(&self, area: &str) -> LookupResult<EncounterArea> {
        (**self).encounter_area(area)
    }

    fn roster(&self) -> LookupResult<Vec<String>> {
        (**self).roster()
    }
}

impl<P: DataProvider + ?Sized> DataProvider for Box<P> {
    fn stats(&self, id_or_name: &str) -> LookupResult<StatsRecord> {
        (**self).stats(id_or_name)
    }

    fn move_power(&self, move_name: &str) -> LookupResult<Option<u16>> {
        (**self).move_power(move_name)
    }

    fn encounter_area(&self, area: &str) -> LookupResult<EncounterArea> {
        (**self).encounter_area(area)
    }

    fn roster(&self) -> LookupResult<Vec<String>> {
        (**self).roster()
    }
}

/// Normalizes a lookup key the way every provider stores it.
pub(crate) fn lookup_key(raw: &str) -> String {
    raw.trim().to_ascii_lowercase()
}
