use crate::errors::ConfigError;
use crate::overworld::{Position, TileGrid};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Sinnoh Route 206.
const DEFAULT_ROUTE: [&str; 19] = [
    "TTTTTTTTTTTTTTTT",
    "TTTTGPPPPPGGGGGT",
    "TGTTGGGPPPPGGGGT",
    "TGGTGGGPPPPPPGGT",
    "TGGGTTGGPPPTPGGT",
    "TPGGTTTTPPTTTTGT",
    "TPGGGTGTTPTTTTGT",
    "TPPTPPPPPPPTTTTT",
    "TPPTGPPPTTPGGTTT",
    "TPPGTPGTGTPPGGGT",
    "TPPGTGTGGTTPPGGT",
    "TPGGTTGGPPPPPPPT",
    "TGGTTTTGPPPPPPPT",
    "TTTTTGPPTTGGPPPT",
    "TTTPPPTTGTTTTGPT",
    "TGPPPPPGGGGGTTGT",
    "TGGPPPPPPGGGTTGT",
    "TGGGPPPPPPPGGTTT",
    "TTTTTTTTTTTTTTTT",
];

/// Runtime settings, loaded from RON. Every field has a default, so a config
/// file only needs the values it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameConfig {
    /// Level shared by both combatants.
    pub level: u8,
    /// Provider area the encounter rate and wild species come from.
    pub encounter_area: String,
    /// Used when the area lookup fails at session start.
    pub fallback_encounter_rate: f64,
    /// One string per row: `T` blocked, `P` open, `G` trigger.
    pub route_layout: Vec<String>,
    pub start: Position,
    pub starter_count: usize,
    pub move_slots: usize,
    pub stats_cache_ttl_secs: u64,
    pub store_dir: PathBuf,
    pub default_player: String,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            level: 50,
            encounter_area: "sinnoh-route-206".to_string(),
            fallback_encounter_rate: 0.1,
            route_layout: DEFAULT_ROUTE.iter().map(|row| row.to_string()).collect(),
            start: Position::new(8, 7),
            starter_count: 3,
            move_slots: 4,
            stats_cache_ttl_secs: 300,
            store_dir: PathBuf::from("saves"),
            default_player: "player".to_string(),
        }
    }
}

impl GameConfig {
    /// Reads and validates a RON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        let config = Self::from_ron(&content)?;
        info!(path = %path.display(), area = %config.encounter_area, "config loaded");
        Ok(config)
    }

    pub fn from_ron(content: &str) -> Result<Self, ConfigError> {
        let config: GameConfig = ron::from_str(content)?;
        config.route_grid()?;
        Ok(config)
    }

    /// Parses the route layout and checks the start tile is walkable.
    pub fn route_grid(&self) -> Result<TileGrid, ConfigError> {
        let grid = TileGrid::parse(&self.route_layout)?;
        match grid.tile(self.start) {
            Some(tile) if tile.is_walkable() => Ok(grid),
            _ => Err(ConfigError::InvalidStart {
                x: self.start.x,
                y: self.start.y,
            }),
        }
    }

    pub fn stats_cache_ttl(&self) -> Duration {
        Duration::from_secs(self.stats_cache_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schema::TileKind;

    #[test]
    fn test_default_route_is_valid() {
        let config = GameConfig::default();
        let grid = config.route_grid().unwrap();
        assert_eq!((grid.width(), grid.height()), (16, 19));
        assert_eq!(grid.tile(config.start), Some(TileKind::Open));
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = GameConfig::from_ron("(level: 30, starter_count: 2)").unwrap();
        assert_eq!(config.level, 30);
        assert_eq!(config.starter_count, 2);
        assert_eq!(config.move_slots, 4);
        assert_eq!(config.encounter_area, "sinnoh-route-206");
        assert_eq!(config.stats_cache_ttl(), Duration::from_secs(300));
    }

    #[test]
    fn test_blocked_start_is_rejected() {
        let result = GameConfig::from_ron(r#"(route_layout: ["TTT", "TPT"], start: (x: 0, y: 0))"#);
        assert!(matches!(result, Err(ConfigError::InvalidStart { x: 0, y: 0 })));

        let result = GameConfig::from_ron(r#"(route_layout: ["TTT", "TPT"], start: (x: 9, y: 9))"#);
        assert!(matches!(result, Err(ConfigError::InvalidStart { .. })));
    }

    #[test]
    fn test_syntax_errors_surface_as_parse_errors() {
        assert!(matches!(
            GameConfig::from_ron("(level: )"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_sample_config_file_parses() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("config/game.ron");
        let config = GameConfig::load(path).unwrap();
        assert_eq!(config.level, 50);
        assert_eq!(config.route_grid().unwrap().height(), 19);
    }
}
