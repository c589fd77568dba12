//! Game configuration consumed once per new game
//!
//! A [`GameConfig`] describes everything the session needs to start an
//! episode: which ruleset to load, the map shape, the opposition, and the
//! RNG seed. It is validated up front and immutable once a game starts.

use serde::{Deserialize, Serialize};

/// Configuration for a new game
///
/// Defaults match the standard training setup: a 40x40 map against two
/// mid-skill AI opponents with fog of war enabled.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Ruleset name, e.g. "classic"
    pub ruleset: String,

    /// Map width in tiles
    pub map_width: u32,

    /// Map height in tiles
    pub map_height: u32,

    /// Number of AI opponents (the controlled player is created on top)
    pub num_ai_players: u32,

    /// AI difficulty, 0-10
    pub ai_skill_level: u32,

    /// Random seed; 0 lets the engine choose one
    pub seed: u32,

    /// Enable fog of war for all players
    pub fog_of_war: bool,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            ruleset: "classic".to_string(),
            map_width: 40,
            map_height: 40,
            num_ai_players: 2,
            ai_skill_level: 3,
            seed: 0,
            fog_of_war: true,
        }
    }
}

/// Maximum players per game (controlled player + AI opponents)
pub const MAX_PLAYERS: u32 = 8;

/// Smallest map edge the generator can seat players on
pub const MIN_MAP_SIZE: u32 = 16;

/// Largest supported map edge
pub const MAX_MAP_SIZE: u32 = 512;

impl GameConfig {
    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<(), String> {
        if self.ruleset.is_empty() {
            return Err("ruleset name must not be empty".into());
        }

        if self.map_width < MIN_MAP_SIZE
            || self.map_height < MIN_MAP_SIZE
            || self.map_width > MAX_MAP_SIZE
            || self.map_height > MAX_MAP_SIZE
        {
            return Err(format!(
                "map size {}x{} outside supported range {}..={} per edge",
                self.map_width, self.map_height, MIN_MAP_SIZE, MAX_MAP_SIZE
            ));
        }

        if self.num_ai_players == 0 || self.num_ai_players >= MAX_PLAYERS {
            return Err(format!(
                "num_ai_players ({}) must be in 1..={}",
                self.num_ai_players,
                MAX_PLAYERS - 1
            ));
        }

        if self.ai_skill_level > 10 {
            return Err(format!(
                "ai_skill_level ({}) must be in 0..=10",
                self.ai_skill_level
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GameConfig::default().validate().is_ok());
    }

    #[test]
    fn test_rejects_tiny_map() {
        let config = GameConfig {
            map_width: 4,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_too_many_ai_players() {
        let config = GameConfig {
            num_ai_players: MAX_PLAYERS,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_excess_skill() {
        let config = GameConfig {
            ai_skill_level: 11,
            ..GameConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
